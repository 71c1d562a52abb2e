pub mod core;
pub mod llm;
pub mod rag;
pub mod report;
pub mod review;
pub mod server;
pub mod state;
