//! Retrieval module.
//!
//! This module provides:
//! - `RetrievalClient`: namespaced top-k similarity queries
//! - `PineconeIndex`: hosted index client
//! - `MemoryIndex` (tests only): in-process brute-force index
//! - `grounding_context`: metadata serialisation for dialogue grounding

mod context_builder;
#[cfg(test)]
mod memory;
mod pinecone;
mod store;

pub use context_builder::grounding_context;
#[cfg(test)]
pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;
pub use store::{Match, RetrievalClient, RetrievalError, RetrievalResult};
