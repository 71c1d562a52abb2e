pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiClient;
pub use provider::{CompletionError, CompletionGateway, EmbeddingError, EmbeddingGateway};
pub use types::{ChatMessage, CompletionRequest, Dialogue, Role};
