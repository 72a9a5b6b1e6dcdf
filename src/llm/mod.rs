pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;
use crate::models::chat::ConversationMessage;

pub use self::gemini::GeminiChatClient;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub contents: Vec<ConversationMessage>,
    pub system_instruction: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("provider response contained no text")]
    EmptyResponse,
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// A text-generation backend: one conversation in, one reply out.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
