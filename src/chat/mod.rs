//! Chat-completion backend

mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;

use crate::Result;

/// A chat-completion backend that turns one user utterance into reply text
///
/// Implementations extract the reply from whatever wire shape the backend
/// speaks; an unrecognized shape is `Error::UnexpectedShape`, everything
/// else that goes wrong is a transport-class error.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a reply for a single user turn
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the response shape is unknown.
    async fn complete(&self, utterance: &str) -> Result<String>;
}
