//! Dialogue responder
//!
//! Two scripted rules answer identity questions directly; everything else
//! is delegated to the chat backend. Backend trouble degrades to a scripted
//! apology so the caller always gets a reply to show and speak.

use std::sync::Arc;

use crate::chat::ChatBackend;
use crate::{Error, Result};

/// Fixed reply when the utterance asks for the assistant's name
pub const NAME_REPLY: &str = "My name is Lisa.";

/// Fixed reply when the utterance asks who built the assistant
pub const DEVELOPER_REPLY: &str = "I was developed by Robo Miracle.";

/// Scripted apology when the chat backend is unreachable
pub const BACKEND_APOLOGY: &str =
    "I am having trouble connecting to my AI backend. Please try again later.";

/// Produces a reply string for each user utterance
pub struct Responder {
    backend: Arc<dyn ChatBackend>,
}

impl Responder {
    /// Create a responder over the given chat backend
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Produce a reply for one user utterance
    ///
    /// Scripted rules are checked first, case-insensitively, and never
    /// touch the backend. A failed delegation becomes the scripted apology.
    ///
    /// # Errors
    ///
    /// Returns error only when the backend answered with a shape the
    /// client does not recognize.
    pub async fn respond(&self, utterance: &str) -> Result<String> {
        let lowered = utterance.to_lowercase();

        if lowered.contains("your name") {
            return Ok(NAME_REPLY.to_string());
        }
        if lowered.contains("who developed you") {
            return Ok(DEVELOPER_REPLY.to_string());
        }

        match self.backend.complete(utterance).await {
            Ok(reply) => Ok(reply),
            Err(e @ Error::UnexpectedShape(_)) => Err(e),
            Err(e) => {
                tracing::error!(error = %e, "chat backend failed");
                Ok(BACKEND_APOLOGY.to_string())
            }
        }
    }
}
