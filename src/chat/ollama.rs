//! Ollama chat-completion client

use std::time::Duration;

use async_trait::async_trait;

use super::ChatBackend;
use crate::{Error, Result};

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Known response shapes from `/api/chat`
///
/// Current servers nest the reply under `message`; some older builds
/// return a top-level `content` field. Anything else is `Unrecognized`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ChatResponse {
    Nested { message: ResponseMessage },
    Flat { content: String },
    Unrecognized(serde_json::Value),
}

#[derive(serde::Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for a local Ollama server
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// `timeout` bounds each request; `max_retries` is clamped to at most
    /// one retry, and only transport failures are retried.
    ///
    /// # Errors
    ///
    /// Returns error if the model name is empty or the client cannot be built.
    pub fn new(
        base_url: &str,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        if model.is_empty() {
            return Err(Error::Config("Ollama model name required".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            max_retries: max_retries.min(1),
        })
    }

    async fn chat_once(&self, utterance: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: utterance,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Chat(format!("Ollama API error {status}: {body}")));
        }

        let body = response.text().await?;
        match serde_json::from_str::<ChatResponse>(&body)? {
            ChatResponse::Nested { message } => Ok(message.content),
            ChatResponse::Flat { content } => Ok(content),
            ChatResponse::Unrecognized(value) => Err(Error::UnexpectedShape(value.to_string())),
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn complete(&self, utterance: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.chat_once(utterance).await {
                Ok(reply) => {
                    tracing::debug!(chars = reply.len(), "chat completion received");
                    return Ok(reply);
                }
                // A recognized-but-unknown shape will not improve on retry
                Err(e @ Error::UnexpectedShape(_)) => return Err(e),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "chat request failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
