//! Speech-to-text transcription

use std::path::Path;

use async_trait::async_trait;

use crate::config::SttConfig;
use crate::{Error, Result};

/// Response from a Whisper-style transcription API
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// A speech recognizer that reads audio from a file on disk
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the WAV audio at `path` to text
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or recognition fails.
    async fn transcribe_file(&self, path: &Path) -> Result<String>;
}

/// Transcribes speech via an OpenAI-compatible transcription endpoint
pub struct SpeechToText {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl SpeechToText {
    /// Create a new STT instance from recognition configuration
    ///
    /// # Errors
    ///
    /// Returns error if the model name is missing.
    pub fn new(config: &SttConfig) -> Result<Self> {
        if config.model.is_empty() {
            return Err(Error::Config("STT model name required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Transcribe WAV audio bytes to text
    ///
    /// # Errors
    ///
    /// Returns error if transcription fails
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting transcription");

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Stt(e.to_string()))?,
            )
            .text("model", self.model.clone());

        let mut builder = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(form);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, "transcription request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Stt(format!("transcription API error {status}: {body}")));
        }

        let result: TranscriptionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription response");
            e
        })?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let audio = tokio::fs::read(path).await?;
        self.transcribe(audio).await
    }
}
