//! Text-to-speech synthesis

use crate::config::VoiceConfig;
use crate::{Error, Result};

/// Synthesizes speech from text via an OpenAI-compatible speech endpoint
pub struct TextToSpeech {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    speed: f32,
}

impl TextToSpeech {
    /// Create a new TTS instance from voice configuration
    ///
    /// # Errors
    ///
    /// Returns error if the voice identifier is missing.
    pub fn new(config: &VoiceConfig) -> Result<Self> {
        if config.voice.is_empty() {
            return Err(Error::Config("TTS voice identifier required".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            speed: config.speed,
        })
    }

    /// The configured voice identifier
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes (MP3 format)
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let mut builder = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("speech API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}
