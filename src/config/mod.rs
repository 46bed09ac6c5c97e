//! Configuration for the Lisa gateway

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Default chat request timeout in seconds
const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;

/// Default depth of the speak queue
const DEFAULT_QUEUE_DEPTH: usize = 32;

/// Lisa gateway configuration
///
/// Built from defaults, overlaid with the optional TOML config file, then
/// environment variables. Passed explicitly to every component constructor.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Chat-completion backend configuration
    pub chat: ChatConfig,

    /// Spoken-output configuration
    pub voice: VoiceConfig,

    /// Speech-recognition configuration
    pub stt: SttConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// Chat-completion backend configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Ollama base URL
    pub base_url: String,

    /// Model identifier (e.g. "llama3.2")
    pub model: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Retries after a transport failure (clamped to at most 1)
    pub max_retries: u32,
}

/// Spoken-output configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable spoken replies
    pub enabled: bool,

    /// Speech API base URL (OpenAI-compatible)
    pub base_url: String,

    /// API key, if the endpoint requires one
    pub api_key: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub model: String,

    /// TTS voice identifier
    pub voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub speed: f32,

    /// Speak queue depth; overflow rejects the newest item
    pub queue_depth: usize,
}

/// Speech-recognition configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Recognition API base URL (OpenAI-compatible)
    pub base_url: String,

    /// API key, if the endpoint requires one
    pub api_key: Option<String>,

    /// Recognition model (e.g. "whisper-1")
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 5000,
                static_dir: Some(PathBuf::from("static")),
            },
            chat: ChatConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "llama3.2".to_string(),
                timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
                max_retries: 1,
            },
            voice: VoiceConfig {
                enabled: true,
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "tts-1".to_string(),
                voice: "alloy".to_string(),
                speed: 1.0,
                queue_depth: DEFAULT_QUEUE_DEPTH,
            },
            stt: SttConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "whisper-1".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from defaults, the TOML overlay, and environment
    ///
    /// An explicit `path` must exist and parse; the default location
    /// (`~/.config/lisa/config.toml`) is optional and soft-fails.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be read or parsed,
    /// or if a value is out of range.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let overlay = match path {
            Some(p) => file::load_from(p)?,
            None => file::load_default(),
        };

        let mut config = Self::default();
        config.apply(overlay);

        // Speech endpoints share the OpenAI key unless the file set one
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.voice.api_key.get_or_insert_with(|| key.clone());
                config.stt.api_key.get_or_insert(key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, overlay: file::LisaConfigFile) {
        if let Some(port) = overlay.server.port {
            self.server.port = port;
        }
        if let Some(dir) = overlay.server.static_dir {
            self.server.static_dir = Some(PathBuf::from(dir));
        }

        if let Some(url) = overlay.chat.base_url {
            self.chat.base_url = url;
        }
        if let Some(model) = overlay.chat.model {
            self.chat.model = model;
        }
        if let Some(secs) = overlay.chat.timeout_secs {
            self.chat.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = overlay.chat.max_retries {
            self.chat.max_retries = retries;
        }

        if let Some(enabled) = overlay.voice.enabled {
            self.voice.enabled = enabled;
        }
        if let Some(url) = overlay.voice.base_url {
            self.voice.base_url = url;
        }
        if let Some(key) = overlay.voice.api_key {
            self.voice.api_key = Some(key);
        }
        if let Some(model) = overlay.voice.model {
            self.voice.model = model;
        }
        if let Some(voice) = overlay.voice.voice {
            self.voice.voice = voice;
        }
        if let Some(speed) = overlay.voice.speed {
            self.voice.speed = speed;
        }
        if let Some(depth) = overlay.voice.queue_depth {
            self.voice.queue_depth = depth;
        }

        if let Some(url) = overlay.stt.base_url {
            self.stt.base_url = url;
        }
        if let Some(key) = overlay.stt.api_key {
            self.stt.api_key = Some(key);
        }
        if let Some(model) = overlay.stt.model {
            self.stt.model = model;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chat.model.is_empty() {
            return Err(Error::Config("chat model name must not be empty".to_string()));
        }
        if !(0.25..=4.0).contains(&self.voice.speed) {
            return Err(Error::Config(format!(
                "voice speed {} out of range (0.25 to 4.0)",
                self.voice.speed
            )));
        }
        if self.voice.queue_depth == 0 {
            return Err(Error::Config("speak queue depth must be at least 1".to_string()));
        }
        Ok(())
    }
}
