//! TOML configuration file loading
//!
//! Supports `~/.config/lisa/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LisaConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Chat-completion backend configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Spoken-output configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Speech-recognition configuration
    #[serde(default)]
    pub stt: SttFileConfig,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Listen port
    pub port: Option<u16>,

    /// Static files directory (web UI)
    pub static_dir: Option<String>,
}

/// Chat backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// Ollama base URL (e.g. "http://localhost:11434")
    pub base_url: Option<String>,

    /// Model identifier (e.g. "llama3.2")
    pub model: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Retries after a transport failure
    pub max_retries: Option<u32>,
}

/// Spoken-output configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable spoken replies
    pub enabled: Option<bool>,

    /// Speech API base URL
    pub base_url: Option<String>,

    /// API key for the speech endpoint
    pub api_key: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub voice: Option<String>,

    /// TTS speed multiplier
    pub speed: Option<f32>,

    /// Speak queue depth
    pub queue_depth: Option<usize>,
}

/// Speech-recognition configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Recognition API base URL
    pub base_url: Option<String>,

    /// API key for the recognition endpoint
    pub api_key: Option<String>,

    /// Recognition model (e.g. "whisper-1")
    pub model: Option<String>,
}

/// Load a config file from an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<LisaConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load the TOML config file from the standard path
///
/// Returns `LisaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_default() -> LisaConfigFile {
    let Some(path) = config_file_path() else {
        return LisaConfigFile::default();
    };

    if !path.exists() {
        return LisaConfigFile::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            LisaConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/lisa/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("lisa").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults() {
        let parsed: LisaConfigFile = toml::from_str("").unwrap();
        assert!(parsed.server.port.is_none());
        assert!(parsed.chat.model.is_none());
        assert!(parsed.voice.voice.is_none());
    }

    #[test]
    fn partial_sections_parse() {
        let parsed: LisaConfigFile = toml::from_str(
            r#"
            [chat]
            model = "mistral"
            timeout_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(parsed.chat.model.as_deref(), Some("mistral"));
        assert_eq!(parsed.chat.timeout_secs, Some(10));
        assert!(parsed.stt.model.is_none());
    }
}
