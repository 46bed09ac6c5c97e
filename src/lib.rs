//! Lisa Gateway - voice chat front end for a local language model
//!
//! This library provides the core functionality for the Lisa gateway:
//! - Dialogue responder (scripted rules + Ollama chat completion)
//! - Spoken replies via a serialized speech queue
//! - Speech-to-text transcription endpoint
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Browser                          │
//! │   speech capture  │  chat log  │  text input        │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Lisa Gateway                        │
//! │   Responder  │  Speak Queue  │  STT  │  Static UI   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              External services                       │
//! │   Ollama  │  Speech API (STT/TTS)  │  Speakers      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod responder;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use responder::Responder;
