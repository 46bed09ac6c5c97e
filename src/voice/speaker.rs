//! Serialized speech output
//!
//! The synthesizer and the audio device are one process-wide resource with
//! no thread-safety guarantee between utterances. All speak requests funnel
//! through a bounded queue with a single consumer task that owns the engine
//! exclusively; request handlers only enqueue and never wait.

use async_trait::async_trait;

use tokio::sync::mpsc;

use crate::voice::{AudioPlayback, TextToSpeech};
use crate::Result;

/// Something that can turn reply text into audible speech
#[async_trait]
pub trait SpeechEngine: Send + 'static {
    /// Speak one utterance to completion
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails.
    async fn speak(&mut self, text: &str) -> Result<()>;
}

/// Synthesizes over HTTP and plays on the default output device
pub struct LocalSpeaker {
    tts: TextToSpeech,
    playback: AudioPlayback,
}

impl LocalSpeaker {
    /// Create a speaker from a synthesizer, probing the output device
    ///
    /// # Errors
    ///
    /// Returns error if no usable audio output device is present.
    pub fn new(tts: TextToSpeech) -> Result<Self> {
        let playback = AudioPlayback::new()?;
        tracing::info!(voice = tts.voice(), "speech output ready");
        Ok(Self { tts, playback })
    }
}

#[async_trait]
impl SpeechEngine for LocalSpeaker {
    async fn speak(&mut self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;
        self.playback.play_mp3(&audio)
    }
}

/// Cloneable handle for enqueueing speech work items
#[derive(Clone)]
pub struct SpeakQueue {
    tx: mpsc::Sender<String>,
}

impl SpeakQueue {
    /// Spawn the single consumer worker that owns the engine
    ///
    /// The queue holds at most `depth` pending utterances.
    pub fn spawn<E: SpeechEngine>(mut engine: E, depth: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<String>(depth.max(1));

        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = engine.speak(&text).await {
                    tracing::warn!(error = %e, "speak failed");
                }
            }
            tracing::debug!("speak queue closed");
        });

        Self { tx }
    }

    /// Enqueue reply text for speaking, without waiting
    ///
    /// A full queue rejects the newest item rather than blocking the
    /// caller. Returns whether the item was accepted.
    pub fn enqueue(&self, text: &str) -> bool {
        match self.tx.try_send(text.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("speak queue full, dropping utterance");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!("speak worker is gone");
                false
            }
        }
    }
}
