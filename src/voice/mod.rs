//! Voice processing: speech synthesis, audio output, speech recognition

mod playback;
mod speaker;
mod stt;
mod tts;

pub use playback::AudioPlayback;
pub use speaker::{LocalSpeaker, SpeakQueue, SpeechEngine};
pub use stt::{SpeechToText, Transcriber};
pub use tts::TextToSpeech;
