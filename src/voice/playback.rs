//! Audio playback to speakers

use std::io::Cursor;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Plays decoded audio on the default output device
///
/// Only the negotiated stream configuration is held between plays; the
/// device is re-acquired per utterance so a replugged output just works.
pub struct AudioPlayback {
    config: StreamConfig,
}

impl AudioPlayback {
    /// Probe the default output device and negotiate a stream config
    ///
    /// # Errors
    ///
    /// Returns error if no output device supports 24kHz mono or stereo.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let rate = SampleRate(PLAYBACK_SAMPLE_RATE);
        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                (c.channels() == 1 || c.channels() == 2)
                    && c.min_sample_rate() <= rate
                    && c.max_sample_rate() >= rate
            })
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

        let config = supported.with_sample_rate(rate).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = PLAYBACK_SAMPLE_RATE,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self { config })
    }

    /// Decode MP3 bytes and play them, blocking until playback finishes
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        let samples = decode_mp3(mp3_data)?;
        self.play(samples)
    }

    fn play(&self, samples: Vec<f32>) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let channels = self.config.channels as usize;
        let sample_count = samples.len();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let mut remaining = samples.into_iter();

        let stream = device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = remaining.next().unwrap_or_else(|| {
                            let _ = done_tx.send(());
                            0.0
                        });
                        frame.fill(sample);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let duration_ms = (sample_count as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
        let _ = done_rx.recv_timeout(Duration::from_millis(duration_ms + 500));

        // Let the device buffer drain before tearing the stream down
        std::thread::sleep(Duration::from_millis(100));
        drop(stream);

        tracing::debug!(samples = sample_count, "playback complete");
        Ok(())
    }
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let channels = frame.channels.max(1);
                samples.extend(frame.data.chunks(channels).map(|frame_samples| {
                    let sum: f32 = frame_samples.iter().map(|&s| f32::from(s) / 32768.0).sum();
                    sum / frame_samples.len() as f32
                }));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}
