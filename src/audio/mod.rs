//! Audio collaborator interfaces.
//!
//! The editor does not own audio decoding or playback transport - it
//! consumes them through the traits below. Decoded samples are kept only
//! for envelope extraction and are never persisted; a saved project stores
//! audio metadata and is re-linked to the asset by file name on load.

pub mod wav;

use std::path::Path;

use anyhow::Result;

pub use wav::WavDecoder;

/// Decoded multi-channel audio signal.
#[derive(Debug, Clone, Default)]
pub struct DecodedAudio {
    /// Per-channel sample data, all channels the same length.
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration: f64,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// First channel, the one the envelope extractor reads.
    pub fn first_channel(&self) -> Option<&[f32]> {
        self.channels.first().map(|c| c.as_slice())
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes an audio file into raw samples.
pub trait AudioDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// Playback transport. Scrubbing fires short preview snippets through it;
/// regular playback uses play/pause/seek.
pub trait AudioTransport {
    /// Play a short snippet starting at `start` seconds, `len` seconds long.
    fn play_scrub_snippet(&mut self, start: f64, len: f64);
    fn play(&mut self, from: f64);
    fn pause(&mut self);
    fn seek(&mut self, to: f64);
}

/// Transport used when no audio backend is wired up. Everything is a no-op;
/// the editor stays fully usable without sound.
#[derive(Debug, Default)]
pub struct NullTransport;

impl AudioTransport for NullTransport {
    fn play_scrub_snippet(&mut self, _start: f64, _len: f64) {}
    fn play(&mut self, _from: f64) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _to: f64) {}
}
