//! Amplitude envelope extraction.
//!
//! Reduces a decoded audio channel to a fixed-length RMS envelope that both
//! waveform renderers (live strip and export column) consume. The envelope
//! is peak-normalized: whenever any window has energy, the loudest window
//! maps to exactly 1.0.

use crate::audio::DecodedAudio;

/// Default number of envelope points, capped at the source sample count.
pub const DEFAULT_ENVELOPE_POINTS: usize = 2000;

/// Normalization floor: windows quieter than this across the whole run are
/// treated as silence instead of dividing by ~0.
const RMS_FLOOR: f32 = 1e-5;

/// Peak-normalized RMS envelope of one audio channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmplitudeEnvelope {
    samples: Vec<f32>,
    duration: f64,
}

impl AmplitudeEnvelope {
    /// Build an envelope from raw channel samples.
    ///
    /// Partitions the channel into `target_points` contiguous windows
    /// (the last may be shorter), takes the RMS of each, then divides by
    /// the run maximum. Deterministic for identical input. Degenerate
    /// input (no samples, zero target) yields an empty envelope.
    pub fn from_samples(channel: &[f32], duration: f64, target_points: usize) -> Self {
        let total = channel.len();
        let target = target_points.min(total);
        if target == 0 {
            return Self::default();
        }

        let samples_per_point = (total / target).max(1);
        let mut envelope = Vec::with_capacity(target);
        let mut max_rms = RMS_FLOOR;
        for i in 0..target {
            let start = i * samples_per_point;
            let end = (start + samples_per_point).min(total);
            let window = &channel[start..end];
            let rms = if window.is_empty() {
                0.0
            } else {
                let sum_squares: f32 = window.iter().map(|s| s * s).sum();
                (sum_squares / window.len() as f32).sqrt()
            };
            if rms > max_rms {
                max_rms = rms;
            }
            envelope.push(rms);
        }

        if max_rms > RMS_FLOOR {
            for v in &mut envelope {
                *v /= max_rms;
            }
        } else {
            envelope.fill(0.0);
        }

        Self { samples: envelope, duration: duration.max(0.0) }
    }

    /// Build from decoded audio, first channel only.
    pub fn from_audio(audio: &DecodedAudio, target_points: usize) -> Self {
        match audio.first_channel() {
            Some(channel) => Self::from_samples(channel, audio.duration, target_points),
            None => Self::default(),
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Empty envelope means "nothing to draw" for every renderer.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_signal_is_all_ones() {
        // 4000 identical samples at 2000 points: every window has the same
        // RMS, so every normalized value is exactly 1.0.
        let channel = vec![0.25f32; 4000];
        let env = AmplitudeEnvelope::from_samples(&channel, 1.0, 2000);
        assert_eq!(env.len(), 2000);
        assert!(env.samples().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_peak_normalization() {
        let mut channel = vec![0.1f32; 1000];
        channel[500] = 0.9;
        let env = AmplitudeEnvelope::from_samples(&channel, 1.0, 100);
        let max = env.samples().iter().cloned().fold(0.0f32, f32::max);
        assert_eq!(max, 1.0);
        assert!(env.samples().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_silence_yields_zeros_not_nan() {
        let channel = vec![0.0f32; 512];
        let env = AmplitudeEnvelope::from_samples(&channel, 1.0, 64);
        assert_eq!(env.len(), 64);
        assert!(env.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_target_capped_at_sample_count() {
        let channel = vec![0.5f32; 10];
        let env = AmplitudeEnvelope::from_samples(&channel, 1.0, 2000);
        assert_eq!(env.len(), 10);
    }

    #[test]
    fn test_empty_input_yields_empty_envelope() {
        let env = AmplitudeEnvelope::from_samples(&[], 0.0, 2000);
        assert!(env.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let channel: Vec<f32> = (0..4096).map(|i| ((i as f32) * 0.01).sin()).collect();
        let a = AmplitudeEnvelope::from_samples(&channel, 2.0, 500);
        let b = AmplitudeEnvelope::from_samples(&channel, 2.0, 500);
        assert_eq!(a, b);
    }
}
