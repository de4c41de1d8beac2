//! WAV decoder backed by `hound`.
//!
//! Default [`AudioDecoder`](super::AudioDecoder) collaborator. Handles
//! integer and float PCM, de-interleaves into per-channel buffers
//! normalized to [-1, 1].

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use super::{AudioDecoder, DecodedAudio};

#[derive(Debug, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("opening wav file {}", path.display()))?;
        let spec = reader.spec();
        if spec.channels == 0 {
            bail!("wav file {} has zero channels", path.display());
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .context("reading float samples")?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<Result<_, _>>()
                    .context("reading int samples")?
            }
        };

        let channel_count = spec.channels as usize;
        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for (i, sample) in interleaved.into_iter().enumerate() {
            channels[i % channel_count].push(sample);
        }

        let duration = frames as f64 / spec.sample_rate as f64;
        info!(
            "decoded {}: {:.2}s, {} Hz, {} channel(s)",
            path.display(),
            duration,
            spec.sample_rate,
            channel_count
        );

        Ok(DecodedAudio { channels, sample_rate: spec.sample_rate, duration })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, channels: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for ch in 0..channels {
                let v = if ch == 0 { (i % 100) as i16 * 100 } else { 0 };
                writer.write_sample(v).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_deinterleaves_and_normalizes() {
        let dir = std::env::temp_dir();
        let path = dir.join("xsheet_wav_decoder_test.wav");
        write_test_wav(&path, 2, 800);

        let audio = WavDecoder.decode(&path).unwrap();
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.len(), 800);
        assert!((audio.duration - 0.1).abs() < 1e-9);
        assert!(audio.first_channel().unwrap().iter().all(|v| v.abs() <= 1.0));
        // Second channel was written silent.
        assert!(audio.channels[1].iter().all(|&v| v == 0.0));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_decode_missing_file_errors() {
        let err = WavDecoder.decode(Path::new("/nonexistent/nope.wav"));
        assert!(err.is_err());
    }
}
