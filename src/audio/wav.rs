//! WAV decoding for submitted audio.
//!
//! Accepts arbitrary sample rates and channel counts, downmixing to mono and
//! resampling to the 16kHz the transcription model expects.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, SalesqlError};
use std::io::Read;
use std::path::Path;

/// Decode WAV data from any reader into 16kHz mono i16 samples.
pub fn decode_reader<R: Read>(reader: R) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| SalesqlError::AudioDecode {
        message: format!("Failed to parse WAV data: {}", e),
    })?;

    let spec = wav_reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SalesqlError::AudioDecode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    // Convert to mono if stereo
    let mono_samples = if source_channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|chunk| {
                let left = chunk[0] as i32;
                let right = chunk[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    // Resample to 16kHz if needed
    let samples = if source_rate != SAMPLE_RATE {
        resample(&mono_samples, source_rate, SAMPLE_RATE)
    } else {
        mono_samples
    };

    Ok(samples)
}

/// Decode a WAV file from disk into 16kHz mono i16 samples.
pub fn decode_file(path: &Path) -> Result<Vec<i16>> {
    let file = std::fs::File::open(path).map_err(|e| SalesqlError::AudioDecode {
        message: format!("Failed to open {}: {}", path.display(), e),
    })?;
    decode_reader(std::io::BufReader::new(file))
}

/// Pad with silence or trim so the buffer is exactly `target_len` samples.
///
/// Whisper consumes a fixed-duration window; shorter recordings are padded
/// with zeros, longer ones are truncated.
pub fn pad_or_trim(mut samples: Vec<i16>, target_len: usize) -> Vec<i16> {
    if samples.len() > target_len {
        samples.truncate(target_len);
    } else {
        samples.resize(target_len, 0);
    }
    samples
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
