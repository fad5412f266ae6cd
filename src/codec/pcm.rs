//! Linear-PCM formats and raw sample buffers

use num_traits::clamp;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SonoraError};

/// Bit depths the container supports (signed integer PCM)
pub const SUPPORTED_BIT_DEPTHS: &[u16] = &[8, 16, 24, 32];

/// Accepted sample rate range in Hz
pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;

/// Maximum channel count
pub const MAX_CHANNELS: u16 = 8;

/// Shape of a PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Bits per sample: 8, 16, 24 or 32
    pub bits_per_sample: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        PcmFormat::cd_quality()
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        PcmFormat {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// 44.1kHz, mono, 16-bit
    pub fn cd_quality() -> Self {
        PcmFormat::new(44_100, 1, 16)
    }

    /// Check the format is one the container can describe
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(SonoraError::InvalidAudio {
                reason: format!(
                    "sample rate {} Hz (must be {}-{})",
                    self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
                ),
            });
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(SonoraError::InvalidAudio {
                reason: format!("{} channels (must be 1-{})", self.channels, MAX_CHANNELS),
            });
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(SonoraError::InvalidAudio {
                reason: format!(
                    "{}-bit audio (only 8, 16, 24, 32 supported)",
                    self.bits_per_sample
                ),
            });
        }
        Ok(())
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Bytes per interleaved frame
    pub fn block_align(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    pub fn byte_rate(&self) -> u64 {
        self.sample_rate as u64 * self.block_align() as u64
    }

    /// Largest representable sample value
    pub fn max_amplitude(&self) -> i32 {
        ((1i64 << (self.bits_per_sample - 1)) - 1) as i32
    }

    /// Smallest representable sample value
    pub fn min_amplitude(&self) -> i32 {
        (-(1i64 << (self.bits_per_sample - 1))) as i32
    }
}

/// Quantized, interleaved samples plus the format they are expressed in
///
/// Never persisted on its own; it only travels from the synthesizer to the
/// codec and the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSamples {
    format: PcmFormat,
    samples: Vec<i32>,
}

impl RawSamples {
    /// Wrap already-quantized interleaved samples
    pub fn new(format: PcmFormat, samples: Vec<i32>) -> Result<Self> {
        format.validate()?;
        if samples.len() % format.channels as usize != 0 {
            return Err(SonoraError::InvalidAudio {
                reason: format!(
                    "{} samples do not divide into {} channels",
                    samples.len(),
                    format.channels
                ),
            });
        }
        let (min, max) = (format.min_amplitude(), format.max_amplitude());
        if let Some(bad) = samples.iter().find(|s| **s < min || **s > max) {
            return Err(SonoraError::InvalidAudio {
                reason: format!(
                    "sample {} out of range for {}-bit audio",
                    bad, format.bits_per_sample
                ),
            });
        }
        Ok(RawSamples { format, samples })
    }

    /// Quantize a mono signal in [-1.0, 1.0] and copy it to every channel
    ///
    /// Values are clamped before narrowing, so out-of-range input saturates
    /// instead of wrapping around.
    pub fn from_signal(signal: &[f64], format: PcmFormat) -> Result<Self> {
        format.validate()?;
        let channels = format.channels as usize;
        let scale = format.max_amplitude() as f64;
        let (min, max) = (format.min_amplitude() as f64, scale);

        let mut samples = Vec::with_capacity(signal.len() * channels);
        for &value in signal {
            let value = if value.is_nan() { 0.0 } else { value };
            let scaled = clamp((clamp(value, -1.0, 1.0) * scale).round(), min, max);
            let quantized = scaled as i32;
            for _ in 0..channels {
                samples.push(quantized);
            }
        }

        Ok(RawSamples { format, samples })
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Number of frames (samples per channel)
    pub fn sample_count(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    /// Length of the raw payload in bytes
    pub fn byte_len(&self) -> u64 {
        self.samples.len() as u64 * self.format.bytes_per_sample() as u64
    }

    /// Playable duration recovered from the sample count
    pub fn duration_secs(&self) -> f64 {
        self.sample_count() as f64 / self.format.sample_rate as f64
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }
}
