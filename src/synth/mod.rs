//! Waveform Synthesizers
//!
//! One pure render function per genre. A `Genre` is picked through the
//! `SynthesizerRegistry` and turns a `StyleDescriptor` into a mono signal
//! in [-1.0, 1.0], which is then quantized into `RawSamples`.
//!
//! Every variant produces exactly `round(duration * sample_rate)` frames and
//! is fully deterministic.

mod classical;
mod jazz;
mod registry;
mod rock;

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::codec::{PcmFormat, RawSamples};
use crate::error::Result;
use crate::style::StyleDescriptor;

pub use registry::SynthesizerRegistry;

/// Fade-in length at the start of every render
const ATTACK_SECS: f64 = 0.005;

/// Fade-out length at the end of every render
const RELEASE_SECS: f64 = 0.1;

/// Registered synthesis variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    /// Harmonic tone around A4 with a tempo-driven swell
    Classical,
    /// tanh-saturated power chord around A3
    Rock,
    /// Swung dominant-seventh stabs
    Jazz,
}

impl Genre {
    pub const ALL: [Genre; 3] = [Genre::Classical, Genre::Rock, Genre::Jazz];

    /// Canonical registry key
    pub fn id(&self) -> &'static str {
        match self {
            Genre::Classical => "classical",
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
        }
    }

    /// Render a mono signal for `style` at `sample_rate`
    pub fn render(&self, style: &StyleDescriptor, sample_rate: u32) -> Vec<f64> {
        let frames = sample_count(style.duration_secs(), sample_rate);
        let signal = match self {
            Genre::Classical => classical::render(style, sample_rate, frames),
            Genre::Rock => rock::render(style, sample_rate, frames),
            Genre::Jazz => jazz::render(style, sample_rate, frames),
        };
        debug_assert_eq!(signal.len(), frames);
        signal
    }

    /// Render and quantize into `format`
    pub fn synthesize(&self, style: &StyleDescriptor, format: PcmFormat) -> Result<RawSamples> {
        format.validate()?;
        let signal = self.render(style, format.sample_rate);
        tracing::debug!(
            genre = self.id(),
            tempo = style.tempo(),
            frames = signal.len(),
            sample_rate = format.sample_rate,
            "rendered signal"
        );
        RawSamples::from_signal(&signal, format)
    }
}

/// Exact frame count for a duration
pub fn sample_count(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs * sample_rate as f64).round() as usize
}

/// Phase of a sine at `frequency` Hz after `index` samples
#[inline]
fn phase(frequency: f64, index: usize, sample_rate: u32) -> f64 {
    TAU * frequency * index as f64 / sample_rate as f64
}

/// Linear fade-in/fade-out gain, removes clicks at both ends
fn edge_gain(index: usize, frames: usize, sample_rate: u32) -> f64 {
    let attack = ((ATTACK_SECS * sample_rate as f64) as usize).max(1);
    let release = ((RELEASE_SECS * sample_rate as f64) as usize).max(1);

    let fade_in = (index as f64 / attack as f64).min(1.0);
    let remaining = frames.saturating_sub(index);
    let fade_out = (remaining as f64 / release as f64).min(1.0);
    fade_in.min(fade_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleBuilder;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    fn style(genre: Genre, tempo: u32, duration_secs: f64) -> StyleDescriptor {
        StyleBuilder::new(genre.id())
            .tempo(tempo)
            .duration_secs(duration_secs)
            .build()
            .unwrap()
    }

    #[test_case(1.0, 44_100, 44_100 ; "whole second")]
    #[test_case(30.0, 44_100, 1_323_000 ; "thirty seconds")]
    #[test_case(1.00001, 44_100, 44_100 ; "rounds down")]
    #[test_case(1.5, 22_050, 33_075 ; "half second")]
    #[test_case(2.99999, 8_000, 24_000 ; "rounds up")]
    fn test_sample_count(duration: f64, rate: u32, expected: usize) {
        assert_eq!(sample_count(duration, rate), expected);
    }

    #[test]
    fn test_every_genre_exact_length() {
        for genre in Genre::ALL {
            for (duration, rate) in [(1.0, 8_000), (1.337, 44_100), (2.5, 48_000)] {
                let signal = genre.render(&style(genre, 120, duration), rate);
                assert_eq!(signal.len(), sample_count(duration, rate), "{:?}", genre);

                let recovered = signal.len() as f64 / rate as f64;
                assert_abs_diff_eq!(recovered, duration, epsilon = 1.0 / rate as f64);
            }
        }
    }

    #[test]
    fn test_every_genre_stays_in_range() {
        for genre in Genre::ALL {
            for tempo in [60, 120, 200] {
                let signal = genre.render(&style(genre, tempo, 1.0), 22_050);
                assert!(signal.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
                assert!(signal.iter().any(|s| s.abs() > 0.1), "{:?} is silent", genre);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for genre in Genre::ALL {
            let s = style(genre, 97, 1.25);
            let a = genre.synthesize(&s, PcmFormat::cd_quality()).unwrap();
            let b = genre.synthesize(&s, PcmFormat::cd_quality()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_genres_differ() {
        let classical = Genre::Classical.render(&style(Genre::Classical, 120, 1.0), 8_000);
        let rock = Genre::Rock.render(&style(Genre::Rock, 120, 1.0), 8_000);
        assert_ne!(classical, rock);
    }

    #[test]
    fn test_edge_gain() {
        assert_eq!(edge_gain(0, 44_100, 44_100), 0.0);
        assert_eq!(edge_gain(22_050, 44_100, 44_100), 1.0);
        assert!(edge_gain(44_099, 44_100, 44_100) < 0.01);
    }
}
