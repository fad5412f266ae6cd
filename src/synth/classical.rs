//! Classical: a harmonically rich tone near A4.
//!
//! The fundamental plus three overtones of decreasing amplitude, swelled by
//! an envelope that breathes once per beat.

use std::f64::consts::TAU;

use super::{edge_gain, phase};
use crate::style::StyleDescriptor;

const BASE_FREQUENCY: f64 = 440.0;

/// (harmonic number, relative amplitude)
const PARTIALS: [(f64, f64); 4] = [(1.0, 1.0), (2.0, 0.5), (3.0, 0.25), (4.0, 0.125)];

const PEAK: f64 = 0.8;

/// Envelope floor between swells
const SWELL_FLOOR: f64 = 0.55;

pub(super) fn render(style: &StyleDescriptor, sample_rate: u32, frames: usize) -> Vec<f64> {
    let norm: f64 = PARTIALS.iter().map(|(_, amp)| amp).sum();
    let swell_rate = style.beat_rate();

    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let tone: f64 = PARTIALS
                .iter()
                .map(|(harmonic, amp)| amp * phase(BASE_FREQUENCY * harmonic, i, sample_rate).sin())
                .sum::<f64>()
                / norm;
            let swell = 0.5 - 0.5 * (TAU * swell_rate * t).cos();
            let envelope = SWELL_FLOOR + (1.0 - SWELL_FLOOR) * swell;
            PEAK * envelope * tone * edge_gain(i, frames, sample_rate)
        })
        .collect()
}
