//! Jazz: swung dominant-seventh stabs on A3.
//!
//! Each beat is split long-short (2:1); every stab decays exponentially and
//! the off-beat is played softer.

use super::{edge_gain, phase};
use crate::style::StyleDescriptor;

const ROOT_FREQUENCY: f64 = 220.0;

/// Root, major third, fifth, minor seventh as (ratio, level)
const CHORD: [(f64, f64); 4] = [(1.0, 1.0), (1.25, 0.7), (1.5, 0.6), (1.8, 0.5)];

const PEAK: f64 = 0.7;

/// Share of the beat taken by the long swung note
const SWING_RATIO: f64 = 2.0 / 3.0;

const OFFBEAT_LEVEL: f64 = 0.6;
const DECAY: f64 = 4.0;

pub(super) fn render(style: &StyleDescriptor, sample_rate: u32, frames: usize) -> Vec<f64> {
    let norm: f64 = CHORD.iter().map(|(_, level)| level).sum();
    let beat_rate = style.beat_rate();

    (0..frames)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let position = (t * beat_rate).fract();
            let (local, level) = if position < SWING_RATIO {
                (position / SWING_RATIO, 1.0)
            } else {
                ((position - SWING_RATIO) / (1.0 - SWING_RATIO), OFFBEAT_LEVEL)
            };
            let envelope = level * (-DECAY * local).exp();

            let chord: f64 = CHORD
                .iter()
                .map(|(ratio, level)| level * phase(ROOT_FREQUENCY * ratio, i, sample_rate).sin())
                .sum::<f64>()
                / norm;
            PEAK * envelope * chord * edge_gain(i, frames, sample_rate)
        })
        .collect()
}
