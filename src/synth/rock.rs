//! Rock: a saturated power chord around A3.
//!
//! Root plus fifth driven through `tanh`. Faster tempos push the drive
//! harder and raise both the output level and the clip ceiling.

use super::{edge_gain, phase};
use crate::style::{StyleDescriptor, MAX_TEMPO, MIN_TEMPO};

const BASE_FREQUENCY: f64 = 220.0;
const REFERENCE_TEMPO: f64 = 120.0;

/// tanh drive at the reference tempo
const BASE_DRIVE: f64 = 3.0;

const FIFTH_RATIO: f64 = 1.5;
const FIFTH_LEVEL: f64 = 0.5;

/// Clip ceiling at the slowest and fastest tempo
const MIN_CEILING: f64 = 0.5;
const MAX_CEILING: f64 = 0.9;

pub(super) fn render(style: &StyleDescriptor, sample_rate: u32, frames: usize) -> Vec<f64> {
    let tempo = style.tempo() as f64;
    let frequency = BASE_FREQUENCY * (tempo / REFERENCE_TEMPO).sqrt();
    let drive = BASE_DRIVE * tempo / REFERENCE_TEMPO;

    let intensity = (tempo - MIN_TEMPO as f64) / (MAX_TEMPO - MIN_TEMPO) as f64;
    let ceiling = MIN_CEILING + (MAX_CEILING - MIN_CEILING) * intensity.clamp(0.0, 1.0);
    let makeup = 1.0 / drive.tanh();

    (0..frames)
        .map(|i| {
            let root = phase(frequency, i, sample_rate).sin();
            let fifth = phase(frequency * FIFTH_RATIO, i, sample_rate).sin();
            let chord = (root + FIFTH_LEVEL * fifth) / (1.0 + FIFTH_LEVEL);
            let shaped = (drive * chord).tanh() * makeup;
            let sample = ceiling * shaped * edge_gain(i, frames, sample_rate);
            sample.clamp(-ceiling, ceiling)
        })
        .collect()
}
