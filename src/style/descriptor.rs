//! Style Descriptor validation
//!
//! A `StyleDescriptor` can only exist in a valid state: every constructor
//! funnels through `StyleDescriptor::try_from(StyleRequest)`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SonoraError};

/// Only linear-PCM WAV containers are produced
pub const SUPPORTED_CONTAINER: &str = "wav";

/// Longest accepted genre string, in characters
pub const MAX_GENRE_LEN: usize = 50;

/// Tempo bounds in beats per minute
pub const MIN_TEMPO: u32 = 60;
pub const MAX_TEMPO: u32 = 200;
pub const DEFAULT_TEMPO: u32 = 120;

/// Maximum number of distinct instruments
pub const MAX_INSTRUMENTS: usize = 10;

/// Duration bounds in seconds
pub const MIN_DURATION_SECS: f64 = 1.0;
pub const MAX_DURATION_SECS: f64 = 60.0;
pub const DEFAULT_DURATION_SECS: f64 = 30.0;

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}

fn default_duration() -> f64 {
    DEFAULT_DURATION_SECS
}

fn default_container() -> String {
    SUPPORTED_CONTAINER.to_string()
}

/// Unvalidated style as it arrives over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRequest {
    pub genre: String,
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    #[serde(default)]
    pub instrumentation: Vec<String>,
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    #[serde(default = "default_container")]
    pub container: String,
}

impl StyleRequest {
    /// Request with the given genre and every other field defaulted
    pub fn new(genre: impl Into<String>) -> Self {
        StyleRequest {
            genre: genre.into(),
            tempo: DEFAULT_TEMPO,
            instrumentation: Vec::new(),
            duration_secs: DEFAULT_DURATION_SECS,
            container: default_container(),
        }
    }
}

/// Validated musical style
///
/// Immutable once built; embedded by value into every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StyleRequest", into = "StyleRequest")]
pub struct StyleDescriptor {
    genre: String,
    tempo: u32,
    instrumentation: Vec<String>,
    duration_secs: f64,
    container: String,
}

impl StyleDescriptor {
    /// Validate and build a descriptor for `genre` with default settings
    pub fn new(genre: impl Into<String>) -> Result<Self> {
        Self::try_from(StyleRequest::new(genre))
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    /// Tempo in BPM
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn instrumentation(&self) -> &[String] {
        &self.instrumentation
    }

    /// Requested duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Beats per second, used by the tempo-driven envelopes
    pub fn beat_rate(&self) -> f64 {
        self.tempo as f64 / 60.0
    }
}

impl TryFrom<StyleRequest> for StyleDescriptor {
    type Error = SonoraError;

    fn try_from(request: StyleRequest) -> Result<Self> {
        let genre_len = request.genre.chars().count();
        if request.genre.trim().is_empty() {
            return Err(SonoraError::invalid_style("genre", "must not be empty"));
        }
        if genre_len > MAX_GENRE_LEN {
            return Err(SonoraError::invalid_style(
                "genre",
                format!("{} characters (maximum {})", genre_len, MAX_GENRE_LEN),
            ));
        }

        if !(MIN_TEMPO..=MAX_TEMPO).contains(&request.tempo) {
            return Err(SonoraError::invalid_style(
                "tempo",
                format!(
                    "{} BPM (must be {}-{})",
                    request.tempo, MIN_TEMPO, MAX_TEMPO
                ),
            ));
        }

        if request.instrumentation.len() > MAX_INSTRUMENTS {
            return Err(SonoraError::invalid_style(
                "instrumentation",
                format!(
                    "{} instruments (maximum {})",
                    request.instrumentation.len(),
                    MAX_INSTRUMENTS
                ),
            ));
        }
        let mut seen = HashSet::new();
        for instrument in &request.instrumentation {
            if instrument.trim().is_empty() {
                return Err(SonoraError::invalid_style(
                    "instrumentation",
                    "instrument names must not be empty",
                ));
            }
            if !seen.insert(instrument.as_str()) {
                return Err(SonoraError::invalid_style(
                    "instrumentation",
                    format!("duplicate instrument {:?}", instrument),
                ));
            }
        }

        // NaN fails the range check too
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&request.duration_secs) {
            return Err(SonoraError::invalid_style(
                "duration_secs",
                format!(
                    "{}s (must be {:.1}-{:.1})",
                    request.duration_secs, MIN_DURATION_SECS, MAX_DURATION_SECS
                ),
            ));
        }

        if request.container != SUPPORTED_CONTAINER {
            return Err(SonoraError::invalid_style(
                "container",
                format!(
                    "{:?} is not supported (only {:?})",
                    request.container, SUPPORTED_CONTAINER
                ),
            ));
        }

        Ok(StyleDescriptor {
            genre: request.genre,
            tempo: request.tempo,
            instrumentation: request.instrumentation,
            duration_secs: request.duration_secs,
            container: request.container,
        })
    }
}

impl From<StyleDescriptor> for StyleRequest {
    fn from(style: StyleDescriptor) -> Self {
        StyleRequest {
            genre: style.genre,
            tempo: style.tempo,
            instrumentation: style.instrumentation,
            duration_secs: style.duration_secs,
            container: style.container,
        }
    }
}
