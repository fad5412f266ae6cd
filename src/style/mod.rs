//! Style Descriptors
//!
//! Validated, immutable descriptions of what to synthesize: genre, tempo,
//! instrumentation, duration and container format.

mod builder;
mod descriptor;

pub use builder::StyleBuilder;
pub use descriptor::{
    StyleDescriptor, StyleRequest, DEFAULT_DURATION_SECS, DEFAULT_TEMPO, MAX_DURATION_SECS,
    MAX_GENRE_LEN, MAX_INSTRUMENTS, MAX_TEMPO, MIN_DURATION_SECS, MIN_TEMPO, SUPPORTED_CONTAINER,
};
