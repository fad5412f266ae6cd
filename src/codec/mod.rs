//! Audio Container Codec
//!
//! - PCM formats and raw sample buffers
//! - WAV framing and header probing
//! - Crash-safe export (temp file, then atomic rename)

pub mod export;
pub mod pcm;
pub mod wav;

pub use export::{export_container, publish, read_container, safe_file_name, CONTAINER_EXTENSION};
pub use pcm::{PcmFormat, RawSamples};
pub use wav::{decode, encode, probe, probe_file, ContainerInfo};
