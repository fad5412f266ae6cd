//! Sonora - Deterministic Music Synthesis
//!
//! Sonora turns a short style description (genre, tempo, instrumentation,
//! duration) into PCM audio and stores it per user under hard quotas.
//!
//! # Architecture
//!
//! A request flows through four stages:
//! - Style: validation of the caller's descriptor
//! - Synth: genre-specific waveform rendering, pure and deterministic
//! - Codec: PCM framing into WAV and crash-safe publishing
//! - Store: per-user quota ledger, naming and the on-disk manifest
//!
//! The `engine` module wires them together; `cli` is a local front end.
//!
//! ```no_run
//! use sonora::engine::{EngineConfig, SynthesisEngine};
//! use sonora::style::StyleRequest;
//!
//! let engine = SynthesisEngine::from_config(&EngineConfig::default())?;
//! let response = engine.synthesize("alice", StyleRequest::new("jazz"), false)?;
//! println!("stored {}", response.artifact.name);
//! # Ok::<(), sonora::SonoraError>(())
//! ```

pub mod cli;
pub mod codec;
pub mod engine;
pub mod error;
pub mod store;
pub mod style;
pub mod synth;

pub use error::{Result, SonoraError};
