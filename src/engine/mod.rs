//! Synthesis Engine
//!
//! Configuration and the orchestrator tying style validation, synthesis and
//! storage together.

pub mod config;
pub mod synthesis;

pub use config::{EngineConfig, DEFAULT_STORAGE_ROOT, STORAGE_ROOT_ENV};
pub use synthesis::{ArtifactResponse, SynthesisEngine};
