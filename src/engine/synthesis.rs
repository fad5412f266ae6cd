//! Synthesis Orchestrator
//!
//! Validates a style, picks the synthesizer for its genre, renders, and hands
//! the result to the repository for admission. Single attempt: every error
//! from validation, synthesis or admission is returned unchanged.

use std::sync::Arc;

use serde::Serialize;

use crate::codec::{PcmFormat, RawSamples};
use crate::engine::config::EngineConfig;
use crate::error::Result;
use crate::store::{Artifact, ArtifactRepository, ArtifactSummary, QuotaUsage, StoredArtifact};
use crate::style::{StyleDescriptor, StyleRequest};
use crate::synth::SynthesizerRegistry;

/// An artifact plus, on request, its container bytes
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactResponse {
    pub artifact: StoredArtifact,
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
}

/// Entry point for synthesis requests
///
/// Dependencies are passed in explicitly; cloning the repository `Arc` lets
/// several engines share one store.
#[derive(Debug)]
pub struct SynthesisEngine {
    registry: SynthesizerRegistry,
    repository: Arc<ArtifactRepository>,
    format: PcmFormat,
}

impl SynthesisEngine {
    pub fn new(
        registry: SynthesizerRegistry,
        repository: Arc<ArtifactRepository>,
        format: PcmFormat,
    ) -> Result<Self> {
        format.validate()?;
        Ok(SynthesisEngine {
            registry,
            repository,
            format,
        })
    }

    /// Build an engine with the default registry, recovering storage from
    /// `config.storage_root`
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let repository = ArtifactRepository::open(&config.storage_root, config.quota)?;
        Self::new(
            SynthesizerRegistry::with_defaults(),
            Arc::new(repository),
            config.pcm_format(),
        )
    }

    pub fn repository(&self) -> &Arc<ArtifactRepository> {
        &self.repository
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Registered genre names
    pub fn genres(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Validate and synthesize without storing anything
    pub fn render(&self, request: StyleRequest) -> Result<(StyleDescriptor, RawSamples)> {
        let style = StyleDescriptor::try_from(request)?;
        let samples = self.render_style(&style)?;
        Ok((style, samples))
    }

    fn render_style(&self, style: &StyleDescriptor) -> Result<RawSamples> {
        // Resolve first: an unknown genre must fail before any buffer exists
        let genre = self.registry.resolve(style.genre())?;
        genre.synthesize(style, self.format)
    }

    /// Synthesize and store an artifact for `user_id`
    pub fn synthesize(
        &self,
        user_id: &str,
        request: StyleRequest,
        include_audio: bool,
    ) -> Result<ArtifactResponse> {
        let style = StyleDescriptor::try_from(request)?;
        self.synthesize_style(user_id, style, None, include_audio)
    }

    /// Same as `synthesize` for an already validated style, optionally
    /// storing it under a caller-chosen name
    pub fn synthesize_style(
        &self,
        user_id: &str,
        style: StyleDescriptor,
        name: Option<String>,
        include_audio: bool,
    ) -> Result<ArtifactResponse> {
        let samples = self.render_style(&style)?;
        tracing::debug!(user_id, genre = style.genre(), frames = samples.sample_count(), "rendered");

        let mut candidate = Artifact::new(style, samples);
        if let Some(name) = name {
            candidate = candidate.with_name(name);
        }
        let (artifact, bytes) = self.repository.admit_with_bytes(user_id, candidate)?;
        Ok(ArtifactResponse {
            artifact,
            audio: include_audio.then_some(bytes),
        })
    }

    /// Summaries of everything `user_id` has stored
    pub fn list_artifacts(&self, user_id: &str) -> Vec<ArtifactSummary> {
        self.repository.list(user_id)
    }

    /// Fetch a stored artifact, optionally with its container bytes
    pub fn get_artifact(
        &self,
        user_id: &str,
        name: &str,
        include_audio: bool,
    ) -> Result<ArtifactResponse> {
        let artifact = self.repository.get(user_id, name)?;
        let audio = if include_audio {
            Some(self.repository.read_container(user_id, name)?)
        } else {
            None
        };
        Ok(ArtifactResponse { artifact, audio })
    }

    pub fn remove_artifact(&self, user_id: &str, name: &str) -> Result<StoredArtifact> {
        self.repository.remove(user_id, name)
    }

    pub fn usage(&self, user_id: &str) -> QuotaUsage {
        self.repository.usage(user_id)
    }
}
