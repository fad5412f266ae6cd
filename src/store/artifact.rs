//! Artifact types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{PcmFormat, RawSamples, CONTAINER_EXTENSION};
use crate::style::StyleDescriptor;

/// A synthesized result waiting for admission
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Requested name; generated during admission when absent
    pub name: Option<String>,
    pub style: StyleDescriptor,
    pub samples: RawSamples,
}

impl Artifact {
    pub fn new(style: StyleDescriptor, samples: RawSamples) -> Self {
        Artifact {
            name: None,
            style,
            samples,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Payload size charged against the byte quota
    pub fn size_bytes(&self) -> u64 {
        self.samples.byte_len()
    }
}

/// Metadata derived from a published container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactAnalysis {
    /// `sample_count / sample_rate`
    pub duration_secs: f64,
    /// Frames per channel
    pub sample_count: u64,
    /// Raw payload bytes (the quota charge)
    pub size_bytes: u64,
    /// Container bytes on disk, header included
    pub file_size_bytes: u64,
    pub genre: String,
}

/// An admitted, immutable artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub name: String,
    pub user_id: String,
    pub style: StyleDescriptor,
    pub format: PcmFormat,
    pub analysis: ArtifactAnalysis,
    /// SHA-256 of the stored container
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

impl StoredArtifact {
    /// File name of the container inside the user's directory
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, CONTAINER_EXTENSION)
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            name: self.name.clone(),
            duration_secs: self.analysis.duration_secs,
            genre: self.analysis.genre.clone(),
        }
    }
}

/// Listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub name: String,
    pub duration_secs: f64,
    pub genre: String,
}
