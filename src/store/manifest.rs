//! Per-user manifest
//!
//! Records every admitted artifact of one user so the repository can be
//! rebuilt after a restart. Written through the same atomic publish as the
//! containers themselves.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Result;
use crate::store::artifact::StoredArtifact;

/// Manifest file name inside each user directory
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserManifest {
    pub user_id: String,
    pub artifacts: Vec<StoredArtifact>,
}

impl UserManifest {
    /// Build a manifest, artifacts ordered by name
    pub fn new<'a>(user_id: &str, artifacts: impl IntoIterator<Item = &'a StoredArtifact>) -> Self {
        let mut artifacts: Vec<StoredArtifact> = artifacts.into_iter().cloned().collect();
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        UserManifest {
            user_id: user_id.to_string(),
            artifacts,
        }
    }

    /// Load the manifest from `dir`, if one exists
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let manifest: UserManifest = serde_json::from_str(&content)?;
        Ok(Some(manifest))
    }

    /// Atomically replace the manifest in `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self)?;
        codec::publish(dir, MANIFEST_FILE, &content)?;
        Ok(())
    }
}
