//! Engine configuration
//!
//! Loaded from a JSON file; every field has a default so an empty object is
//! a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::PcmFormat;
use crate::error::{Result, SonoraError};
use crate::store::QuotaLimits;

/// Environment variable overriding `storage_root`
pub const STORAGE_ROOT_ENV: &str = "SONORA_STORAGE_ROOT";

/// Default storage root, relative to the working directory
pub const DEFAULT_STORAGE_ROOT: &str = "sonora-data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root directory for stored containers and manifests
    pub storage_root: PathBuf,
    /// Sample rate of synthesized audio (default: 44100)
    pub sample_rate: u32,
    /// Channel count (default: 1)
    pub channels: u16,
    /// Bit depth: 8, 16, 24 or 32 (default: 16)
    pub bits_per_sample: u16,
    /// Per-user caps
    pub quota: QuotaLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let format = PcmFormat::cd_quality();
        EngineConfig {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            sample_rate: format.sample_rate,
            channels: format.channels,
            bits_per_sample: format.bits_per_sample,
            quota: QuotaLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SonoraError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SONORA_STORAGE_ROOT` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(root) = std::env::var_os(STORAGE_ROOT_ENV).filter(|v| !v.is_empty()) {
            self.storage_root = PathBuf::from(root);
        }
        self
    }

    /// PCM format every synthesis run produces
    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat::new(self.sample_rate, self.channels, self.bits_per_sample)
    }

    pub fn validate(&self) -> Result<()> {
        self.pcm_format()
            .validate()
            .map_err(|e| SonoraError::InvalidConfig {
                reason: e.to_string(),
            })?;

        if self.quota.max_files == 0 || self.quota.max_total_bytes == 0 {
            return Err(SonoraError::InvalidConfig {
                reason: "quota limits must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.pcm_format(), PcmFormat::new(44_100, 1, 16));
        assert_eq!(config.quota.max_files, 10);
        assert_eq!(config.quota.max_total_bytes, 100 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sonora.json");
        fs::write(
            &path,
            r#"{"storage_root": "/srv/sonora", "sample_rate": 48000, "quota": {"max_files": 3}}"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.storage_root, PathBuf::from("/srv/sonora"));
        assert_eq!(config.sample_rate, 48_000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.quota.max_files, 3);
        assert_eq!(config.quota.max_total_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sonora.json");
        fs::write(&path, r#"{"bits_per_sample": 12}"#).unwrap();

        let err = EngineConfig::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        fs::write(&path, r#"{"quota": {"max_files": 0}}"#).unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/sonora.json")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
