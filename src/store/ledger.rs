//! Per-user quota accounting

use serde::{Deserialize, Serialize};

use crate::error::{Result, SonoraError};

/// Default maximum number of stored artifacts per user
pub const DEFAULT_MAX_FILES: usize = 10;

/// Default aggregate payload budget per user (100 MiB)
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 100 * 1024 * 1024;

/// Caps applied to every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaLimits {
    pub max_files: usize,
    pub max_total_bytes: u64,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        QuotaLimits {
            max_files: DEFAULT_MAX_FILES,
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

/// Current holdings of one user
///
/// Only mutated while the owning user's admission lock is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserLedger {
    count: usize,
    total_bytes: u64,
}

impl UserLedger {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Fail if storing `size` more bytes would break either cap
    pub fn check(&self, user_id: &str, limits: &QuotaLimits, size: u64) -> Result<()> {
        if self.count >= limits.max_files {
            return Err(SonoraError::QuotaExceeded {
                user_id: user_id.to_string(),
                reason: format!("maximum {} files per user reached", limits.max_files),
            });
        }

        let projected = self.total_bytes.checked_add(size);
        if projected.map_or(true, |total| total > limits.max_total_bytes) {
            return Err(SonoraError::QuotaExceeded {
                user_id: user_id.to_string(),
                reason: format!(
                    "storing {} bytes would exceed the {} byte limit ({} in use)",
                    size, limits.max_total_bytes, self.total_bytes
                ),
            });
        }

        Ok(())
    }

    /// Record a stored artifact
    pub fn commit(&mut self, size: u64) {
        self.count += 1;
        self.total_bytes += size;
    }

    /// Forget a removed artifact
    pub fn release(&mut self, size: u64) {
        self.count = self.count.saturating_sub(1);
        self.total_bytes = self.total_bytes.saturating_sub(size);
    }
}

/// Snapshot of a user's quota position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    pub file_count: usize,
    pub total_bytes: u64,
    pub max_files: usize,
    pub max_total_bytes: u64,
}

impl QuotaUsage {
    pub fn new(ledger: &UserLedger, limits: &QuotaLimits) -> Self {
        QuotaUsage {
            file_count: ledger.count(),
            total_bytes: ledger.total_bytes(),
            max_files: limits.max_files,
            max_total_bytes: limits.max_total_bytes,
        }
    }

    /// Bytes still available
    pub fn remaining_bytes(&self) -> u64 {
        self.max_total_bytes.saturating_sub(self.total_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_count_cap() {
        let limits = QuotaLimits::default();
        let mut ledger = UserLedger::default();
        for _ in 0..10 {
            ledger.check("u", &limits, 1).unwrap();
            ledger.commit(1);
        }

        let err = ledger.check("u", &limits, 1).unwrap_err();
        assert_eq!(err.error_code(), "QUOTA_EXCEEDED");
        assert_eq!(ledger.count(), 10);
    }

    #[test]
    fn test_byte_cap_is_inclusive() {
        let limits = QuotaLimits {
            max_files: 10,
            max_total_bytes: 100,
        };
        let mut ledger = UserLedger::default();
        ledger.commit(60);

        assert!(ledger.check("u", &limits, 40).is_ok());
        assert!(ledger.check("u", &limits, 41).is_err());
        assert!(ledger.check("u", &limits, u64::MAX).is_err());
    }

    #[test]
    fn test_release() {
        let mut ledger = UserLedger::default();
        ledger.commit(500);
        ledger.commit(200);
        ledger.release(500);

        assert_eq!(ledger.count(), 1);
        assert_eq!(ledger.total_bytes(), 200);

        let usage = QuotaUsage::new(&ledger, &QuotaLimits::default());
        assert_eq!(usage.remaining_bytes(), DEFAULT_MAX_TOTAL_BYTES - 200);
    }
}
