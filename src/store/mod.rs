//! Artifact Repository
//!
//! Quota-enforced, per-user storage of synthesized artifacts:
//! - name validation and generation
//! - per-user ledgers
//! - on-disk manifests and crash recovery

pub mod artifact;
pub mod ledger;
pub mod manifest;
pub mod naming;
pub mod repository;

pub use artifact::{Artifact, ArtifactAnalysis, ArtifactSummary, StoredArtifact};
pub use ledger::{QuotaLimits, QuotaUsage, UserLedger, DEFAULT_MAX_FILES, DEFAULT_MAX_TOTAL_BYTES};
pub use naming::{generate_name, sanitize_fragment, validate_name, MAX_NAME_LEN};
pub use repository::ArtifactRepository;
