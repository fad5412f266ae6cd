//! Artifact Repository
//!
//! Owns the (user, name) → artifact mapping and every user's quota ledger.
//!
//! Admission for one user is serialized by that user's lock: the quota check,
//! the container publish, the manifest rewrite and the ledger update happen
//! inside one critical section. Different users never contend beyond the
//! brief lookup of their lock.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::codec::{self, export::TEMP_SUFFIX, CONTAINER_EXTENSION};
use crate::error::{Result, SonoraError};
use crate::store::artifact::{Artifact, ArtifactAnalysis, ArtifactSummary, StoredArtifact};
use crate::store::ledger::{QuotaLimits, QuotaUsage, UserLedger};
use crate::store::manifest::{UserManifest, MANIFEST_FILE};
use crate::store::naming::{generate_name, validate_name};

/// Directory under the storage root holding one directory per user
pub const USERS_DIR: &str = "users";

/// Everything stored for one user
#[derive(Debug)]
struct UserSpace {
    user_id: String,
    dir: PathBuf,
    ledger: UserLedger,
    artifacts: HashMap<String, StoredArtifact>,
}

impl UserSpace {
    fn new(user_id: &str, dir: PathBuf) -> Self {
        UserSpace {
            user_id: user_id.to_string(),
            dir,
            ledger: UserLedger::default(),
            artifacts: HashMap::new(),
        }
    }

    fn lookup(&self, name: &str) -> Result<&StoredArtifact> {
        self.artifacts.get(name).ok_or_else(|| SonoraError::NotFound {
            name: name.to_string(),
        })
    }

    fn container_path(&self, artifact: &StoredArtifact) -> PathBuf {
        self.dir.join(artifact.file_name())
    }

    fn save_manifest<'a>(&self, artifacts: impl IntoIterator<Item = &'a StoredArtifact>) -> Result<()> {
        UserManifest::new(&self.user_id, artifacts).save(&self.dir)
    }
}

/// Quota-enforcing store of synthesized artifacts
#[derive(Debug)]
pub struct ArtifactRepository {
    root: PathBuf,
    limits: QuotaLimits,
    spaces: Mutex<HashMap<String, Arc<Mutex<UserSpace>>>>,
}

impl ArtifactRepository {
    /// Empty in-memory state over `root`; only `open` may hand one out, after
    /// loading whatever the root already holds
    fn new(root: impl Into<PathBuf>, limits: QuotaLimits) -> Self {
        ArtifactRepository {
            root: root.into(),
            limits,
            spaces: Mutex::new(HashMap::new()),
        }
    }

    /// Open a repository, recovering every user's artifacts from disk
    ///
    /// This is the only constructor. A fresh root simply yields an empty
    /// repository.
    ///
    /// Leftover temporary files are removed, manifest entries whose
    /// container is missing or does not match its recorded analysis are
    /// dropped, and containers no manifest references are deleted.
    pub fn open(root: impl Into<PathBuf>, limits: QuotaLimits) -> Result<Self> {
        let repository = Self::new(root, limits);
        let users_dir = repository.root.join(USERS_DIR);
        if !users_dir.exists() {
            return Ok(repository);
        }

        let mut recovered = HashMap::new();
        for entry in WalkDir::new(&users_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(space) = repository.recover_space(entry.path())? {
                tracing::info!(
                    user_id = %space.user_id,
                    artifacts = space.artifacts.len(),
                    bytes = space.ledger.total_bytes(),
                    "recovered user storage"
                );
                recovered.insert(space.user_id.clone(), Arc::new(Mutex::new(space)));
            }
        }

        *repository.spaces.lock() = recovered;
        Ok(repository)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn limits(&self) -> QuotaLimits {
        self.limits
    }

    /// Directory holding `user_id`'s containers
    ///
    /// Derived from a hash so arbitrary user ids never reach path
    /// construction.
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        let digest = Sha256::digest(user_id.as_bytes());
        self.root.join(USERS_DIR).join(format!("{:x}", digest))
    }

    fn space(&self, user_id: &str) -> Arc<Mutex<UserSpace>> {
        let mut spaces = self.spaces.lock();
        spaces
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserSpace::new(user_id, self.user_dir(user_id)))))
            .clone()
    }

    fn existing_space(&self, user_id: &str) -> Option<Arc<Mutex<UserSpace>>> {
        self.spaces.lock().get(user_id).cloned()
    }

    /// Store `candidate` for `user_id` if the quota allows it
    ///
    /// All-or-nothing: on any failure the ledger, the manifest and the
    /// user's directory are left as they were.
    pub fn admit(&self, user_id: &str, candidate: Artifact) -> Result<StoredArtifact> {
        self.admit_with_bytes(user_id, candidate).map(|(stored, _)| stored)
    }

    /// Same as `admit`, also returning the container bytes that were published
    ///
    /// The bytes come from the same encode that produced the stored file, so
    /// no second read races with a concurrent `remove`.
    pub fn admit_with_bytes(
        &self,
        user_id: &str,
        mut candidate: Artifact,
    ) -> Result<(StoredArtifact, Vec<u8>)> {
        if let Some(name) = &candidate.name {
            validate_name(name)?;
        }
        let size = candidate.size_bytes();

        let space = self.space(user_id);
        let mut space = space.lock();

        if let Err(e) = space.ledger.check(user_id, &self.limits, size) {
            tracing::warn!(user_id, size, error = %e, "admission rejected");
            return Err(e);
        }

        let name = match candidate.name.take() {
            Some(name) if space.artifacts.contains_key(&name) => {
                return Err(SonoraError::NameTaken { name });
            }
            Some(name) => name,
            None => generate_name(&candidate.style, |n| space.artifacts.contains_key(n)),
        };

        let bytes = codec::encode(&candidate.samples)?;
        let file_name = format!("{}.{}", name, CONTAINER_EXTENSION);
        let path = codec::publish(&space.dir, &file_name, &bytes)?;

        let stored = match Self::finish_admission(&space, user_id, name, candidate, &path, &bytes) {
            Ok(stored) => stored,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path) {
                    tracing::error!(path = %path.display(), error = %cleanup, "failed to remove rejected container");
                }
                return Err(e);
            }
        };

        space.ledger.commit(stored.analysis.size_bytes);
        space.artifacts.insert(stored.name.clone(), stored.clone());

        tracing::info!(
            user_id,
            name = %stored.name,
            bytes = stored.analysis.size_bytes,
            files = space.ledger.count(),
            total_bytes = space.ledger.total_bytes(),
            "artifact admitted"
        );
        Ok((stored, bytes))
    }

    /// Derive analysis from the published container and record it in the
    /// manifest
    fn finish_admission(
        space: &UserSpace,
        user_id: &str,
        name: String,
        candidate: Artifact,
        path: &Path,
        bytes: &[u8],
    ) -> Result<StoredArtifact> {
        let info = codec::probe_file(path)?;
        let size = candidate.size_bytes();
        if info.data_len != size || info.format != candidate.samples.format() {
            return Err(SonoraError::InvalidAudio {
                reason: format!(
                    "published container declares {} data bytes, expected {}",
                    info.data_len, size
                ),
            });
        }

        let genre = candidate.style.genre().to_string();
        let stored = StoredArtifact {
            name,
            user_id: user_id.to_string(),
            style: candidate.style,
            format: info.format,
            analysis: ArtifactAnalysis {
                duration_secs: info.duration_secs(),
                sample_count: info.sample_count,
                size_bytes: info.data_len,
                file_size_bytes: info.total_len,
                genre,
            },
            checksum: format!("{:x}", Sha256::digest(bytes)),
            created_at: Utc::now(),
        };

        space.save_manifest(space.artifacts.values().chain(std::iter::once(&stored)))?;
        Ok(stored)
    }

    /// Fetch one artifact's metadata
    ///
    /// The name is validated before any lookup, so malformed names and
    /// missing artifacts are reported independently of storage state.
    pub fn get(&self, user_id: &str, name: &str) -> Result<StoredArtifact> {
        validate_name(name)?;
        let space = self.existing_space(user_id).ok_or_else(|| SonoraError::NotFound {
            name: name.to_string(),
        })?;
        let space = space.lock();
        space.lookup(name).cloned()
    }

    /// Read the stored container bytes of one artifact
    pub fn read_container(&self, user_id: &str, name: &str) -> Result<Vec<u8>> {
        validate_name(name)?;
        let space = self.existing_space(user_id).ok_or_else(|| SonoraError::NotFound {
            name: name.to_string(),
        })?;
        let space = space.lock();
        let artifact = space.lookup(name)?;
        // Report the artifact name, never the hashed on-disk path
        codec::read_container(&space.container_path(artifact)).map_err(|e| match e {
            SonoraError::NotFound { .. } => SonoraError::NotFound {
                name: name.to_string(),
            },
            other => other,
        })
    }

    /// Snapshot of a user's artifacts, oldest first
    pub fn list(&self, user_id: &str) -> Vec<ArtifactSummary> {
        let Some(space) = self.existing_space(user_id) else {
            return Vec::new();
        };
        let space = space.lock();
        let mut artifacts: Vec<&StoredArtifact> = space.artifacts.values().collect();
        artifacts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        artifacts.into_iter().map(StoredArtifact::summary).collect()
    }

    /// Delete an artifact and release its quota
    ///
    /// Once the manifest no longer lists the artifact the removal has
    /// happened. Failing to delete the container file afterwards is only
    /// logged: the file is unreferenced from then on and `open` deletes it.
    pub fn remove(&self, user_id: &str, name: &str) -> Result<StoredArtifact> {
        validate_name(name)?;
        let space = self.existing_space(user_id).ok_or_else(|| SonoraError::NotFound {
            name: name.to_string(),
        })?;
        let mut space = space.lock();
        let artifact = space.lookup(name)?.clone();

        // Manifest first: a crash afterwards leaves only an orphan file,
        // which `open` deletes
        space.save_manifest(space.artifacts.values().filter(|a| a.name != name))?;

        let path = space.container_path(&artifact);
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to delete container, left for recovery"
            );
        }

        space.artifacts.remove(name);
        space.ledger.release(artifact.analysis.size_bytes);

        tracing::info!(user_id, name, "artifact removed");
        Ok(artifact)
    }

    /// Current quota position of a user
    pub fn usage(&self, user_id: &str) -> QuotaUsage {
        let ledger = self
            .existing_space(user_id)
            .map(|space| space.lock().ledger)
            .unwrap_or_default();
        QuotaUsage::new(&ledger, &self.limits)
    }

    /// Rebuild one user's space from its directory
    fn recover_space(&self, dir: &Path) -> Result<Option<UserSpace>> {
        remove_temp_files(dir)?;

        let Some(manifest) = UserManifest::load(dir)? else {
            tracing::warn!(dir = %dir.display(), "user directory without manifest skipped");
            return Ok(None);
        };
        if self.user_dir(&manifest.user_id) != dir {
            tracing::warn!(
                dir = %dir.display(),
                user_id = %manifest.user_id,
                "manifest does not belong to this directory, skipped"
            );
            return Ok(None);
        }

        let mut space = UserSpace::new(&manifest.user_id, dir.to_path_buf());
        let recorded = manifest.artifacts.len();
        for artifact in manifest.artifacts {
            let path = space.container_path(&artifact);
            match verify_container(&path, &artifact) {
                Ok(()) => {
                    space.ledger.commit(artifact.analysis.size_bytes);
                    space.artifacts.insert(artifact.name.clone(), artifact);
                }
                Err(e) => {
                    tracing::warn!(
                        name = %artifact.name,
                        error = %e,
                        "dropping manifest entry that does not match its container"
                    );
                }
            }
        }

        if space.artifacts.len() != recorded {
            space.save_manifest(space.artifacts.values())?;
        }
        remove_orphan_containers(&space)?;

        if space.ledger.count() > self.limits.max_files
            || space.ledger.total_bytes() > self.limits.max_total_bytes
        {
            tracing::warn!(user_id = %space.user_id, "recovered storage exceeds current quota");
        }
        Ok(Some(space))
    }
}

/// Check a stored container still matches its recorded analysis
fn verify_container(path: &Path, artifact: &StoredArtifact) -> Result<()> {
    validate_name(&artifact.name)?;
    let bytes = codec::read_container(path)?;
    let info = codec::probe(&bytes)?;
    let checksum = format!("{:x}", Sha256::digest(&bytes));

    let matches = checksum == artifact.checksum
        && info.format == artifact.format
        && info.sample_count == artifact.analysis.sample_count
        && info.data_len == artifact.analysis.size_bytes
        && info.total_len == artifact.analysis.file_size_bytes;
    if !matches {
        return Err(SonoraError::InvalidAudio {
            reason: format!("{} does not match its manifest entry", path.display()),
        });
    }
    Ok(())
}

fn remove_temp_files(dir: &Path) -> Result<()> {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_temp = entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(TEMP_SUFFIX);
        if is_temp {
            tracing::info!(path = %entry.path().display(), "removing interrupted write");
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn remove_orphan_containers(space: &UserSpace) -> Result<()> {
    for entry in WalkDir::new(&space.dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || entry.file_name() == MANIFEST_FILE {
            continue;
        }
        let path = entry.path();
        let is_container = path
            .extension()
            .map(|ext| ext == CONTAINER_EXTENSION)
            .unwrap_or(false);
        let referenced = path
            .file_stem()
            .map(|stem| space.artifacts.contains_key(stem.to_string_lossy().as_ref()))
            .unwrap_or(false);
        if is_container && !referenced {
            tracing::info!(path = %path.display(), "removing unreferenced container");
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
