//! Crash-safe publishing of container files
//!
//! Bytes are written to a temporary file next to the destination and only
//! renamed onto the final path once fully written and synced. The temporary
//! file is owned by a `NamedTempFile`, so every early return removes it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::error::{Result, SonoraError};

/// Extension of every published container
pub const CONTAINER_EXTENSION: &str = "wav";

/// Suffix of in-flight temporary files
pub const TEMP_SUFFIX: &str = ".tmp";

/// Reduce a caller-supplied name to a safe file name
///
/// Directory components are dropped, so `../../etc/passwd` becomes
/// `passwd.wav`. Names that are empty, hidden or parent references are
/// rejected outright.
pub fn safe_file_name(requested: &str) -> Result<String> {
    let invalid = || SonoraError::InvalidName {
        name: requested.to_string(),
    };

    // Treat both separators as separators regardless of platform
    let base = requested
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "." || base == ".." || base.starts_with('.') {
        return Err(invalid());
    }

    let path = Path::new(base);
    let has_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
        .unwrap_or(false);

    if has_extension {
        Ok(base.to_string())
    } else {
        Ok(format!("{}.{}", base, CONTAINER_EXTENSION))
    }
}

/// Atomically publish `bytes` as `dir/file_name`
///
/// `file_name` must already be a bare file name. On any failure the
/// temporary file is removed and nothing appears at the destination.
pub fn publish(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let final_path = dir.join(file_name);
    let export_failed = |source: std::io::Error| SonoraError::ExportFailed {
        path: final_path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(export_failed)?;

    let mut temp = Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(export_failed)?;

    temp.write_all(bytes).map_err(export_failed)?;
    temp.flush().map_err(export_failed)?;
    temp.as_file().sync_all().map_err(export_failed)?;

    // On failure the PersistError hands the temp file back; dropping it deletes it
    temp.persist(&final_path)
        .map_err(|e| export_failed(e.error))?;

    tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "published container");
    Ok(final_path)
}

/// Export a container to a caller-chosen location
///
/// Only the base name of `requested_name` is honoured; the file always lands
/// inside `target_dir`.
pub fn export_container(bytes: &[u8], target_dir: &Path, requested_name: &str) -> Result<PathBuf> {
    let file_name = safe_file_name(requested_name)?;
    let path = publish(target_dir, &file_name, bytes)?;
    tracing::info!(path = %path.display(), "exported container");
    Ok(path)
}

/// Read a whole container file
///
/// A missing file is reported by its base name only.
pub fn read_container(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SonoraError::NotFound {
                name: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }
        } else {
            SonoraError::Io(e)
        }
    })
}
