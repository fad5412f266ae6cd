//! Artifact names
//!
//! Names are the only user-influenced string that reaches the filesystem, so
//! every lookup validates against `[A-Za-z0-9_-]+` before touching storage.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::{Result, SonoraError};
use crate::style::StyleDescriptor;

/// Allowed artifact name characters
const NAME_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

/// Longest accepted artifact name
pub const MAX_NAME_LEN: usize = 100;

/// Longest descriptive fragment kept in generated names
const MAX_FRAGMENT_LEN: usize = 64;

/// Hex characters of the random token
const TOKEN_LEN: usize = 12;

static NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn name_regex() -> &'static Regex {
    NAME_REGEX.get_or_init(|| Regex::new(NAME_PATTERN).expect("invalid regex pattern"))
}

/// Check a name against the allowed pattern
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LEN || !name_regex().is_match(name) {
        return Err(SonoraError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Replace every disallowed character with `_`
pub fn sanitize_fragment(raw: &str) -> String {
    let fragment: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FRAGMENT_LEN)
        .collect();

    if fragment.is_empty() {
        "artifact".to_string()
    } else {
        fragment
    }
}

/// Generate a fresh name for `style`, retrying while `taken` reports a clash
pub fn generate_name(style: &StyleDescriptor, taken: impl Fn(&str) -> bool) -> String {
    let fragment = sanitize_fragment(&format!("{}_{}bpm", style.genre(), style.tempo()));
    loop {
        let token = Uuid::new_v4().simple().to_string();
        let name = format!("{}_{}", fragment, &token[..TOKEN_LEN]);
        if !taken(&name) {
            return name;
        }
    }
}
