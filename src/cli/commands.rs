//! CLI Command Implementations
//!
//! Each command returns the JSON document the binary prints, which keeps
//! them testable without capturing stdout.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::info;

use super::{Commands, StyleArgs};
use crate::codec::{self, export_container};
use crate::engine::{ArtifactResponse, SynthesisEngine};
use crate::error::Result;
use crate::style::StyleDescriptor;

/// Dispatch a parsed command
pub fn run(engine: &SynthesisEngine, user_id: &str, command: Commands) -> Result<Value> {
    match command {
        Commands::Synthesize {
            style,
            name,
            output,
        } => synthesize(engine, user_id, &style, name, output.as_deref()),
        Commands::Render { style, output } => render(engine, &style, &output),
        Commands::List => list(engine, user_id),
        Commands::Get { name, output } => get(engine, user_id, &name, output.as_deref()),
        Commands::Remove { name } => remove(engine, user_id, &name),
        Commands::Usage => usage(engine, user_id),
        Commands::Genres => Ok(json!({ "genres": engine.genres() })),
    }
}

/// Synthesize and store; optionally export a copy of the container.
pub fn synthesize(
    engine: &SynthesisEngine,
    user_id: &str,
    style: &StyleArgs,
    name: Option<String>,
    output: Option<&Path>,
) -> Result<Value> {
    let descriptor = StyleDescriptor::try_from(style.to_request())?;
    info!(user_id, genre = descriptor.genre(), "synthesizing");

    let response = engine.synthesize_style(user_id, descriptor, name, output.is_some())?;
    let exported = export_audio(&response, output)?;
    response_json(&response, exported)
}

/// Render without touching the repository.
pub fn render(engine: &SynthesisEngine, style: &StyleArgs, output: &Path) -> Result<Value> {
    let (descriptor, samples) = engine.render(style.to_request())?;
    let bytes = codec::encode(&samples)?;

    let (dir, file_name) = split_target(output);
    let path = export_container(&bytes, &dir, &file_name)?;

    Ok(json!({
        "path": path,
        "genre": descriptor.genre(),
        "sample_count": samples.sample_count(),
        "duration_secs": samples.duration_secs(),
        "file_size_bytes": bytes.len(),
    }))
}

pub fn list(engine: &SynthesisEngine, user_id: &str) -> Result<Value> {
    let artifacts = engine.list_artifacts(user_id);
    Ok(json!({
        "user_id": user_id,
        "count": artifacts.len(),
        "artifacts": artifacts,
    }))
}

pub fn get(
    engine: &SynthesisEngine,
    user_id: &str,
    name: &str,
    output: Option<&Path>,
) -> Result<Value> {
    let response = engine.get_artifact(user_id, name, output.is_some())?;
    let exported = export_audio(&response, output)?;
    response_json(&response, exported)
}

pub fn remove(engine: &SynthesisEngine, user_id: &str, name: &str) -> Result<Value> {
    let removed = engine.remove_artifact(user_id, name)?;
    Ok(json!({
        "removed": removed.summary(),
        "usage": engine.usage(user_id),
    }))
}

pub fn usage(engine: &SynthesisEngine, user_id: &str) -> Result<Value> {
    let usage = engine.usage(user_id);
    Ok(json!({
        "user_id": user_id,
        "usage": usage,
        "remaining_bytes": usage.remaining_bytes(),
    }))
}

fn export_audio(response: &ArtifactResponse, dir: Option<&Path>) -> Result<Option<PathBuf>> {
    match (dir, &response.audio) {
        (Some(dir), Some(audio)) => {
            export_container(audio, dir, &response.artifact.file_name()).map(Some)
        }
        _ => Ok(None),
    }
}

fn response_json(response: &ArtifactResponse, exported: Option<PathBuf>) -> Result<Value> {
    let mut value = serde_json::to_value(response)?;
    if let (Some(path), Value::Object(map)) = (exported, &mut value) {
        map.insert("exported_to".to_string(), json!(path));
    }
    Ok(value)
}

/// Split a target path into its directory and base name
fn split_target(output: &Path) -> (PathBuf, String) {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn engine(root: &Path) -> SynthesisEngine {
        let config = EngineConfig {
            storage_root: root.to_path_buf(),
            sample_rate: 8_000,
            ..EngineConfig::default()
        };
        SynthesisEngine::from_config(&config).unwrap()
    }

    fn style(genre: &str) -> StyleArgs {
        StyleArgs {
            genre: genre.to_string(),
            tempo: 100,
            instruments: vec!["piano".to_string()],
            duration: 1.0,
        }
    }

    #[test]
    fn test_synthesize_then_list_and_remove() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir.path().join("store"));

        let value = synthesize(&engine, "alice", &style("jazz"), Some("tune".into()), None).unwrap();
        assert_eq!(value["artifact"]["name"], "tune");
        assert_eq!(value["artifact"]["analysis"]["sample_count"], 8_000);
        assert!(value.get("exported_to").is_none());

        let listed = list(&engine, "alice").unwrap();
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["artifacts"][0]["genre"], "jazz");

        let removed = remove(&engine, "alice", "tune").unwrap();
        assert_eq!(removed["usage"]["file_count"], 0);
    }

    #[test]
    fn test_get_exports_copy() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir.path().join("store"));
        let out = dir.path().join("out");

        synthesize(&engine, "alice", &style("rock"), Some("loud".into()), None).unwrap();
        let value = get(&engine, "alice", "loud", Some(&out)).unwrap();

        assert_eq!(value["exported_to"], json!(out.join("loud.wav")));
        assert!(out.join("loud.wav").is_file());
    }

    #[test]
    fn test_render_writes_file_only() {
        let dir = tempdir().unwrap();
        let engine = engine(&dir.path().join("store"));
        let target = dir.path().join("demo.wav");

        let value = render(&engine, &style("classical"), &target).unwrap();
        assert_eq!(value["sample_count"], 8_000);
        assert_eq!(value["file_size_bytes"], 44 + 16_000);
        assert!(target.is_file());
        assert_eq!(usage(&engine, "local").unwrap()["usage"]["file_count"], 0);
    }

    #[test]
    fn test_split_target() {
        assert_eq!(
            split_target(Path::new("song.wav")),
            (PathBuf::from("."), "song.wav".to_string())
        );
        assert_eq!(
            split_target(Path::new("out/mix.wav")),
            (PathBuf::from("out"), "mix.wav".to_string())
        );
    }
}
