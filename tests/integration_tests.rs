//! Integration Tests
//!
//! End-to-end tests for the Sonora synthesis pipeline.

use std::path::Path;
use std::sync::Arc;

use approx::assert_abs_diff_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use sonora::codec::{self, PcmFormat};
use sonora::engine::{EngineConfig, SynthesisEngine};
use sonora::store::{ArtifactRepository, QuotaLimits};
use sonora::style::{StyleBuilder, StyleRequest};
use sonora::synth::SynthesizerRegistry;
use sonora::SonoraError;

/// Helper to build an engine over a scratch root
fn engine_at(root: &Path, format: PcmFormat) -> SynthesisEngine {
    let repository = Arc::new(ArtifactRepository::open(root, QuotaLimits::default()).unwrap());
    SynthesisEngine::new(SynthesizerRegistry::with_defaults(), repository, format).unwrap()
}

fn short(genre: &str, duration_secs: f64) -> StyleRequest {
    StyleRequest {
        duration_secs,
        ..StyleRequest::new(genre)
    }
}

// === Full Pipeline Tests ===

#[test]
fn test_default_classical_request() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());

    let request = StyleRequest {
        tempo: 120,
        ..StyleRequest::new("classical")
    };
    let response = engine.synthesize("alice", request, false).unwrap();
    let analysis = &response.artifact.analysis;

    assert_eq!(analysis.sample_count, 1_323_000);
    assert_eq!(analysis.size_bytes, 2_646_000);
    assert_eq!(analysis.file_size_bytes, 44 + 2_646_000);
    assert_abs_diff_eq!(analysis.duration_secs, 30.0, epsilon = 1.0 / 44_100.0);
    assert_eq!(analysis.genre, "classical");
    assert!(response.audio.is_none());

    let path = engine
        .repository()
        .user_dir("alice")
        .join(response.artifact.file_name());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 44 + 2_646_000);
}

#[test]
fn test_header_alone_determines_length() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::new(22_050, 1, 16));

    let response = engine.synthesize("alice", short("rock", 2.5), true).unwrap();
    let audio = response.audio.unwrap();
    let info = codec::probe(&audio).unwrap();

    assert_eq!(info.sample_count, 55_125);
    assert_eq!(info.data_len, 110_250);
    assert_eq!(info.total_len, info.header_len + info.data_len);
    assert_eq!(info.total_len, audio.len() as u64);
}

#[test]
fn test_stored_audio_matches_render() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::new(8_000, 1, 16));

    let (_, rendered) = engine.render(short("jazz", 1.5)).unwrap();
    let stored = engine.synthesize("alice", short("jazz", 1.5), false).unwrap();
    let fetched = engine
        .get_artifact("alice", &stored.artifact.name, true)
        .unwrap();

    let decoded = codec::decode(&fetched.audio.unwrap()).unwrap();
    assert_eq!(decoded, rendered);
}

#[test]
fn test_synthesis_is_deterministic() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());

    for genre in ["classical", "rock", "jazz"] {
        let style = StyleBuilder::new(genre)
            .tempo(150)
            .instrument("synth")
            .duration_secs(1.0)
            .build()
            .unwrap();
        let request = StyleRequest::from(style);

        let (_, first) = engine.render(request.clone()).unwrap();
        let (_, second) = engine.render(request).unwrap();
        assert_eq!(first.samples(), second.samples(), "{} differs", genre);
    }
}

#[test]
fn test_multichannel_and_bit_depths() {
    let dir = tempdir().unwrap();

    for format in [
        PcmFormat::new(8_000, 2, 8),
        PcmFormat::new(8_000, 2, 24),
        PcmFormat::new(8_000, 1, 32),
    ] {
        let engine = engine_at(dir.path(), format);
        let response = engine.synthesize("alice", short("rock", 1.0), true).unwrap();
        let info = codec::probe(&response.audio.unwrap()).unwrap();

        assert_eq!(info.format, format);
        assert_eq!(info.sample_count, 8_000);
        assert_eq!(info.data_len, 8_000 * format.block_align() as u64);
        assert_eq!(response.artifact.analysis.size_bytes, info.data_len);
    }

    // Every engine reopened the same root, so nothing earlier was lost
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());
    assert_eq!(engine.usage("alice").file_count, 3);
    assert_eq!(engine.list_artifacts("alice").len(), 3);
}

// === Error Path Tests ===

#[test]
fn test_unsupported_genre_leaves_no_trace() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());

    let err = engine
        .synthesize("alice", StyleRequest::new("dubstep"), false)
        .unwrap_err();

    assert!(matches!(err, SonoraError::UnsupportedGenre { .. }));
    assert_eq!(err.status_code(), 400);
    assert!(engine.list_artifacts("alice").is_empty());
    assert!(!engine.repository().user_dir("alice").exists());
}

#[test]
fn test_traversal_name_rejected() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());

    let err = engine
        .get_artifact("alice", "../../etc/passwd", false)
        .unwrap_err();
    assert!(matches!(err, SonoraError::InvalidName { .. }));
    assert_eq!(err.status_code(), 400);

    let err = engine.get_artifact("alice", "missing", false).unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[test]
fn test_invalid_style_fields() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::cd_quality());

    let cases = [
        StyleRequest {
            duration_secs: 0.5,
            ..StyleRequest::new("rock")
        },
        StyleRequest {
            tempo: 59,
            ..StyleRequest::new("rock")
        },
        StyleRequest {
            container: "mp3".to_string(),
            ..StyleRequest::new("rock")
        },
        StyleRequest::new("   "),
    ];

    for request in cases {
        let err = engine.synthesize("alice", request, false).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STYLE");
    }
    assert_eq!(engine.usage("alice").file_count, 0);
}

// === Persistence Tests ===

#[test]
fn test_reopen_restores_artifacts() {
    let dir = tempdir().unwrap();
    let config = EngineConfig {
        storage_root: dir.path().to_path_buf(),
        sample_rate: 8_000,
        ..EngineConfig::default()
    };

    let names: Vec<String> = {
        let engine = SynthesisEngine::from_config(&config).unwrap();
        ["classical", "rock", "jazz"]
            .iter()
            .map(|genre| {
                engine
                    .synthesize("alice", short(genre, 1.0), false)
                    .unwrap()
                    .artifact
                    .name
            })
            .collect()
    };

    let engine = SynthesisEngine::from_config(&config).unwrap();
    let usage = engine.usage("alice");
    assert_eq!(usage.file_count, 3);
    assert_eq!(usage.total_bytes, 3 * 16_000);

    for name in &names {
        let fetched = engine.get_artifact("alice", name, true).unwrap();
        assert_eq!(fetched.audio.unwrap().len(), 44 + 16_000);
    }
}

#[test]
fn test_remove_frees_name_and_quota() {
    let dir = tempdir().unwrap();
    let engine = engine_at(dir.path(), PcmFormat::new(8_000, 1, 16));
    let style = sonora::style::StyleDescriptor::try_from(short("rock", 1.0)).unwrap();

    engine
        .synthesize_style("alice", style.clone(), Some("take".into()), false)
        .unwrap();
    let removed = engine.remove_artifact("alice", "take").unwrap();
    assert_eq!(removed.name, "take");
    assert_eq!(engine.usage("alice").total_bytes, 0);

    engine
        .synthesize_style("alice", style, Some("take".into()), false)
        .unwrap();
    assert_eq!(engine.list_artifacts("alice").len(), 1);
}
