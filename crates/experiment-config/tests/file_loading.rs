//! File-based loading tests for experiment-config.
// crates/experiment-config/tests/file_loading.rs
// =============================================================================
// Module: File Loading Tests
// Description: Format detection and file limits for config paths.
// Purpose: Ensure files load like inline sources and fail closed on bad input.
// =============================================================================

use std::fs;
use std::path::Path;

use experiment_config::ConfigError;
use experiment_config::ConfigFormat;
use experiment_config::ExperimentConfig;
use experiment_config::experiment_toml_example;

mod common;

use common::TestResult;

#[test]
fn toml_and_json_files_load_identically() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let toml_path = dir.path().join("test_ligand.toml");
    let json_path = dir.path().join("test_ligand.JSON");
    fs::write(&toml_path, experiment_toml_example()).map_err(|err| err.to_string())?;
    let document = common::example_document()?;
    let json_text = serde_json::to_string_pretty(&document).map_err(|err| err.to_string())?;
    fs::write(&json_path, json_text).map_err(|err| err.to_string())?;

    let from_toml = ExperimentConfig::load(toml_path.as_path()).map_err(|err| err.to_string())?;
    let from_json = ExperimentConfig::load(json_path).map_err(|err| err.to_string())?;
    if from_toml != from_json {
        return Err("file formats should load equal configs".to_string());
    }
    Ok(())
}

#[test]
fn format_detection_by_extension() -> TestResult {
    let cases = [
        ("a.json", ConfigFormat::Json),
        ("a.Json", ConfigFormat::Json),
        ("a.toml", ConfigFormat::Toml),
        ("experiment", ConfigFormat::Toml),
    ];
    for (path, expected) in cases {
        if ConfigFormat::for_path(Path::new(path)) != expected {
            return Err(format!("wrong format for {path}"));
        }
    }
    Ok(())
}

#[test]
fn missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match ExperimentConfig::load(dir.path().join("absent.toml")) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn oversized_file_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("huge.toml");
    let mut content = experiment_toml_example();
    content.push_str(&"#".repeat(1024 * 1024));
    fs::write(&path, content).map_err(|err| err.to_string())?;
    match ExperimentConfig::load(path) {
        Err(ConfigError::Parse(message)) if message.contains("size limit") => Ok(()),
        other => Err(format!("expected size limit error, got {other:?}")),
    }
}

#[test]
fn non_utf8_file_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    match ExperimentConfig::load(path) {
        Err(ConfigError::Parse(message)) if message.contains("utf-8") => Ok(()),
        other => Err(format!("expected utf-8 error, got {other:?}")),
    }
}

#[test]
fn overlong_path_component_rejected() -> TestResult {
    let path = Path::new("configs").join("x".repeat(300));
    match ExperimentConfig::load(path) {
        Err(ConfigError::Io(message)) if message.contains("component") => Ok(()),
        other => Err(format!("expected path component error, got {other:?}")),
    }
}
