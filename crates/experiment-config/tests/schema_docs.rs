//! Schema, example, and docs alignment tests for experiment-config.
// crates/experiment-config/tests/schema_docs.rs
// =============================================================================
// Module: Schema and Docs Tests
// Description: Check generated artifacts against the runtime config model.
// Purpose: Prevent drift between schema, example, docs, and validation.
// =============================================================================

use experiment_config::DocsError;
use experiment_config::ExperimentConfig;
use experiment_config::FIELD_KEYS;
use experiment_config::experiment_docs_markdown;
use experiment_config::experiment_schema;
use experiment_config::experiment_toml_example;
use experiment_config::keys;
use experiment_config::verify_experiment_docs;
use experiment_config::write_experiment_docs;
use serde_json::Value;
use serde_json::json;

mod common;

use common::TestResult;

fn validator() -> Result<jsonschema::Validator, String> {
    jsonschema::validator_for(&experiment_schema()).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Schema
// ============================================================================

#[test]
fn schema_requires_every_field() -> TestResult {
    let schema = experiment_schema();
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .ok_or("schema missing required list")?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if required != FIELD_KEYS {
        return Err(format!("required list mismatch: {required:?}"));
    }
    for key in FIELD_KEYS {
        if schema.pointer(&format!("/properties/{key}/description")).is_none() {
            return Err(format!("schema property {key} lacks a description"));
        }
    }
    Ok(())
}

#[test]
fn example_validates_against_schema() -> TestResult {
    let validator = validator()?;
    let document = common::example_document()?;
    let errors: Vec<String> = validator.iter_errors(&document).map(|err| err.to_string()).collect();
    if !errors.is_empty() {
        return Err(format!("example does not validate: {}", errors.join(", ")));
    }
    Ok(())
}

#[test]
fn loaded_config_encoding_validates_against_schema() -> TestResult {
    let validator = validator()?;
    let config = ExperimentConfig::from_toml_str(&experiment_toml_example())
        .and_then(|config| config.with_derived_param("input_shape", 1024_i64))
        .map_err(|err| err.to_string())?;
    let encoded = config.to_json_value().map_err(|err| err.to_string())?;
    if !validator.is_valid(&encoded) {
        return Err("encoded config should satisfy the schema".to_string());
    }
    Ok(())
}

#[test]
fn schema_rejects_what_the_loader_rejects() -> TestResult {
    let validator = validator()?;
    let cases = [
        (keys::N_SPLITS, json!(1)),
        (keys::DATA_GLOBS, json!([])),
        (keys::DATA_GLOBS, json!(["/abs/*.npz"])),
        (keys::DATA_GLOBS, json!(["a/../b/*.npz"])),
        (keys::DATA_GLOBS, json!(["../outside/*.npz"])),
        (keys::DATA_GLOBS, json!(["data\\..\\*.npz"])),
        (keys::LEARNING_RATE, json!(-0.1)),
        (keys::BETAS, json!([0.9, 1.0])),
        (keys::BETAS, json!([0.9])),
        (keys::MAX_EPOCHS, json!(0)),
        (keys::MODEL_CLASS_PATH, json!("Model")),
        (keys::MODEL_KWARGS, json!({ "hidden_shape": [1, 2] })),
        ("UNKNOWN", json!(true)),
    ];
    for (key, value) in cases {
        let document = common::document_with(key, value.clone())?;
        if validator.is_valid(&document) {
            return Err(format!("schema accepted {key} = {value}"));
        }
        if ExperimentConfig::from_document(document).is_ok() {
            return Err(format!("loader accepted {key} = {value}"));
        }
    }
    let document = common::document_without(keys::VERBOSE)?;
    if validator.is_valid(&document) {
        return Err("schema accepted a document without VERBOSE".to_string());
    }
    Ok(())
}

#[test]
fn dotted_names_are_not_parent_segments() -> TestResult {
    let validator = validator()?;
    let document = common::document_with(keys::DATA_GLOBS, json!(["runs..v2/**/*.npz"]))?;
    if !validator.is_valid(&document) {
        return Err("schema should accept `..` inside a segment name".to_string());
    }
    ExperimentConfig::from_document(document).map_err(|err| err.to_string())?;
    Ok(())
}

// ============================================================================
// SECTION: Docs
// ============================================================================

#[test]
fn docs_list_every_field() -> TestResult {
    let docs = experiment_docs_markdown().map_err(|err| err.to_string())?;
    for key in FIELD_KEYS {
        if !docs.contains(&format!("| `{key}` |")) {
            return Err(format!("docs missing field {key}"));
        }
    }
    for heading in ["## Data", "## Model", "## Optimizer (Adam)", "## Trainer", "## Bootstrapping"] {
        if !docs.contains(heading) {
            return Err(format!("docs missing section {heading}"));
        }
    }
    if !docs.contains("`NPZ_FILES` is read as `DATA_GLOBS`") {
        return Err("docs should list legacy aliases".to_string());
    }
    if !docs.contains("minimum: 2") {
        return Err("docs should render the N_SPLITS minimum".to_string());
    }
    Ok(())
}

#[test]
fn docs_are_deterministic() -> TestResult {
    let first = experiment_docs_markdown().map_err(|err| err.to_string())?;
    let second = experiment_docs_markdown().map_err(|err| err.to_string())?;
    if first != second {
        return Err("docs output should be deterministic".to_string());
    }
    Ok(())
}

#[test]
fn written_docs_verify_and_drift_is_detected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("experiment-config.md");
    write_experiment_docs(Some(&path)).map_err(|err| err.to_string())?;
    verify_experiment_docs(Some(&path)).map_err(|err| err.to_string())?;
    std::fs::write(&path, "stale").map_err(|err| err.to_string())?;
    match verify_experiment_docs(Some(&path)) {
        Err(DocsError::Drift(_)) => Ok(()),
        other => Err(format!("expected drift, got {other:?}")),
    }
}
