//! Audited loading tests for experiment-config.
// crates/experiment-config/tests/audit_logging.rs
// =============================================================================
// Module: Audit Logging Tests
// Description: Load outcome events recorded by the audited loader.
// Purpose: Ensure every load attempt leaves a structured audit trail.
// =============================================================================

use std::fs;
use std::sync::Arc;
use std::sync::Mutex;

use experiment_config::ConfigAuditEvent;
use experiment_config::ConfigAuditSink;
use experiment_config::ConfigSource;
use experiment_config::ExperimentLoader;
use experiment_config::FileAuditSink;
use experiment_config::LoadOutcome;
use experiment_config::experiment_toml_example;
use experiment_config::keys;
use serde_json::Value;
use serde_json::json;

mod common;

use common::TestResult;

/// Sink that keeps events in memory.
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ConfigAuditEvent>>,
}

impl ConfigAuditSink for RecordingSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl RecordingSink {
    fn outcomes(&self) -> Vec<LoadOutcome> {
        self.events
            .lock()
            .map(|events| events.iter().map(|event| event.outcome).collect())
            .unwrap_or_default()
    }
}

#[test]
fn successful_load_records_loaded_event() -> TestResult {
    let sink = Arc::new(RecordingSink::default());
    let loader = ExperimentLoader::new(sink.clone());
    loader
        .load(ConfigSource::Toml(experiment_toml_example()))
        .map_err(|err| err.to_string())?;
    if sink.outcomes() != vec![LoadOutcome::Loaded] {
        return Err(format!("unexpected outcomes: {:?}", sink.outcomes()));
    }
    let events = sink.events.lock().map_err(|err| err.to_string())?;
    let event = events.first().ok_or("missing event")?;
    if event.source != "inline:toml"
        || event.data_glob_count != Some(1)
        || event.model_class_path.as_deref()
            != Some("kinoml.ml.torch_models.NeuralNetworkRegression")
    {
        return Err("loaded event should describe the config".to_string());
    }
    Ok(())
}

#[test]
fn validation_flag_records_warning_event() -> TestResult {
    let sink = Arc::new(RecordingSink::default());
    let loader = ExperimentLoader::new(sink.clone());
    let document = common::document_with(keys::VALIDATION, json!(true))?;
    loader.load(ConfigSource::Value(document)).map_err(|err| err.to_string())?;
    if sink.outcomes() != vec![LoadOutcome::Loaded, LoadOutcome::Warning] {
        return Err(format!("unexpected outcomes: {:?}", sink.outcomes()));
    }
    let events = sink.events.lock().map_err(|err| err.to_string())?;
    let warning = events.get(1).ok_or("missing warning")?;
    if warning.field.as_deref() != Some(keys::VALIDATION)
        || warning.error_kind != Some("validation_unsupported")
    {
        return Err("warning should reference VALIDATION".to_string());
    }
    Ok(())
}

#[test]
fn rejected_load_records_field_and_kind() -> TestResult {
    let sink = Arc::new(RecordingSink::default());
    let loader = ExperimentLoader::new(sink.clone());
    let document = common::document_with(keys::N_SPLITS, json!(1))?;
    if loader.load(ConfigSource::Value(document)).is_ok() {
        return Err("load should fail".to_string());
    }
    let events = sink.events.lock().map_err(|err| err.to_string())?;
    let [event] = events.as_slice() else {
        return Err(format!("expected one event, got {}", events.len()));
    };
    if event.outcome != LoadOutcome::Rejected
        || event.field.as_deref() != Some(keys::N_SPLITS)
        || event.error_kind != Some("invalid_value")
    {
        return Err("rejected event should name N_SPLITS".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_appends_json_lines() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log_path = dir.path().join("audit.jsonl");
    let sink = FileAuditSink::new(&log_path).map_err(|err| err.to_string())?;
    let loader = ExperimentLoader::new(Arc::new(sink));
    loader
        .load(ConfigSource::Toml(experiment_toml_example()))
        .map_err(|err| err.to_string())?;
    let _ = loader.load(ConfigSource::Value(common::document_without(keys::EPSILON)?));

    let content = fs::read_to_string(&log_path).map_err(|err| err.to_string())?;
    let lines: Vec<Value> = content
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()
        .map_err(|err| err.to_string())?;
    let outcomes: Vec<&str> =
        lines.iter().filter_map(|line| line.get("outcome").and_then(Value::as_str)).collect();
    if outcomes != vec!["loaded", "rejected"] {
        return Err(format!("unexpected outcomes: {outcomes:?}"));
    }
    let rejected = lines.get(1).ok_or("missing rejected line")?;
    if rejected.get("error_kind") != Some(&json!("missing_field")) || rejected.get("kind").is_some()
    {
        return Err("rejected line should carry the missing_field error kind".to_string());
    }
    if lines.iter().any(|line| line.get("event") != Some(&json!("experiment_config"))) {
        return Err("every line should carry the event name".to_string());
    }
    Ok(())
}
