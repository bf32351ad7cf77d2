// crates/experiment-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for experiment config tests.
// Purpose: Reduce duplication across integration tests for experiment-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use experiment_config::ConfigError;
use experiment_config::experiment_toml_example;
use serde_json::Value;

/// Result type used by integration tests.
pub type TestResult = Result<(), String>;

/// Parses the canonical example into a structured document.
pub fn example_document() -> Result<Value, String> {
    toml::from_str(&experiment_toml_example()).map_err(|err| err.to_string())
}

/// Returns the example document with one key replaced.
pub fn document_with(key: &str, value: Value) -> Result<Value, String> {
    let mut document = example_document()?;
    let table = document.as_object_mut().ok_or("example root is not a table")?;
    table.insert(key.to_string(), value);
    Ok(document)
}

/// Returns the example document with one key removed.
pub fn document_without(key: &str) -> Result<Value, String> {
    let mut document = example_document()?;
    let table = document.as_object_mut().ok_or("example root is not a table")?;
    if table.remove(key).is_none() {
        return Err(format!("example has no key {key}"));
    }
    Ok(document)
}

/// Asserts that a result is `InvalidValue` for the given key.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, field: &str) -> TestResult {
    match result {
        Err(ConfigError::InvalidValue {
            field: actual,
            reason,
        }) => {
            if actual == field {
                Ok(())
            } else {
                Err(format!("expected invalid {field}, got invalid {actual}: {reason}"))
            }
        }
        Err(other) => Err(format!("expected invalid {field}, got {other}")),
        Ok(_) => Err(format!("expected invalid {field}, load succeeded")),
    }
}

/// Asserts that a result is `MissingField` for the given key.
pub fn assert_missing<T>(result: Result<T, ConfigError>, field: &str) -> TestResult {
    match result {
        Err(ConfigError::MissingField(actual)) if actual == field => Ok(()),
        Err(other) => Err(format!("expected missing {field}, got {other}")),
        Ok(_) => Err(format!("expected missing {field}, load succeeded")),
    }
}

/// Compares floats bit-for-bit.
pub fn assert_float(actual: f64, expected: f64, label: &str) -> TestResult {
    if actual.to_bits() == expected.to_bits() {
        Ok(())
    } else {
        Err(format!("{label}: expected {expected}, got {actual}"))
    }
}
