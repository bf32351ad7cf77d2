// crates/experiment-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON schema builder for experiment configuration records.
// Purpose: Provide the canonical validation schema for config artifacts.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema for experiment configuration records.
//! The schema mirrors the runtime validation rules and is used by tooling,
//! docs, and editors. Legacy key aliases are accepted by the loader but are
//! not part of the canonical schema.

use serde_json::Value;
use serde_json::json;

use crate::config::FIELD_KEYS;
use crate::config::MAX_DATA_GLOBS;
use crate::config::MAX_MODEL_CLASS_PATH_LENGTH;
use crate::config::MAX_MODEL_KWARGS;
use crate::config::MAX_TOTAL_PATH_LENGTH;
use crate::config::MIN_MAX_EPOCHS;
use crate::config::MIN_N_SPLITS;
use crate::config::keys;

/// Pattern matching one identifier segment.
const IDENTIFIER_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";
/// Pattern matching a glob anchored at a filesystem root or drive.
const ROOTED_GLOB_PATTERN: &str = "^([/\\\\]|[A-Za-z]:)";
/// Pattern matching a glob with a `..` path segment.
const PARENT_SEGMENT_PATTERN: &str = "(^|[/\\\\])\\.\\.([/\\\\]|$)";
/// Pattern matching a dotted path of at least two identifier segments.
const CLASS_PATH_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*(\\.[A-Za-z_][A-Za-z0-9_]*)+$";

/// Returns the JSON schema for an experiment configuration record.
#[must_use]
pub fn experiment_schema() -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(keys::DATA_GLOBS.to_string(), data_globs_schema());
    properties.insert(keys::MODEL_CLASS_PATH.to_string(), model_class_path_schema());
    properties.insert(keys::MODEL_KWARGS.to_string(), model_kwargs_schema());
    properties.insert(
        keys::WITH_OBSERVATION_MODEL.to_string(),
        bool_schema("Apply an observation model to raw model outputs before scoring."),
    );
    properties.insert(
        keys::LEARNING_RATE.to_string(),
        positive_number_schema("Adam learning rate."),
    );
    properties.insert(
        keys::EPSILON.to_string(),
        positive_number_schema("Adam numerical stability term."),
    );
    properties.insert(keys::BETAS.to_string(), betas_schema());
    properties.insert(
        keys::MAX_EPOCHS.to_string(),
        count_schema(MIN_MAX_EPOCHS, "Number of training epochs per fold."),
    );
    properties.insert(
        keys::N_SPLITS.to_string(),
        count_schema(MIN_N_SPLITS, "Number of cross-validation folds."),
    );
    properties.insert(
        keys::SHUFFLE_FOLDS.to_string(),
        bool_schema("Shuffle samples before splitting into folds."),
    );
    properties.insert(
        keys::VALIDATION.to_string(),
        bool_schema("Hold out a validation split (`true` is not implemented by the harness)."),
    );
    properties.insert(
        keys::MIN_ITEMS_PER_DATASET.to_string(),
        json!({
            "type": "integer",
            "minimum": 0,
            "maximum": i64::MAX,
            "description": "Datasets with fewer items are skipped."
        }),
    );
    properties.insert(
        keys::N_BOOTSTRAPS.to_string(),
        count_schema(0, "Number of bootstrap resampling rounds."),
    );
    properties.insert(
        keys::BOOTSTRAP_SAMPLE_RATIO.to_string(),
        positive_number_schema("Fraction of the dataset drawn per bootstrap round."),
    );
    properties.insert(keys::VERBOSE.to_string(), bool_schema("Verbose harness output."));

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "experiment-config://schemas/experiment.schema.json",
        "title": "Experiment Configuration",
        "description": "Settings for one training experiment.",
        "type": "object",
        "properties": Value::Object(properties),
        "required": FIELD_KEYS,
        "additionalProperties": false
    })
}

// ============================================================================
// SECTION: Field Schemas
// ============================================================================

/// Schema for the data glob list.
fn data_globs_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "maxItems": MAX_DATA_GLOBS,
        "items": {
            "type": "string",
            "minLength": 1,
            "maxLength": MAX_TOTAL_PATH_LENGTH,
            "allOf": [
                { "not": { "pattern": ROOTED_GLOB_PATTERN } },
                { "not": { "pattern": PARENT_SEGMENT_PATTERN } }
            ]
        },
        "description": "Glob patterns relative to the data root (`**` crosses directories)."
    })
}

/// Schema for the model class path.
fn model_class_path_schema() -> Value {
    json!({
        "type": "string",
        "pattern": CLASS_PATH_PATTERN,
        "maxLength": MAX_MODEL_CLASS_PATH_LENGTH,
        "description": "Model registry key (fully-qualified dotted class path)."
    })
}

/// Schema for model constructor keyword arguments.
fn model_kwargs_schema() -> Value {
    json!({
        "type": "object",
        "maxProperties": MAX_MODEL_KWARGS,
        "propertyNames": { "pattern": IDENTIFIER_PATTERN },
        "additionalProperties": { "type": ["boolean", "integer", "number", "string"] },
        "description": "Scalar keyword arguments passed verbatim to the model factory."
    })
}

/// Schema for the optimizer decay rates.
fn betas_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 2,
        "maxItems": 2,
        "items": {
            "type": "number",
            "exclusiveMinimum": 0,
            "exclusiveMaximum": 1
        },
        "description": "Adam first- and second-moment decay rates."
    })
}

/// Schema for a boolean flag.
fn bool_schema(description: &str) -> Value {
    json!({
        "type": "boolean",
        "description": description
    })
}

/// Schema for a strictly positive number.
fn positive_number_schema(description: &str) -> Value {
    json!({
        "type": "number",
        "exclusiveMinimum": 0,
        "description": description
    })
}

/// Schema for a `u32` count with a lower bound.
fn count_schema(minimum: u32, description: &str) -> Value {
    json!({
        "type": "integer",
        "minimum": minimum,
        "maximum": u32::MAX,
        "description": description
    })
}
