// crates/experiment-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for experiment configuration docs.
// Purpose: Keep config docs in sync with schema and validation.
// Dependencies: serde_json, thiserror, std
// ============================================================================

//! ## Overview
//! Generates `docs/experiment-config.md` from the canonical schema. Output is
//! deterministic so drift can be detected in CI.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::config::KEY_ALIASES;
use crate::config::keys;
use crate::examples::experiment_toml_example;
use crate::schema::experiment_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "docs/experiment-config.md";

/// Schema keywords rendered in the constraints column, in display order.
const CONSTRAINT_KEYWORDS: &[&str] = &[
    "minimum",
    "exclusiveMinimum",
    "maximum",
    "exclusiveMaximum",
    "minItems",
    "maxItems",
    "maxProperties",
    "pattern",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Schema traversal or rendering error.
    #[error("docs schema error: {0}")]
    Schema(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// One rendered group of fields.
struct SectionSpec {
    /// Section heading.
    heading: &'static str,
    /// Ordered keys rendered in the table.
    fields: &'static [&'static str],
}

/// Field groups in rendering order.
const SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        heading: "Data",
        fields: &[keys::DATA_GLOBS],
    },
    SectionSpec {
        heading: "Model",
        fields: &[keys::MODEL_CLASS_PATH, keys::MODEL_KWARGS, keys::WITH_OBSERVATION_MODEL],
    },
    SectionSpec {
        heading: "Optimizer (Adam)",
        fields: &[keys::LEARNING_RATE, keys::EPSILON, keys::BETAS],
    },
    SectionSpec {
        heading: "Trainer",
        fields: &[
            keys::MAX_EPOCHS,
            keys::N_SPLITS,
            keys::SHUFFLE_FOLDS,
            keys::VALIDATION,
            keys::MIN_ITEMS_PER_DATASET,
        ],
    },
    SectionSpec {
        heading: "Bootstrapping",
        fields: &[keys::N_BOOTSTRAPS, keys::BOOTSTRAP_SAMPLE_RATIO],
    },
    SectionSpec {
        heading: "Output",
        fields: &[keys::VERBOSE],
    },
];

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Generates the configuration markdown documentation.
///
/// # Errors
///
/// Returns [`DocsError`] when schema traversal fails.
pub fn experiment_docs_markdown() -> Result<String, DocsError> {
    let schema = experiment_schema();
    let mut out = String::new();

    out.push_str("<!--\n");
    out.push_str("docs/experiment-config.md\n");
    out.push_str("Generated: This file is auto-generated; do not edit manually.\n");
    out.push_str("-->\n\n");
    out.push_str("# Experiment Configuration\n\n");
    out.push_str("Every field is required. Keys are case-sensitive. Loading fails closed on\n");
    out.push_str("missing fields, unknown keys, and out-of-domain values.\n\n");

    for section in SECTIONS {
        out.push_str("## ");
        out.push_str(section.heading);
        out.push_str("\n\n");
        out.push_str(&render_table(&schema, section.fields)?);
        out.push('\n');
    }

    out.push_str("## Legacy Keys\n\n");
    for (alias, canonical) in KEY_ALIASES {
        writeln!(out, "- `{alias}` is read as `{canonical}`.")
            .map_err(|err| DocsError::Schema(err.to_string()))?;
    }
    out.push('\n');

    out.push_str("## Example\n\n```toml\n");
    out.push_str(&experiment_toml_example());
    out.push_str("```\n");
    Ok(out)
}

/// Writes the generated docs to the standard location.
///
/// # Errors
///
/// Returns [`DocsError`] when file output fails.
pub fn write_experiment_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = experiment_docs_markdown()?;
    fs::write(path, content.as_bytes()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the on-disk docs match the generated output.
///
/// # Errors
///
/// Returns [`DocsError`] when the docs drift.
pub fn verify_experiment_docs(path: Option<&Path>) -> Result<(), DocsError> {
    let path = path.unwrap_or_else(|| Path::new(DOCS_PATH));
    let content = experiment_docs_markdown()?;
    let existing = fs::read_to_string(path).map_err(|err| DocsError::Io(err.to_string()))?;
    if existing != content {
        return Err(DocsError::Drift(format!("docs mismatch: {}", path.display())));
    }
    Ok(())
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the field table for one section.
fn render_table(schema: &Value, fields: &[&str]) -> Result<String, DocsError> {
    let mut table = String::from("| Field | Type | Constraints | Notes |\n| --- | --- | --- | --- |\n");
    for field in fields {
        let property = schema
            .pointer(&format!("/properties/{field}"))
            .ok_or_else(|| DocsError::Schema(format!("missing schema property: {field}")))?;
        let description = property.get("description").and_then(Value::as_str).unwrap_or("");
        writeln!(
            table,
            "| `{field}` | {} | {} | {} |",
            render_type(property),
            render_constraints(property),
            description.replace('|', "\\|")
        )
        .map_err(|err| DocsError::Schema(err.to_string()))?;
    }
    Ok(table)
}

/// Renders the JSON type of a property.
fn render_type(property: &Value) -> String {
    let base = match property.get("type") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Array(names)) => {
            names.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(" \\| ")
        }
        _ => "any".to_string(),
    };
    match property.pointer("/items/type").and_then(Value::as_str) {
        Some(item) if base == "array" => format!("array of {item}"),
        _ => base,
    }
}

/// Renders the constraint keywords of a property and its items.
fn render_constraints(property: &Value) -> String {
    let mut parts = Vec::new();
    for (prefix, target) in [("", Some(property)), ("items ", property.get("items"))] {
        let Some(target) = target else {
            continue;
        };
        for keyword in CONSTRAINT_KEYWORDS {
            if let Some(value) = target.get(*keyword) {
                let rendered = match value {
                    Value::String(text) => format!("`{}`", text.replace('|', "\\|")),
                    other => other.to_string(),
                };
                parts.push(format!("{prefix}{keyword}: {rendered}"));
            }
        }
    }
    if parts.is_empty() { "-".to_string() } else { parts.join("; ") }
}
