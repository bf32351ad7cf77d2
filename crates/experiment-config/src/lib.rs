// crates/experiment-config/src/lib.rs
// ============================================================================
// Module: Experiment Config Library
// Description: Canonical experiment config model, validation, and artifacts.
// Purpose: Single source of truth for experiment configuration semantics.
// Dependencies: globset, serde, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! `experiment-config` defines the configuration record a training harness
//! reads before running one experiment: data globs, model registry key and
//! keyword arguments, Adam hyperparameters, cross-validation and bootstrap
//! settings. Loading is strict and fail-closed. The crate also provides a
//! model registry, audited loading, and deterministic schema, example, and
//! docs generators.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod docs;
pub mod examples;
pub mod loader;
pub mod registry;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ConfigAuditEvent;
pub use audit::ConfigAuditSink;
pub use audit::FileAuditSink;
pub use audit::LoadOutcome;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::*;
pub use docs::DocsError;
pub use docs::experiment_docs_markdown;
pub use docs::verify_experiment_docs;
pub use docs::write_experiment_docs;
pub use examples::experiment_toml_example;
pub use loader::ExperimentLoader;
pub use registry::ModelFactory;
pub use registry::ModelRegistry;
pub use registry::RegistryError;
pub use schema::experiment_schema;
