// crates/experiment-config/src/audit.rs
// ============================================================================
// Module: Config Audit Logging
// Description: Structured audit events for experiment config loading.
// Purpose: Emit JSON-line load outcomes without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the audit event payload recorded for every config load
//! attempt and the sinks that persist it. Events are single-line JSON so
//! deployments can route them into their preferred logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::ConfigError;
use crate::config::ConfigWarning;
use crate::config::ExperimentConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome classification for a config load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Configuration loaded and validated.
    Loaded,
    /// Configuration rejected.
    Rejected,
    /// Configuration loaded with a non-fatal finding.
    Warning,
}

/// Config load audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Source label (path or inline marker).
    pub source: String,
    /// Load outcome.
    pub outcome: LoadOutcome,
    /// Key the event refers to, when applicable.
    pub field: Option<String>,
    /// Normalized error or warning kind label.
    pub error_kind: Option<&'static str>,
    /// Human-readable detail.
    pub message: Option<String>,
    /// Model registry key of a loaded config.
    pub model_class_path: Option<String>,
    /// Number of data globs of a loaded config.
    pub data_glob_count: Option<usize>,
}

impl ConfigAuditEvent {
    /// Creates an event with a consistent timestamp and empty detail fields.
    fn base(source: &str, outcome: LoadOutcome) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "experiment_config",
            timestamp_ms,
            source: source.to_string(),
            outcome,
            field: None,
            error_kind: None,
            message: None,
            model_class_path: None,
            data_glob_count: None,
        }
    }

    /// Creates an event for a successful load.
    #[must_use]
    pub fn loaded(source: &str, config: &ExperimentConfig) -> Self {
        let mut event = Self::base(source, LoadOutcome::Loaded);
        event.model_class_path = Some(config.model_class_path().to_string());
        event.data_glob_count = Some(config.data_globs().len());
        event
    }

    /// Creates an event for a rejected load.
    #[must_use]
    pub fn rejected(source: &str, error: &ConfigError) -> Self {
        let mut event = Self::base(source, LoadOutcome::Rejected);
        event.field = error.field().map(str::to_string);
        event.error_kind = Some(error.kind());
        event.message = Some(error.to_string());
        event
    }

    /// Creates an event for a non-fatal finding.
    #[must_use]
    pub fn warning(source: &str, warning: ConfigWarning) -> Self {
        let mut event = Self::base(source, LoadOutcome::Warning);
        event.field = Some(warning.field().to_string());
        event.error_kind = Some(warning.as_str());
        event.message = Some(warning.message().to_string());
        event
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for config load events.
pub trait ConfigAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ConfigAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ConfigAuditSink for StderrAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ConfigAuditSink for FileAuditSink {
    fn record(&self, event: &ConfigAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ConfigAuditSink for NoopAuditSink {
    fn record(&self, _event: &ConfigAuditEvent) {}
}
