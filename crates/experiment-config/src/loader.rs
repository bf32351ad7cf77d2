// crates/experiment-config/src/loader.rs
// ============================================================================
// Module: Audited Loader
// Description: Config loading wrapper that records audit events.
// Purpose: Keep `ExperimentConfig::load` pure while logging load outcomes.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`ExperimentLoader`] calls [`ExperimentConfig::load`] and records one
//! audit event per outcome, plus one warning event per [`ConfigWarning`] on
//! success. The returned value is identical to an unaudited load.
//!
//! [`ConfigWarning`]: crate::config::ConfigWarning

use std::sync::Arc;

use crate::audit::ConfigAuditEvent;
use crate::audit::ConfigAuditSink;
use crate::audit::NoopAuditSink;
use crate::config::ConfigError;
use crate::config::ConfigSource;
use crate::config::ExperimentConfig;

/// Loads experiment configs and records the outcome to an audit sink.
#[derive(Clone)]
pub struct ExperimentLoader {
    /// Destination for load events.
    sink: Arc<dyn ConfigAuditSink>,
}

impl Default for ExperimentLoader {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink))
    }
}

impl ExperimentLoader {
    /// Creates a loader that records to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn ConfigAuditSink>) -> Self {
        Self {
            sink,
        }
    }

    /// Loads and validates a configuration, recording the outcome.
    ///
    /// # Errors
    ///
    /// Returns the same [`ConfigError`] as [`ExperimentConfig::load`].
    pub fn load(&self, source: impl Into<ConfigSource>) -> Result<ExperimentConfig, ConfigError> {
        let source = source.into();
        let label = source.label();
        match ExperimentConfig::load(source) {
            Ok(config) => {
                self.sink.record(&ConfigAuditEvent::loaded(&label, &config));
                for warning in config.warnings() {
                    self.sink.record(&ConfigAuditEvent::warning(&label, warning));
                }
                Ok(config)
            }
            Err(error) => {
                self.sink.record(&ConfigAuditEvent::rejected(&label, &error));
                Err(error)
            }
        }
    }
}
