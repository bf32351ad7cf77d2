// crates/experiment-config/src/registry.rs
// ============================================================================
// Module: Model Registry
// Description: Registry of model factories keyed by stable class paths.
// Purpose: Resolve MODEL_CLASS_PATH to a constructor without dynamic lookup.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The model registry maps a stable string key (the `MODEL_CLASS_PATH` value)
//! to a factory that builds a model from [`ModelKwargs`]. The harness resolves
//! the configured key once at startup; a miss fails with
//! [`RegistryError::UnresolvedReference`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::ExperimentConfig;
use crate::config::ModelKwargs;
use crate::config::is_identifier;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Factory that builds a model from constructor keyword arguments.
pub type ModelFactory<M> = Box<dyn Fn(&ModelKwargs) -> Result<M, String> + Send + Sync>;

/// Model registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Key is not a dotted identifier path.
    #[error("invalid model key: {0}")]
    InvalidKey(String),
    /// Key already has a factory.
    #[error("model already registered: {0}")]
    Duplicate(String),
    /// Key has no registered factory.
    #[error("unresolved model reference: {0}")]
    UnresolvedReference(String),
    /// Factory rejected the keyword arguments.
    #[error("model construction failed for {key}: {reason}")]
    Factory {
        /// Registry key of the model.
        key: String,
        /// Factory error message.
        reason: String,
    },
}

/// Registry of model factories.
///
/// # Invariants
/// - Keys are unique dotted identifier paths.
/// - Factories are `Send + Sync` so the registry can be shared across workers.
pub struct ModelRegistry<M> {
    /// Factories keyed by model class path.
    factories: BTreeMap<String, ModelFactory<M>>,
}

impl<M> Default for ModelRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ModelRegistry<M> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a factory under the given key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the key is malformed or already taken.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&ModelKwargs) -> Result<M, String> + Send + Sync + 'static,
    {
        let key = key.into();
        if key.split('.').count() < 2 || !key.split('.').all(is_identifier) {
            return Err(RegistryError::InvalidKey(key));
        }
        if self.factories.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Returns true when a factory is registered for the key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Returns registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Resolves a key to its factory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnresolvedReference`] when the key is unknown.
    pub fn resolve(&self, key: &str) -> Result<&ModelFactory<M>, RegistryError> {
        self.factories.get(key).ok_or_else(|| RegistryError::UnresolvedReference(key.to_string()))
    }

    /// Builds the model named by a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the model key is unresolved or the
    /// factory rejects the keyword arguments.
    pub fn build(&self, config: &ExperimentConfig) -> Result<M, RegistryError> {
        let key = config.model_class_path();
        let factory = self.resolve(key)?;
        factory(config.model_kwargs()).map_err(|reason| RegistryError::Factory {
            key: key.to_string(),
            reason,
        })
    }
}
