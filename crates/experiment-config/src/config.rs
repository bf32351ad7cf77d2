// crates/experiment-config/src/config.rs
// ============================================================================
// Module: Experiment Configuration
// Description: Loading and validation for experiment configuration records.
// Purpose: Provide strict, fail-closed parsing of experiment settings.
// Dependencies: globset, serde, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! An experiment is described by a flat record of upper-case keys (for example
//! `LEARNING_RATE` or `N_SPLITS`). The record is read from TOML or JSON, every
//! key is required, and each value is checked against its domain before an
//! [`ExperimentConfig`] is returned. Loading either fully succeeds or fails.
//!
//! The only sanctioned change after loading is
//! [`ExperimentConfig::with_derived_param`], which returns a new record with an
//! extra model keyword argument and leaves the original untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of data glob patterns.
pub(crate) const MAX_DATA_GLOBS: usize = 256;
/// Maximum number of model keyword arguments.
pub(crate) const MAX_MODEL_KWARGS: usize = 128;
/// Maximum length of a model class path.
pub(crate) const MAX_MODEL_CLASS_PATH_LENGTH: usize = 512;
/// Minimum number of cross-validation folds.
pub(crate) const MIN_N_SPLITS: u32 = 2;
/// Minimum number of training epochs.
pub(crate) const MIN_MAX_EPOCHS: u32 = 1;

/// Canonical field keys of the experiment record.
pub mod keys {
    /// Data glob patterns, relative to the repository data root.
    pub const DATA_GLOBS: &str = "DATA_GLOBS";
    /// Registry key of the model class.
    pub const MODEL_CLASS_PATH: &str = "MODEL_CLASS_PATH";
    /// Keyword arguments passed to the model constructor.
    pub const MODEL_KWARGS: &str = "MODEL_KWARGS";
    /// Whether an observation model wraps the raw model outputs.
    pub const WITH_OBSERVATION_MODEL: &str = "WITH_OBSERVATION_MODEL";
    /// Optimizer learning rate.
    pub const LEARNING_RATE: &str = "LEARNING_RATE";
    /// Optimizer numerical stability term.
    pub const EPSILON: &str = "EPSILON";
    /// Optimizer moment decay rates.
    pub const BETAS: &str = "BETAS";
    /// Number of training epochs.
    pub const MAX_EPOCHS: &str = "MAX_EPOCHS";
    /// Number of cross-validation folds.
    pub const N_SPLITS: &str = "N_SPLITS";
    /// Whether folds are shuffled.
    pub const SHUFFLE_FOLDS: &str = "SHUFFLE_FOLDS";
    /// Whether a validation split is used.
    pub const VALIDATION: &str = "VALIDATION";
    /// Datasets with fewer items are skipped.
    pub const MIN_ITEMS_PER_DATASET: &str = "MIN_ITEMS_PER_DATASET";
    /// Number of bootstrap rounds.
    pub const N_BOOTSTRAPS: &str = "N_BOOTSTRAPS";
    /// Fraction of the dataset drawn per bootstrap round.
    pub const BOOTSTRAP_SAMPLE_RATIO: &str = "BOOTSTRAP_SAMPLE_RATIO";
    /// Verbose harness output.
    pub const VERBOSE: &str = "VERBOSE";
}

/// Every required key, in canonical order.
pub const FIELD_KEYS: &[&str] = &[
    keys::DATA_GLOBS,
    keys::MODEL_CLASS_PATH,
    keys::MODEL_KWARGS,
    keys::WITH_OBSERVATION_MODEL,
    keys::LEARNING_RATE,
    keys::EPSILON,
    keys::BETAS,
    keys::MAX_EPOCHS,
    keys::N_SPLITS,
    keys::SHUFFLE_FOLDS,
    keys::VALIDATION,
    keys::MIN_ITEMS_PER_DATASET,
    keys::N_BOOTSTRAPS,
    keys::BOOTSTRAP_SAMPLE_RATIO,
    keys::VERBOSE,
];

/// Legacy key spellings accepted on input, mapped to their canonical key.
pub const KEY_ALIASES: &[(&str, &str)] =
    &[("NPZ_FILES", keys::DATA_GLOBS), ("MODEL_CLS", keys::MODEL_CLASS_PATH)];

// ============================================================================
// SECTION: Sources
// ============================================================================

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension (`.json` is JSON, all else TOML).
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parses a document in this format into a structured value.
    fn parse(self, content: &str) -> Result<Value, ConfigError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string())),
            Self::Json => {
                serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
            }
        }
    }
}

/// Where an experiment configuration is read from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Configuration file on disk.
    Path(PathBuf),
    /// In-memory TOML document.
    Toml(String),
    /// In-memory JSON document.
    Json(String),
    /// Already-parsed structured record.
    Value(Value),
}

impl ConfigSource {
    /// Returns a short label identifying the source in logs.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Toml(_) => "inline:toml".to_string(),
            Self::Json(_) => "inline:json".to_string(),
            Self::Value(_) => "inline:value".to_string(),
        }
    }

    /// Reads the source into a structured document.
    fn into_document(self) -> Result<Value, ConfigError> {
        match self {
            Self::Path(path) => read_document(&path),
            Self::Toml(content) => ConfigFormat::Toml.parse(&content),
            Self::Json(content) => ConfigFormat::Json.parse(&content),
            Self::Value(value) => Ok(value),
        }
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

// ============================================================================
// SECTION: Value Types
// ============================================================================

/// Scalar value passed verbatim to the model constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KwargValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// String value.
    Str(String),
}

impl From<bool> for KwargValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for KwargValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for KwargValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for KwargValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for KwargValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KwargValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Model constructor keyword arguments keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelKwargs(BTreeMap<String, KwargValue>);

impl ModelKwargs {
    /// Returns the value for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KwargValue> {
        self.0.get(name)
    }

    /// Returns true when the parameter is set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over parameters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KwargValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, KwargValue)> for ModelKwargs {
    fn from_iter<I: IntoIterator<Item = (String, KwargValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// First- and second-moment decay rates of an Adam-family optimizer.
///
/// # Invariants
/// - Both rates lie strictly between 0 and 1 once validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct Betas {
    /// First-moment decay rate.
    first: f64,
    /// Second-moment decay rate.
    second: f64,
}

impl Betas {
    /// Creates a validated pair of decay rates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when either rate is outside (0, 1).
    pub fn new(first: f64, second: f64) -> Result<Self, ConfigError> {
        let betas = Self {
            first,
            second,
        };
        betas.validate()?;
        Ok(betas)
    }

    /// Returns the first-moment decay rate.
    #[must_use]
    pub const fn first(&self) -> f64 {
        self.first
    }

    /// Returns the second-moment decay rate.
    #[must_use]
    pub const fn second(&self) -> f64 {
        self.second
    }

    /// Checks both rates against the open unit interval.
    fn validate(&self) -> Result<(), ConfigError> {
        for beta in [self.first, self.second] {
            if !(beta.is_finite() && beta > 0.0 && beta < 1.0) {
                return Err(invalid(keys::BETAS, "entries must lie strictly between 0 and 1"));
            }
        }
        Ok(())
    }
}

impl From<Betas> for [f64; 2] {
    fn from(betas: Betas) -> Self {
        [betas.first, betas.second]
    }
}

/// Non-fatal findings about a loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `VALIDATION = true` is accepted but the training harness ignores it.
    ValidationUnsupported,
}

impl ConfigWarning {
    /// Returns a stable label for the warning.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationUnsupported => "validation_unsupported",
        }
    }

    /// Returns the key the warning refers to.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::ValidationUnsupported => keys::VALIDATION,
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ValidationUnsupported => {
                "VALIDATION=true is not implemented by the training harness"
            }
        }
    }
}

// ============================================================================
// SECTION: Configuration Record
// ============================================================================

/// Validated experiment configuration.
///
/// # Invariants
/// - Every field is present and within its domain.
/// - `data_globs` holds at least one relative, compilable pattern.
/// - Values are immutable; derived parameters produce a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "Value")]
pub struct ExperimentConfig {
    /// Data glob patterns relative to the repository data root.
    data_globs: Vec<String>,
    /// Registry key of the model class.
    model_class_path: String,
    /// Whether an observation model wraps raw model outputs.
    with_observation_model: bool,
    /// Optimizer learning rate.
    learning_rate: f64,
    /// Optimizer numerical stability term.
    epsilon: f64,
    /// Optimizer moment decay rates.
    betas: Betas,
    /// Number of training epochs.
    max_epochs: u32,
    /// Number of cross-validation folds.
    n_splits: u32,
    /// Whether folds are shuffled.
    shuffle_folds: bool,
    /// Whether a validation split is requested.
    validation: bool,
    /// Minimum dataset size; smaller datasets are skipped.
    min_items_per_dataset: u64,
    /// Number of bootstrap rounds.
    n_bootstraps: u32,
    /// Fraction of the dataset drawn per bootstrap round.
    bootstrap_sample_ratio: f64,
    /// Verbose harness output.
    verbose: bool,
    /// Model constructor keyword arguments (emitted last so TOML tables follow scalars).
    model_kwargs: ModelKwargs,
}

impl ExperimentConfig {
    /// Loads and validates a configuration from the given source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the source cannot be read or parsed, when
    /// a required field is missing, or when a field is out of domain.
    pub fn load(source: impl Into<ConfigSource>) -> Result<Self, ConfigError> {
        let document = source.into().into_document()?;
        Self::from_document(document)
    }

    /// Loads a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::load(ConfigSource::Toml(content.to_string()))
    }

    /// Loads a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Self::load(ConfigSource::Json(content.to_string()))
    }

    /// Builds a configuration from a parsed document.
    ///
    /// All presence checks run before any domain check, so a missing key is
    /// always reported as [`ConfigError::MissingField`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is not a table, contains
    /// unknown keys, lacks a required key, or holds an out-of-domain value.
    pub fn from_document(document: Value) -> Result<Self, ConfigError> {
        let Value::Object(table) = document else {
            return Err(ConfigError::Parse("config root must be a table".to_string()));
        };
        let mut fields = FieldTable::collect(table)?;
        let betas = fields.take_float_list(keys::BETAS)?;
        let [first, second] = betas.as_slice() else {
            return Err(invalid(keys::BETAS, "must contain exactly two entries"));
        };
        let config = Self {
            data_globs: fields.take_string_list(keys::DATA_GLOBS)?,
            model_class_path: fields.take_string(keys::MODEL_CLASS_PATH)?,
            with_observation_model: fields.take_bool(keys::WITH_OBSERVATION_MODEL)?,
            learning_rate: fields.take_float(keys::LEARNING_RATE)?,
            epsilon: fields.take_float(keys::EPSILON)?,
            betas: Betas {
                first: *first,
                second: *second,
            },
            max_epochs: fields.take_count(keys::MAX_EPOCHS)?,
            n_splits: fields.take_count(keys::N_SPLITS)?,
            shuffle_folds: fields.take_bool(keys::SHUFFLE_FOLDS)?,
            validation: fields.take_bool(keys::VALIDATION)?,
            min_items_per_dataset: fields.take_count(keys::MIN_ITEMS_PER_DATASET)?,
            n_bootstraps: fields.take_count(keys::N_BOOTSTRAPS)?,
            bootstrap_sample_ratio: fields.take_float(keys::BOOTSTRAP_SAMPLE_RATIO)?,
            verbose: fields.take_bool(keys::VERBOSE)?,
            model_kwargs: fields.take_kwargs(keys::MODEL_KWARGS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data_globs(&self.data_globs)?;
        validate_model_class_path(&self.model_class_path)?;
        validate_model_kwargs(&self.model_kwargs)?;
        validate_positive_float(keys::LEARNING_RATE, self.learning_rate)?;
        validate_positive_float(keys::EPSILON, self.epsilon)?;
        self.betas.validate()?;
        if self.max_epochs < MIN_MAX_EPOCHS {
            return Err(invalid(keys::MAX_EPOCHS, format!("must be at least {MIN_MAX_EPOCHS}")));
        }
        if self.n_splits < MIN_N_SPLITS {
            return Err(invalid(keys::N_SPLITS, format!("must be at least {MIN_N_SPLITS}")));
        }
        validate_positive_float(keys::BOOTSTRAP_SAMPLE_RATIO, self.bootstrap_sample_ratio)?;
        Ok(())
    }

    /// Returns a new configuration with an extra model keyword argument.
    ///
    /// This is the single sanctioned extension point: the harness injects
    /// parameters known only after data is loaded (e.g. `input_shape`) before
    /// sharing the record with workers. `self` is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the name is not an
    /// identifier, the parameter is already set, the value is not finite, or
    /// the keyword argument limit is exceeded.
    pub fn with_derived_param(
        &self,
        name: &str,
        value: impl Into<KwargValue>,
    ) -> Result<Self, ConfigError> {
        if self.model_kwargs.contains(name) {
            return Err(invalid(keys::MODEL_KWARGS, format!("parameter `{name}` is already set")));
        }
        let mut next = self.clone();
        next.model_kwargs.0.insert(name.to_string(), value.into());
        validate_model_kwargs(&next.model_kwargs)?;
        Ok(next)
    }

    /// Returns non-fatal findings about this configuration.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.validation {
            warnings.push(ConfigWarning::ValidationUnsupported);
        }
        warnings
    }

    /// Compiles the data globs into a matcher for candidate data files.
    ///
    /// `*` does not cross directory separators; `**` does.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a pattern fails to compile.
    pub fn data_glob_set(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.data_globs {
            builder.add(compile_glob(pattern)?);
        }
        builder.build().map_err(|err| invalid(keys::DATA_GLOBS, err.to_string()))
    }

    /// Serializes the configuration as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Encode`] when serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Encode(err.to_string()))
    }

    /// Serializes the configuration as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Encode`] when serialization fails.
    pub fn to_json_value(&self) -> Result<Value, ConfigError> {
        serde_json::to_value(self).map_err(|err| ConfigError::Encode(err.to_string()))
    }

    /// Returns the data glob patterns.
    #[must_use]
    pub fn data_globs(&self) -> &[String] {
        &self.data_globs
    }

    /// Returns the model registry key.
    #[must_use]
    pub fn model_class_path(&self) -> &str {
        &self.model_class_path
    }

    /// Returns the model constructor keyword arguments.
    #[must_use]
    pub const fn model_kwargs(&self) -> &ModelKwargs {
        &self.model_kwargs
    }

    /// Returns whether an observation model is applied.
    #[must_use]
    pub const fn with_observation_model(&self) -> bool {
        self.with_observation_model
    }

    /// Returns the optimizer learning rate.
    #[must_use]
    pub const fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Returns the optimizer epsilon.
    #[must_use]
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the optimizer decay rates.
    #[must_use]
    pub const fn betas(&self) -> Betas {
        self.betas
    }

    /// Returns the number of training epochs.
    #[must_use]
    pub const fn max_epochs(&self) -> u32 {
        self.max_epochs
    }

    /// Returns the number of cross-validation folds.
    #[must_use]
    pub const fn n_splits(&self) -> u32 {
        self.n_splits
    }

    /// Returns whether folds are shuffled.
    #[must_use]
    pub const fn shuffle_folds(&self) -> bool {
        self.shuffle_folds
    }

    /// Returns whether a validation split was requested.
    #[must_use]
    pub const fn validation(&self) -> bool {
        self.validation
    }

    /// Returns the minimum number of items a dataset needs to be used.
    #[must_use]
    pub const fn min_items_per_dataset(&self) -> u64 {
        self.min_items_per_dataset
    }

    /// Returns the number of bootstrap rounds.
    #[must_use]
    pub const fn n_bootstraps(&self) -> u32 {
        self.n_bootstraps
    }

    /// Returns the bootstrap sample ratio.
    #[must_use]
    pub const fn bootstrap_sample_ratio(&self) -> f64 {
        self.bootstrap_sample_ratio
    }

    /// Returns whether verbose output is requested.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }
}

impl TryFrom<Value> for ExperimentConfig {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_document(value)
    }
}

// ============================================================================
// SECTION: Field Extraction
// ============================================================================

/// Required fields keyed by canonical key, with aliases resolved.
struct FieldTable {
    /// Field values keyed by canonical key.
    values: BTreeMap<&'static str, Value>,
}

impl FieldTable {
    /// Resolves aliases, checks presence, then rejects unknown or repeated keys.
    ///
    /// Unknown and repeated keys are reported only once every required key is
    /// present.
    fn collect(table: Map<String, Value>) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        let mut key_error = None;
        for (key, value) in table {
            let Some(canonical) = canonical_key(&key) else {
                if key_error.is_none() {
                    key_error = Some(ConfigError::InvalidValue {
                        field: key,
                        reason: "unknown field".to_string(),
                    });
                }
                continue;
            };
            if value.is_null() {
                continue;
            }
            if values.insert(canonical, value).is_some() && key_error.is_none() {
                key_error =
                    Some(invalid(canonical, format!("specified more than once (via `{key}`)")));
            }
        }
        for key in FIELD_KEYS {
            if !values.contains_key(key) {
                return Err(ConfigError::MissingField((*key).to_string()));
            }
        }
        if let Some(error) = key_error {
            return Err(error);
        }
        Ok(Self {
            values,
        })
    }

    /// Removes a field value.
    fn take(&mut self, key: &'static str) -> Result<Value, ConfigError> {
        self.values.remove(key).ok_or_else(|| ConfigError::MissingField(key.to_string()))
    }

    /// Removes a boolean field.
    fn take_bool(&mut self, key: &'static str) -> Result<bool, ConfigError> {
        self.take(key)?.as_bool().ok_or_else(|| invalid(key, "expected a boolean"))
    }

    /// Removes a numeric field, widening integers to floats.
    fn take_float(&mut self, key: &'static str) -> Result<f64, ConfigError> {
        self.take(key)?.as_f64().ok_or_else(|| invalid(key, "expected a number"))
    }

    /// Removes a non-negative integer field sized to `T`.
    fn take_count<T: TryFrom<i64>>(&mut self, key: &'static str) -> Result<T, ConfigError> {
        let value = self.take(key)?;
        let Some(number) = value.as_i64() else {
            if value.is_u64() {
                return Err(invalid(key, "integer out of range"));
            }
            return Err(invalid(key, "expected an integer"));
        };
        if number < 0 {
            return Err(invalid(key, "must not be negative"));
        }
        T::try_from(number).map_err(|_| invalid(key, "integer out of range"))
    }

    /// Removes a string field.
    fn take_string(&mut self, key: &'static str) -> Result<String, ConfigError> {
        match self.take(key)? {
            Value::String(value) => Ok(value),
            _ => Err(invalid(key, "expected a string")),
        }
    }

    /// Removes an array-of-strings field.
    fn take_string_list(&mut self, key: &'static str) -> Result<Vec<String>, ConfigError> {
        let Value::Array(items) = self.take(key)? else {
            return Err(invalid(key, "expected an array of strings"));
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::String(value) => Ok(value),
                _ => Err(invalid(key, "expected an array of strings")),
            })
            .collect()
    }

    /// Removes an array-of-numbers field.
    fn take_float_list(&mut self, key: &'static str) -> Result<Vec<f64>, ConfigError> {
        let Value::Array(items) = self.take(key)? else {
            return Err(invalid(key, "expected an array of numbers"));
        };
        items
            .iter()
            .map(|item| item.as_f64().ok_or_else(|| invalid(key, "expected an array of numbers")))
            .collect()
    }

    /// Removes the model keyword argument table.
    fn take_kwargs(&mut self, key: &'static str) -> Result<ModelKwargs, ConfigError> {
        let Value::Object(table) = self.take(key)? else {
            return Err(invalid(key, "expected a table"));
        };
        let mut kwargs = BTreeMap::new();
        for (name, value) in table {
            let value = match value {
                Value::Bool(flag) => KwargValue::Bool(flag),
                Value::Number(number) => {
                    if let Some(int) = number.as_i64() {
                        KwargValue::Int(int)
                    } else if number.is_u64() {
                        return Err(invalid(key, format!("parameter `{name}` is out of range")));
                    } else {
                        let float = number.as_f64().ok_or_else(|| {
                            invalid(key, format!("parameter `{name}` is not a number"))
                        })?;
                        KwargValue::Float(float)
                    }
                }
                Value::String(text) => KwargValue::Str(text),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(invalid(
                        key,
                        format!("parameter `{name}` must be a bool, integer, float, or string"),
                    ));
                }
            };
            kwargs.insert(name, value);
        }
        Ok(ModelKwargs(kwargs))
    }
}

/// Maps an input key (canonical or alias) to its canonical key.
fn canonical_key(key: &str) -> Option<&'static str> {
    if let Some(canonical) = FIELD_KEYS.iter().copied().find(|candidate| *candidate == key) {
        return Some(canonical);
    }
    KEY_ALIASES.iter().find(|(alias, _)| *alias == key).map(|(_, canonical)| *canonical)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Serialization failure while encoding configuration.
    #[error("config encode error: {0}")]
    Encode(String),
    /// Required field absent.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// Field present but outside its domain.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending key.
        field: String,
        /// Violated constraint.
        reason: String,
    },
}

impl ConfigError {
    /// Returns the key the error refers to, when there is one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField(field)
            | Self::InvalidValue {
                field, ..
            } => Some(field),
            Self::Io(_) | Self::Parse(_) | Self::Encode(_) => None,
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Encode(_) => "encode",
            Self::MissingField(_) => "missing_field",
            Self::InvalidValue {
                ..
            } => "invalid_value",
        }
    }
}

/// Builds an [`ConfigError::InvalidValue`] for a canonical key.
fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses a configuration file under size and path limits.
fn read_document(path: &Path) -> Result<Value, ConfigError> {
    validate_path(path)?;
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Parse("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Parse("config file must be utf-8".to_string()))?;
    ConfigFormat::for_path(path).parse(content)
}

/// Validates a config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Io("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Io("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Compiles one data glob with path-aware wildcard semantics.
fn compile_glob(pattern: &str) -> Result<Glob, ConfigError> {
    GlobBuilder::new(pattern).literal_separator(true).build().map_err(|err| {
        invalid(keys::DATA_GLOBS, format!("pattern `{pattern}` is not a valid glob: {err}"))
    })
}

/// Validates the data glob list.
fn validate_data_globs(patterns: &[String]) -> Result<(), ConfigError> {
    if patterns.is_empty() {
        return Err(invalid(keys::DATA_GLOBS, "must contain at least one pattern"));
    }
    if patterns.len() > MAX_DATA_GLOBS {
        return Err(invalid(keys::DATA_GLOBS, format!("at most {MAX_DATA_GLOBS} patterns")));
    }
    for pattern in patterns {
        if pattern.trim().is_empty() {
            return Err(invalid(keys::DATA_GLOBS, "patterns must be non-empty"));
        }
        if pattern.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(invalid(keys::DATA_GLOBS, "pattern exceeds max length"));
        }
        if is_rooted(pattern) {
            return Err(invalid(
                keys::DATA_GLOBS,
                format!("pattern `{pattern}` must be relative to the data root"),
            ));
        }
        if pattern.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(invalid(
                keys::DATA_GLOBS,
                format!("pattern `{pattern}` must not contain `..` segments"),
            ));
        }
        compile_glob(pattern)?;
    }
    Ok(())
}

/// Returns true for patterns anchored at a filesystem root or drive.
fn is_rooted(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    match bytes {
        [b'/' | b'\\', ..] => true,
        [drive, b':', ..] => drive.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Validates the dotted model class path.
fn validate_model_class_path(path: &str) -> Result<(), ConfigError> {
    if path.len() > MAX_MODEL_CLASS_PATH_LENGTH {
        return Err(invalid(keys::MODEL_CLASS_PATH, "exceeds max length"));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() < 2 {
        return Err(invalid(keys::MODEL_CLASS_PATH, "must be a fully-qualified dotted path"));
    }
    for segment in segments {
        if !is_identifier(segment) {
            return Err(invalid(
                keys::MODEL_CLASS_PATH,
                format!("segment `{segment}` is not a valid identifier"),
            ));
        }
    }
    Ok(())
}

/// Validates model keyword argument names and values.
fn validate_model_kwargs(kwargs: &ModelKwargs) -> Result<(), ConfigError> {
    if kwargs.len() > MAX_MODEL_KWARGS {
        return Err(invalid(keys::MODEL_KWARGS, format!("at most {MAX_MODEL_KWARGS} parameters")));
    }
    for (name, value) in kwargs.iter() {
        if !is_identifier(name) {
            return Err(invalid(
                keys::MODEL_KWARGS,
                format!("parameter name `{name}` is not a valid identifier"),
            ));
        }
        if let KwargValue::Float(float) = value
            && !float.is_finite()
        {
            return Err(invalid(keys::MODEL_KWARGS, format!("parameter `{name}` must be finite")));
        }
    }
    Ok(())
}

/// Validates a strictly positive, finite float.
fn validate_positive_float(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(invalid(field, "must be a finite number greater than zero"))
}

/// Returns true for ASCII identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
