// crates/experiment-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example experiment configuration.
// Purpose: Deterministic example for docs, tests, and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for an experiment configuration: a small ligand
//! regression run. Output is deterministic and kept in sync with the schema
//! and docs.

/// Returns the canonical example experiment configuration in TOML.
#[must_use]
pub fn experiment_toml_example() -> String {
    String::from(
        r#"# Data: glob patterns relative to the repository data root.
DATA_GLOBS = ["test_ligand/_output/**/*.npz"]

# Model: registry key of the model class.
MODEL_CLASS_PATH = "kinoml.ml.torch_models.NeuralNetworkRegression"
WITH_OBSERVATION_MODEL = true

# Adam
LEARNING_RATE = 0.001
EPSILON = 1e-7
BETAS = [0.9, 0.999]

# Trainer
MAX_EPOCHS = 50
N_SPLITS = 2
SHUFFLE_FOLDS = false
VALIDATION = false
MIN_ITEMS_PER_DATASET = 1

# Bootstrapping
N_BOOTSTRAPS = 1
BOOTSTRAP_SAMPLE_RATIO = 1

# Output
VERBOSE = false

# input_shape is derived by the harness after data is loaded.
[MODEL_KWARGS]
hidden_shape = 100
"#,
    )
}
