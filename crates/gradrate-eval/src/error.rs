//! Error types for evaluation and training.

use gradrate_data::DataError;
use gradrate_models::ModelError;
use thiserror::Error;

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors raised by the evaluator, the trainer and artifact persistence.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A model could not be fitted or scored
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// The feature table could not be built or read
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Fold count incompatible with the number of rows
    #[error("Invalid fold count {folds} for {samples} rows: need 2 <= folds <= rows")]
    InvalidFolds {
        /// Requested folds
        folds: usize,
        /// Rows in the table
        samples: usize,
    },

    /// Train/test split cannot be formed
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Artifact features do not match the table being scored
    #[error("Feature mismatch: model expects [{expected}], table has [{actual}]")]
    FeatureMismatch {
        /// Features the model was trained on
        expected: String,
        /// Features offered
        actual: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
