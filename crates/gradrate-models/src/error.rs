//! Error types for model fitting and scoring.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised when a model cannot be fitted or scored.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Not enough rows to fit or score
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Shapes of the inputs do not line up
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Invalid hyperparameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input contains NaN or infinite values
    #[error("Non-finite value in {0}")]
    NonFinite(String),

    /// Least squares solver error
    #[error("Linear regression failed: {0}")]
    Linear(#[from] linfa_linear::LinearError<f64>),

    /// Elastic net solver error
    #[error("Elastic net failed: {0}")]
    ElasticNet(#[from] linfa_elasticnet::ElasticNetError),
}
