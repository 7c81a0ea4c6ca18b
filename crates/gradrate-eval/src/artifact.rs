//! Persisted model artifacts.
//!
//! An artifact is written as pretty JSON. Floats are serialized with
//! shortest round-trip formatting, so a loaded model reproduces the
//! predictions of the one that was saved bit for bit.

use crate::error::{EvalError, Result};
use crate::train::{FittedModel, TrainingOutcome};
use chrono::{DateTime, Utc};
use gradrate_data::FeatureTable;
use gradrate_models::ModelFamily;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default artifact file name.
pub const DEFAULT_ARTIFACT_FILE: &str = "linear_regression.json";

/// Scores recorded when the model was trained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetrics {
    /// R² on the training rows
    pub train_r2: f64,
    /// R² on the test rows
    pub test_r2: f64,
    /// Mean squared error on the test rows
    pub test_mse: f64,
}

/// A trained model ready to be saved or loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Family that was fitted
    pub family: ModelFamily,
    /// Feature columns, in the order the model expects them
    pub feature_names: Vec<String>,
    /// Target column
    pub target: String,
    /// Training scores
    pub metrics: ArtifactMetrics,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Version of the library that wrote the artifact
    pub version: String,
    /// Scaler and linear model
    pub model: FittedModel,
}

impl ModelArtifact {
    /// Package a training outcome with the names of the table it was fitted on.
    pub fn from_outcome(outcome: &TrainingOutcome, table: &FeatureTable) -> Self {
        Self {
            family: outcome.family,
            feature_names: table.feature_names().to_vec(),
            target: table.target_name().to_string(),
            metrics: ArtifactMetrics {
                train_r2: outcome.train_r2,
                test_r2: outcome.test_r2,
                test_mse: outcome.test_mse,
            },
            created_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: outcome.model.clone(),
        }
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the artifact to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Read an artifact from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), family = %artifact.family, "loaded model artifact");
        Ok(artifact)
    }

    /// Predict from raw features laid out in [`Self::feature_names`] order.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.model.predict(x)
    }

    /// Predict for a feature table, checking its columns match the model's.
    pub fn predict_table(&self, table: &FeatureTable) -> Result<Array1<f64>> {
        if table.feature_names() != self.feature_names.as_slice() {
            return Err(EvalError::FeatureMismatch {
                expected: self.feature_names.join(", "),
                actual: table.feature_names().join(", "),
            });
        }
        self.predict(table.features())
    }
}
