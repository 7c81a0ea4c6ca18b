//! Final model training on a single held-out split.

use crate::error::Result;
use crate::folds::shuffled_split;
use crate::report::ScoreBlock;
use gradrate_data::FeatureTable;
use gradrate_models::{
    LinearModel, ModelFamily, Regressor, StandardScaler, mean_squared_error, r2_score,
};
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Configuration for [`FinalTrainer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Share of rows held out for testing, in (0, 1)
    pub test_fraction: f64,
    /// Model family to fit
    pub family: ModelFamily,
    /// Standardize features with a scaler fitted on the training rows
    pub standardize: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            family: ModelFamily::Ols,
            standardize: true,
        }
    }
}

/// A linear model together with the scaler its inputs pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    scaler: Option<StandardScaler>,
    model: LinearModel,
}

impl FittedModel {
    /// Wrap a fitted model and its optional scaler.
    pub const fn new(scaler: Option<StandardScaler>, model: LinearModel) -> Self {
        Self { scaler, model }
    }

    /// Scaler applied before the model, if any
    pub const fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    /// Underlying linear model
    pub const fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Number of raw input features
    pub fn n_features(&self) -> usize {
        self.model.n_features()
    }

    /// Predict from unscaled features.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let predictions = match &self.scaler {
            Some(scaler) => self.model.predict(&scaler.transform(x)?)?,
            None => self.model.predict(x)?,
        };
        Ok(predictions)
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Family that was fitted
    pub family: ModelFamily,
    /// Whether features were standardized
    pub standardize: bool,
    /// Fitted model
    pub model: FittedModel,
    /// R² on the training rows
    pub train_r2: f64,
    /// R² on the test rows
    pub test_r2: f64,
    /// Mean squared error on the test rows
    pub test_mse: f64,
    /// Rows used for fitting
    pub train_indices: Vec<usize>,
    /// Rows held out for testing
    pub test_indices: Vec<usize>,
}

impl TrainingOutcome {
    /// Scores as a console block.
    pub fn summary(&self) -> ScoreBlock {
        ScoreBlock {
            label: ScoreBlock::label_for(&self.family, self.standardize),
            train_r2: self.train_r2,
            holdout_r2: self.test_r2,
            holdout_label: "R^2 Test",
            mse: self.test_mse,
        }
    }
}

impl fmt::Display for TrainingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Fits the model that gets persisted.
#[derive(Debug, Clone, Default)]
pub struct FinalTrainer {
    config: TrainerConfig,
}

impl FinalTrainer {
    /// Create a trainer.
    pub const fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub const fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Shuffle once, hold out the test rows, fit and score.
    pub fn train<R: Rng + ?Sized>(
        &self,
        table: &FeatureTable,
        rng: &mut R,
    ) -> Result<TrainingOutcome> {
        let TrainerConfig {
            test_fraction,
            family,
            standardize,
        } = self.config;
        family.validate()?;

        let (train_indices, test_indices) =
            shuffled_split(table.n_samples(), test_fraction, rng)?;
        let (train_x, train_y) = table.select_rows(&train_indices);
        let (test_x, test_y) = table.select_rows(&test_indices);

        let (scaler, fit_x) = if standardize {
            let (scaler, scaled) = StandardScaler::fit_transform(&train_x)?;
            (Some(scaler), scaled)
        } else {
            (None, train_x)
        };
        let model = FittedModel::new(scaler, family.fit(&fit_x, &train_y)?);

        let train_r2 = model.model().score(&fit_x, &train_y)?;
        let predictions = model.predict(&test_x)?;
        let test_r2 = r2_score(&test_y, &predictions)?;
        let test_mse = mean_squared_error(&test_y, &predictions)?;

        info!(
            %family,
            standardize,
            train_rows = train_indices.len(),
            test_rows = test_indices.len(),
            test_r2,
            "trained final model"
        );

        Ok(TrainingOutcome {
            family,
            standardize,
            model,
            train_r2,
            test_r2,
            test_mse,
            train_indices,
            test_indices,
        })
    }
}
