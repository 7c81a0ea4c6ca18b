//! K-fold cross-validation.
//!
//! Every invocation draws a fresh [`FoldAssignment`] from the caller's random
//! source. For each fold a new model is fitted on the other folds and scored
//! on the held-out one. Scaling, when enabled, is fitted on the training rows
//! of the fold alone.

use crate::error::{EvalError, Result};
use crate::folds::FoldAssignment;
use crate::report::ScoreBlock;
use gradrate_data::FeatureTable;
use gradrate_models::{ModelFamily, Regressor, StandardScaler, mean_squared_error, r2_score};
use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Configuration for [`CrossValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationConfig {
    /// Number of folds (at least 2, at most the number of rows)
    pub folds: usize,
    /// Standardize features with a scaler fitted per fold
    pub standardize: bool,
    /// Model family to fit
    pub family: ModelFamily,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            standardize: false,
            family: ModelFamily::Ols,
        }
    }
}

/// Scores of one fold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldScore {
    /// Fold index
    pub fold: usize,
    /// R² on the training rows
    pub train_r2: f64,
    /// R² on the held-out rows
    pub validation_r2: f64,
    /// Mean squared error on the held-out rows
    pub validation_mse: f64,
}

/// Per-fold scores and their means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    /// Family evaluated
    pub family: ModelFamily,
    /// Whether features were standardized
    pub standardize: bool,
    /// Scores in fold order
    pub folds: Vec<FoldScore>,
    /// Mean training R²
    pub mean_train_r2: f64,
    /// Mean validation R²
    pub mean_validation_r2: f64,
    /// Mean validation MSE
    pub mean_validation_mse: f64,
}

impl CrossValidationReport {
    fn from_scores(family: ModelFamily, standardize: bool, folds: Vec<FoldScore>) -> Self {
        let n = folds.len() as f64;
        let mean = |f: fn(&FoldScore) -> f64| folds.iter().map(f).sum::<f64>() / n;
        Self {
            family,
            standardize,
            mean_train_r2: mean(|s| s.train_r2),
            mean_validation_r2: mean(|s| s.validation_r2),
            mean_validation_mse: mean(|s| s.validation_mse),
            folds,
        }
    }

    /// Heading naming the family and scaling.
    pub fn label(&self) -> String {
        ScoreBlock::label_for(&self.family, self.standardize)
    }

    /// Mean scores as a console block.
    pub fn summary(&self) -> ScoreBlock {
        ScoreBlock {
            label: self.label(),
            train_r2: self.mean_train_r2,
            holdout_r2: self.mean_validation_r2,
            holdout_label: "R^2 Validation",
            mse: self.mean_validation_mse,
        }
    }
}

impl fmt::Display for CrossValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Training and validation matrices of one fold.
#[derive(Debug, Clone)]
pub struct FoldData {
    /// Scaler fitted on the training rows, when standardizing
    pub scaler: Option<StandardScaler>,
    /// Training features (scaled if a scaler is present)
    pub train_x: Array2<f64>,
    /// Training target
    pub train_y: Array1<f64>,
    /// Validation features (scaled with the training scaler)
    pub validation_x: Array2<f64>,
    /// Validation target
    pub validation_y: Array1<f64>,
}

/// Build the matrices for fold `fold` of an assignment.
pub fn prepare_fold(
    table: &FeatureTable,
    assignment: &FoldAssignment,
    fold: usize,
    standardize: bool,
) -> Result<FoldData> {
    let (train_x, train_y) = table.select_rows(&assignment.train_indices(fold));
    let (validation_x, validation_y) = table.select_rows(assignment.fold(fold));

    if !standardize {
        return Ok(FoldData {
            scaler: None,
            train_x,
            train_y,
            validation_x,
            validation_y,
        });
    }

    let (scaler, train_x) = StandardScaler::fit_transform(&train_x)?;
    let validation_x = scaler.transform(&validation_x)?;
    Ok(FoldData {
        scaler: Some(scaler),
        train_x,
        train_y,
        validation_x,
        validation_y,
    })
}

/// K-fold cross-validated evaluator.
#[derive(Debug, Clone, Default)]
pub struct CrossValidator {
    config: CrossValidationConfig,
}

impl CrossValidator {
    /// Create an evaluator.
    pub const fn new(config: CrossValidationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub const fn config(&self) -> &CrossValidationConfig {
        &self.config
    }

    /// Draw a fold assignment from `rng` and evaluate over it.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        table: &FeatureTable,
        rng: &mut R,
    ) -> Result<CrossValidationReport> {
        self.config.family.validate()?;
        let assignment = FoldAssignment::random(table.n_samples(), self.config.folds, rng)?;
        self.evaluate_folds(table, &assignment)
    }

    /// Evaluate over a given fold assignment.
    ///
    /// Any fit or scoring failure aborts the whole evaluation.
    pub fn evaluate_folds(
        &self,
        table: &FeatureTable,
        assignment: &FoldAssignment,
    ) -> Result<CrossValidationReport> {
        if assignment.n_samples() != table.n_samples() {
            return Err(EvalError::InvalidFolds {
                folds: assignment.n_folds(),
                samples: table.n_samples(),
            });
        }

        let family = self.config.family;
        let mut scores = Vec::with_capacity(assignment.n_folds());
        for fold in 0..assignment.n_folds() {
            let data = prepare_fold(table, assignment, fold, self.config.standardize)?;
            let model = family.fit(&data.train_x, &data.train_y)?;

            let train_r2 = model.score(&data.train_x, &data.train_y)?;
            let predictions = model.predict(&data.validation_x)?;
            let validation_r2 = r2_score(&data.validation_y, &predictions)?;
            let validation_mse = mean_squared_error(&data.validation_y, &predictions)?;

            debug!(fold, train_r2, validation_r2, validation_mse, "fold scored");
            scores.push(FoldScore {
                fold,
                train_r2,
                validation_r2,
                validation_mse,
            });
        }

        let report =
            CrossValidationReport::from_scores(family, self.config.standardize, scores);
        info!(
            family = %report.family,
            standardize = report.standardize,
            folds = report.folds.len(),
            mean_validation_r2 = report.mean_validation_r2,
            "cross-validation finished"
        );
        Ok(report)
    }
}
