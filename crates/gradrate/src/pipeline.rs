//! End-to-end pipeline steps.
//!
//! Each function is one stage the CLI exposes: scrape, prepare, evaluate,
//! compare, train and predict. Nothing is kept between calls; data moves
//! through files named in [`PipelineConfig`] or through return values.

use gradrate_data::{
    Assembly, DataError, FeatureTable, FillSource, ID_COLUMN, RecordExtractor, TARGET_COLUMN,
    assemble_with_progress, clean_institutions, encode_features, feature_matrix,
    impute_incidental_columns, impute_soft_columns, load_reference_table, read_csv, reference_identifiers,
    split_features_and_target,
};
use gradrate_eval::{
    CrossValidationConfig, CrossValidationReport, CrossValidator, DEFAULT_ARTIFACT_FILE,
    EvalError, FinalTrainer, ModelArtifact, TrainerConfig, TrainingOutcome,
};
use gradrate_models::{ModelError, ModelFamily, mean_squared_error, r2_score};
use indicatif::ProgressBar;
use ndarray::Array1;
use polars::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors from any stage of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Data preparation error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Evaluation or persistence error
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// File locations and column choices shared by the stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// IPEDS reference list
    pub reference_path: PathBuf,
    /// Name column of the reference list
    pub reference_name_column: String,
    /// Assembled, uncleaned dataset
    pub raw_path: PathBuf,
    /// Encoded feature table
    pub features_path: PathBuf,
    /// Persisted model
    pub artifact_path: PathBuf,
    /// Column to predict
    pub target: String,
    /// Identifier column, excluded from the features
    pub id_column: String,
    /// Imputation policy for the soft and incidental columns
    pub fill: FillSource,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from("4-Year-Public-and-Private-Universities-and-IPEDS-IDs.csv"),
            reference_name_column: gradrate_data::reference::DEFAULT_NAME_COLUMN.to_string(),
            raw_path: PathBuf::from("college_raw.csv"),
            features_path: PathBuf::from("five_college_df.csv"),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_FILE),
            target: TARGET_COLUMN.to_string(),
            id_column: ID_COLUMN.to_string(),
            fill: FillSource::default(),
        }
    }
}

/// Load the reference list and extract every institution on it.
pub fn scrape_dataset<E: RecordExtractor + ?Sized>(
    config: &PipelineConfig,
    extractor: &E,
    progress: Option<&ProgressBar>,
) -> Result<Assembly> {
    let reference = load_reference_table(&config.reference_path, &config.reference_name_column)?;
    let identifiers = reference_identifiers(&reference)?;
    Ok(assemble_with_progress(&identifiers, &reference, extractor, progress)?)
}

/// Clean, impute and encode an assembled frame.
pub fn prepare_dataset(raw: &DataFrame, fill: FillSource) -> Result<DataFrame> {
    let cleaned = clean_institutions(raw)?;
    let imputed = impute_soft_columns(&cleaned, fill)?;
    let imputed = impute_incidental_columns(&imputed, fill)?;
    let encoded = encode_features(&imputed)?;
    info!(
        rows = encoded.height(),
        columns = encoded.width(),
        %fill,
        "prepared dataset"
    );
    Ok(encoded)
}

/// Read the encoded feature CSV into a [`FeatureTable`].
pub fn load_feature_table(config: &PipelineConfig) -> Result<FeatureTable> {
    load_table_from(&config.features_path, &config.target, &config.id_column)
}

fn load_table_from(path: &Path, target: &str, id_column: &str) -> Result<FeatureTable> {
    let df = read_csv(path)?;
    Ok(split_features_and_target(&df, target, Some(id_column))?)
}

/// Cross-validate one model configuration.
pub fn evaluate_dataset<R: Rng + ?Sized>(
    table: &FeatureTable,
    config: CrossValidationConfig,
    rng: &mut R,
) -> Result<CrossValidationReport> {
    Ok(CrossValidator::new(config).evaluate(table, rng)?)
}

/// Cross-validate OLS, ridge and LASSO, each without and with scaling.
///
/// Every variant draws its own folds from `rng`.
pub fn compare_families<R: Rng + ?Sized>(
    table: &FeatureTable,
    alpha: f64,
    folds: usize,
    rng: &mut R,
) -> Result<Vec<CrossValidationReport>> {
    let families = [
        ModelFamily::Ols,
        ModelFamily::Ridge { alpha },
        ModelFamily::Lasso { alpha },
    ];

    let mut reports = Vec::with_capacity(families.len() * 2);
    for family in families {
        for standardize in [false, true] {
            let config = CrossValidationConfig {
                folds,
                standardize,
                family,
            };
            reports.push(evaluate_dataset(table, config, rng)?);
        }
    }
    Ok(reports)
}

/// Fit the final model and package it as an artifact.
pub fn train_final_model<R: Rng + ?Sized>(
    table: &FeatureTable,
    config: TrainerConfig,
    rng: &mut R,
) -> Result<(TrainingOutcome, ModelArtifact)> {
    let outcome = FinalTrainer::new(config).train(table, rng)?;
    let artifact = ModelArtifact::from_outcome(&outcome, table);
    Ok((outcome, artifact))
}

/// Predictions for a frame, with scores when the target is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// One prediction per row
    pub values: Array1<f64>,
    /// R² against the target column, if it was present
    pub r2: Option<f64>,
    /// Mean squared error against the target column, if it was present
    pub mse: Option<f64>,
}

/// Score an encoded frame with a persisted model.
pub fn predict_frame(artifact: &ModelArtifact, df: &DataFrame) -> Result<Prediction> {
    let x = feature_matrix(df, &artifact.feature_names)?;
    let values = artifact.predict(&x)?;

    if df.get_column_index(&artifact.target).is_none() {
        return Ok(Prediction {
            values,
            r2: None,
            mse: None,
        });
    }

    let target = feature_matrix(df, std::slice::from_ref(&artifact.target))?
        .column(0)
        .to_owned();
    Ok(Prediction {
        r2: Some(r2_score(&target, &values)?),
        mse: Some(mean_squared_error(&target, &values)?),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_names() {
        let config = PipelineConfig::default();
        assert_eq!(config.features_path, PathBuf::from("five_college_df.csv"));
        assert_eq!(config.artifact_path, PathBuf::from("linear_regression.json"));
        assert_eq!(config.raw_path, PathBuf::from("college_raw.csv"));
        assert_eq!(config.target, "five_year_grad_rate");
        assert_eq!(config.id_column, "ipeds_id");
        assert_eq!(config.fill, FillSource::CohortMean);
    }

    #[test]
    fn test_missing_reference_file_is_data_error() {
        let config = PipelineConfig {
            reference_path: PathBuf::from("/nonexistent/gradrate/reference.csv"),
            ..PipelineConfig::default()
        };
        let extractor = |id: &str| -> std::result::Result<
            gradrate_data::InstitutionRecord,
            gradrate_data::ExtractionFault,
        > {
            Err(gradrate_data::ExtractionFault::MissingName { id: id.to_string() })
        };
        assert!(matches!(
            scrape_dataset(&config, &extractor, None),
            Err(PipelineError::Data(_))
        ));
    }
}
