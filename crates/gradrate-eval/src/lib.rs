#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gradrate/gradrate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod cross_validate;
pub mod error;
pub mod folds;
pub mod report;
pub mod train;

pub use artifact::{ArtifactMetrics, DEFAULT_ARTIFACT_FILE, ModelArtifact};
pub use cross_validate::{
    CrossValidationConfig, CrossValidationReport, CrossValidator, FoldData, FoldScore,
    prepare_fold,
};
pub use error::{EvalError, Result};
pub use folds::{FoldAssignment, shuffled_split};
pub use report::{ScoreBlock, comparison_table};
pub use train::{FinalTrainer, FittedModel, TrainerConfig, TrainingOutcome};
