#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gradrate/gradrate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;

// Re-export main types from sub-crates
pub use gradrate_data as data;
pub use gradrate_eval as eval;
pub use gradrate_models as models;

pub use pipeline::{
    PipelineConfig, PipelineError, Prediction, compare_families, evaluate_dataset,
    load_feature_table, predict_frame, prepare_dataset, scrape_dataset, train_final_model,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
