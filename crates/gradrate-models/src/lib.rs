#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gradrate/gradrate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod linear;
pub mod metrics;
pub mod scaler;

pub use error::{ModelError, Result};
pub use linear::{
    LassoConfig, LassoRegression, LinearModel, ModelFamily, OrdinaryLeastSquares, Regressor,
    RidgeRegression,
};
pub use metrics::{mean_squared_error, r2_score};
pub use scaler::StandardScaler;
