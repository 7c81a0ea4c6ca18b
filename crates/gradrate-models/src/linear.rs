//! Linear regression families
//!
//! OLS is fitted with `linfa-linear`; ridge and LASSO are the two ends of
//! `linfa-elasticnet`. Every family fits an unpenalized intercept:
//!
//! - OLS:   min ||y - Xw||²
//! - Ridge: min (1/2n)||y - Xw||² + (α/2)||w||²
//! - LASSO: min (1/2n)||y - Xw||² + α||w||₁

use crate::error::{ModelError, Result};
use crate::metrics::r2_score;
use linfa::Dataset;
use linfa::traits::Fit;
use linfa_elasticnet::ElasticNet;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fitted linear predictor: `intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Array1<f64>,
}

impl LinearModel {
    /// Create a model from known parameters
    pub const fn new(intercept: f64, coefficients: Array1<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Intercept term
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient per feature column
    pub const fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Number of features the model expects
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    /// R² of the predictions on `x` against `y`.
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        r2_score(y, &predictions)
    }
}

/// Something that can be fitted to a design matrix and a target.
pub trait Regressor {
    /// Short human-readable name
    fn name(&self) -> &str;

    /// Fit a fresh model on `x` (rows are observations) and `y`.
    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel>;
}

/// Ordinary least squares, fitted with `linfa-linear`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinaryLeastSquares;

impl Regressor for OrdinaryLeastSquares {
    fn name(&self) -> &str {
        "Linear regression"
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel> {
        fit_active_columns(x, y, |x, y| {
            let fitted = LinearRegression::new().fit(&Dataset::new(x, y))?;
            Ok((fitted.intercept(), fitted.params().to_owned()))
        })
    }
}

/// Ridge regression: elastic net with `l1_ratio = 0`.
#[derive(Debug, Clone, Copy)]
pub struct RidgeRegression {
    alpha: f64,
}

impl RidgeRegression {
    /// Create a ridge regressor.
    ///
    /// # Errors
    /// Returns an error if `alpha` is negative or not finite.
    pub fn new(alpha: f64) -> Result<Self> {
        validate_alpha(alpha)?;
        Ok(Self { alpha })
    }

    /// Regularization strength
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Regressor for RidgeRegression {
    fn name(&self) -> &str {
        "Ridge regression"
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel> {
        fit_elastic_net(x, y, 0.0, &LassoConfig {
            alpha: self.alpha,
            ..LassoConfig::default()
        })
    }
}

/// Coordinate descent settings shared by the penalized families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LassoConfig {
    /// Penalty strength
    pub alpha: f64,
    /// Maximum number of coordinate descent passes (default: 1000)
    pub max_iter: u32,
    /// Convergence tolerance (default: 1e-4)
    pub tol: f64,
}

impl Default for LassoConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iter: 1000,
            tol: 1e-4,
        }
    }
}

/// LASSO regression: elastic net with `l1_ratio = 1`.
#[derive(Debug, Clone, Copy)]
pub struct LassoRegression {
    config: LassoConfig,
}

impl LassoRegression {
    /// Create a LASSO regressor with default solver settings.
    pub fn new(alpha: f64) -> Result<Self> {
        Self::with_config(LassoConfig {
            alpha,
            ..Default::default()
        })
    }

    /// Create a LASSO regressor with explicit solver settings.
    pub fn with_config(config: LassoConfig) -> Result<Self> {
        validate_alpha(config.alpha)?;
        if config.max_iter == 0 {
            return Err(ModelError::InvalidParameter(
                "max_iter must be positive".to_string(),
            ));
        }
        if config.tol.is_nan() || config.tol <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "tol must be positive, got {}",
                config.tol
            )));
        }
        Ok(Self { config })
    }

    /// Solver settings
    pub const fn config(&self) -> &LassoConfig {
        &self.config
    }
}

impl Regressor for LassoRegression {
    fn name(&self) -> &str {
        "LASSO regression"
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel> {
        fit_elastic_net(x, y, 1.0, &self.config)
    }
}

/// Model family selector shared by the evaluation harness.
///
/// Regularization strength travels with the variant, so a ridge or LASSO
/// family can never be built without one.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelFamily {
    /// Ordinary least squares
    #[default]
    Ols,
    /// Ridge regression
    Ridge {
        /// L2 penalty
        alpha: f64,
    },
    /// LASSO regression
    Lasso {
        /// L1 penalty
        alpha: f64,
    },
}

impl ModelFamily {
    /// Build a family from its name and an optional regularization strength.
    ///
    /// `alpha` is ignored for OLS and required for ridge and LASSO.
    pub fn from_parts(name: &str, alpha: Option<f64>) -> Result<Self> {
        let family = match name.to_lowercase().as_str() {
            "ols" | "linear" => return Ok(Self::Ols),
            "ridge" => Self::Ridge {
                alpha: alpha.ok_or_else(|| {
                    ModelError::InvalidParameter("ridge requires alpha".to_string())
                })?,
            },
            "lasso" => Self::Lasso {
                alpha: alpha.ok_or_else(|| {
                    ModelError::InvalidParameter("lasso requires alpha".to_string())
                })?,
            },
            other => {
                return Err(ModelError::InvalidParameter(format!(
                    "unknown model family: {other}"
                )));
            }
        };
        family.validate()?;
        Ok(family)
    }

    /// Check the regularization strength.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Ols => Ok(()),
            Self::Ridge { alpha } | Self::Lasso { alpha } => validate_alpha(*alpha),
        }
    }

    /// Regularization strength, if any
    pub const fn alpha(&self) -> Option<f64> {
        match self {
            Self::Ols => None,
            Self::Ridge { alpha } | Self::Lasso { alpha } => Some(*alpha),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ols => write!(f, "Linear regression"),
            Self::Ridge { alpha } => write!(f, "Ridge regression (alpha={alpha})"),
            Self::Lasso { alpha } => write!(f, "LASSO regression (alpha={alpha})"),
        }
    }
}

impl Regressor for ModelFamily {
    fn name(&self) -> &str {
        match self {
            Self::Ols => "Linear regression",
            Self::Ridge { .. } => "Ridge regression",
            Self::Lasso { .. } => "LASSO regression",
        }
    }

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<LinearModel> {
        match *self {
            Self::Ols => OrdinaryLeastSquares.fit(x, y),
            Self::Ridge { alpha } => RidgeRegression::new(alpha)?.fit(x, y),
            Self::Lasso { alpha } => LassoRegression::new(alpha)?.fit(x, y),
        }
    }
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha.is_finite() && alpha >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidParameter(format!(
            "alpha must be a finite non-negative number, got {alpha}"
        )))
    }
}

fn fit_elastic_net(
    x: &Array2<f64>,
    y: &Array1<f64>,
    l1_ratio: f64,
    config: &LassoConfig,
) -> Result<LinearModel> {
    fit_active_columns(x, y, |x, y| {
        let fitted = ElasticNet::params()
            .penalty(config.alpha)
            .l1_ratio(l1_ratio)
            .with_intercept(true)
            .max_iterations(config.max_iter)
            .tolerance(config.tol)
            .fit(&Dataset::new(x, y))?;
        Ok((fitted.intercept(), fitted.hyperplane().to_owned()))
    })
}

/// Validate the training set, then fit only the columns that vary.
///
/// A constant column (e.g. an indicator that is all zeros inside one fold)
/// gets a zero coefficient instead of reaching the solver.
fn fit_active_columns<F>(x: &Array2<f64>, y: &Array1<f64>, solve: F) -> Result<LinearModel>
where
    F: FnOnce(Array2<f64>, Array1<f64>) -> Result<(f64, Array1<f64>)>,
{
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(ModelError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("training data".to_string()));
    }

    let active: Vec<usize> = x
        .columns()
        .into_iter()
        .enumerate()
        .filter(|(_, column)| column.iter().any(|v| *v != column[0]))
        .map(|(j, _)| j)
        .collect();

    let y_mean = y.mean().unwrap_or(0.0);
    let mut coefficients = Array1::<f64>::zeros(x.ncols());
    if active.is_empty() {
        return Ok(LinearModel::new(y_mean, coefficients));
    }

    let (intercept, fitted) = solve(x.select(Axis(1), &active), y.to_owned())?;
    for (&j, &w) in active.iter().zip(fitted.iter()) {
        coefficients[j] = w;
    }
    Ok(LinearModel::new(intercept, coefficients))
}
