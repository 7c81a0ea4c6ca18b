//! Standard scaling
//!
//! Centers each feature on its mean and divides by its population standard
//! deviation (ddof = 0). Columns with zero variance keep a scale of 1.0 so
//! they transform to zeros instead of NaN.

use crate::error::{ModelError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column mean/variance scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit the scaler on the rows of `x`.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("scaler input".to_string()));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(ModelError::InsufficientData {
                required: 1,
                actual: 0,
            })?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });

        Ok(Self { mean, scale })
    }

    /// Scale `x` with the fitted parameters.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        Ok((x - &self.mean.view().insert_axis(Axis(0))) / &self.scale.view().insert_axis(Axis(0)))
    }

    /// Fit on `x` and return the scaled copy alongside the scaler.
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }

    /// Fitted column means
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Fitted column standard deviations (1.0 for constant columns)
    pub const fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_fit_parameters() {
        let x = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();

        assert_abs_diff_eq!(scaler.mean()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.mean()[1], 10.0, epsilon = 1e-12);
        // Population std of [1, 2, 3]
        assert_abs_diff_eq!(scaler.scale()[0], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        // Constant column
        assert_abs_diff_eq!(scaler.scale()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_zero_mean_unit_variance() {
        let x = array![[1.0, 5.0], [4.0, -1.0], [7.0, 2.0], [0.0, 2.0]];
        let (_, scaled) = StandardScaler::fit_transform(&x).unwrap();

        for col in scaled.columns() {
            assert_abs_diff_eq!(col.mean().unwrap(), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(col.std(0.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_transform_dimension_mismatch() {
        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0, 2.0, 3.0]]).is_err());
    }

    #[test]
    fn test_empty_input() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(StandardScaler::fit(&x).is_err());
    }
}
