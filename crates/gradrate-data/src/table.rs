//! Numeric feature table handed to the models.

use crate::error::{DataError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;

/// Fully numeric design matrix with its target.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    target_name: String,
    features: Array2<f64>,
    target: Array1<f64>,
}

impl FeatureTable {
    /// Create a table, checking that names, rows and target agree.
    pub fn new(
        feature_names: Vec<String>,
        target_name: impl Into<String>,
        features: Array2<f64>,
        target: Array1<f64>,
    ) -> Result<Self> {
        if feature_names.len() != features.ncols() {
            return Err(DataError::DimensionMismatch {
                expected: features.ncols(),
                actual: feature_names.len(),
            });
        }
        if target.len() != features.nrows() {
            return Err(DataError::DimensionMismatch {
                expected: features.nrows(),
                actual: target.len(),
            });
        }
        Ok(Self {
            feature_names,
            target_name: target_name.into(),
            features,
            target,
        })
    }

    /// Feature column names, in matrix column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Target column name
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Feature matrix (rows are institutions)
    pub const fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Target vector
    pub const fn target(&self) -> &Array1<f64> {
        &self.target
    }

    /// Number of rows
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Copy out the given rows.
    pub fn select_rows(&self, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
        (
            self.features.select(Axis(0), indices),
            self.target.select(Axis(0), indices),
        )
    }
}

/// Split an encoded frame into a [`FeatureTable`].
///
/// Every column other than `target` and `id_column` becomes a feature. All of
/// them must be numeric (booleans count as 0/1) and complete.
pub fn split_features_and_target(
    df: &DataFrame,
    target: &str,
    id_column: Option<&str>,
) -> Result<FeatureTable> {
    if df.get_column_index(target).is_none() {
        return Err(DataError::MissingColumn(target.to_string()));
    }

    let feature_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| name != target && Some(name.as_str()) != id_column)
        .collect();

    let target_values = numeric_column(df, target)?;
    let columns = feature_names
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;

    let features = Array2::from_shape_fn((df.height(), columns.len()), |(i, j)| columns[j][i]);
    FeatureTable::new(feature_names, target, features, Array1::from(target_values))
}

/// Matrix of the named columns, in the given order.
///
/// Used to score a frame with a persisted model, where the column list comes
/// from the model rather than the frame.
pub fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    for name in columns {
        if df.get_column_index(name).is_none() {
            return Err(DataError::MissingColumn(name.clone()));
        }
    }
    let values = columns
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;
    Ok(Array2::from_shape_fn((df.height(), values.len()), |(i, j)| values[j][i]))
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?;
    let dtype = column.dtype();
    if !(dtype.is_float() || dtype.is_integer() || dtype.is_bool()) {
        return Err(DataError::NonNumeric(name.to_string()));
    }

    let values = column.cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = values
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| !v.is_nan()))
        .collect();

    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        return Err(DataError::ResidualNulls {
            column: name.to_string(),
            count: missing,
        });
    }
    Ok(values.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn encoded() -> DataFrame {
        DataFrame::new(vec![
            Series::new("ipeds_id".into(), &[1i64, 2, 3]).into(),
            Series::new("retention_rate".into(), &[80.0, 70.0, 60.0]).into(),
            Series::new("sector_Public".into(), &[1i32, 0, 1]).into(),
            Series::new("five_year_grad_rate".into(), &[55.0, 45.0, 35.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_split_features_and_target() {
        let table =
            split_features_and_target(&encoded(), "five_year_grad_rate", Some("ipeds_id")).unwrap();

        assert_eq!(table.feature_names(), ["retention_rate", "sector_Public"]);
        assert_eq!(table.target_name(), "five_year_grad_rate");
        assert_eq!(table.features(), &array![[80.0, 1.0], [70.0, 0.0], [60.0, 1.0]]);
        assert_eq!(table.target(), &array![55.0, 45.0, 35.0]);
        assert_eq!(table.n_samples(), 3);
        assert_eq!(table.n_features(), 2);
    }

    #[test]
    fn test_without_id_column_everything_else_is_a_feature() {
        let table = split_features_and_target(&encoded(), "five_year_grad_rate", None).unwrap();
        assert_eq!(table.n_features(), 3);
        assert_eq!(table.feature_names()[0], "ipeds_id");
    }

    #[test]
    fn test_select_rows() {
        let table =
            split_features_and_target(&encoded(), "five_year_grad_rate", Some("ipeds_id")).unwrap();
        let (x, y) = table.select_rows(&[2, 0]);
        assert_eq!(x, array![[60.0, 1.0], [80.0, 1.0]]);
        assert_eq!(y, array![35.0, 55.0]);
    }

    #[test]
    fn test_text_feature_is_error() {
        let mut df = encoded();
        let state: Column = Series::new("state".into(), &["AL", "AK", "AZ"]).into();
        df.with_column(state).unwrap();
        assert!(matches!(
            split_features_and_target(&df, "five_year_grad_rate", Some("ipeds_id")),
            Err(DataError::NonNumeric(c)) if c == "state"
        ));
    }

    #[test]
    fn test_null_feature_is_error() {
        let mut df = encoded();
        let gpa: Column = Series::new("average_gpa".into(), &[Some(3.0), None, Some(3.2)]).into();
        df.with_column(gpa).unwrap();
        assert!(matches!(
            split_features_and_target(&df, "five_year_grad_rate", Some("ipeds_id")),
            Err(DataError::ResidualNulls { count: 1, .. })
        ));
    }

    #[test]
    fn test_missing_target_is_error() {
        assert!(matches!(
            split_features_and_target(&encoded(), "six_year_grad_rate", None),
            Err(DataError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_feature_matrix_follows_requested_order() {
        let names = vec!["sector_Public".to_string(), "retention_rate".to_string()];
        let x = feature_matrix(&encoded(), &names).unwrap();
        assert_eq!(x, array![[1.0, 80.0], [0.0, 70.0], [1.0, 60.0]]);

        let missing = vec!["average_gpa".to_string()];
        assert!(matches!(
            feature_matrix(&encoded(), &missing),
            Err(DataError::MissingColumn(c)) if c == "average_gpa"
        ));
    }

    #[test]
    fn test_new_checks_shapes() {
        let result = FeatureTable::new(
            vec!["a".to_string()],
            "y",
            Array2::zeros((3, 2)),
            Array1::zeros(3),
        );
        assert!(result.is_err());
    }
}
