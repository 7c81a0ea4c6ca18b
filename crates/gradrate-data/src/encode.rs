//! Feature encoding.
//!
//! Categorical fields become 0/1 indicator columns with the lexicographically
//! first level dropped as the reference. Descriptive text and the alternative
//! graduation-rate targets are removed, leaving a frame that
//! [`split_features_and_target`](crate::split_features_and_target) accepts.

use crate::clean::{SCRAPED_NAME_COLUMN, present_mask};
use crate::error::{DataError, Result};
use crate::{ID_COLUMN, NAME_COLUMN};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Columns expanded into indicators.
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["sector", "admission_test"];

/// Columns removed before modelling, when present.
pub const EXCLUDED_COLUMNS: [&str; 5] = [
    "state",
    NAME_COLUMN,
    SCRAPED_NAME_COLUMN,
    "four_year_grad_rate",
    "six_year_grad_rate",
];

/// Encode an imputed frame for modelling.
///
/// The identifier column is kept as `Int64` so persisted tables still name
/// their rows. Fails if any retained column still has a missing value.
pub fn encode_features(df: &DataFrame) -> Result<DataFrame> {
    let mut indicators = Vec::new();
    for column in CATEGORICAL_COLUMNS {
        indicators.extend(indicator_columns(df, column)?);
    }

    let retained: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| {
            !CATEGORICAL_COLUMNS.contains(&name.as_str())
                && !EXCLUDED_COLUMNS.contains(&name.as_str())
        })
        .collect();
    let mut encoded = df.select(retained)?;

    if encoded.get_column_index(ID_COLUMN).is_some() {
        let ids = encoded.column(ID_COLUMN)?.cast(&DataType::Int64)?;
        encoded.with_column(ids)?;
    }
    for indicator in indicators {
        encoded.with_column(indicator)?;
    }

    for column in encoded.get_columns() {
        let missing = present_mask(column.as_materialized_series())?
            .into_iter()
            .filter(|present| !present)
            .count();
        if missing > 0 {
            return Err(DataError::ResidualNulls {
                column: column.name().to_string(),
                count: missing,
            });
        }
    }

    debug!(
        rows = encoded.height(),
        columns = encoded.width(),
        "encoded features"
    );
    Ok(encoded)
}

/// One `Int32` column per non-reference level of `column`, named
/// `{column}_{level}`. Rows with a missing level are all zeros.
fn indicator_columns(df: &DataFrame, column: &str) -> Result<Vec<Column>> {
    let values = df
        .column(column)
        .map_err(|_| DataError::MissingColumn(column.to_string()))?
        .cast(&DataType::String)?;
    let values = values.as_materialized_series().str()?;

    let levels: BTreeSet<&str> = values.into_iter().flatten().collect();
    Ok(levels
        .iter()
        .skip(1)
        .map(|level| {
            let flags: Vec<i32> = values
                .into_iter()
                .map(|v| i32::from(v == Some(*level)))
                .collect();
            Series::new(format!("{column}_{level}").into(), flags).into()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imputed() -> DataFrame {
        DataFrame::new(vec![
            Series::new("ipeds_id".into(), &["10", "20", "30", "40"]).into(),
            Series::new("name".into(), &["A", "B", "C", "D"]).into(),
            Series::new("state".into(), &["AL", "AL", "GA", "GA"]).into(),
            Series::new(
                "sector".into(),
                &["Public", "Private not-for-profit", "Public", "Public"],
            )
            .into(),
            Series::new(
                "admission_test".into(),
                &["Required", "Considered but not required", "Recommended", "Required"],
            )
            .into(),
            Series::new("average_gpa".into(), &[3.1, 3.4, 3.3, 3.0]).into(),
            Series::new("four_year_grad_rate".into(), &[20.0, 40.0, 30.0, 25.0]).into(),
            Series::new("five_year_grad_rate".into(), &[30.0, 55.0, 45.0, 35.0]).into(),
            Series::new("six_year_grad_rate".into(), &[35.0, 60.0, 50.0, 40.0]).into(),
        ])
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_sector_gets_single_indicator() {
        let encoded = encode_features(&imputed()).unwrap();

        let sector_columns: Vec<String> = names(&encoded)
            .into_iter()
            .filter(|n| n.starts_with("sector"))
            .collect();
        assert_eq!(sector_columns, vec!["sector_Public"]);

        let flags: Vec<Option<i32>> = encoded
            .column("sector_Public")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flags, vec![Some(1), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_encoded_layout() {
        let encoded = encode_features(&imputed()).unwrap();

        assert_eq!(
            names(&encoded),
            vec![
                "ipeds_id",
                "average_gpa",
                "five_year_grad_rate",
                "sector_Public",
                "admission_test_Recommended",
                "admission_test_Required",
            ]
        );
        assert_eq!(encoded.column("ipeds_id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_missing_level_encodes_as_zeros() {
        let mut df = imputed();
        let sector: Column = Series::new(
            "sector".into(),
            &[Some("Public"), None, Some("Private not-for-profit"), Some("Public")],
        )
        .into();
        df.with_column(sector).unwrap();

        let encoded = encode_features(&df).unwrap();
        let flags: Vec<Option<i32>> = encoded
            .column("sector_Public")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(flags, vec![Some(1), Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_residual_null_is_error() {
        let mut df = imputed();
        let gpa: Column =
            Series::new("average_gpa".into(), &[Some(3.1), None, Some(3.3), Some(3.0)]).into();
        df.with_column(gpa).unwrap();

        assert!(matches!(
            encode_features(&df),
            Err(DataError::ResidualNulls { column, count: 1 }) if column == "average_gpa"
        ));
    }

    #[test]
    fn test_missing_categorical_is_error() {
        let df = imputed().drop("admission_test").unwrap();
        assert!(matches!(
            encode_features(&df),
            Err(DataError::MissingColumn(c)) if c == "admission_test"
        ));
    }
}
