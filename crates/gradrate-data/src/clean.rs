//! Structural cleaning: the hard-drop policy.

use crate::error::{DataError, Result};
use polars::prelude::*;
use tracing::info;

/// Sectors removed from the dataset. `-` marks institutions without a
/// published sector, which are for-profit in practice.
pub const EXCLUDED_SECTORS: [&str; 2] = ["Private for-profit", "-"];

/// Columns whose missing values drop the whole row.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "in_state_tuition",
    "out_state_tuition",
    "pell_percent",
    "percent_admitted",
    "retention_rate",
    "admission_test",
    "four_year_grad_rate",
    "five_year_grad_rate",
    "six_year_grad_rate",
];

/// Scraped name column, redundant once joined with the reference table.
pub const SCRAPED_NAME_COLUMN: &str = "college_name";

const SECTOR_COLUMN: &str = "sector";

/// Apply the hard-drop policy to an assembled frame.
///
/// Removes the scraped name column, excluded sectors, and every row with a
/// missing value in one of [`REQUIRED_COLUMNS`]. Rows with no sector at all
/// are kept.
pub fn clean_institutions(df: &DataFrame) -> Result<DataFrame> {
    for column in REQUIRED_COLUMNS.iter().chain(std::iter::once(&SECTOR_COLUMN)) {
        if df.get_column_index(column).is_none() {
            return Err(DataError::MissingColumn(column.to_string()));
        }
    }

    let df = if df.get_column_index(SCRAPED_NAME_COLUMN).is_some() {
        df.drop(SCRAPED_NAME_COLUMN)?
    } else {
        df.clone()
    };

    let sector = df.column(SECTOR_COLUMN)?.cast(&DataType::String)?;
    let mut keep: Vec<bool> = sector
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|s| s.is_none_or(|s| !EXCLUDED_SECTORS.contains(&s)))
        .collect();
    let after_sector = keep.iter().filter(|k| **k).count();

    for column in REQUIRED_COLUMNS {
        let present = present_mask(df.column(column)?.as_materialized_series())?;
        for (k, p) in keep.iter_mut().zip(present) {
            *k &= p;
        }
    }

    let cleaned = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
    info!(
        rows = df.height(),
        excluded_sector = df.height() - after_sector,
        missing_required = after_sector - cleaned.height(),
        kept = cleaned.height(),
        "cleaned institutions"
    );
    Ok(cleaned)
}

/// `true` where a value is present. NaN counts as missing in float columns.
pub(crate) fn present_mask(series: &Series) -> Result<Vec<bool>> {
    if series.dtype().is_float() {
        let values = series.cast(&DataType::Float64)?;
        Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.is_some_and(|v| !v.is_nan()))
            .collect())
    } else {
        Ok(series.is_not_null().into_iter().map(|v| v == Some(true)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembled() -> DataFrame {
        let n = 6;
        let mut columns: Vec<Column> = vec![
            Series::new("ipeds_id".into(), &["1", "2", "3", "4", "5", "6"]).into(),
            Series::new("name".into(), &["A", "B", "C", "D", "E", "F"]).into(),
            Series::new("college_name".into(), &["A", "B", "C", "D", "E", "F"]).into(),
            Series::new(
                "sector".into(),
                &[
                    Some("Public"),
                    Some("Private for-profit"),
                    Some("-"),
                    Some("Private not-for-profit"),
                    None,
                    Some("Public"),
                ],
            )
            .into(),
            Series::new(
                "admission_test".into(),
                &["Required", "Required", "Required", "Required", "Required", "Required"],
            )
            .into(),
        ];
        for column in REQUIRED_COLUMNS.iter().filter(|c| **c != "admission_test") {
            // Row 4 has a NaN tuition, row 6 misses retention.
            let values: Vec<Option<f64>> = (0..n)
                .map(|i| match (i, *column) {
                    (3, "in_state_tuition") => Some(f64::NAN),
                    (5, "retention_rate") => None,
                    _ => Some(50.0),
                })
                .collect();
            columns.push(Series::new((*column).into(), values).into());
        }
        columns.push(Series::new("average_gpa".into(), vec![None::<f64>; n]).into());
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_clean_institutions() {
        let cleaned = clean_institutions(&assembled()).unwrap();

        let ids: Vec<&str> = cleaned
            .column("ipeds_id")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        // Sector-less row 5 survives, soft columns stay null.
        assert_eq!(ids, vec!["1", "5"]);
        assert!(cleaned.column("college_name").is_err());
        assert_eq!(cleaned.column("average_gpa").unwrap().null_count(), 2);
    }

    #[test]
    fn test_missing_required_column_is_error() {
        let df = assembled().drop("pell_percent").unwrap();
        assert!(matches!(
            clean_institutions(&df),
            Err(DataError::MissingColumn(c)) if c == "pell_percent"
        ));
    }

    #[test]
    fn test_null_admission_test_drops_row() {
        let mut df = assembled();
        let tests: Column = Series::new(
            "admission_test".into(),
            &[None, Some("Required"), Some("Required"), Some("Required"), Some("Required"), Some("Required")],
        )
        .into();
        df.with_column(tests).unwrap();
        let cleaned = clean_institutions(&df).unwrap();
        assert_eq!(cleaned.height(), 1);
    }
}
