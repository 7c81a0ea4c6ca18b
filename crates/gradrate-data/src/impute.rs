//! Cohort imputation: the cohort-impute and incidental-fill policies.
//!
//! Missing GPA and test scores are filled with a mean computed inside the
//! institution's admission-rate cohort. The remaining optional numeric fields
//! (enrollment, part-time and minority shares) are filled the same way so a
//! single gap never fails encoding. All fill values are derived from the
//! column as it was before any fill, so the order cohorts are processed in
//! does not matter.

use crate::error::{DataError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Admission rate column the cohorts are defined over.
pub const ADMISSION_COLUMN: &str = "percent_admitted";

/// Columns filled by cohort instead of dropping rows.
pub const SOFT_COLUMNS: [&str; 4] = [
    "average_gpa",
    "median_sat_verbal",
    "median_sat_math",
    "median_act_composite",
];

/// Optional numeric columns that are neither hard-dropped nor soft.
pub const INCIDENTAL_COLUMNS: [&str; 3] = [
    "size_undergrads",
    "percent_part_time",
    "percent_underrep_minority",
];

/// Band of institutions by admission rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdmissionCohort {
    /// At most 20% admitted
    UpTo20,
    /// Above 20%, at most 40%
    Above20UpTo40,
    /// Above 40%, at most 60%
    Above40UpTo60,
    /// Above 60%, at most 80%
    Above60UpTo80,
    /// Above 80%, below 100%
    Above80Below100,
    /// Exactly 100%
    Open,
}

impl AdmissionCohort {
    /// All cohorts, lowest admission rate first.
    pub const ALL: [Self; 6] = [
        Self::UpTo20,
        Self::Above20UpTo40,
        Self::Above40UpTo60,
        Self::Above60UpTo80,
        Self::Above80Below100,
        Self::Open,
    ];

    /// Cohort of an admission rate, `None` for NaN or rates above 100.
    pub fn classify(percent_admitted: f64) -> Option<Self> {
        match percent_admitted {
            p if p.is_nan() => None,
            p if p <= 20.0 => Some(Self::UpTo20),
            p if p <= 40.0 => Some(Self::Above20UpTo40),
            p if p <= 60.0 => Some(Self::Above40UpTo60),
            p if p <= 80.0 => Some(Self::Above60UpTo80),
            p if p < 100.0 => Some(Self::Above80Below100),
            p if p == 100.0 => Some(Self::Open),
            _ => None,
        }
    }

    /// Interval notation for the band.
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpTo20 => "(-inf, 20]",
            Self::Above20UpTo40 => "(20, 40]",
            Self::Above40UpTo60 => "(40, 60]",
            Self::Above60UpTo80 => "(60, 80]",
            Self::Above80Below100 => "(80, 100)",
            Self::Open => "{100}",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AdmissionCohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where fill values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillSource {
    /// Mean of the column within the row's cohort, falling back to the
    /// whole-table mean when the cohort has no observed value
    #[default]
    CohortMean,
    /// Whole-table mean for every cohort
    TableMean,
}

impl fmt::Display for FillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CohortMean => f.write_str("cohort-mean"),
            Self::TableMean => f.write_str("table-mean"),
        }
    }
}

impl FromStr for FillSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cohort-mean" | "cohort" => Ok(Self::CohortMean),
            "table-mean" | "table" => Ok(Self::TableMean),
            other => Err(format!(
                "unknown fill source '{other}', expected cohort-mean or table-mean"
            )),
        }
    }
}

/// Fill missing values of `column` by admission-rate cohort.
///
/// Rows outside every cohort (missing, NaN or above-100 admission rate) keep
/// their missing values. The filled column is returned as `Float64`; all other
/// columns and the row order are unchanged.
pub fn impute_by_cohort(df: &DataFrame, column: &str, source: FillSource) -> Result<DataFrame> {
    let values = float_values(df, column)?;
    let admitted = float_values(df, ADMISSION_COLUMN)?;

    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() {
        return Err(DataError::EmptyColumn(column.to_string()));
    }
    let table_mean = observed.iter().sum::<f64>() / observed.len() as f64;

    let cohorts: Vec<Option<AdmissionCohort>> = admitted
        .iter()
        .map(|a| a.and_then(AdmissionCohort::classify))
        .collect();

    let mut sums = [0.0_f64; 6];
    let mut counts = [0usize; 6];
    for (value, cohort) in values.iter().zip(&cohorts) {
        if let (Some(v), Some(c)) = (value, cohort) {
            sums[c.index()] += v;
            counts[c.index()] += 1;
        }
    }

    let fill_for = |cohort: AdmissionCohort| match source {
        FillSource::TableMean => table_mean,
        FillSource::CohortMean => {
            let i = cohort.index();
            if counts[i] > 0 {
                sums[i] / counts[i] as f64
            } else {
                table_mean
            }
        }
    };

    let mut filled = 0usize;
    let result: Vec<Option<f64>> = values
        .iter()
        .zip(&cohorts)
        .map(|(value, cohort)| match (value, cohort) {
            (Some(v), _) => Some(*v),
            (None, Some(c)) => {
                filled += 1;
                Some(fill_for(*c))
            }
            (None, None) => None,
        })
        .collect();

    debug!(%column, %source, filled, "imputed by cohort");

    let mut out = df.clone();
    let filled_column: Column = Series::new(column.into(), result).into();
    out.with_column(filled_column)?;
    Ok(out)
}

/// Run [`impute_by_cohort`] over every column in [`SOFT_COLUMNS`].
pub fn impute_soft_columns(df: &DataFrame, source: FillSource) -> Result<DataFrame> {
    impute_columns(df, &SOFT_COLUMNS, source)
}

/// Run [`impute_by_cohort`] over every column in [`INCIDENTAL_COLUMNS`].
pub fn impute_incidental_columns(df: &DataFrame, source: FillSource) -> Result<DataFrame> {
    let missing: usize = INCIDENTAL_COLUMNS
        .iter()
        .filter_map(|column| df.column(column).ok())
        .map(|column| column.null_count())
        .sum();
    let filled = impute_columns(df, &INCIDENTAL_COLUMNS, source)?;
    info!(missing, %source, "filled incidental columns");
    Ok(filled)
}

fn impute_columns(df: &DataFrame, columns: &[&str], source: FillSource) -> Result<DataFrame> {
    columns
        .iter()
        .try_fold(df.clone(), |acc, column| impute_by_cohort(&acc, column, source))
}

/// Column values as floats with NaN treated as missing.
fn float_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(column)
        .map_err(|_| DataError::MissingColumn(column.to_string()))?
        .cast(&DataType::Float64)
        .map_err(|_| DataError::NonNumeric(column.to_string()))?;
    Ok(series
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|v| !v.is_nan()))
        .collect())
}
