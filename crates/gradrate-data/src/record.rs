//! Scraped institution records and their tabular form.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column order of a frame built from [`InstitutionRecord`]s.
pub const RECORD_COLUMNS: [&str; 20] = [
    "ipeds_id",
    "college_name",
    "state",
    "size_undergrads",
    "percent_admitted",
    "in_state_tuition",
    "out_state_tuition",
    "sector",
    "average_gpa",
    "percent_part_time",
    "admission_test",
    "median_sat_verbal",
    "median_sat_math",
    "median_act_composite",
    "percent_underrep_minority",
    "pell_percent",
    "retention_rate",
    "four_year_grad_rate",
    "five_year_grad_rate",
    "six_year_grad_rate",
];

/// One university's profile statistics.
///
/// Numeric fields are `None` when the source value was absent or did not
/// parse as a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionRecord {
    /// IPEDS identifier
    pub ipeds_id: String,
    /// Name as shown on the profile page
    pub college_name: String,
    /// State
    pub state: Option<String>,
    /// Number of undergraduates
    pub size_undergrads: Option<f64>,
    /// Admission rate in percent
    pub percent_admitted: Option<f64>,
    /// In-state tuition and fees
    pub in_state_tuition: Option<f64>,
    /// Out-of-state tuition and fees
    pub out_state_tuition: Option<f64>,
    /// Sector, e.g. `Public` or `Private not-for-profit`
    pub sector: Option<String>,
    /// Average high school GPA among freshmen
    pub average_gpa: Option<f64>,
    /// Percent of students enrolled part time
    pub percent_part_time: Option<f64>,
    /// Admission test policy
    pub admission_test: Option<String>,
    /// Median SAT verbal score
    pub median_sat_verbal: Option<f64>,
    /// Median SAT math score
    pub median_sat_math: Option<f64>,
    /// Median ACT composite score
    pub median_act_composite: Option<f64>,
    /// Percent underrepresented minority
    pub percent_underrep_minority: Option<f64>,
    /// Percent receiving Pell grants
    pub pell_percent: Option<f64>,
    /// First-year retention rate
    pub retention_rate: Option<f64>,
    /// Four-year graduation rate
    pub four_year_grad_rate: Option<f64>,
    /// Five-year graduation rate
    pub five_year_grad_rate: Option<f64>,
    /// Six-year graduation rate
    pub six_year_grad_rate: Option<f64>,
}

impl InstitutionRecord {
    /// Create an empty record for an identifier.
    pub fn new(ipeds_id: impl Into<String>, college_name: impl Into<String>) -> Self {
        Self {
            ipeds_id: ipeds_id.into(),
            college_name: college_name.into(),
            ..Self::default()
        }
    }
}

/// Build a frame with one row per record, columns in [`RECORD_COLUMNS`] order.
pub fn records_to_frame(records: &[InstitutionRecord]) -> Result<DataFrame> {
    let ids: Vec<&str> = records.iter().map(|r| r.ipeds_id.as_str()).collect();
    let names: Vec<&str> = records.iter().map(|r| r.college_name.as_str()).collect();

    let df = DataFrame::new(vec![
        Series::new("ipeds_id".into(), ids).into(),
        Series::new("college_name".into(), names).into(),
        Series::new("state".into(), text(records, |r| r.state.as_deref())).into(),
        Series::new("size_undergrads".into(), number(records, |r| r.size_undergrads)).into(),
        Series::new("percent_admitted".into(), number(records, |r| r.percent_admitted)).into(),
        Series::new("in_state_tuition".into(), number(records, |r| r.in_state_tuition)).into(),
        Series::new("out_state_tuition".into(), number(records, |r| r.out_state_tuition)).into(),
        Series::new("sector".into(), text(records, |r| r.sector.as_deref())).into(),
        Series::new("average_gpa".into(), number(records, |r| r.average_gpa)).into(),
        Series::new("percent_part_time".into(), number(records, |r| r.percent_part_time)).into(),
        Series::new("admission_test".into(), text(records, |r| r.admission_test.as_deref())).into(),
        Series::new("median_sat_verbal".into(), number(records, |r| r.median_sat_verbal)).into(),
        Series::new("median_sat_math".into(), number(records, |r| r.median_sat_math)).into(),
        Series::new(
            "median_act_composite".into(),
            number(records, |r| r.median_act_composite),
        )
        .into(),
        Series::new(
            "percent_underrep_minority".into(),
            number(records, |r| r.percent_underrep_minority),
        )
        .into(),
        Series::new("pell_percent".into(), number(records, |r| r.pell_percent)).into(),
        Series::new("retention_rate".into(), number(records, |r| r.retention_rate)).into(),
        Series::new(
            "four_year_grad_rate".into(),
            number(records, |r| r.four_year_grad_rate),
        )
        .into(),
        Series::new(
            "five_year_grad_rate".into(),
            number(records, |r| r.five_year_grad_rate),
        )
        .into(),
        Series::new("six_year_grad_rate".into(), number(records, |r| r.six_year_grad_rate)).into(),
    ])?;

    Ok(df)
}

fn text<'a>(
    records: &'a [InstitutionRecord],
    field: fn(&InstitutionRecord) -> Option<&str>,
) -> Vec<Option<&'a str>> {
    records.iter().map(field).collect()
}

fn number(records: &[InstitutionRecord], field: fn(&InstitutionRecord) -> Option<f64>) -> Vec<Option<f64>> {
    records.iter().map(field).collect()
}
