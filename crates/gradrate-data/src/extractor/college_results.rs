//! College Results Online profile scraper.

use super::html;
use super::{ExtractionFault, RecordExtractor};
use crate::error::{DataError, Result};
use crate::record::InstitutionRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Profile page URL prefix; the identifier is appended.
const DEFAULT_BASE_URL: &str = "http://www.collegeresults.org/collegeprofile.aspx?institutionid=";

const USER_AGENT: &str = concat!("gradrate/", env!("CARGO_PKG_VERSION"));

// Positions of the `class="data"` cells on a profile page.
const STATE: usize = 3;
const RETENTION_RATE: usize = 6;
const FOUR_YEAR_GRAD_RATE: usize = 7;
const FIVE_YEAR_GRAD_RATE: usize = 8;
const SIX_YEAR_GRAD_RATE: usize = 9;
const SECTOR: usize = 11;
const SIZE_UNDERGRADS: usize = 13;
const AVERAGE_GPA: usize = 19;
const ADMISSION_TEST: usize = 20;
const MEDIAN_SAT_VERBAL: usize = 21;
const MEDIAN_SAT_MATH: usize = 22;
const MEDIAN_ACT_COMPOSITE: usize = 24;
const PERCENT_ADMITTED: usize = 26;
const IN_STATE_TUITION: usize = 27;
const OUT_STATE_TUITION: usize = 28;
const PELL_PERCENT: usize = 35;
const PERCENT_UNDERREP_MINORITY: usize = 36;
const PERCENT_PART_TIME: usize = 49;

/// Number of data cells a complete profile page carries at minimum.
pub const REQUIRED_CELLS: usize = PERCENT_PART_TIME + 1;

/// Configuration for [`CollegeResultsExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// URL prefix the identifier is appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Scrapes institution profiles over blocking HTTP, one request per call.
#[derive(Debug, Clone)]
pub struct CollegeResultsExtractor {
    client: reqwest::blocking::Client,
    config: ExtractorConfig,
}

impl CollegeResultsExtractor {
    /// Create an extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client, config })
    }

    /// Create an extractor with the default configuration.
    pub fn try_default() -> Result<Self> {
        Self::new(ExtractorConfig::default())
    }

    /// Configuration in use
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Profile URL for an identifier.
    pub fn profile_url(&self, id: &str) -> String {
        format!("{}{}", self.config.base_url, id)
    }
}

impl RecordExtractor for CollegeResultsExtractor {
    fn extract(&self, id: &str) -> std::result::Result<InstitutionRecord, ExtractionFault> {
        let url = self.profile_url(id);
        trace!(%url, "requesting profile");

        let request_fault = |e: reqwest::Error| ExtractionFault::Request {
            id: id.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().map_err(request_fault)?;
        if !response.status().is_success() {
            return Err(ExtractionFault::Status {
                id: id.to_string(),
                status: response.status().as_u16(),
            });
        }
        let body = response.text().map_err(request_fault)?;

        parse_profile_page(id, &body)
    }
}

/// Parse a profile page into a record.
///
/// The name comes from the first `<h2>`; every other field is read from a
/// fixed position in the sequence of `class="data"` cells. Values that do not
/// parse as numbers become `None`.
pub fn parse_profile_page(
    id: &str,
    page: &str,
) -> std::result::Result<InstitutionRecord, ExtractionFault> {
    let college_name =
        html::first_element_text(page, "h2").ok_or_else(|| ExtractionFault::MissingName {
            id: id.to_string(),
        })?;

    let cells = html::elements_with_class(page, "data");
    if cells.len() < REQUIRED_CELLS {
        return Err(ExtractionFault::MissingCells {
            id: id.to_string(),
            expected: REQUIRED_CELLS,
            found: cells.len(),
        });
    }

    let cell = |i: usize| cells[i].as_str();
    let text = |i: usize| Some(cell(i).to_string()).filter(|s| !s.is_empty());
    let percent = |i: usize| parse_number(cell(i).strip_suffix('%').unwrap_or(cell(i)));
    let prefix = |i: usize, n: usize| parse_number(&cell(i).chars().take(n).collect::<String>());
    let dollars = |i: usize| {
        let raw = cell(i);
        parse_number(&raw.strip_prefix('$').unwrap_or(raw).replace(',', ""))
    };

    Ok(InstitutionRecord {
        ipeds_id: id.to_string(),
        college_name,
        state: text(STATE),
        size_undergrads: parse_number(&cell(SIZE_UNDERGRADS).replace(',', "")),
        percent_admitted: percent(PERCENT_ADMITTED),
        in_state_tuition: dollars(IN_STATE_TUITION),
        out_state_tuition: dollars(OUT_STATE_TUITION),
        sector: text(SECTOR),
        average_gpa: parse_number(cell(AVERAGE_GPA)),
        percent_part_time: percent(PERCENT_PART_TIME),
        admission_test: text(ADMISSION_TEST),
        median_sat_verbal: prefix(MEDIAN_SAT_VERBAL, 3),
        median_sat_math: prefix(MEDIAN_SAT_MATH, 3),
        median_act_composite: prefix(MEDIAN_ACT_COMPOSITE, 4),
        percent_underrep_minority: percent(PERCENT_UNDERREP_MINORITY),
        pell_percent: percent(PELL_PERCENT),
        retention_rate: percent(RETENTION_RATE),
        four_year_grad_rate: percent(FOUR_YEAR_GRAD_RATE),
        five_year_grad_rate: percent(FIVE_YEAR_GRAD_RATE),
        six_year_grad_rate: percent(SIX_YEAR_GRAD_RATE),
    })
}

/// Parse a cell as a finite number; anything else is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
