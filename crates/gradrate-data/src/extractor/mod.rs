//! Record extraction.
//!
//! A [`RecordExtractor`] turns one institution identifier into an
//! [`InstitutionRecord`]. Any failure for that identifier is an
//! [`ExtractionFault`], which the assembler treats as "skip this one".

mod college_results;
pub mod html;

pub use college_results::{
    CollegeResultsExtractor, ExtractorConfig, REQUIRED_CELLS, parse_number, parse_profile_page,
};

use crate::record::InstitutionRecord;
use thiserror::Error;

/// Failure to extract one institution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFault {
    /// The request could not be completed
    #[error("request for {id} failed: {message}")]
    Request {
        /// Identifier
        id: String,
        /// Underlying error text
        message: String,
    },

    /// The server answered with a non-success status
    #[error("request for {id} returned HTTP {status}")]
    Status {
        /// Identifier
        id: String,
        /// HTTP status code
        status: u16,
    },

    /// The page has no institution name
    #[error("profile page for {id} has no name heading")]
    MissingName {
        /// Identifier
        id: String,
    },

    /// The page has fewer data cells than the layout requires
    #[error("profile page for {id} has {found} data cells, expected at least {expected}")]
    MissingCells {
        /// Identifier
        id: String,
        /// Required number of cells
        expected: usize,
        /// Cells found
        found: usize,
    },
}

/// Source of institution records.
pub trait RecordExtractor {
    /// Extract the record for one identifier.
    fn extract(&self, id: &str) -> Result<InstitutionRecord, ExtractionFault>;
}

impl<F> RecordExtractor for F
where
    F: Fn(&str) -> Result<InstitutionRecord, ExtractionFault>,
{
    fn extract(&self, id: &str) -> Result<InstitutionRecord, ExtractionFault> {
        self(id)
    }
}
