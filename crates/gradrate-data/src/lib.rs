#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/gradrate/gradrate/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod assemble;
pub mod clean;
pub mod encode;
pub mod error;
pub mod extractor;
pub mod impute;
pub mod io;
pub mod record;
pub mod reference;
pub mod table;

pub use assemble::{Assembly, AssemblyStats, assemble, assemble_with_progress};
pub use clean::{EXCLUDED_SECTORS, REQUIRED_COLUMNS, clean_institutions};
pub use encode::encode_features;
pub use error::{DataError, Result};
pub use extractor::{CollegeResultsExtractor, ExtractionFault, ExtractorConfig, RecordExtractor};
pub use impute::{
    AdmissionCohort, FillSource, INCIDENTAL_COLUMNS, SOFT_COLUMNS, impute_by_cohort,
    impute_incidental_columns, impute_soft_columns,
};
pub use io::{read_csv, write_csv};
pub use record::{InstitutionRecord, records_to_frame};
pub use reference::{load_reference_table, reference_identifiers};
pub use table::{FeatureTable, feature_matrix, split_features_and_target};

/// Identifier column shared by the reference table and scraped records.
pub const ID_COLUMN: &str = "ipeds_id";

/// Column the reference table's institution name is stored under.
pub const NAME_COLUMN: &str = "name";

/// Prediction target.
pub const TARGET_COLUMN: &str = "five_year_grad_rate";

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
