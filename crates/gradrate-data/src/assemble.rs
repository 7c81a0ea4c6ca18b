//! Dataset assembly.
//!
//! Extraction is sequential and never fails the whole run: an identifier the
//! extractor cannot handle is logged and left out.

use crate::error::{DataError, Result};
use crate::extractor::RecordExtractor;
use crate::record::records_to_frame;
use crate::reference::first_occurrence_mask;
use crate::ID_COLUMN;
use indicatif::ProgressBar;
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Counts collected while assembling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Distinct identifiers handed to the extractor
    pub attempted: usize,
    /// Identifiers that produced a record
    pub extracted: usize,
    /// Identifiers skipped after an extraction fault
    pub skipped: usize,
    /// Rows left after joining with the reference table
    pub joined: usize,
}

impl fmt::Display for AssemblyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} extracted, {} skipped, {} joined",
            self.attempted, self.extracted, self.skipped, self.joined
        )
    }
}

/// Assembled frame together with its statistics.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// Reference columns followed by the scraped columns
    pub frame: DataFrame,
    /// Extraction counts
    pub stats: AssemblyStats,
}

/// Extract every identifier and join the records with the reference table.
pub fn assemble<S, E>(identifiers: &[S], reference: &DataFrame, extractor: &E) -> Result<DataFrame>
where
    S: AsRef<str>,
    E: RecordExtractor + ?Sized,
{
    assemble_with_progress(identifiers, reference, extractor, None).map(|a| a.frame)
}

/// [`assemble`] with an optional progress bar advanced once per identifier.
pub fn assemble_with_progress<S, E>(
    identifiers: &[S],
    reference: &DataFrame,
    extractor: &E,
    progress: Option<&ProgressBar>,
) -> Result<Assembly>
where
    S: AsRef<str>,
    E: RecordExtractor + ?Sized,
{
    if reference.get_column_index(ID_COLUMN).is_none() {
        return Err(DataError::MissingColumn(ID_COLUMN.to_string()));
    }

    let mut seen = HashSet::new();
    let unique: Vec<&str> = identifiers
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| seen.insert(*id))
        .collect();

    let mut stats = AssemblyStats {
        attempted: unique.len(),
        ..AssemblyStats::default()
    };
    if let Some(pb) = progress {
        pb.set_length(unique.len() as u64);
    }

    let mut records = Vec::with_capacity(unique.len());
    for id in unique {
        if let Some(pb) = progress {
            pb.set_message(id.to_string());
        }
        match extractor.extract(id) {
            Ok(record) => records.push(record),
            Err(fault) => {
                debug!(%id, %fault, "skipping institution");
                stats.skipped += 1;
            }
        }
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    stats.extracted = records.len();

    let scraped = records_to_frame(&records)?;

    let mut reference = reference.clone();
    let ids = reference.column(ID_COLUMN)?.cast(&DataType::String)?;
    reference.with_column(ids)?;
    let mask = first_occurrence_mask(reference.column(ID_COLUMN)?.as_materialized_series().str()?);
    let reference = reference.filter(&mask)?;

    let frame = reference
        .lazy()
        .join(
            scraped.lazy(),
            [col(ID_COLUMN)],
            [col(ID_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;
    stats.joined = frame.height();

    info!(%stats, "assembled dataset");
    Ok(Assembly { frame, stats })
}
