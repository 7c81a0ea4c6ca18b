//! Reference table of institution identifiers and names.

use crate::error::{DataError, Result};
use crate::io::read_csv;
use crate::{ID_COLUMN, NAME_COLUMN};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Name column of the published IPEDS list.
pub const DEFAULT_NAME_COLUMN: &str = "college";

/// Load the reference CSV.
///
/// Keeps the identifier (as text) and the name column, renamed to
/// [`NAME_COLUMN`]. Repeated identifiers keep their first row.
pub fn load_reference_table(path: &Path, name_column: &str) -> Result<DataFrame> {
    let raw = read_csv(path)?;
    let table = reference_from_frame(&raw, name_column)?;
    info!(
        path = %path.display(),
        institutions = table.height(),
        "loaded reference table"
    );
    Ok(table)
}

/// Normalize an already loaded frame into a reference table.
pub fn reference_from_frame(df: &DataFrame, name_column: &str) -> Result<DataFrame> {
    for column in [ID_COLUMN, name_column] {
        if df.get_column_index(column).is_none() {
            return Err(DataError::MissingColumn(column.to_string()));
        }
    }

    let mut table = df.select([ID_COLUMN, name_column])?;
    let ids = table.column(ID_COLUMN)?.cast(&DataType::String)?;
    table.with_column(ids)?;
    if name_column != NAME_COLUMN {
        table.rename(name_column, NAME_COLUMN.into())?;
    }

    let mask = first_occurrence_mask(table.column(ID_COLUMN)?.as_materialized_series().str()?);
    Ok(table.filter(&mask)?)
}

/// Non-null identifiers of a reference table, in order.
pub fn reference_identifiers(reference: &DataFrame) -> Result<Vec<String>> {
    let ids = reference
        .column(ID_COLUMN)
        .map_err(|_| DataError::MissingColumn(ID_COLUMN.to_string()))?
        .cast(&DataType::String)?;
    let ids = ids.as_materialized_series().str()?;
    Ok(ids.into_iter().flatten().map(str::to_string).collect())
}

/// Mask keeping the first row of every distinct non-null value; null rows are dropped.
pub(crate) fn first_occurrence_mask(values: &StringChunked) -> BooleanChunked {
    let mut seen = HashSet::new();
    let keep: Vec<bool> = values
        .into_iter()
        .map(|v| v.is_some_and(|v| seen.insert(v.to_string())))
        .collect();
    BooleanChunked::from_slice("keep".into(), &keep)
}
