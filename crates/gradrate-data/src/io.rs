//! CSV interchange.

use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Read a comma-separated file with a header row.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), columns = df.width(), "read csv");
    Ok(df)
}

/// Write a frame as comma-separated text with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    debug!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_round_trip_keeps_nulls() {
        let mut df = DataFrame::new(vec![
            Series::new("ipeds_id".into(), &["1", "2"]).into(),
            Series::new("average_gpa".into(), &[Some(3.5), None]).into(),
        ])
        .unwrap();

        let path = std::env::temp_dir().join(format!("gradrate-io-{}.csv", std::process::id()));
        write_csv(&mut df, &path).unwrap();
        let back = read_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(back.height(), 2);
        assert_eq!(back.column("average_gpa").unwrap().null_count(), 1);
    }
}
