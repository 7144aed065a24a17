//! CSV export of the full strategy table.

use crate::domain::analysis::{Analysis, TableRow};
use crate::domain::error::DashboardError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub fn export_file_name(ticker: &str) -> String {
    format!("{}_strategy.csv", ticker.to_uppercase())
}

pub fn write_table<W: Write>(writer: W, rows: &[TableRow]) -> Result<(), DashboardError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_table<R: Read>(reader: R) -> Result<Vec<TableRow>, DashboardError> {
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.deserialize()
        .map(|row| row.map_err(DashboardError::from))
        .collect()
}

/// Writes the analysis table to `path`, creating parent directories.
pub fn export_analysis(analysis: &Analysis, path: &Path) -> Result<(), DashboardError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| DashboardError::Export {
        reason: format!("cannot create {}: {}", path.display(), e),
    })?;
    let rows = analysis.table_rows();
    write_table(file, &rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "strategy table exported");
    Ok(())
}
