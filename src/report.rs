use std::path::Path;

use polars::prelude::*;

use crate::dates::DateRange;
use crate::error::ReconcileError;
use crate::schema::{report, KEY};

/// The finished shortage report: one record set plus the sheet name the
/// serializing collaborator should write it under.
#[derive(Debug, Clone)]
pub struct ShortageReport {
    pub sheet_name: String,
    pub rows: DataFrame,
}

impl ShortageReport {
    pub fn is_empty(&self) -> bool {
        self.rows.height() == 0
    }

    pub fn len(&self) -> usize {
        self.rows.height()
    }

    /// Serialize the report rows as CSV. The transport filename is the
    /// caller's concern.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ReconcileError> {
        let mut file = std::fs::File::create(path)?;
        let mut rows = self.rows.clone();
        CsvWriter::new(&mut file).finish(&mut rows)?;
        Ok(())
    }
}

/// Package the shortage rows: fixed column order, deterministic key sort,
/// sheet name derived from the range. No further transformation.
pub fn assemble(rows: DataFrame, range: &DateRange) -> Result<ShortageReport, ReconcileError> {
    let columns: Vec<Expr> = report::COLUMNS.iter().map(|name| col(*name)).collect();
    let rows = rows
        .lazy()
        .select(columns)
        .sort([KEY], Default::default())
        .collect()?;
    Ok(ShortageReport {
        sheet_name: range.sheet_name(),
        rows,
    })
}
