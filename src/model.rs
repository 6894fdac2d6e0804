use std::path::PathBuf;

use polars::prelude::*;
use tracing::info;

use crate::dates::DateRange;
use crate::error::ReconcileError;
use crate::pipeline::{build_shortage_report, require_columns, ReconcileInputs};
use crate::report::ShortageReport;
use crate::schema::{plan, prior, stock};

/// The boundary collaborator around the reconciliation core.
///
/// Loads the input record sets from CSV files under a base path (one weekly
/// plan, one or more stock reports, up to two prior shortage reports) and
/// hands already-loaded frames to the pure pipeline. Each model instance is
/// one invocation's worth of inputs; nothing persists between runs.
pub struct ShortfallModel {
    base_path: PathBuf,
    plan: Option<DataFrame>,
    stocks: Vec<DataFrame>,
    prior_reports: [Option<DataFrame>; 2],
}

impl ShortfallModel {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            plan: None,
            stocks: Vec::new(),
            prior_reports: [None, None],
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the weekly plan CSV.
    ///
    /// Required columns: `SO#`, `LI`, `Module`, `Cell PSD`, `PED`,
    /// `Delivery Date`. Date-labeled quantity columns vary per sheet and
    /// are discovered by the pipeline, not declared here.
    pub fn load_plan(&mut self, filename: &str) -> Result<(), ReconcileError> {
        let df = self.read_csv_as_strings(filename)?;
        require_columns(&df, &plan::REQUIRED)?;
        info!(rows = df.height(), filename, "plan loaded");
        self.plan = Some(df);
        Ok(())
    }

    /// Load one stock report CSV and add it to the combined stock input.
    ///
    /// Required columns: `So`, `Li`, `St Location`, `Total Stock`.
    pub fn load_stock(&mut self, filename: &str) -> Result<(), ReconcileError> {
        let df = self.read_csv_as_strings(filename)?;
        require_columns(&df, &stock::REQUIRED)?;
        info!(rows = df.height(), filename, "stock report loaded");
        self.stocks.push(df);
        Ok(())
    }

    /// Load a prior shortage-report CSV into the next free history slot.
    ///
    /// Required columns: `SO#`, `LI`, `Comment`. Comment carry-forward
    /// concatenates in load order; at most two prior reports are accepted.
    pub fn load_prior_report(&mut self, filename: &str) -> Result<(), ReconcileError> {
        let df = self.read_csv_as_strings(filename)?;
        require_columns(&df, &prior::REQUIRED)?;
        let slot = self
            .prior_reports
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or_else(|| {
                ReconcileError::InvalidData("at most two prior reports are supported".to_string())
            })?;
        info!(rows = df.height(), filename, "prior report loaded");
        *slot = Some(df);
        Ok(())
    }

    // ── Reconciliation ──────────────────────────────────────────────────────

    /// Run the shortage pipeline over the loaded inputs.
    pub fn reconcile(&self, range: &DateRange) -> Result<ShortageReport, ReconcileError> {
        let plan = self
            .plan
            .clone()
            .ok_or_else(|| ReconcileError::NotLoaded("plan".to_string()))?;
        let inputs = ReconcileInputs {
            plan,
            stocks: self.stocks.clone(),
            prior_reports: self.prior_reports.clone(),
        };
        build_shortage_report(&inputs, range)
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    /// Read a CSV file with all columns as String dtype; the pipeline
    /// coerces per use. Trims whitespace from column names.
    fn read_csv_as_strings(&self, filename: &str) -> Result<DataFrame, ReconcileError> {
        let path = self.base_path.join(filename);
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        Ok(df)
    }
}
