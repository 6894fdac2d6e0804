use std::collections::BTreeSet;

use polars::prelude::*;
use tracing::debug;

use crate::dates::{month_day, parse_date_value, DateRange};
use crate::error::ReconcileError;
use crate::schema::{plan, report, KEY};

/// Aggregate keyed plan rows to one row per key.
///
/// `selected` is the date-column subset chosen for the range. Per row, the
/// selected columns are coerced to numbers (failures and missing values
/// contribute zero) and summed; rows without a strictly positive total are
/// not shortage candidates and are dropped before grouping. Groups then sum
/// the totals and fold each metadata field into a deduplicated, sorted,
/// comma-joined summary with dates rendered as month-day labels.
///
/// Output: `Key`, `Total Planned Qty`, `All Modules`, `Cell PSD`, `PED`,
/// `Delivery Date`; at most one row per key, sorted by key.
pub fn aggregate_plan(
    plan_df: &DataFrame,
    selected: &[String],
    range: &DateRange,
) -> Result<DataFrame, ReconcileError> {
    let total = selected.iter().fold(lit(0.0), |acc, name| {
        acc + col(name.as_str()).cast(DataType::Float64).fill_null(lit(0.0))
    });

    let filtered = plan_df
        .clone()
        .lazy()
        .filter(col(KEY).neq(lit("")))
        .with_columns([total.alias(report::TOTAL_PLANNED_QTY)])
        .filter(col(report::TOTAL_PLANNED_QTY).gt(lit(0.0)))
        .collect()?;
    debug!(
        rows = filtered.height(),
        columns = selected.len(),
        "plan rows with positive planned quantity in window"
    );

    let year = range.default_year();
    let mut keys: Vec<String> = Vec::new();
    let mut quantities: Vec<f64> = Vec::new();
    let mut modules: Vec<String> = Vec::new();
    let mut cell_psd: Vec<String> = Vec::new();
    let mut ped: Vec<String> = Vec::new();
    let mut delivery: Vec<String> = Vec::new();

    if filtered.height() > 0 {
        for part in filtered.partition_by([KEY], true)? {
            let key = part
                .column(KEY)?
                .as_materialized_series()
                .str()?
                .get(0)
                .unwrap_or("")
                .to_string();
            let qty = part
                .column(report::TOTAL_PLANNED_QTY)?
                .as_materialized_series()
                .f64()?
                .sum()
                .unwrap_or(0.0);

            keys.push(key);
            quantities.push(qty);
            modules.push(joined_unique(&part, plan::MODULE)?);
            cell_psd.push(joined_month_days(&part, plan::CELL_PSD, year)?);
            ped.push(joined_month_days(&part, plan::PED, year)?);
            delivery.push(joined_month_days(&part, plan::DELIVERY_DATE, year)?);
        }
    }

    let out = df!(
        KEY => keys,
        report::TOTAL_PLANNED_QTY => quantities,
        report::ALL_MODULES => modules,
        report::CELL_PSD => cell_psd,
        report::PED => ped,
        report::DELIVERY_DATE => delivery,
    )?;
    Ok(out.sort([KEY], SortMultipleOptions::default())?)
}

/// Non-null, non-blank string values of a column within one group.
fn string_values(part: &DataFrame, column: &str) -> Result<Vec<String>, ReconcileError> {
    let series = part
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .filter_map(|v| v.map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect())
}

/// Deduplicated, sorted, comma-joined values.
fn joined_unique(part: &DataFrame, column: &str) -> Result<String, ReconcileError> {
    let unique: BTreeSet<String> = string_values(part, column)?.into_iter().collect();
    Ok(unique.into_iter().collect::<Vec<_>>().join(","))
}

/// Like `joined_unique`, but values are parsed as dates first and rendered
/// as month-day labels. Unparseable values are discarded.
fn joined_month_days(
    part: &DataFrame,
    column: &str,
    default_year: i32,
) -> Result<String, ReconcileError> {
    let unique: BTreeSet<String> = string_values(part, column)?
        .iter()
        .filter_map(|v| parse_date_value(v, default_year))
        .map(month_day)
        .collect();
    Ok(unique.into_iter().collect::<Vec<_>>().join(","))
}
