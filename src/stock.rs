use polars::prelude::*;

use crate::error::ReconcileError;
use crate::schema::{stock, KEY};

/// Sum stock per key at one storage location.
///
/// `combined` is the union of all keyed stock record sets. Rows at other
/// locations are ignored; keys with no stock at this location simply do not
/// appear (absence is resolved by the joiner, never as a zero row here).
/// The summed column is emitted under `out_column`.
pub fn stock_totals(
    combined: &DataFrame,
    location: i64,
    out_column: &str,
) -> Result<DataFrame, ReconcileError> {
    let out = combined
        .clone()
        .lazy()
        .filter(col(KEY).neq(lit("")))
        .filter(
            col(stock::ST_LOCATION)
                .cast(DataType::Float64)
                .cast(DataType::Int64)
                .eq(lit(location)),
        )
        .group_by([col(KEY)])
        .agg([col(stock::TOTAL_STOCK)
            .cast(DataType::Float64)
            .sum()
            .alias(out_column)])
        .collect()?;
    Ok(out)
}
