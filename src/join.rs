use polars::prelude::*;
use tracing::debug;

use crate::error::ReconcileError;
use crate::schema::{report, KEY};

/// Left-join the aggregated plan against the three location stock totals
/// and compute shortages.
///
/// Every plan key must appear in the joined result even with no stock at a
/// location - zero stock is the interesting case - so all three joins are
/// left joins with absent totals filled as zero. The shortage is planned
/// quantity minus primary-location stock; only strictly positive shortages
/// survive.
pub fn join_shortages(
    plan_agg: &DataFrame,
    primary: &DataFrame,
    secondary_a: &DataFrame,
    secondary_b: &DataFrame,
) -> Result<DataFrame, ReconcileError> {
    let out = plan_agg
        .clone()
        .lazy()
        .join(
            primary.clone().lazy(),
            [col(KEY)],
            [col(KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            secondary_a.clone().lazy(),
            [col(KEY)],
            [col(KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            secondary_b.clone().lazy(),
            [col(KEY)],
            [col(KEY)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            col(report::STOCK_PRIMARY).fill_null(lit(0.0)),
            col(report::STOCK_SECONDARY_A).fill_null(lit(0.0)),
            col(report::STOCK_SECONDARY_B).fill_null(lit(0.0)),
        ])
        // Guaranteed upstream; kept so the join output alone upholds the
        // no-empty-key invariant.
        .filter(col(KEY).neq(lit("")))
        .with_columns([
            (col(report::TOTAL_PLANNED_QTY) - col(report::STOCK_PRIMARY))
                .alias(report::SHORTAGE),
        ])
        .filter(col(report::SHORTAGE).gt(lit(0.0)))
        .collect()?;
    debug!(shortages = out.height(), "positive shortages after join");
    Ok(out)
}
