use polars::prelude::*;
use tracing::{debug, info};

use crate::dates::{select_date_columns, DateRange};
use crate::error::ReconcileError;
use crate::report::ShortageReport;
use crate::schema::{locations, plan as plan_cols, prior as prior_cols, report as report_cols,
                    stock as stock_cols, KEY};
use crate::{comments, join, key, plan, report, stock};

/// Already-loaded record sets for one reconciliation run.
///
/// The plan and at least one stock set are required; prior shortage reports
/// are optional, in provided order. The pipeline is a pure function of
/// these inputs - nothing is shared across invocations.
#[derive(Debug, Clone)]
pub struct ReconcileInputs {
    pub plan: DataFrame,
    pub stocks: Vec<DataFrame>,
    pub prior_reports: [Option<DataFrame>; 2],
}

/// Run the reconciliation recipe: derive keys on every input, select the
/// date window, aggregate plan and stock, join, compute shortages, carry
/// prior comments forward, and package the report.
pub fn build_shortage_report(
    inputs: &ReconcileInputs,
    range: &DateRange,
) -> Result<ShortageReport, ReconcileError> {
    require_columns(&inputs.plan, &plan_cols::REQUIRED)?;
    if inputs.stocks.is_empty() {
        return Err(ReconcileError::Validation(
            "at least one stock record set is required".to_string(),
        ));
    }
    for stock_df in &inputs.stocks {
        require_columns(stock_df, &stock_cols::REQUIRED)?;
    }
    for prior_df in inputs.prior_reports.iter().flatten() {
        require_columns(prior_df, &prior_cols::REQUIRED)?;
    }

    // The date window is taken from the raw plan schema, before the key
    // column is added.
    let plan_columns = inputs.plan.get_column_names_str();
    let selected = select_date_columns(&plan_columns, range);
    debug!(
        selected = selected.len(),
        start = %range.start(),
        end = %range.end(),
        "date columns selected from plan schema"
    );

    let keyed_plan = key::drop_empty_keys(key::with_key(
        inputs.plan.clone(),
        plan_cols::SALES_ORDER,
        plan_cols::LINE_ITEM,
    )?)?;

    // Key each stock set, narrow to the shared columns, and combine.
    let mut keyed_stocks: Vec<LazyFrame> = Vec::with_capacity(inputs.stocks.len());
    for stock_df in &inputs.stocks {
        let keyed = key::drop_empty_keys(key::with_key(
            stock_df.clone(),
            stock_cols::SALES_ORDER,
            stock_cols::LINE_ITEM,
        )?)?;
        keyed_stocks.push(keyed.lazy().select([
            col(KEY),
            col(stock_cols::ST_LOCATION),
            col(stock_cols::TOTAL_STOCK),
        ]));
    }
    let combined_stock = concat(keyed_stocks, UnionArgs::default())?.collect()?;
    debug!(rows = combined_stock.height(), "combined stock records");

    let plan_agg = plan::aggregate_plan(&keyed_plan, &selected, range)?;
    let primary = stock::stock_totals(&combined_stock, locations::PRIMARY, report_cols::STOCK_PRIMARY)?;
    let secondary_a =
        stock::stock_totals(&combined_stock, locations::SECONDARY_A, report_cols::STOCK_SECONDARY_A)?;
    let secondary_b =
        stock::stock_totals(&combined_stock, locations::SECONDARY_B, report_cols::STOCK_SECONDARY_B)?;

    let shortages = join::join_shortages(&plan_agg, &primary, &secondary_a, &secondary_b)?;

    let mut keyed_priors: [Option<DataFrame>; 2] = [None, None];
    for (slot, prior_df) in inputs.prior_reports.iter().enumerate() {
        if let Some(prior_df) = prior_df {
            keyed_priors[slot] = Some(key::drop_empty_keys(key::with_key(
                prior_df.clone(),
                prior_cols::SALES_ORDER,
                prior_cols::LINE_ITEM,
            )?)?);
        }
    }
    let commented = comments::carry_forward(
        shortages,
        [keyed_priors[0].as_ref(), keyed_priors[1].as_ref()],
    )?;

    let report = report::assemble(commented, range)?;
    info!(
        rows = report.len(),
        sheet = %report.sheet_name,
        "shortage report built"
    );
    Ok(report)
}

/// Fail fast when a required schema field is absent from a record set.
pub(crate) fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), ReconcileError> {
    for &name in required {
        if df.column(name).is_err() {
            return Err(ReconcileError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        )
        .unwrap()
    }

    fn sample_plan() -> DataFrame {
        df!(
            plan_cols::SALES_ORDER => [Some("100"), None, Some("300")],
            plan_cols::LINE_ITEM => [Some("1"), Some("2"), Some("3")],
            plan_cols::MODULE => ["A1", "A2", "A3"],
            plan_cols::CELL_PSD => ["1/3", "1/3", "1/3"],
            plan_cols::PED => ["1/5", "1/5", "1/5"],
            plan_cols::DELIVERY_DATE => ["1/7", "1/7", "1/7"],
            "1/1" => ["5", "9", "1"],
            "1/2" => ["3", "9", "1"],
            "1/9" => ["100", "100", "100"],
        )
        .unwrap()
    }

    fn sample_stock() -> DataFrame {
        df!(
            stock_cols::SALES_ORDER => ["100", "300", "100"],
            stock_cols::LINE_ITEM => ["1", "3", "1"],
            stock_cols::ST_LOCATION => ["118", "118", "75"],
            stock_cols::TOTAL_STOCK => ["2", "10", "4"],
        )
        .unwrap()
    }

    fn inputs() -> ReconcileInputs {
        ReconcileInputs {
            plan: sample_plan(),
            stocks: vec![sample_stock()],
            prior_reports: [None, None],
        }
    }

    fn column_f64(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    #[test]
    fn end_to_end_shortage_example() {
        let report = build_shortage_report(&inputs(), &range()).unwrap();

        // Key 1001: planned 5+3=8 inside the window (the 1/9 column is
        // outside), stock 2 at the primary location, shortage 6. Key 3003
        // is fully covered. The row with a missing order never appears.
        assert_eq!(report.len(), 1);
        let keys: Vec<&str> = report
            .rows
            .column(KEY)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(keys, vec!["1001"]);
        assert_eq!(column_f64(&report.rows, report_cols::TOTAL_PLANNED_QTY), vec![8.0]);
        assert_eq!(column_f64(&report.rows, report_cols::STOCK_PRIMARY), vec![2.0]);
        assert_eq!(column_f64(&report.rows, report_cols::STOCK_SECONDARY_A), vec![4.0]);
        assert_eq!(column_f64(&report.rows, report_cols::STOCK_SECONDARY_B), vec![0.0]);
        assert_eq!(column_f64(&report.rows, report_cols::SHORTAGE), vec![6.0]);
        assert_eq!(report.sheet_name, "Jan-01_to_Jan-02");
        assert_eq!(
            report.rows.get_column_names_str(),
            report_cols::COLUMNS.to_vec()
        );
    }

    #[test]
    fn prior_comments_are_carried_forward() {
        let mut inputs = inputs();
        inputs.prior_reports[0] = Some(
            df!(
                prior_cols::SALES_ORDER => ["100"],
                prior_cols::LINE_ITEM => ["1"],
                prior_cols::COMMENT => ["expedite;"],
            )
            .unwrap(),
        );
        inputs.prior_reports[1] = Some(
            df!(
                prior_cols::SALES_ORDER => ["100"],
                prior_cols::LINE_ITEM => ["1"],
                prior_cols::COMMENT => ["vendor confirmed"],
            )
            .unwrap(),
        );
        let report = build_shortage_report(&inputs, &range()).unwrap();
        let comment = report
            .rows
            .column(report_cols::COMMENT)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(0)
            .unwrap()
            .to_string();
        assert_eq!(comment, "expedite;vendor confirmed");
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let mut inputs = inputs();
        inputs.plan = inputs.plan.drop(plan_cols::MODULE).unwrap();
        let err = build_shortage_report(&inputs, &range()).unwrap_err();
        match err {
            ReconcileError::MissingColumn(name) => assert_eq!(name, plan_cols::MODULE),
            other => panic!("expected MissingColumn, got {other}"),
        }
    }

    #[test]
    fn at_least_one_stock_set_is_required() {
        let mut inputs = inputs();
        inputs.stocks.clear();
        let err = build_shortage_report(&inputs, &range()).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }
}
