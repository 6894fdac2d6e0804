use polars::prelude::*;

use crate::error::ReconcileError;
use crate::schema::KEY;

/// One half of the join key.
///
/// Numeric values (including numeric-as-text) are truncated to an integer
/// and rendered as a plain decimal string. Casts are non-strict, so a
/// missing, blank, or non-numeric value becomes null rather than an error.
fn key_part(column: &str) -> Expr {
    col(column)
        .cast(DataType::Float64)
        .cast(DataType::Int64)
        .cast(DataType::String)
}

/// Add the `Key` column to a record set.
///
/// The key concatenates the order identifier and line-item index, in that
/// order. If either source field is missing or non-numeric the whole key is
/// the empty string; a half-derived key would join unrelated line items, so
/// the null from a bad field poisons the concatenation instead of being
/// patched per part. The same derivation is applied to every input table;
/// only the source column names differ per table.
pub fn with_key(
    df: DataFrame,
    order_column: &str,
    line_column: &str,
) -> Result<DataFrame, ReconcileError> {
    let out = df
        .lazy()
        .with_columns([
            concat_str([key_part(order_column), key_part(line_column)], "", false)
                .fill_null(lit(""))
                .alias(KEY),
        ])
        .collect()?;
    Ok(out)
}

/// Drop rows whose derived key is empty.
///
/// Empty keys mark rows with unusable order/line fields; they are excluded
/// from all downstream processing.
pub fn drop_empty_keys(df: DataFrame) -> Result<DataFrame, ReconcileError> {
    let out = df.lazy().filter(col(KEY).neq(lit(""))).collect()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(df: &DataFrame) -> Vec<String> {
        df.column(KEY)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    #[test]
    fn numeric_text_is_truncated_and_concatenated() {
        let df = df!(
            "SO#" => ["100", "100.0", "205.9"],
            "LI" => ["1", "2.0", "10"],
        )
        .unwrap();
        let df = with_key(df, "SO#", "LI").unwrap();
        assert_eq!(keys_of(&df), vec!["1001", "1002", "20510"]);
    }

    #[test]
    fn any_bad_field_empties_the_whole_key() {
        let df = df!(
            "SO#" => [Some("100"), None, Some("abc"), None],
            "LI" => [Some("x"), Some("2"), Some("3"), None],
        )
        .unwrap();
        let df = with_key(df, "SO#", "LI").unwrap();
        assert_eq!(keys_of(&df), vec!["", "", "", ""]);
    }

    #[test]
    fn derivation_is_deterministic() {
        let df = df!("SO#" => ["42"], "LI" => ["7"]).unwrap();
        let a = with_key(df.clone(), "SO#", "LI").unwrap();
        let b = with_key(df, "SO#", "LI").unwrap();
        assert_eq!(keys_of(&a), keys_of(&b));
    }

    #[test]
    fn empty_keys_are_dropped() {
        let df = df!(
            "SO#" => [Some("100"), None],
            "LI" => [Some("1"), Some("2")],
        )
        .unwrap();
        let df = drop_empty_keys(with_key(df, "SO#", "LI").unwrap()).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(keys_of(&df), vec!["1001"]);
    }
}
