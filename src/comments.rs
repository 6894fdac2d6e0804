use polars::prelude::*;

use crate::error::ReconcileError;
use crate::schema::{prior, report, KEY};

/// Carry historical comments forward onto the shortage set.
///
/// Each provided prior-report set is reduced to one comment per key, then
/// left-joined by key. The final `Comment` is the first source's text
/// immediately followed by the second's, a missing side contributing the
/// empty string; textual concatenation, not replacement, so neither history
/// source is lost. Absent prior sets are skipped entirely. The `Comment`
/// column is always present; with no prior sets or no match it is empty.
pub fn carry_forward(
    shortages: DataFrame,
    prior_reports: [Option<&DataFrame>; 2],
) -> Result<DataFrame, ReconcileError> {
    let mut lf = shortages.lazy();
    let mut staged: Vec<String> = Vec::new();

    for (index, prior_df) in prior_reports.into_iter().enumerate() {
        let Some(prior_df) = prior_df else { continue };
        let staging = format!("__comment_{index}");
        let deduped = prior_df
            .clone()
            .lazy()
            .filter(col(KEY).neq(lit("")))
            .group_by([col(KEY)])
            .agg([col(prior::COMMENT)
                .cast(DataType::String)
                .first()
                .alias(staging.as_str())]);
        lf = lf.join(deduped, [col(KEY)], [col(KEY)], JoinArgs::new(JoinType::Left));
        staged.push(staging);
    }

    let filled: Vec<Expr> = staged
        .iter()
        .map(|name| col(name.as_str()).fill_null(lit("")))
        .collect();
    let comment = match filled.as_slice() {
        [] => lit("").alias(report::COMMENT),
        [single] => single.clone().alias(report::COMMENT),
        _ => concat_str(filled.as_slice(), "", false).alias(report::COMMENT),
    };

    let mut out = lf.with_columns([comment]).collect()?;
    for name in &staged {
        out = out.drop(name)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortages() -> DataFrame {
        df!(
            KEY => ["1001", "2002"],
            report::SHORTAGE => [6.0, 4.0],
        )
        .unwrap()
    }

    fn prior_set(rows: &[(&str, &str)]) -> DataFrame {
        let keys: Vec<&str> = rows.iter().map(|(k, _)| *k).collect();
        let comments: Vec<&str> = rows.iter().map(|(_, c)| *c).collect();
        df!(KEY => keys, prior::COMMENT => comments).unwrap()
    }

    fn comment_of(df: &DataFrame, key: &str) -> String {
        let keys = df.column(KEY).unwrap().as_materialized_series().str().unwrap().clone();
        let comments = df
            .column(report::COMMENT)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        (0..df.height())
            .find(|&i| keys.get(i) == Some(key))
            .and_then(|i| comments.get(i))
            .unwrap()
            .to_string()
    }

    #[test]
    fn no_prior_sets_yield_empty_comments() {
        let out = carry_forward(shortages(), [None, None]).unwrap();
        assert_eq!(comment_of(&out, "1001"), "");
        assert_eq!(comment_of(&out, "2002"), "");
    }

    #[test]
    fn both_sources_concatenate_first_then_second() {
        let first = prior_set(&[("1001", "expedite;")]);
        let second = prior_set(&[("1001", "vendor confirmed")]);
        let out = carry_forward(shortages(), [Some(&first), Some(&second)]).unwrap();
        assert_eq!(comment_of(&out, "1001"), "expedite;vendor confirmed");
        // Unmatched key gets empty text from both sides.
        assert_eq!(comment_of(&out, "2002"), "");
    }

    #[test]
    fn single_source_passes_text_through() {
        let first = prior_set(&[("2002", "short last week")]);
        let out = carry_forward(shortages(), [Some(&first), None]).unwrap();
        assert_eq!(comment_of(&out, "2002"), "short last week");

        let second = prior_set(&[("2002", "short last week")]);
        let out = carry_forward(shortages(), [None, Some(&second)]).unwrap();
        assert_eq!(comment_of(&out, "2002"), "short last week");
    }

    #[test]
    fn duplicate_prior_rows_contribute_one_comment() {
        let first = prior_set(&[("1001", "first"), ("1001", "first")]);
        let out = carry_forward(shortages(), [Some(&first), None]).unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(comment_of(&out, "1001"), "first");
    }
}
