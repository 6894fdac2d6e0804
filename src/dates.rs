use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::error::ReconcileError;

/// Inclusive [start, end] reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReconcileError> {
        if end < start {
            return Err(ReconcileError::Validation(format!(
                "date range end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Both boundaries are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Calendar year used to resolve year-less date labels (`"1/7"`).
    pub fn default_year(&self) -> i32 {
        self.start.year()
    }

    /// Output sheet name, `<StartMonthDay>_to_<EndMonthDay>`.
    pub fn sheet_name(&self) -> String {
        format!("{}_to_{}", month_day(self.start), month_day(self.end))
    }
}

/// Render a date as a month-day label, e.g. `Jan-05`.
pub fn month_day(date: NaiveDate) -> String {
    date.format("%b-%d").to_string()
}

// Two-digit years are tried before four-digit ones: %Y happily parses
// "25" as the year 25, which would swallow "1/5/25" with a bogus century.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M:%S"];

/// Central date-coercion rule shared by column headers and metadata values.
///
/// Accepts ISO dates, slash dates with two- or four-digit years, their
/// datetime variants, and bare `M/D` labels resolved in `default_year`.
/// Anything else is `None` - unparseable values are excluded, not errors.
pub fn parse_date_value(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Month/day label without a year.
    NaiveDate::parse_from_str(&format!("{s}/{default_year}"), "%m/%d/%Y").ok()
}

/// Classify a plan column header as a date label.
///
/// A header counts as a date column only if it is lexically shaped like one
/// (contains the `/` separator) AND parses as a calendar date. Metadata
/// headers and date-looking junk (`"N/A"`) fall out here.
pub fn parse_column_date(name: &str, default_year: i32) -> Option<NaiveDate> {
    if !name.contains('/') {
        return None;
    }
    parse_date_value(name, default_year)
}

/// Select the plan headers whose dates fall inside the range.
///
/// Output preserves the original schema order so downstream summation is
/// reproducible.
pub fn select_date_columns(columns: &[&str], range: &DateRange) -> Vec<String> {
    let year = range.default_year();
    columns
        .iter()
        .filter(|name| {
            parse_column_date(name, year)
                .map(|d| range.contains(d))
                .unwrap_or(false)
        })
        .map(|name| name.to_string())
        .collect()
}
