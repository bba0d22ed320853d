use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime};

use crate::period::{Offset, OffsetUnit};

/// Formats accepted for literal calendar dates, tried in order.
///
/// Slash-separated day/month forms are read month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses a literal calendar date, truncating any time component to day precision.
///
/// Returns `None` if `expr` matches none of the supported layouts.
pub(crate) fn parse_date_literal(expr: &str) -> Option<NaiveDate> {
    let expr = expr.trim();
    if expr.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(expr, fmt).ok())
    {
        return Some(date);
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(expr) {
        return Some(date_time.date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(expr, fmt).ok())
        .map(|date_time| date_time.date())
}

pub(crate) trait DateExt: Sized {
    /// Moves this date back by `offset`.
    ///
    /// Month-based units (months, quarters, years) use calendar arithmetic, clamping to the last
    /// day of the target month. Returns `None` if the result falls outside the supported range.
    fn step_back(&self, offset: Offset) -> Option<Self>;

    /// Signed calendar-day count from `self` to `later`.
    fn days_until(&self, later: &Self) -> i64;
}

impl DateExt for NaiveDate {
    fn step_back(&self, offset: Offset) -> Option<NaiveDate> {
        let value = offset.value();
        match offset.unit() {
            OffsetUnit::Day => self.checked_sub_days(Days::new(value as u64)),
            OffsetUnit::Week => self.checked_sub_days(Days::new(value as u64 * 7)),
            OffsetUnit::Month => self.checked_sub_months(Months::new(value)),
            OffsetUnit::Quarter => self.checked_sub_months(Months::new(value.checked_mul(3)?)),
            OffsetUnit::Year => self.checked_sub_months(Months::new(value.checked_mul(12)?)),
        }
    }

    fn days_until(&self, later: &NaiveDate) -> i64 {
        later.signed_duration_since(*self).num_days()
    }
}
