use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use strum::EnumIter;
use tracing::debug;

use crate::{
    series::PriceSeries,
    util::{DateExt, parse_date_literal},
};

pub(crate) mod error;

use error::{PeriodError, Result};

/// Sentinel period start meaning "the oldest available observation".
pub const INCEPTION: &str = "Inception";

/// Sentinel period end meaning "the most recent available observation".
pub const LATEST: &str = "Latest";

lazy_static! {
    static ref OFFSET_GRAMMAR: Regex =
        Regex::new(r"^(\d+)\s*([DWMQY])$").expect("offset grammar is a valid regex");
}

/// Calendar unit of an offset or frequency expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum OffsetUnit {
    Day,
    Week,
    Month,
    /// Three calendar months.
    Quarter,
    Year,
}

impl OffsetUnit {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'D' => Some(Self::Day),
            'W' => Some(Self::Week),
            'M' => Some(Self::Month),
            'Q' => Some(Self::Quarter),
            'Y' => Some(Self::Year),
            _ => None,
        }
    }

    pub const fn symbol(&self) -> char {
        match self {
            Self::Day => 'D',
            Self::Week => 'W',
            Self::Month => 'M',
            Self::Quarter => 'Q',
            Self::Year => 'Y',
        }
    }

    /// Length of one unit in days, given the length of a year in days.
    pub fn days(&self, days_per_year: f64) -> f64 {
        match self {
            Self::Day => 1.,
            Self::Week => days_per_year / 52.,
            Self::Month => days_per_year / 12.,
            Self::Quarter => days_per_year / 4.,
            Self::Year => days_per_year,
        }
    }
}

impl fmt::Display for OffsetUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A count of calendar units, written `<integer><unit>` (e.g. `2W`, `6M`, `3Q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    value: u32,
    unit: OffsetUnit,
}

impl Offset {
    pub fn new(value: u32, unit: OffsetUnit) -> Self {
        Self { value, unit }
    }

    /// Parses an `<integer><unit>` expression. Exactly one unit symbol is accepted, upper case,
    /// after the digits; surrounding whitespace is ignored.
    pub fn parse(expr: &str) -> Option<Self> {
        let captures = OFFSET_GRAMMAR.captures(expr.trim())?;

        let value = captures.get(1)?.as_str().parse::<u32>().ok()?;
        let unit = captures
            .get(2)?
            .as_str()
            .chars()
            .next()
            .and_then(OffsetUnit::from_symbol)?;

        Some(Self { value, unit })
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn unit(&self) -> OffsetUnit {
        self.unit
    }

    /// Approximate length of the offset in days (see [`OffsetUnit::days`]).
    pub fn days(&self, days_per_year: f64) -> f64 {
        self.value as f64 * self.unit.days(days_per_year)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Parsed period start expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStart {
    Inception,
    /// Measured back from the resolved period end.
    Offset(Offset),
    Date(NaiveDate),
}

impl PeriodStart {
    pub fn parse(expr: &str) -> Result<Self> {
        if expr.trim() == INCEPTION {
            return Ok(Self::Inception);
        }

        if let Some(offset) = Offset::parse(expr) {
            return Ok(Self::Offset(offset));
        }

        parse_date_literal(expr)
            .map(Self::Date)
            .ok_or_else(|| PeriodError::InvalidStartExpression(expr.to_string()))
    }

    /// Resolves to a date present in `series`, anchoring offsets on the already-resolved `end`.
    pub fn resolve(&self, end: NaiveDate, series: &PriceSeries) -> Result<NaiveDate> {
        let earliest = series.first_date().ok_or(PeriodError::EmptySeries)?;

        let requested = match self {
            Self::Inception => earliest,
            Self::Offset(offset) => end
                .step_back(*offset)
                .ok_or_else(|| PeriodError::InvalidStartExpression(self.to_string()))?,
            Self::Date(date) => *date,
        };

        series
            .latest_at_or_before(requested)
            .map(|point| point.date)
            .ok_or(PeriodError::NoDataBeforeStart {
                requested,
                earliest,
            })
    }
}

impl fmt::Display for PeriodStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inception => write!(f, "{INCEPTION}"),
            Self::Offset(offset) => fmt::Display::fmt(offset, f),
            Self::Date(date) => fmt::Display::fmt(date, f),
        }
    }
}

/// Parsed period end expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodEnd {
    Latest,
    /// Measured back from the latest observation.
    Offset(Offset),
    Date(NaiveDate),
}

impl PeriodEnd {
    pub fn parse(expr: &str) -> Result<Self> {
        if expr.trim() == LATEST {
            return Ok(Self::Latest);
        }

        if let Some(offset) = Offset::parse(expr) {
            return Ok(Self::Offset(offset));
        }

        parse_date_literal(expr)
            .map(Self::Date)
            .ok_or_else(|| PeriodError::InvalidEndExpression(expr.to_string()))
    }

    /// Resolves to a date present in `series`, falling back to the last observation on or
    /// before the requested date.
    pub fn resolve(&self, series: &PriceSeries) -> Result<NaiveDate> {
        let (earliest, latest) = match (series.first_date(), series.last_date()) {
            (Some(earliest), Some(latest)) => (earliest, latest),
            _ => return Err(PeriodError::EmptySeries),
        };

        let requested = match self {
            Self::Latest => latest,
            Self::Offset(offset) => latest
                .step_back(*offset)
                .ok_or_else(|| PeriodError::InvalidEndExpression(self.to_string()))?,
            Self::Date(date) => *date,
        };

        if requested > latest {
            return Err(PeriodError::NoDataAfterEnd { requested, latest });
        }

        series
            .latest_at_or_before(requested)
            .map(|point| point.date)
            .ok_or(PeriodError::NoDataBeforeEnd {
                requested,
                earliest,
            })
    }
}

impl fmt::Display for PeriodEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "{LATEST}"),
            Self::Offset(offset) => fmt::Display::fmt(offset, f),
            Self::Date(date) => fmt::Display::fmt(date, f),
        }
    }
}

/// A pair of observation dates with `start < end`, both present in the series they were
/// resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl ResolvedRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(PeriodError::StartNotBeforeEnd { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Calendar days from start to end.
    pub fn days(&self) -> i64 {
        self.start.days_until(&self.end)
    }
}

impl fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Resolves a period start/end expression pair against `series`.
///
/// The end is resolved first (a missing end means [`LATEST`]); start offsets are then measured
/// back from that resolved end, not from the series' latest date. Both dates fall back to the
/// last observation on or before the requested date.
pub fn resolve(
    start_expr: Option<&str>,
    end_expr: Option<&str>,
    series: &PriceSeries,
) -> Result<ResolvedRange> {
    let start_expr = start_expr.ok_or(PeriodError::MissingStartExpression)?;

    let end = PeriodEnd::parse(end_expr.unwrap_or(LATEST))?.resolve(series)?;
    let start = PeriodStart::parse(start_expr)?.resolve(end, series)?;

    let range = ResolvedRange::new(start, end)?;

    debug!(
        start_expr,
        end_expr = end_expr.unwrap_or(LATEST),
        %range,
        "resolved period"
    );

    Ok(range)
}
