use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::Serialize;

/// A single dated price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

impl fmt::Display for PricePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.date, self.price)
    }
}

/// Ordered price history for one (asset code, price type) pair.
///
/// Dates are strictly increasing and every price is finite and positive. Observations that
/// violate this are dropped on construction; for duplicate dates the last observation wins.
/// The series is immutable once built and is shared read-only across a batch request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> = points
            .into_iter()
            .filter(|point| point.price.is_finite() && point.price > 0.)
            .map(|point| (point.date, point.price))
            .collect();

        let points = by_date
            .into_iter()
            .map(|(date, price)| PricePoint { date, price })
            .collect();

        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Date of the oldest observation.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|point| point.date)
    }

    /// Date of the most recent observation.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    fn position(&self, date: NaiveDate) -> Result<usize, usize> {
        self.points.binary_search_by(|point| point.date.cmp(&date))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date).is_ok()
    }

    /// Price observed exactly on `date`, if any.
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).ok().map(|idx| self.points[idx].price)
    }

    /// Latest observation dated on or before `date`.
    pub fn latest_at_or_before(&self, date: NaiveDate) -> Option<&PricePoint> {
        match self.position(date) {
            Ok(idx) => Some(&self.points[idx]),
            Err(0) => None,
            Err(idx) => Some(&self.points[idx - 1]),
        }
    }

    /// Observations dated within `[start, end]`, inclusive on both ends.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        if start > end {
            return &[];
        }

        let from = self.position(start).unwrap_or_else(|idx| idx);
        let to = match self.position(end) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };

        &self.points[from..to]
    }

    /// Observations dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> &[PricePoint] {
        let from = self.position(start).unwrap_or_else(|idx| idx);
        &self.points[from..]
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl FromIterator<(NaiveDate, f64)> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(date, price)| PricePoint { date, price }),
        )
    }
}
