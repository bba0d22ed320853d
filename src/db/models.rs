use chrono::NaiveDate;
use sqlx::FromRow;

use crate::series::{PricePoint, PriceSeries};

/// Database row holding one observation of a (asset code, price type) time series.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct PricePointRow {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePointRow {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

impl From<PricePointRow> for PricePoint {
    fn from(row: PricePointRow) -> Self {
        PricePoint::new(row.date, row.price)
    }
}

impl FromIterator<PricePointRow> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePointRow>>(iter: I) -> Self {
        PriceSeries::new(iter.into_iter().map(PricePoint::from))
    }
}
