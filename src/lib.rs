#![doc = include_str!("../README.md")]

/// Exports [`PerformanceAnalytics`], [`PeriodBatch`], and the column-oriented result tables
/// returned by the batch operations.
///
/// [`PerformanceAnalytics`]: crate::batch::PerformanceAnalytics
/// [`PeriodBatch`]: crate::batch::PeriodBatch
pub mod batch;
/// Exports the return, volatility, Sharpe/Sortino and drawdown engines.
pub mod analytics;
/// Exports [`AnalyticsConfig`].
///
/// [`AnalyticsConfig`]: crate::config::AnalyticsConfig
pub mod config;
mod db;
/// Exports the normalization and compounding frequency resolver.
pub mod frequency;
/// Exports the period expression parser and [`resolve`](crate::period::resolve).
pub mod period;
/// Exports [`PriceSeries`] and [`PricePoint`].
///
/// [`PriceSeries`]: crate::series::PriceSeries
/// [`PricePoint`]: crate::series::PricePoint
pub mod series;
mod shared;
mod util;

pub use db::{Database, PriceSeriesRepository};

/// Error types returned by `perfolio`.
pub mod error {
    pub use super::analytics::error::AnalyticsError;
    pub use super::batch::error::BatchError;
    pub use super::db::error::DbError;
    pub use super::frequency::error::FrequencyError;
    pub use super::period::error::PeriodError;
    pub use super::shared::{
        ErrorKind,
        error::{DrawdownRankValidationError, LambdaFactorValidationError},
    };
    pub use super::util::PanicPayload;

    /// Convenience general-purpose Result type alias.
    pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
}

/// Exports database models and shared validated types.
pub mod models {
    pub use super::batch::ItemError;
    pub use super::db::models::PricePointRow;
    pub use super::shared::{DrawdownRank, LambdaFactor};
}
