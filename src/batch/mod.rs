use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    analytics::{self, DrawdownRecord, RiskRatio, Weighting, error::AnalyticsError},
    config::AnalyticsConfig,
    db::Database,
    frequency, period,
    period::ResolvedRange,
    series::PriceSeries,
    shared::{DrawdownRank, ErrorKind, LambdaFactor},
};

pub(crate) mod error;

use error::{BatchError, Result};

/// Why a single batch item has no value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&AnalyticsError> for ItemError {
    fn from(err: &AnalyticsError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// The asset, price type and period expressions a batch call is evaluated over.
///
/// Period starts and ends are parallel: item `i` covers `period_starts[i]` to `period_ends[i]`.
/// A missing end means `Latest`; a missing start fails that item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBatch {
    asset_code: String,
    price_type: String,
    currency: Option<String>,
    period_starts: Vec<Option<String>>,
    period_ends: Vec<Option<String>>,
}

impl PeriodBatch {
    pub fn new(asset_code: impl Into<String>, price_type: impl Into<String>) -> Self {
        Self {
            asset_code: asset_code.into(),
            price_type: price_type.into(),
            currency: None,
            period_starts: Vec::new(),
            period_ends: Vec::new(),
        }
    }

    pub fn asset_code(&self) -> &str {
        &self.asset_code
    }

    pub fn price_type(&self) -> &str {
        &self.price_type
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn period_starts(&self) -> &[Option<String>] {
        &self.period_starts
    }

    pub fn period_ends(&self) -> &[Option<String>] {
        &self.period_ends
    }

    /// Requests prices converted to `currency`. Not supported: every operation fails with
    /// [`ErrorKind::UnsupportedFeature`] when set.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_period_starts<I, S>(mut self, starts: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.period_starts = starts.into_iter().map(|s| s.map(Into::into)).collect();
        self
    }

    pub fn with_period_ends<I, S>(mut self, ends: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.period_ends = ends.into_iter().map(|s| s.map(Into::into)).collect();
        self
    }

    /// Appends one item covering `start` to `end`.
    pub fn with_period(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.period_starts.push(Some(start.into()));
        self.period_ends.push(Some(end.into()));
        self
    }

    fn check_lengths(&self, extra: Option<(&'static str, usize)>) -> Result<usize> {
        let mut lengths = vec![
            ("period_starts", self.period_starts.len()),
            ("period_ends", self.period_ends.len()),
        ];
        lengths.extend(extra);

        let len = self.period_starts.len();
        if lengths.iter().any(|(_, l)| *l != len) {
            return Err(BatchError::MismatchedArrayLengths { lengths });
        }

        Ok(len)
    }

    fn range(
        &self,
        index: usize,
        series: &PriceSeries,
    ) -> analytics::error::Result<ResolvedRange> {
        let start = self.period_starts.get(index).and_then(Option::as_deref);
        let end = self.period_ends.get(index).and_then(Option::as_deref);

        Ok(period::resolve(start, end, series)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsTable {
    pub rate_of_return: Vec<Option<f64>>,
    pub errors: Vec<Option<ItemError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolatilityTable {
    pub volatility: Vec<Option<f64>>,
    pub errors: Vec<Option<ItemError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharpeRatioTable {
    pub sharpe_ratio: Vec<Option<f64>>,
    pub rate_of_return: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
    pub errors: Vec<Option<ItemError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortinoRatioTable {
    pub sortino_ratio: Vec<Option<f64>>,
    pub rate_of_return: Vec<Option<f64>>,
    pub downside_volatility: Vec<Option<f64>>,
    pub errors: Vec<Option<ItemError>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownsTable {
    pub drawdown_start: Vec<Option<NaiveDate>>,
    pub drawdown_end: Vec<Option<NaiveDate>>,
    pub drawdown_performance: Vec<Option<f64>>,
    pub recovery_days: Vec<Option<i64>>,
    pub errors: Vec<Option<ItemError>>,
}

/// Splits per-item results into a value column and an error column.
fn columns<T>(
    results: Vec<analytics::error::Result<T>>,
) -> (Vec<Option<T>>, Vec<Option<ItemError>>) {
    results
        .into_iter()
        .map(|result| match result {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(ItemError::from(&e))),
        })
        .unzip()
}

/// Like [`columns`], but an item whose ratio alone is undefined keeps its value and reports the
/// ratio error.
fn ratio_columns(
    results: Vec<analytics::error::Result<RiskRatio>>,
) -> (Vec<Option<RiskRatio>>, Vec<Option<ItemError>>) {
    let (ratios, mut errors) = columns(results);

    for (ratio, error) in ratios.iter().zip(errors.iter_mut()) {
        if let Some(e) = ratio.as_ref().and_then(RiskRatio::ratio_error) {
            *error = Some(ItemError::from(e));
        }
    }

    (ratios, errors)
}

fn project<T, U>(values: &[Option<T>], field: impl Fn(&T) -> Option<U>) -> Vec<Option<U>> {
    values.iter().map(|value| value.as_ref().and_then(&field)).collect()
}

fn weighting(lambda_factor: Option<f64>) -> analytics::error::Result<Weighting> {
    let lambda = lambda_factor.map(LambdaFactor::try_from).transpose()?;
    Ok(Weighting::from(lambda))
}

/// Batch entry point for the historical performance operations.
///
/// Each operation loads the price series once, then evaluates every period item independently
/// and in input order. A failing item yields `None` in the value columns and an [`ItemError`] in
/// the `errors` column; it never aborts the call.
pub struct PerformanceAnalytics {
    db: Arc<Database>,
    config: AnalyticsConfig,
}

impl PerformanceAnalytics {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            config: AnalyticsConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    async fn load(
        &self,
        operation: &'static str,
        batch: &PeriodBatch,
        extra: Option<(&'static str, usize)>,
    ) -> Result<PriceSeries> {
        if batch.currency().is_some() {
            return Err(BatchError::UnsupportedFeature {
                feature: "Currency conversion",
            });
        }

        let items = batch.check_lengths(extra)?;

        debug!(
            operation,
            asset_code = batch.asset_code(),
            price_type = batch.price_type(),
            items,
            "running batch"
        );

        self.db
            .price_series(batch.asset_code(), batch.price_type())
            .await?
            .ok_or_else(|| BatchError::UnknownAssetOrPriceType {
                asset_code: batch.asset_code().to_string(),
                price_type: batch.price_type().to_string(),
            })
    }

    /// Evaluates `item` for every period in `batch`, isolating failures and panics per item.
    fn run_items<T, F>(
        &self,
        operation: &'static str,
        batch: &PeriodBatch,
        series: &PriceSeries,
        item: F,
    ) -> Vec<analytics::error::Result<T>>
    where
        F: Fn(usize, ResolvedRange) -> analytics::error::Result<T>,
    {
        (0..batch.period_starts.len())
            .map(|index| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    let range = batch.range(index, series)?;
                    item(index, range)
                }))
                .map_err(|e| AnalyticsError::Panicked(e.into()))
                .and_then(|result| result);

                if let Err(e) = &result {
                    warn!(
                        operation,
                        asset_code = batch.asset_code(),
                        index,
                        kind = %e.kind(),
                        error = %e,
                        "batch item failed"
                    );
                }

                result
            })
            .collect()
    }

    /// Rate of return over each period.
    ///
    /// `normalization` and `compounding` default to the configured frequencies. A normalization of
    /// `NA` reports the simple, unannualized return.
    pub async fn historical_returns(
        &self,
        batch: &PeriodBatch,
        normalization: Option<&str>,
        compounding: Option<&str>,
    ) -> Result<ReturnsTable> {
        let series = self.load("historical_returns", batch, None).await?;

        let results = self.run_items("historical_returns", batch, &series, |_, range| {
            let freq = frequency::resolve(normalization, compounding, &self.config)?;
            analytics::rate_of_return(&series, range, freq, &self.config)
        });

        let (rate_of_return, errors) = columns(results);

        Ok(ReturnsTable {
            rate_of_return,
            errors,
        })
    }

    /// Rate of return over each period, scaled to `amount`.
    pub async fn historical_returns_dollar(
        &self,
        batch: &PeriodBatch,
        amount: f64,
        normalization: Option<&str>,
        compounding: Option<&str>,
    ) -> Result<ReturnsTable> {
        let series = self.load("historical_returns_dollar", batch, None).await?;

        let results = self.run_items("historical_returns_dollar", batch, &series, |_, range| {
            let freq = frequency::resolve(normalization, compounding, &self.config)?;
            let rate = analytics::rate_of_return(&series, range, freq, &self.config)?;
            Ok(analytics::dollar_return(rate, amount, &self.config))
        });

        let (rate_of_return, errors) = columns(results);

        Ok(ReturnsTable {
            rate_of_return,
            errors,
        })
    }

    /// Annualized volatility over each period, exponentially weighted when `lambda_factor` is
    /// set.
    pub async fn historical_volatility(
        &self,
        batch: &PeriodBatch,
        lambda_factor: Option<f64>,
    ) -> Result<VolatilityTable> {
        let series = self.load("historical_volatility", batch, None).await?;

        let results = self.run_items("historical_volatility", batch, &series, |_, range| {
            analytics::volatility(&series, range, weighting(lambda_factor)?, &self.config)
        });

        let (volatility, errors) = columns(results);

        Ok(VolatilityTable { volatility, errors })
    }

    /// Sharpe ratio over each period. `riskfree_rate` defaults to zero.
    pub async fn historical_sharpe_ratio(
        &self,
        batch: &PeriodBatch,
        normalization: Option<&str>,
        compounding: Option<&str>,
        lambda_factor: Option<f64>,
        riskfree_rate: Option<f64>,
    ) -> Result<SharpeRatioTable> {
        let series = self.load("historical_sharpe_ratio", batch, None).await?;

        let results = self.run_items("historical_sharpe_ratio", batch, &series, |_, range| {
            let freq = frequency::resolve(normalization, compounding, &self.config)?;
            analytics::sharpe_ratio(
                &series,
                range,
                freq,
                weighting(lambda_factor)?,
                riskfree_rate.unwrap_or(0.),
                &self.config,
            )
        });

        let (ratios, errors) = ratio_columns(results);

        Ok(SharpeRatioTable {
            sharpe_ratio: project(&ratios, RiskRatio::ratio),
            rate_of_return: project(&ratios, |r: &RiskRatio| Some(r.rate_of_return())),
            volatility: project(&ratios, RiskRatio::volatility),
            errors,
        })
    }

    /// Sortino ratio over each period. `riskfree_rate` defaults to zero.
    pub async fn historical_sortino_ratio(
        &self,
        batch: &PeriodBatch,
        normalization: Option<&str>,
        compounding: Option<&str>,
        lambda_factor: Option<f64>,
        riskfree_rate: Option<f64>,
    ) -> Result<SortinoRatioTable> {
        let series = self.load("historical_sortino_ratio", batch, None).await?;

        let results = self.run_items("historical_sortino_ratio", batch, &series, |_, range| {
            let freq = frequency::resolve(normalization, compounding, &self.config)?;
            analytics::sortino_ratio(
                &series,
                range,
                freq,
                weighting(lambda_factor)?,
                riskfree_rate.unwrap_or(0.),
                &self.config,
            )
        });

        let (ratios, errors) = ratio_columns(results);

        Ok(SortinoRatioTable {
            sortino_ratio: project(&ratios, RiskRatio::ratio),
            rate_of_return: project(&ratios, |r: &RiskRatio| Some(r.rate_of_return())),
            downside_volatility: project(&ratios, RiskRatio::volatility),
            errors,
        })
    }

    /// The drawdown at `ranks[i]` within each period, rank 1 being the deepest. A missing rank
    /// means 1.
    pub async fn historical_drawdowns(
        &self,
        batch: &PeriodBatch,
        ranks: &[Option<i64>],
    ) -> Result<DrawdownsTable> {
        let series = self
            .load("historical_drawdowns", batch, Some(("ranks", ranks.len())))
            .await?;

        let results = self.run_items("historical_drawdowns", batch, &series, |index, range| {
            let rank = match ranks.get(index).copied().flatten() {
                Some(rank) => DrawdownRank::try_from(rank)?,
                None => DrawdownRank::default(),
            };
            analytics::drawdown(&series, range, rank, &self.config)
        });

        let (records, errors) = columns(results);

        Ok(DrawdownsTable {
            drawdown_start: project(&records, |r: &DrawdownRecord| Some(r.peak_date())),
            drawdown_end: project(&records, |r: &DrawdownRecord| Some(r.trough_date())),
            drawdown_performance: project(&records, |r: &DrawdownRecord| Some(r.performance())),
            recovery_days: project(&records, |r: &DrawdownRecord| Some(r.recovery_days())),
            errors,
        })
    }
}

#[cfg(test)]
mod tests;
