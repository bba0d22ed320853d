use crate::{
    config::AnalyticsConfig,
    period::ResolvedRange,
    series::{PricePoint, PriceSeries},
    shared::LambdaFactor,
    util::round_dp,
};

use super::error::{AnalyticsError, Result};

/// How log returns are weighted when estimating volatility.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Weighting {
    /// Population standard deviation of the returns.
    #[default]
    Equal,
    /// Exponentially-weighted root mean square, newest return weighted most. The mean is not
    /// subtracted.
    Exponential(LambdaFactor),
}

impl From<Option<LambdaFactor>> for Weighting {
    fn from(value: Option<LambdaFactor>) -> Self {
        value.map_or(Self::Equal, Self::Exponential)
    }
}

fn log_returns(window: &[PricePoint]) -> Vec<f64> {
    window
        .windows(2)
        .map(|pair| (pair[1].price / pair[0].price).ln())
        .collect()
}

fn window_returns(series: &PriceSeries, range: ResolvedRange) -> Result<Vec<f64>> {
    let window = series.window(range.start(), range.end());
    if window.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            observations: window.len(),
        });
    }

    Ok(log_returns(window))
}

/// Annualized standard deviation of `returns`, which must be in chronological order.
fn annualized(returns: &[f64], weighting: Weighting, trading_days: f64) -> f64 {
    let n = returns.len() as f64;

    let variance = match weighting {
        Weighting::Equal => {
            let mean = returns.iter().sum::<f64>() / n;
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n
        }
        Weighting::Exponential(lambda) => {
            let (weighted, total) = returns.iter().rev().enumerate().fold(
                (0., 0.),
                |(weighted, total), (age, r)| {
                    let weight = lambda.weight(age);
                    (weighted + weight * r.powi(2), total + weight)
                },
            );
            weighted / total
        }
    };

    (trading_days * variance).sqrt()
}

/// Annualized volatility of daily log returns within `range`.
pub fn volatility(
    series: &PriceSeries,
    range: ResolvedRange,
    weighting: Weighting,
    config: &AnalyticsConfig,
) -> Result<f64> {
    let returns = window_returns(series, range)?;

    let vol = annualized(
        &returns,
        weighting,
        config.trading_days_per_year().get() as f64,
    );

    Ok(round_dp(vol, config.result_decimals()))
}

/// Annualized volatility of the strictly negative log returns within `range`.
///
/// Returns are filtered before the mean or the exponential weights are computed, so weights
/// are assigned by position among the negative returns only.
pub fn downside_volatility(
    series: &PriceSeries,
    range: ResolvedRange,
    weighting: Weighting,
    config: &AnalyticsConfig,
) -> Result<f64> {
    let downside: Vec<f64> = window_returns(series, range)?
        .into_iter()
        .filter(|r| *r < 0.)
        .collect();

    if downside.is_empty() {
        return Err(AnalyticsError::NoDownsidePeriods {
            start: range.start(),
            end: range.end(),
        });
    }

    let vol = annualized(
        &downside,
        weighting,
        config.trading_days_per_year().get() as f64,
    );

    Ok(round_dp(vol, config.result_decimals()))
}
