use crate::{
    config::AnalyticsConfig, frequency::FrequencyDays, period::ResolvedRange,
    series::PriceSeries, util::round_dp,
};

use super::{
    error::{AnalyticsError, Result},
    returns::rate_of_return,
    volatility::{Weighting, downside_volatility, volatility},
};

/// A risk-adjusted return together with the two figures it was derived from.
///
/// The rate of return is always present. When the volatility cannot be computed, or is zero, the
/// ratio alone is undefined and carries the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRatio {
    ratio: Result<f64>,
    rate_of_return: f64,
    volatility: Option<f64>,
}

impl RiskRatio {
    fn new(
        rate_of_return: f64,
        volatility: Result<f64>,
        riskfree_rate: f64,
        decimals: u32,
    ) -> Self {
        let ratio = match &volatility {
            Ok(vol) if *vol == 0. => Err(AnalyticsError::ZeroVolatility),
            Ok(vol) => Ok(round_dp((rate_of_return - riskfree_rate) / vol, decimals)),
            Err(e) => Err(e.clone()),
        };

        Self {
            ratio,
            rate_of_return,
            volatility: volatility.ok(),
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        self.ratio.as_ref().ok().copied()
    }

    /// Why [`ratio`](Self::ratio) is undefined, if it is.
    pub fn ratio_error(&self) -> Option<&AnalyticsError> {
        self.ratio.as_ref().err()
    }

    pub fn rate_of_return(&self) -> f64 {
        self.rate_of_return
    }

    /// Total volatility for a Sharpe ratio, downside volatility for a Sortino ratio.
    pub fn volatility(&self) -> Option<f64> {
        self.volatility
    }
}

/// Excess return per unit of total volatility over `range`.
pub fn sharpe_ratio(
    series: &PriceSeries,
    range: ResolvedRange,
    freq: FrequencyDays,
    weighting: Weighting,
    riskfree_rate: f64,
    config: &AnalyticsConfig,
) -> Result<RiskRatio> {
    let rate = rate_of_return(series, range, freq, config)?;
    let vol = volatility(series, range, weighting, config);

    Ok(RiskRatio::new(rate, vol, riskfree_rate, config.result_decimals()))
}

/// Excess return per unit of downside volatility over `range`.
pub fn sortino_ratio(
    series: &PriceSeries,
    range: ResolvedRange,
    freq: FrequencyDays,
    weighting: Weighting,
    riskfree_rate: f64,
    config: &AnalyticsConfig,
) -> Result<RiskRatio> {
    let rate = rate_of_return(series, range, freq, config)?;
    let vol = downside_volatility(series, range, weighting, config);

    Ok(RiskRatio::new(rate, vol, riskfree_rate, config.result_decimals()))
}
