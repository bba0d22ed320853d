use crate::{
    config::AnalyticsConfig, frequency::FrequencyDays, period::ResolvedRange,
    series::PriceSeries, util::round_dp,
};

use super::error::{AnalyticsError, Result};

/// Rate of return between the start and end of `range`.
///
/// Without normalization this is the simple return `end / start - 1`. Otherwise the growth is
/// compounded at the compounding frequency and scaled to the normalization period:
/// `((end / start)^(comp / days) - 1) * (norm / comp)`.
pub fn rate_of_return(
    series: &PriceSeries,
    range: ResolvedRange,
    freq: FrequencyDays,
    config: &AnalyticsConfig,
) -> Result<f64> {
    let start_price = series
        .price_on(range.start())
        .ok_or(AnalyticsError::MissingObservation(range.start()))?;
    let end_price = series
        .price_on(range.end())
        .ok_or(AnalyticsError::MissingObservation(range.end()))?;

    let growth = end_price / start_price;

    let Some(norm_days) = freq.normalization() else {
        return Ok(round_dp(growth - 1., config.result_decimals()));
    };

    let days = range.days();
    if days <= 0 {
        return Err(AnalyticsError::ZeroPeriodLength {
            start: range.start(),
            end: range.end(),
        });
    }

    let comp_days = freq.compounding();
    let rate = (growth.powf(comp_days / days as f64) - 1.) * (norm_days / comp_days);

    Ok(round_dp(rate, config.result_decimals()))
}

/// Scales a rate of return to a currency amount.
pub fn dollar_return(rate_of_return: f64, amount: f64, config: &AnalyticsConfig) -> f64 {
    round_dp(rate_of_return * amount, config.result_decimals())
}
