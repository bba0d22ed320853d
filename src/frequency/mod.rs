use std::fmt;

use crate::{config::AnalyticsConfig, period::Offset};

pub(crate) mod error;

use error::{FrequencyError, Result};

/// Normalization expression that disables annualization of returns.
pub const NO_NORMALIZATION: &str = "NA";

/// A strictly positive frequency such as `1Y` or `3M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frequency(Offset);

impl Frequency {
    fn parse(expr: &str) -> Option<Self> {
        Offset::parse(expr)
            .filter(|offset| offset.value() > 0)
            .map(Self)
    }

    pub fn offset(&self) -> Offset {
        self.0
    }

    pub fn days(&self, days_per_year: f64) -> f64 {
        self.0.days(days_per_year)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Normalization and compounding periods expressed in days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyDays {
    normalization: Option<f64>,
    compounding: f64,
}

impl FrequencyDays {
    /// Days in the normalization period, or `None` when returns are reported unannualized.
    pub fn normalization(&self) -> Option<f64> {
        self.normalization
    }

    pub fn compounding(&self) -> f64 {
        self.compounding
    }
}

/// Resolves normalization and compounding expressions into day counts.
///
/// Unset expressions fall back to the configured defaults. `NA` is only meaningful as a
/// normalization; the compounding expression is validated even when normalization is `NA`.
pub fn resolve(
    normalization: Option<&str>,
    compounding: Option<&str>,
    config: &AnalyticsConfig,
) -> Result<FrequencyDays> {
    let normalization = normalization.unwrap_or(config.default_normalization());
    let compounding = compounding.unwrap_or(config.default_compounding());

    let compounding = Frequency::parse(compounding)
        .ok_or_else(|| FrequencyError::InvalidCompounding(compounding.to_string()))?;

    let normalization = if normalization.trim() == NO_NORMALIZATION {
        None
    } else {
        let freq = Frequency::parse(normalization)
            .ok_or_else(|| FrequencyError::InvalidNormalization(normalization.to_string()))?;
        Some(freq)
    };

    let days_per_year = config.days_per_year();

    Ok(FrequencyDays {
        normalization: normalization.map(|freq| freq.days(days_per_year)),
        compounding: compounding.days(days_per_year),
    })
}
