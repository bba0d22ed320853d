use std::num::NonZeroU32;

/// Configuration shared by the analytics engines and the batch runner.
#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    trading_days_per_year: NonZeroU32,
    days_per_year: f64,
    result_decimals: u32,
    default_normalization: String,
    default_compounding: String,
    max_db_connections: NonZeroU32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252.try_into().expect("not zero"),
            days_per_year: 365.25,
            result_decimals: 6,
            default_normalization: "1Y".to_string(),
            default_compounding: "1Y".to_string(),
            max_db_connections: 5.try_into().expect("not zero"),
        }
    }
}

impl AnalyticsConfig {
    /// Returns the number of trading days used to annualize volatility.
    pub fn trading_days_per_year(&self) -> NonZeroU32 {
        self.trading_days_per_year
    }

    /// Returns the number of calendar days in a year, used to convert frequency expressions
    /// into day counts.
    pub fn days_per_year(&self) -> f64 {
        self.days_per_year
    }

    /// Returns the number of decimal places every reported figure is rounded to.
    pub fn result_decimals(&self) -> u32 {
        self.result_decimals
    }

    /// Returns the normalization frequency used when a request leaves it unset.
    pub fn default_normalization(&self) -> &str {
        &self.default_normalization
    }

    /// Returns the compounding frequency used when a request leaves it unset.
    pub fn default_compounding(&self) -> &str {
        &self.default_compounding
    }

    /// Returns the maximum size of the PostgreSQL connection pool.
    pub fn max_db_connections(&self) -> NonZeroU32 {
        self.max_db_connections
    }

    /// Sets the number of trading days used to annualize volatility.
    ///
    /// Default: `252`
    pub fn with_trading_days_per_year(mut self, days: NonZeroU32) -> Self {
        self.trading_days_per_year = days;
        self
    }

    /// Sets the number of calendar days in a year. Non-finite or non-positive values are
    /// ignored.
    ///
    /// Default: `365.25`
    pub fn with_days_per_year(mut self, days: f64) -> Self {
        if days.is_finite() && days > 0. {
            self.days_per_year = days;
        }
        self
    }

    /// Sets the number of decimal places reported figures are rounded to.
    ///
    /// Default: `6`
    pub fn with_result_decimals(mut self, decimals: u32) -> Self {
        self.result_decimals = decimals;
        self
    }

    /// Sets the normalization frequency used when a request leaves it unset.
    ///
    /// Default: `"1Y"`
    pub fn with_default_normalization(mut self, freq: impl Into<String>) -> Self {
        self.default_normalization = freq.into();
        self
    }

    /// Sets the compounding frequency used when a request leaves it unset.
    ///
    /// Default: `"1Y"`
    pub fn with_default_compounding(mut self, freq: impl Into<String>) -> Self {
        self.default_compounding = freq.into();
        self
    }

    /// Sets the maximum size of the PostgreSQL connection pool.
    ///
    /// Default: `5`
    pub fn with_max_db_connections(mut self, connections: NonZeroU32) -> Self {
        self.max_db_connections = connections;
        self
    }
}
