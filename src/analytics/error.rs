use std::result;

use chrono::NaiveDate;
use thiserror::Error;

use crate::{
    frequency::error::FrequencyError,
    period::error::PeriodError,
    shared::{
        ErrorKind,
        error::{DrawdownRankValidationError, LambdaFactorValidationError},
    },
    util::PanicPayload,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    Frequency(#[from] FrequencyError),

    #[error(transparent)]
    InvalidLambdaFactor(#[from] LambdaFactorValidationError),

    #[error(transparent)]
    InvalidRank(#[from] DrawdownRankValidationError),

    #[error("Period from {start} to {end} spans zero days")]
    ZeroPeriodLength { start: NaiveDate, end: NaiveDate },

    #[error("No price observed on {0}")]
    MissingObservation(NaiveDate),

    #[error("At least two observations are required, got {observations}")]
    InsufficientData { observations: usize },

    #[error("No period with a negative return between {start} and {end}")]
    NoDownsidePeriods { start: NaiveDate, end: NaiveDate },

    #[error("Volatility is zero, ratio is undefined")]
    ZeroVolatility,

    #[error("Drawdown rank {rank} not found, {available} drawdowns available")]
    RankNotFound { rank: usize, available: usize },

    #[error("Computation panicked: {0}")]
    Panicked(PanicPayload),
}

impl AnalyticsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Period(e) => e.kind(),
            Self::Frequency(e) => e.kind(),
            Self::InvalidLambdaFactor(_) => ErrorKind::InvalidLambdaFactor,
            Self::InvalidRank(_) => ErrorKind::RankNotFound,
            Self::ZeroPeriodLength { .. } => ErrorKind::ZeroPeriodLength,
            Self::MissingObservation(_) => ErrorKind::InsufficientData,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::NoDownsidePeriods { .. } => ErrorKind::NoDownsidePeriods,
            Self::ZeroVolatility => ErrorKind::ZeroVolatility,
            Self::RankNotFound { .. } => ErrorKind::RankNotFound,
            Self::Panicked(_) => ErrorKind::Panicked,
        }
    }
}

pub type Result<T> = result::Result<T, AnalyticsError>;
