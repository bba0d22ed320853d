use std::{fmt, num::NonZeroUsize, result::Result};

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

pub mod error;

use error::{DrawdownRankValidationError, LambdaFactorValidationError};

/// Flat classification of every failure surfaced by `perfolio`.
///
/// Module error enums carry context (offending expression, dates, ranks); [`ErrorKind`] is what
/// callers match on when they only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize)]
pub enum ErrorKind {
    InvalidStartExpression,
    InvalidEndExpression,
    MissingStartExpression,
    NoDataAfterEnd,
    NoDataBeforeEnd,
    NoDataBeforeStart,
    StartNotBeforeEnd,
    InvalidFrequency,
    ZeroPeriodLength,
    InsufficientData,
    InvalidLambdaFactor,
    NoDownsidePeriods,
    ZeroVolatility,
    RankNotFound,
    UnknownAssetOrPriceType,
    MismatchedArrayLengths,
    UnsupportedFeature,
    Database,
    Panicked,
}

impl ErrorKind {
    /// Returns `true` for kinds that abort a whole batch call rather than a single item.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownAssetOrPriceType
                | Self::MismatchedArrayLengths
                | Self::UnsupportedFeature
                | Self::Database
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{name}")
    }
}

/// Validated decay factor for exponentially-weighted volatility.
///
/// Weights are assigned in reverse chronological order as `(1 - λ) · λ^i`, with `i = 0` at the
/// most recent return. Must be strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LambdaFactor(f64);

impl LambdaFactor {
    /// Returns the factor as an `f64`.
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Returns the weight for the return `age` steps before the most recent one.
    pub fn weight(&self, age: usize) -> f64 {
        (1. - self.0) * self.0.powi(age as i32)
    }
}

impl TryFrom<f64> for LambdaFactor {
    type Error = LambdaFactorValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(LambdaFactorValidationError::NotFinite { value });
        }

        if value <= 0. || value >= 1. {
            return Err(LambdaFactorValidationError::OutOfRange { value });
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for LambdaFactor {
    type Error = LambdaFactorValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::try_from(value as f64)
    }
}

impl fmt::Display for LambdaFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 1-based drawdown rank, where rank 1 is the largest-magnitude drawdown.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct DrawdownRank(NonZeroUsize);

impl DrawdownRank {
    /// The largest drawdown.
    pub const MIN: Self = Self(NonZeroUsize::MIN);

    /// Returns the rank as a `usize`.
    pub fn as_usize(&self) -> usize {
        self.0.get()
    }

    /// Returns the 0-based position of this rank in a sorted drawdown list.
    pub fn as_index(&self) -> usize {
        self.0.get() - 1
    }
}

impl Default for DrawdownRank {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u32> for DrawdownRank {
    type Error = DrawdownRankValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::try_from(value as usize)
    }
}

impl TryFrom<u64> for DrawdownRank {
    type Error = DrawdownRankValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::try_from(value as usize)
    }
}

impl TryFrom<usize> for DrawdownRank {
    type Error = DrawdownRankValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(value)
            .map(Self)
            .ok_or(DrawdownRankValidationError::TooLow {
                value: value as i64,
            })
    }
}

impl TryFrom<i32> for DrawdownRank {
    type Error = DrawdownRankValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(value as i64)
    }
}

impl TryFrom<i64> for DrawdownRank {
    type Error = DrawdownRankValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(DrawdownRankValidationError::TooLow { value });
        }

        Self::try_from(value as usize)
    }
}

impl fmt::Display for DrawdownRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
