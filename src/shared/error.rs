use thiserror::Error;

use super::DrawdownRank;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LambdaFactorValidationError {
    #[error("Invalid lambda factor, must be a finite number, got {value}")]
    NotFinite { value: f64 },

    #[error("Invalid lambda factor, must be strictly between 0 and 1, got {value}")]
    OutOfRange { value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawdownRankValidationError {
    #[error("Invalid drawdown rank, must be at least {}, got {value}", DrawdownRank::MIN)]
    TooLow { value: i64 },
}
