use std::result;

use chrono::NaiveDate;
use thiserror::Error;

use crate::shared::ErrorKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("Period start is required")]
    MissingStartExpression,

    #[error("Period start `{0}` is not a date, offset or `Inception`")]
    InvalidStartExpression(String),

    #[error("Period end `{0}` is not a date, offset or `Latest`")]
    InvalidEndExpression(String),

    #[error("Price series is empty")]
    EmptySeries,

    #[error("No data found on or after end date {requested}, latest observation is {latest}")]
    NoDataAfterEnd {
        requested: NaiveDate,
        latest: NaiveDate,
    },

    #[error("No data found on or before end date {requested}, earliest observation is {earliest}")]
    NoDataBeforeEnd {
        requested: NaiveDate,
        earliest: NaiveDate,
    },

    #[error("No data found prior to start date {requested}, earliest observation is {earliest}")]
    NoDataBeforeStart {
        requested: NaiveDate,
        earliest: NaiveDate,
    },

    #[error("Period start {start} must be before period end {end}")]
    StartNotBeforeEnd { start: NaiveDate, end: NaiveDate },
}

impl PeriodError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingStartExpression => ErrorKind::MissingStartExpression,
            Self::InvalidStartExpression(_) => ErrorKind::InvalidStartExpression,
            Self::InvalidEndExpression(_) => ErrorKind::InvalidEndExpression,
            Self::EmptySeries => ErrorKind::InsufficientData,
            Self::NoDataAfterEnd { .. } => ErrorKind::NoDataAfterEnd,
            Self::NoDataBeforeEnd { .. } => ErrorKind::NoDataBeforeEnd,
            Self::NoDataBeforeStart { .. } => ErrorKind::NoDataBeforeStart,
            Self::StartNotBeforeEnd { .. } => ErrorKind::StartNotBeforeEnd,
        }
    }
}

pub type Result<T> = result::Result<T, PeriodError>;
