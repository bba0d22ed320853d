use std::result;

use thiserror::Error;

use crate::shared::ErrorKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrequencyError {
    #[error("Normalization frequency `{0}` must be `NA` or `<n><D|W|M|Q|Y>` with n > 0")]
    InvalidNormalization(String),

    #[error("Compounding frequency `{0}` must be `<n><D|W|M|Q|Y>` with n > 0")]
    InvalidCompounding(String),
}

impl FrequencyError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidFrequency
    }
}

pub type Result<T> = result::Result<T, FrequencyError>;
