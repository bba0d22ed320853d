use std::result;

use thiserror::Error;

use crate::{db::error::DbError, shared::ErrorKind};

/// Failures that abort a whole batch call. Per-item failures are reported in the `errors` column
/// of the returned table instead.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("{feature} is not supported")]
    UnsupportedFeature { feature: &'static str },

    #[error("Input arrays must have equal lengths, got {lengths:?}")]
    MismatchedArrayLengths { lengths: Vec<(&'static str, usize)> },

    #[error("No price series stored for asset `{asset_code}` and price type `{price_type}`")]
    UnknownAssetOrPriceType {
        asset_code: String,
        price_type: String,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl BatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Self::MismatchedArrayLengths { .. } => ErrorKind::MismatchedArrayLengths,
            Self::UnknownAssetOrPriceType { .. } => ErrorKind::UnknownAssetOrPriceType,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

pub type Result<T> = result::Result<T, BatchError>;
