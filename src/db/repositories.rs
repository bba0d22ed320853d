use async_trait::async_trait;

use super::{error::Result, models::PricePointRow};

/// Source of stored price time series, keyed by asset code and price type.
#[async_trait]
pub trait PriceSeriesRepository: Send + Sync {
    /// Returns every stored observation for the pair, in ascending date order. An unknown pair
    /// yields an empty vector.
    async fn get_price_series(
        &self,
        asset_code: &str,
        price_type: &str,
    ) -> Result<Vec<PricePointRow>>;

    async fn has_series(&self, asset_code: &str, price_type: &str) -> Result<bool>;
}
