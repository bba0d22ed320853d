use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::debug;

use crate::{config::AnalyticsConfig, series::PriceSeries};

pub(crate) mod error;
pub(crate) mod models;
mod postgres;
mod repositories;

use error::{DbError, Result};
use postgres::time_series::PgTimeSeriesRepo;

pub use repositories::PriceSeriesRepository;

/// Primary interface for loading stored price time series.
///
/// Backed by PostgreSQL with automatic migrations, or by any other [`PriceSeriesRepository`]
/// implementation via [`Database::with_repository`].
pub struct Database {
    pub(crate) time_series: Box<dyn PriceSeriesRepository>,
}

impl Database {
    /// Creates a new database instance and runs migrations.
    ///
    /// Establishes a connection pool to the PostgreSQL database, sized by
    /// [`AnalyticsConfig::max_db_connections`], and applies any pending migrations.
    pub async fn new(postgres_db_url: &str, config: &AnalyticsConfig) -> Result<Arc<Self>> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_db_connections().get())
            .connect(postgres_db_url)
            .await
            .map_err(DbError::Connection)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::Migration)?;

        let pool = Arc::new(pool);
        let time_series = Box::new(PgTimeSeriesRepo::new(pool));

        Ok(Arc::new(Self { time_series }))
    }

    /// Creates a database instance over a custom price-series source.
    pub fn with_repository(time_series: Box<dyn PriceSeriesRepository>) -> Arc<Self> {
        Arc::new(Self { time_series })
    }

    /// Loads the price series for the pair, or `None` if nothing is stored for it.
    pub async fn price_series(
        &self,
        asset_code: &str,
        price_type: &str,
    ) -> Result<Option<PriceSeries>> {
        let rows = self
            .time_series
            .get_price_series(asset_code, price_type)
            .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let row_count = rows.len();
        let series: PriceSeries = rows.into_iter().collect();

        debug!(
            asset_code,
            price_type,
            rows = row_count,
            observations = series.len(),
            "loaded price series"
        );

        Ok(Some(series))
    }

    /// Returns `true` if any observation is stored for the pair.
    pub async fn has_price_series(&self, asset_code: &str, price_type: &str) -> Result<bool> {
        self.time_series.has_series(asset_code, price_type).await
    }
}
