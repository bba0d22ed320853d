use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::super::{
    error::{DbError, Result},
    models::PricePointRow,
    repositories::PriceSeriesRepository,
};

pub(crate) struct PgTimeSeriesRepo {
    pool: Arc<Pool<Postgres>>,
}

impl PgTimeSeriesRepo {
    pub fn new(pool: Arc<Pool<Postgres>>) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &Pool<Postgres> {
        self.pool.as_ref()
    }
}

#[async_trait]
impl PriceSeriesRepository for PgTimeSeriesRepo {
    async fn get_price_series(
        &self,
        asset_code: &str,
        price_type: &str,
    ) -> Result<Vec<PricePointRow>> {
        sqlx::query_as::<_, PricePointRow>(
            r#"
                SELECT date, price
                FROM time_series
                WHERE asset_code = $1 AND price_type = $2
                ORDER BY date ASC
            "#,
        )
        .bind(asset_code)
        .bind(price_type)
        .fetch_all(self.pool())
        .await
        .map_err(DbError::Query)
    }

    async fn has_series(&self, asset_code: &str, price_type: &str) -> Result<bool> {
        let (exists,) = sqlx::query_as::<_, (bool,)>(
            r#"
                SELECT EXISTS (
                    SELECT 1 FROM time_series WHERE asset_code = $1 AND price_type = $2
                )
            "#,
        )
        .bind(asset_code)
        .bind(price_type)
        .fetch_one(self.pool())
        .await
        .map_err(DbError::Query)?;

        Ok(exists)
    }
}
