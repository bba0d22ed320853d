use std::collections::HashMap;

use async_trait::async_trait;

use crate::db::{
    PriceSeriesRepository,
    error::{DbError, Result as DbResult},
    models::PricePointRow,
};

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[derive(Default)]
struct MemoryRepo {
    series: HashMap<(String, String), Vec<PricePointRow>>,
}

impl MemoryRepo {
    fn with_series(
        mut self,
        asset_code: &str,
        price_type: &str,
        points: &[(NaiveDate, f64)],
    ) -> Self {
        let rows = points
            .iter()
            .map(|(date, price)| PricePointRow::new(*date, *price))
            .collect();
        self.series
            .insert((asset_code.to_string(), price_type.to_string()), rows);
        self
    }
}

#[async_trait]
impl PriceSeriesRepository for MemoryRepo {
    async fn get_price_series(
        &self,
        asset_code: &str,
        price_type: &str,
    ) -> DbResult<Vec<PricePointRow>> {
        Ok(self
            .series
            .get(&(asset_code.to_string(), price_type.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn has_series(&self, asset_code: &str, price_type: &str) -> DbResult<bool> {
        Ok(self
            .series
            .contains_key(&(asset_code.to_string(), price_type.to_string())))
    }
}

struct UnreachableRepo;

#[async_trait]
impl PriceSeriesRepository for UnreachableRepo {
    async fn get_price_series(&self, _: &str, _: &str) -> DbResult<Vec<PricePointRow>> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }

    async fn has_series(&self, _: &str, _: &str) -> DbResult<bool> {
        Err(DbError::Query(sqlx::Error::PoolTimedOut))
    }
}

/// Daily prices from 2019-01-01 through 2021-01-15, trending up with a zig-zag.
fn daily_points() -> Vec<(NaiveDate, f64)> {
    date(2019, 1, 1)
        .iter_days()
        .take_while(|d| *d <= date(2021, 1, 15))
        .enumerate()
        .map(|(i, d)| {
            let zig = if i % 2 == 0 { 1. } else { 0. };
            (d, 100. + i as f64 * 0.1 + zig)
        })
        .collect()
}

fn scenario_points() -> Vec<(NaiveDate, f64)> {
    [1., 1., 5., 3., 4., 3., 2., 5.]
        .into_iter()
        .enumerate()
        .map(|(i, price)| (date(2021, 1, i as u32 + 1), price))
        .collect()
}

fn analytics() -> PerformanceAnalytics {
    let repo = MemoryRepo::default()
        .with_series("X", "PR", &[(date(2021, 1, 1), 100.), (date(2021, 1, 2), 110.)])
        .with_series("DAILY", "PR", &daily_points())
        .with_series("FLAT", "PR", &[
            (date(2021, 1, 1), 50.),
            (date(2021, 1, 2), 50.),
            (date(2021, 1, 3), 50.),
        ])
        .with_series("DD", "TR", &scenario_points());

    PerformanceAnalytics::new(Database::with_repository(Box::new(repo)))
}

fn kinds(errors: &[Option<ItemError>]) -> Vec<Option<ErrorKind>> {
    errors.iter().map(|e| e.as_ref().map(|e| e.kind)).collect()
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn mismatched_period_arrays_fail_the_batch() {
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period_starts([Some("1Y"), Some("2W"), Some("6M")])
            .with_period_ends([Some("Latest"), Some("Latest")]);

        let err = analytics()
            .historical_returns(&batch, None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MismatchedArrayLengths);
        assert!(err.kind().is_batch_fatal());
    }

    #[tokio::test]
    async fn mismatched_ranks_fail_the_batch() {
        let batch = PeriodBatch::new("DD", "TR").with_period("Inception", "Latest");

        let err = analytics()
            .historical_drawdowns(&batch, &[Some(1), Some(2)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BatchError::MismatchedArrayLengths { ref lengths } if lengths.contains(&("ranks", 2))
        ));
    }

    #[tokio::test]
    async fn currency_is_unsupported() {
        let batch = PeriodBatch::new("X", "PR")
            .with_currency("EUR")
            .with_period("Inception", "Latest");

        let err = analytics()
            .historical_volatility(&batch, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    }

    #[tokio::test]
    async fn unknown_pair() {
        let batch = PeriodBatch::new("X", "TR").with_period("Inception", "Latest");

        let err = analytics()
            .historical_returns(&batch, None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownAssetOrPriceType);
    }

    #[tokio::test]
    async fn database_failures_are_surfaced() {
        let db = Database::with_repository(Box::new(UnreachableRepo));
        let analytics = PerformanceAnalytics::new(db);
        let batch = PeriodBatch::new("X", "PR").with_period("Inception", "Latest");

        let err = analytics
            .historical_returns(&batch, None, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Database);
    }

    #[tokio::test]
    async fn database_reports_stored_pairs() {
        let repo = MemoryRepo::default().with_series("X", "PR", &scenario_points());
        let db = Database::with_repository(Box::new(repo));

        assert!(db.has_price_series("X", "PR").await.unwrap());
        assert!(!db.has_price_series("X", "TR").await.unwrap());
        assert!(db.price_series("X", "TR").await.unwrap().is_none());
        assert_eq!(db.price_series("X", "PR").await.unwrap().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_table() {
        let batch = PeriodBatch::new("X", "PR");

        let table = analytics()
            .historical_returns(&batch, None, None)
            .await
            .unwrap();

        assert!(table.rate_of_return.is_empty());
        assert!(table.errors.is_empty());
    }

    #[tokio::test]
    async fn panicking_item_is_isolated() {
        let analytics = analytics();
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period("1Y", "Latest")
            .with_period("6M", "Latest")
            .with_period("1M", "Latest");
        let series = analytics.load("days", &batch, None).await.unwrap();

        let results = analytics.run_items("days", &batch, &series, |index, range| {
            if index == 1 {
                panic!("item {index} exploded");
            }
            Ok(range.days())
        });
        let (days, errors) = columns(results);

        assert!(days[0].is_some());
        assert_eq!(days[1], None);
        assert!(days[2].is_some());
        assert_eq!(kinds(&errors), vec![None, Some(ErrorKind::Panicked), None]);
        assert!(errors[1].as_ref().unwrap().message.contains("item 1 exploded"));
    }
}

mod returns {
    use super::*;

    #[tokio::test]
    async fn inception_to_latest_without_normalization() {
        let batch = PeriodBatch::new("X", "PR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_returns(&batch, Some("NA"), None)
            .await
            .unwrap();

        assert_eq!(table.rate_of_return, vec![Some(0.1)]);
        assert_eq!(table.errors, vec![None]);
    }

    #[tokio::test]
    async fn failing_items_are_null_in_place() {
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period_starts([Some("1Y"), Some("balgham"), Some("6M")])
            .with_period_ends([Some("Latest"), Some("Latest"), Some("Latest")]);

        let table = analytics()
            .historical_returns(&batch, None, None)
            .await
            .unwrap();

        assert!(table.rate_of_return[0].is_some());
        assert!(table.rate_of_return[1].is_none());
        assert!(table.rate_of_return[2].is_some());
        assert_eq!(
            kinds(&table.errors),
            vec![None, Some(ErrorKind::InvalidStartExpression), None]
        );
    }

    #[tokio::test]
    async fn missing_expressions() {
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period_starts([None, Some("2W")])
            .with_period_ends([Some("Latest"), None]);

        let table = analytics()
            .historical_returns(&batch, Some("NA"), None)
            .await
            .unwrap();

        assert_eq!(
            kinds(&table.errors),
            vec![Some(ErrorKind::MissingStartExpression), None]
        );
        assert!(table.rate_of_return[1].is_some());
    }

    #[tokio::test]
    async fn invalid_frequency_fails_every_item() {
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period("1Y", "Latest")
            .with_period("6M", "Latest");

        let table = analytics()
            .historical_returns(&batch, Some("yearly"), None)
            .await
            .unwrap();

        assert_eq!(table.rate_of_return, vec![None, None]);
        assert_eq!(
            kinds(&table.errors),
            vec![Some(ErrorKind::InvalidFrequency); 2]
        );
    }

    #[tokio::test]
    async fn dollar_returns_scale_by_amount() {
        let batch = PeriodBatch::new("X", "PR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_returns_dollar(&batch, 2500., Some("NA"), None)
            .await
            .unwrap();

        assert_eq!(table.rate_of_return, vec![Some(250.)]);
    }

    #[tokio::test]
    async fn table_serializes_column_oriented() {
        let batch = PeriodBatch::new("X", "PR")
            .with_period("Inception", "Latest")
            .with_period("Latest", "Latest");

        let table = analytics()
            .historical_returns(&batch, Some("NA"), None)
            .await
            .unwrap();

        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json["rate_of_return"], serde_json::json!([0.1, null]));
        assert_eq!(json["errors"][0], serde_json::Value::Null);
        assert_eq!(json["errors"][1]["kind"], "InvalidStartExpression");
    }
}

mod volatility {
    use super::*;

    #[tokio::test]
    async fn constant_prices_have_zero_volatility() {
        let batch = PeriodBatch::new("FLAT", "PR").with_period("Inception", "Latest");
        let analytics = analytics();

        let equal = analytics.historical_volatility(&batch, None).await.unwrap();
        let weighted = analytics
            .historical_volatility(&batch, Some(0.94))
            .await
            .unwrap();

        assert_eq!(equal.volatility, vec![Some(0.)]);
        assert_eq!(weighted.volatility, vec![Some(0.)]);
    }

    #[tokio::test]
    async fn invalid_lambda_factor_is_reported_per_item() {
        let batch = PeriodBatch::new("DAILY", "PR")
            .with_period("1Y", "Latest")
            .with_period("2W", "Latest");

        let table = analytics()
            .historical_volatility(&batch, Some(1.5))
            .await
            .unwrap();

        assert_eq!(table.volatility, vec![None, None]);
        assert_eq!(
            kinds(&table.errors),
            vec![Some(ErrorKind::InvalidLambdaFactor); 2]
        );
    }

    #[tokio::test]
    async fn zig_zag_prices_are_volatile() {
        let batch = PeriodBatch::new("DAILY", "PR").with_period("6M", "Latest");

        let table = analytics()
            .historical_volatility(&batch, None)
            .await
            .unwrap();

        assert!(table.volatility[0].unwrap() > 0.);
    }
}

mod ratios {
    use super::*;

    #[tokio::test]
    async fn sharpe_columns_agree_with_single_operations() {
        let batch = PeriodBatch::new("DAILY", "PR").with_period("1Y", "Latest");
        let analytics = analytics();

        let returns = analytics
            .historical_returns(&batch, None, None)
            .await
            .unwrap();
        let volatility = analytics.historical_volatility(&batch, None).await.unwrap();
        let sharpe = analytics
            .historical_sharpe_ratio(&batch, None, None, None, Some(0.02))
            .await
            .unwrap();

        let rate = returns.rate_of_return[0].unwrap();
        let vol = volatility.volatility[0].unwrap();

        assert_eq!(sharpe.rate_of_return, vec![Some(rate)]);
        assert_eq!(sharpe.volatility, vec![Some(vol)]);
        assert_eq!(
            sharpe.sharpe_ratio,
            vec![Some(crate::util::round_dp((rate - 0.02) / vol, 6))]
        );
    }

    #[tokio::test]
    async fn zero_volatility_nulls_only_the_ratio() {
        let batch = PeriodBatch::new("FLAT", "PR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_sharpe_ratio(&batch, None, None, None, None)
            .await
            .unwrap();

        assert_eq!(table.sharpe_ratio, vec![None]);
        assert_eq!(table.rate_of_return, vec![Some(0.)]);
        assert_eq!(table.volatility, vec![Some(0.)]);
        assert_eq!(kinds(&table.errors), vec![Some(ErrorKind::ZeroVolatility)]);
    }

    #[tokio::test]
    async fn sortino_reports_downside_volatility() {
        let batch = PeriodBatch::new("DAILY", "PR").with_period("1Y", "Latest");
        let analytics = analytics();

        let sharpe = analytics
            .historical_sharpe_ratio(&batch, None, None, None, None)
            .await
            .unwrap();
        let sortino = analytics
            .historical_sortino_ratio(&batch, None, None, None, None)
            .await
            .unwrap();

        assert_eq!(sortino.rate_of_return, sharpe.rate_of_return);
        assert!(sortino.downside_volatility[0].unwrap() > 0.);
        assert_ne!(sortino.downside_volatility, sharpe.volatility);
    }

    #[tokio::test]
    async fn sortino_without_losses() {
        let batch = PeriodBatch::new("X", "PR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_sortino_ratio(&batch, None, None, None, None)
            .await
            .unwrap();

        assert_eq!(table.sortino_ratio, vec![None]);
        assert_eq!(table.rate_of_return, vec![Some(0.1)]);
        assert_eq!(table.downside_volatility, vec![None]);
        assert_eq!(kinds(&table.errors), vec![Some(ErrorKind::NoDownsidePeriods)]);
    }
}

mod drawdowns {
    use super::*;

    #[tokio::test]
    async fn deepest_drawdown_of_scenario_series() {
        let batch = PeriodBatch::new("DD", "TR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_drawdowns(&batch, &[Some(1)])
            .await
            .unwrap();

        assert_eq!(table.drawdown_start, vec![Some(date(2021, 1, 3))]);
        assert_eq!(table.drawdown_end, vec![Some(date(2021, 1, 7))]);
        assert_eq!(table.drawdown_performance, vec![Some(-0.6)]);
        assert_eq!(table.recovery_days, vec![Some(1)]);
    }

    #[tokio::test]
    async fn ranks_default_to_one_and_must_be_positive() {
        let batch = PeriodBatch::new("DD", "TR")
            .with_period("Inception", "Latest")
            .with_period("Inception", "Latest")
            .with_period("Inception", "Latest");

        let table = analytics()
            .historical_drawdowns(&batch, &[None, Some(0), Some(3)])
            .await
            .unwrap();

        assert_eq!(table.drawdown_end[0], Some(date(2021, 1, 7)));
        assert_eq!(
            kinds(&table.errors),
            vec![
                None,
                Some(ErrorKind::RankNotFound),
                Some(ErrorKind::RankNotFound)
            ]
        );
    }

    #[tokio::test]
    async fn monotonic_series_has_no_drawdown() {
        let batch = PeriodBatch::new("X", "PR").with_period("Inception", "Latest");

        let table = analytics()
            .historical_drawdowns(&batch, &[Some(1)])
            .await
            .unwrap();

        assert_eq!(table.drawdown_performance, vec![None]);
        assert_eq!(kinds(&table.errors), vec![Some(ErrorKind::RankNotFound)]);
    }
}
