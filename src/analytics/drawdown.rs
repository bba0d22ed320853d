use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    config::AnalyticsConfig,
    period::ResolvedRange,
    series::PriceSeries,
    shared::DrawdownRank,
    util::{DateExt, round_dp},
};

use super::error::{AnalyticsError, Result};

/// Sentinel recovery length for drawdowns whose peak is never exceeded in the available data.
pub const NOT_RECOVERED: i64 = -1;

/// The deepest point reached below one running peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawdownRecord {
    peak_date: NaiveDate,
    trough_date: NaiveDate,
    performance: f64,
    recovery_days: i64,
}

impl DrawdownRecord {
    /// Date of the running peak the drawdown is measured from.
    pub fn peak_date(&self) -> NaiveDate {
        self.peak_date
    }

    pub fn trough_date(&self) -> NaiveDate {
        self.trough_date
    }

    /// Trough value relative to the peak, minus one. Always negative.
    pub fn performance(&self) -> f64 {
        self.performance
    }

    /// Calendar days from the trough until a new running peak is set, or [`NOT_RECOVERED`].
    pub fn recovery_days(&self) -> i64 {
        self.recovery_days
    }

    pub fn is_recovered(&self) -> bool {
        self.recovery_days != NOT_RECOVERED
    }
}

struct Underwater {
    date: NaiveDate,
    peak_date: NaiveDate,
    drawdown: f64,
}

/// Drawdown of every observation from the start of `range` onwards, against its running peak.
///
/// A new peak is set whenever the cumulative return meets or exceeds the running maximum.
fn underwater_curve(series: &PriceSeries, range: ResolvedRange) -> Vec<Underwater> {
    let points = series.since(range.start());
    let Some(base) = points.first().map(|point| point.price) else {
        return Vec::new();
    };

    let mut peak = f64::NEG_INFINITY;
    let mut peak_date = range.start();

    points
        .iter()
        .map(|point| {
            let cum_return = point.price / base;
            if cum_return >= peak {
                peak = cum_return;
                peak_date = point.date;
            }

            Underwater {
                date: point.date,
                peak_date,
                drawdown: cum_return / peak - 1.,
            }
        })
        .collect()
}

/// All drawdowns within `range`, deepest first.
///
/// Each running peak contributes at most one drawdown, its trough. Recovery is measured against
/// data after the end of `range` too.
pub fn drawdowns(
    series: &PriceSeries,
    range: ResolvedRange,
    config: &AnalyticsConfig,
) -> Vec<DrawdownRecord> {
    let curve = underwater_curve(series, range);

    let mut peaks: Vec<NaiveDate> = curve.iter().map(|row| row.peak_date).collect();
    peaks.dedup();
    let next_peak: HashMap<NaiveDate, NaiveDate> = peaks
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    let mut troughs: Vec<&Underwater> = Vec::new();
    for row in curve.iter().filter(|row| row.date <= range.end()) {
        if row.drawdown.is_nan() || row.drawdown >= 0. {
            continue;
        }

        match troughs.last_mut() {
            Some(trough) if trough.peak_date == row.peak_date => {
                if row.drawdown < trough.drawdown {
                    *trough = row;
                }
            }
            _ => troughs.push(row),
        }
    }

    troughs.sort_by(|a, b| a.drawdown.total_cmp(&b.drawdown));

    troughs
        .into_iter()
        .map(|trough| DrawdownRecord {
            peak_date: trough.peak_date,
            trough_date: trough.date,
            performance: round_dp(trough.drawdown, config.result_decimals()),
            recovery_days: next_peak
                .get(&trough.peak_date)
                .map_or(NOT_RECOVERED, |recovered| trough.date.days_until(recovered)),
        })
        .collect()
}

/// The drawdown at `rank` within `range`, where rank 1 is the deepest.
pub fn drawdown(
    series: &PriceSeries,
    range: ResolvedRange,
    rank: DrawdownRank,
    config: &AnalyticsConfig,
) -> Result<DrawdownRecord> {
    let mut all = drawdowns(series, range, config);
    let available = all.len();

    if rank.as_index() >= available {
        return Err(AnalyticsError::RankNotFound {
            rank: rank.as_usize(),
            available,
        });
    }

    Ok(all.swap_remove(rank.as_index()))
}
