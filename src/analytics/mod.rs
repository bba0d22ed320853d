//! Return, volatility, risk-ratio and drawdown engines.
//!
//! Every engine works on an already-loaded [`PriceSeries`](crate::series::PriceSeries) and an
//! already-resolved [`ResolvedRange`](crate::period::ResolvedRange), and rounds the figures it
//! reports to the configured number of decimals.

pub(crate) mod error;

mod drawdown;
mod ratios;
mod returns;
mod volatility;

pub use drawdown::{DrawdownRecord, NOT_RECOVERED, drawdown, drawdowns};
pub use ratios::{RiskRatio, sharpe_ratio, sortino_ratio};
pub use returns::{dollar_return, rate_of_return};
pub use volatility::{Weighting, downside_volatility, volatility};
