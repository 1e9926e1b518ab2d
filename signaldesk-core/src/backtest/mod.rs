//! Mock backtest engine.
//!
//! There is no price history behind a run: trades are a random walk seeded
//! from a random base price, and the result is summarized with
//! [`summarize`]. Requests are built from a board row or a saved template.

pub mod summary;

pub use summary::{
    equity_curve, summarize, BacktestResult, BacktestTrade, EquityPoint, RiskMetrics,
    RiskMetricsMode, TRADE_TIME_FORMAT,
};

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Indicator, IndicatorParams, SignalRow, Template, TradeSide};
use crate::numeric::round_dp;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

#[derive(Debug, Error, PartialEq)]
pub enum BacktestError {
    #[error("no row selected: pick a dashboard row before running a backtest")]
    MissingContext,

    #[error("initial capital must be a positive amount, got {0}")]
    InvalidCapital(f64),

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// User-editable backtest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    /// Percent of capital per trade.
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub timeframe: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl BacktestSettings {
    pub const DEFAULT_TIMEFRAME: &'static str = "1h";

    /// 10000 capital, 10% size, 2% stop, 4% target over the last 30 days.
    pub fn defaults(timeframe: Option<&str>, today: NaiveDate) -> Self {
        Self {
            initial_capital: 10_000.0,
            position_size: 10.0,
            stop_loss: 2.0,
            take_profit: 4.0,
            timeframe: timeframe.unwrap_or(Self::DEFAULT_TIMEFRAME).to_string(),
            start_date: today - Duration::days(30),
            end_date: today,
        }
    }

    pub fn validate(&self) -> Result<(), BacktestError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::InvalidCapital(self.initial_capital));
        }
        if self.start_date > self.end_date {
            return Err(BacktestError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Everything a run needs: what is being tested and with which settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    pub name: String,
    pub indicator: Indicator,
    pub indicator_params: IndicatorParams,
    pub timeframes: Vec<String>,
    pub settings: BacktestSettings,
}

impl BacktestRequest {
    /// Build from the selected board row. `None` means the backtest screen was
    /// opened without a selection.
    pub fn from_row(row: Option<&SignalRow>, today: NaiveDate) -> Result<Self, BacktestError> {
        let row = row.ok_or(BacktestError::MissingContext)?;
        let timeframes = row.timeframe_labels();
        let settings = BacktestSettings::defaults(timeframes.first().map(String::as_str), today);
        Ok(Self {
            symbol: row.symbol.clone(),
            name: row.instrument_name.clone(),
            indicator: row.indicator,
            indicator_params: row.indicator_params.clone(),
            timeframes,
            settings,
        })
    }

    pub fn from_template(template: &Template, today: NaiveDate) -> Self {
        let mut settings =
            BacktestSettings::defaults(template.timeframes.first().map(String::as_str), today);
        settings.initial_capital = template.initial_capital;
        settings.position_size = template.position_size;
        settings.stop_loss = template.stop_loss;
        settings.take_profit = template.take_profit;
        Self {
            symbol: template.symbol.clone(),
            name: template.symbol_name.clone(),
            indicator: template.indicator,
            indicator_params: template.indicator_params.clone(),
            timeframes: template.timeframes.clone(),
            settings,
        }
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

fn random_minutes<R: Rng + ?Sized>(rng: &mut R, days: f64) -> Duration {
    Duration::minutes((rng.gen::<f64>() * days * MINUTES_PER_DAY) as i64)
}

/// Random-walk trade list ending around `as_of`.
///
/// Between 20 and 69 trades. Each entry sits within ±10 of the running base
/// price; the move is `(U - 0.4) * 10` in the trade's favour, so winners are
/// slightly more likely. The base price follows each exit.
pub fn generate_trades<R: Rng + ?Sized>(rng: &mut R, as_of: NaiveDateTime) -> Vec<BacktestTrade> {
    let as_of = truncate_to_minute(as_of);
    let count = rng.gen_range(20..70);
    let mut base_price = rng.gen::<f64>() * 1000.0 + 100.0;
    let mut trades = Vec::with_capacity(count);

    for i in 0..count {
        let entry_date = as_of - random_minutes(rng, 30.0);
        let exit_date = entry_date + random_minutes(rng, 5.0);
        let direction = if rng.gen::<f64>() > 0.5 {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        let entry = base_price + (rng.gen::<f64>() - 0.5) * 20.0;
        let delta = (rng.gen::<f64>() - 0.4) * 10.0;
        let exit = entry + delta * direction.sign();
        let profit = (exit - entry) * direction.sign();

        trades.push(BacktestTrade {
            id: i + 1,
            entry_date,
            exit_date,
            direction,
            entry_price: round_dp(entry, 2),
            exit_price: round_dp(exit, 2),
            profit: round_dp(profit, 2),
            profit_percent: round_dp(profit / entry * 100.0, 2),
        });
        base_price = exit;
    }
    trades
}

/// Run a mock backtest for `request`.
pub fn run_mock_backtest<R: Rng + ?Sized>(
    request: &BacktestRequest,
    rng: &mut R,
    as_of: NaiveDateTime,
    mode: RiskMetricsMode,
) -> Result<BacktestResult, BacktestError> {
    request.settings.validate()?;
    let trades = generate_trades(rng, as_of);
    let risk = mode.resolve(rng);
    let result = summarize(trades, request.settings.initial_capital, risk);
    debug!(
        symbol = %request.symbol,
        indicator = %request.indicator,
        trades = result.total_trades,
        net_profit = result.net_profit,
        "mock backtest complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn as_of() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap()
    }

    fn request() -> BacktestRequest {
        BacktestRequest {
            symbol: "AAPL".into(),
            name: "Apple Inc.".into(),
            indicator: Indicator::Rsi,
            indicator_params: Indicator::Rsi.default_params(),
            timeframes: vec!["1h".into()],
            settings: BacktestSettings::defaults(None, as_of().date()),
        }
    }

    #[test]
    fn trade_count_and_dates_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let trades = generate_trades(&mut rng, as_of());
        assert!((20..70).contains(&trades.len()));
        let earliest = as_of() - Duration::days(30) - Duration::minutes(1);
        for t in &trades {
            assert!(t.entry_date <= as_of());
            assert!(t.entry_date >= earliest);
            assert!(t.exit_date >= t.entry_date);
            assert!(t.exit_date <= t.entry_date + Duration::days(5));
        }
        assert_eq!(trades[0].id, 1);
    }

    #[test]
    fn same_seed_same_run() {
        let a = run_mock_backtest(&request(), &mut StdRng::seed_from_u64(7), as_of(), RiskMetricsMode::Mock);
        let b = run_mock_backtest(&request(), &mut StdRng::seed_from_u64(7), as_of(), RiskMetricsMode::Mock);
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_positive_capital() {
        let mut req = request();
        req.settings.initial_capital = 0.0;
        let err = run_mock_backtest(&req, &mut StdRng::seed_from_u64(1), as_of(), RiskMetricsMode::Mock)
            .unwrap_err();
        assert_eq!(err, BacktestError::InvalidCapital(0.0));

        req.settings.initial_capital = f64::NAN;
        assert!(req.settings.validate().is_err());
    }

    #[test]
    fn rejects_inverted_dates() {
        let mut req = request();
        std::mem::swap(&mut req.settings.start_date, &mut req.settings.end_date);
        assert!(matches!(
            req.settings.validate(),
            Err(BacktestError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn missing_row_is_missing_context() {
        assert_eq!(
            BacktestRequest::from_row(None, as_of().date()).unwrap_err(),
            BacktestError::MissingContext
        );
    }

    #[test]
    fn defaults_without_timeframe() {
        let s = BacktestSettings::defaults(None, as_of().date());
        assert_eq!(s.timeframe, "1h");
        assert_eq!(s.initial_capital, 10_000.0);
        assert_eq!((s.end_date - s.start_date).num_days(), 30);
    }
}
