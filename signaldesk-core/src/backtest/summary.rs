//! Backtest trade records and the summary statistics computed over them.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{TemplateResults, TradeSide};
use crate::numeric::{mean_f64, percent_of, round_dp, std_dev};

/// `YYYY-MM-DD HH:MM`, the timestamp format of backtest trades.
pub const TRADE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

mod trade_time {
    use super::TRADE_TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format(TRADE_TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TRADE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    /// 1-based position in the run.
    pub id: usize,
    #[serde(with = "trade_time")]
    pub entry_date: NaiveDateTime,
    #[serde(with = "trade_time")]
    pub exit_date: NaiveDateTime,
    pub direction: TradeSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub profit_percent: f64,
}

impl BacktestTrade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub label: String,
    pub equity: f64,
}

/// How drawdown and Sharpe are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMetricsMode {
    /// Random placeholders: drawdown in [5, 20), Sharpe in [0.5, 2.5).
    #[default]
    Mock,
    /// Computed from the equity curve.
    Derived,
}

impl RiskMetricsMode {
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> RiskMetrics {
        match self {
            RiskMetricsMode::Mock => RiskMetrics::mock(rng),
            RiskMetricsMode::Derived => RiskMetrics::Derived,
        }
    }
}

impl std::str::FromStr for RiskMetricsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(RiskMetricsMode::Mock),
            "derived" => Ok(RiskMetricsMode::Derived),
            other => Err(format!("unknown risk metrics mode '{other}'")),
        }
    }
}

/// Risk figures fed to [`summarize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskMetrics {
    Given {
        max_drawdown_percent: f64,
        sharpe_ratio: f64,
    },
    Derived,
}

impl RiskMetrics {
    pub fn mock<R: Rng + ?Sized>(rng: &mut R) -> Self {
        RiskMetrics::Given {
            max_drawdown_percent: round_dp(rng.gen::<f64>() * 15.0 + 5.0, 2),
            sharpe_ratio: round_dp(rng.gen::<f64>() * 2.0 + 0.5, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub trades: Vec<BacktestTrade>,
    pub total_trades: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub total_loss: f64,
    pub net_profit: f64,
    pub profit_factor: f64,
    pub max_drawdown_percent: f64,
    pub sharpe_ratio: f64,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    /// Headline figures stored on a template after a run.
    pub fn last_results(&self) -> TemplateResults {
        TemplateResults {
            win_rate: self.win_rate,
            net_profit: self.net_profit,
            profit_factor: self.profit_factor,
            total_trades: self.total_trades,
        }
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}

/// Equity after each trade at ten units per trade, starting from a `Start`
/// point at `initial_capital`.
///
/// Accumulates the cent-rounded trade profit, so the curve always agrees with
/// the trade table rather than with unrounded random-walk profits.
pub fn equity_curve(trades: &[BacktestTrade], initial_capital: f64) -> Vec<EquityPoint> {
    let mut equity = initial_capital;
    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(EquityPoint {
        label: "Start".to_string(),
        equity: round_dp(initial_capital, 2),
    });
    for (i, t) in trades.iter().enumerate() {
        equity += t.profit * 10.0;
        curve.push(EquityPoint {
            label: format!("Trade {}", i + 1),
            equity: round_dp(equity, 2),
        });
    }
    curve
}

/// Peak-to-trough decline of the curve, in percent (positive).
pub fn max_drawdown_percent(curve: &[f64]) -> f64 {
    if curve.len() < 2 {
        return 0.0;
    }
    let mut peak = curve[0];
    let mut max_dd = 0.0_f64;
    for &eq in curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (peak - eq) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd * 100.0
}

/// Per-step returns of an equity curve.
pub fn step_returns(curve: &[f64]) -> Vec<f64> {
    curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// mean / std of per-trade returns, scaled by √n. 0 with fewer than two
/// returns or zero variance.
pub fn trade_sharpe(curve: &[f64]) -> f64 {
    let returns = step_returns(curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * (returns.len() as f64).sqrt()
}

/// Summary statistics over a fixed trade list.
///
/// Total profit and total loss are rounded to cents first, and net profit is
/// their difference rounded to cents again.
pub fn summarize(trades: Vec<BacktestTrade>, initial_capital: f64, risk: RiskMetrics) -> BacktestResult {
    let (winners, losers): (Vec<&BacktestTrade>, Vec<&BacktestTrade>) =
        trades.iter().partition(|t| t.is_winner());

    let total_profit = round_dp(winners.iter().map(|t| t.profit).sum::<f64>(), 2);
    let total_loss = round_dp(losers.iter().map(|t| t.profit).sum::<f64>().abs(), 2);
    let net_profit = round_dp(total_profit - total_loss, 2);
    let profit_factor = if total_loss > 0.0 {
        round_dp(total_profit / total_loss, 2)
    } else {
        total_profit
    };
    let win_rate = round_dp(percent_of(winners.len(), trades.len()), 1);

    let curve = equity_curve(&trades, initial_capital);
    let (max_drawdown_percent, sharpe_ratio) = match risk {
        RiskMetrics::Given {
            max_drawdown_percent,
            sharpe_ratio,
        } => (max_drawdown_percent, sharpe_ratio),
        RiskMetrics::Derived => {
            let values: Vec<f64> = curve.iter().map(|p| p.equity).collect();
            (
                round_dp(max_drawdown_percent(&values), 2),
                round_dp(trade_sharpe(&values), 2),
            )
        }
    };

    BacktestResult {
        initial_capital,
        total_trades: trades.len(),
        win_count: winners.len(),
        loss_count: losers.len(),
        win_rate,
        total_profit,
        total_loss,
        net_profit,
        profit_factor,
        max_drawdown_percent,
        sharpe_ratio,
        equity_curve: curve,
        trades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn trade(id: usize, profit: f64) -> BacktestTrade {
        BacktestTrade {
            id,
            entry_date: at(1),
            exit_date: at(2),
            direction: TradeSide::Buy,
            entry_price: 100.0,
            exit_price: 100.0 + profit,
            profit,
            profit_percent: profit,
        }
    }

    const FIXED: RiskMetrics = RiskMetrics::Given {
        max_drawdown_percent: 10.0,
        sharpe_ratio: 1.0,
    };

    #[test]
    fn single_winning_trade() {
        let r = summarize(vec![trade(1, 50.0)], 10_000.0, FIXED);
        assert_eq!(r.net_profit, 50.0);
        assert_eq!(r.total_loss, 0.0);
        assert_eq!(r.profit_factor, 50.0);
        assert_eq!(r.win_rate, 100.0);
        assert_eq!(
            r.equity_curve,
            vec![
                EquityPoint { label: "Start".into(), equity: 10_000.0 },
                EquityPoint { label: "Trade 1".into(), equity: 10_500.0 },
            ]
        );
    }

    #[test]
    fn breakeven_counts_as_loss() {
        let r = summarize(vec![trade(1, 0.0), trade(2, 3.0)], 1_000.0, FIXED);
        assert_eq!(r.loss_count, 1);
        assert_eq!(r.win_count, 1);
        assert_eq!(r.win_rate, 50.0);
    }

    #[test]
    fn profit_factor_and_net() {
        let r = summarize(
            vec![trade(1, 4.0), trade(2, -2.0), trade(3, 2.0)],
            1_000.0,
            FIXED,
        );
        assert_eq!(r.total_profit, 6.0);
        assert_eq!(r.total_loss, 2.0);
        assert_eq!(r.net_profit, 4.0);
        assert_eq!(r.profit_factor, 3.0);
        assert_eq!(r.win_rate, 66.7);
        assert_eq!(r.last_results().total_trades, 3);
    }

    #[test]
    fn net_profit_is_rounded_to_cents() {
        let r = summarize(
            vec![trade(1, 0.1), trade(2, 0.2), trade(3, -0.1)],
            1_000.0,
            FIXED,
        );
        assert_eq!(r.total_profit, 0.3);
        assert_eq!(r.total_loss, 0.1);
        assert_eq!(r.net_profit, 0.2);
        assert_eq!(r.last_results().net_profit, 0.2);
    }

    #[test]
    fn derived_drawdown_from_curve() {
        // 1000 -> 1100 -> 990 : 10% off the peak
        let r = summarize(vec![trade(1, 10.0), trade(2, -11.0)], 1_000.0, RiskMetrics::Derived);
        assert_eq!(r.max_drawdown_percent, 10.0);
    }

    #[test]
    fn empty_trade_list() {
        let r = summarize(Vec::new(), 5_000.0, RiskMetrics::Derived);
        assert_eq!(r.total_trades, 0);
        assert_eq!(r.win_rate, 0.0);
        assert_eq!(r.profit_factor, 0.0);
        assert_eq!(r.equity_curve.len(), 1);
        assert_eq!(r.final_equity(), 5_000.0);
        assert_eq!(r.sharpe_ratio, 0.0);
    }

    #[test]
    fn trade_time_serializes_to_minutes() {
        let json = serde_json::to_value(trade(1, 1.0)).unwrap();
        assert_eq!(json["entry_date"], "2024-03-01 01:00");
        let back: BacktestTrade = serde_json::from_value(json).unwrap();
        assert_eq!(back.entry_date, at(1));
    }

    #[test]
    fn mock_metrics_in_range() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            match RiskMetrics::mock(&mut rng) {
                RiskMetrics::Given { max_drawdown_percent, sharpe_ratio } => {
                    assert!((5.0..=20.0).contains(&max_drawdown_percent));
                    assert!((0.5..=2.5).contains(&sharpe_ratio));
                }
                RiskMetrics::Derived => unreachable!(),
            }
        }
    }
}
