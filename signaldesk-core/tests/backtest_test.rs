//! Mock backtest runs through the public API.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use signaldesk_core::backtest::{
    run_mock_backtest, summarize, BacktestError, BacktestRequest, BacktestTrade, EquityPoint,
    RiskMetrics, RiskMetricsMode,
};
use signaldesk_core::board::SignalBoard;
use signaldesk_core::catalog;
use signaldesk_core::domain::TradeSide;
use signaldesk_core::rng::{scope, RngHierarchy};

fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 20)
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap()
}

fn request() -> BacktestRequest {
    let mut rng = StdRng::seed_from_u64(1);
    let mut board = SignalBoard::new();
    board.add_row(&catalog::instruments(), &mut rng, Utc::now()).unwrap();
    BacktestRequest::from_row(board.rows().first(), as_of().date()).unwrap()
}

#[test]
fn request_from_row_uses_first_timeframe() {
    let req = request();
    assert_eq!(req.symbol, "AAPL");
    assert_eq!(req.settings.timeframe, "1m");
    assert_eq!(req.settings.initial_capital, 10_000.0);
}

#[test]
fn run_satisfies_summary_rules() {
    let hierarchy = RngHierarchy::new(2024);
    let mut rng = hierarchy.rng_for(scope::BACKTEST, "AAPL:RSI", 0);
    let r = run_mock_backtest(&request(), &mut rng, as_of(), RiskMetricsMode::Mock).unwrap();

    assert!((20..70).contains(&r.total_trades));
    assert_eq!(r.trades.len(), r.total_trades);
    assert_eq!(r.equity_curve.len(), r.total_trades + 1);
    assert_eq!(r.equity_curve[0].label, "Start");
    assert_eq!(r.equity_curve[1].label, "Trade 1");
    assert_eq!(r.net_profit, r.total_profit - r.total_loss);
    assert!((5.0..=20.0).contains(&r.max_drawdown_percent));
    assert!((0.5..=2.5).contains(&r.sharpe_ratio));
    for t in &r.trades {
        assert_eq!(t.profit > 0.0, t.is_winner());
        assert_eq!(t.entry_price, (t.entry_price * 100.0).round() / 100.0);
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let hierarchy = RngHierarchy::new(5);
    let a = run_mock_backtest(
        &request(),
        &mut hierarchy.rng_for(scope::BACKTEST, "k", 0),
        as_of(),
        RiskMetricsMode::Derived,
    )
    .unwrap();
    let b = run_mock_backtest(
        &request(),
        &mut hierarchy.rng_for(scope::BACKTEST, "k", 0),
        as_of(),
        RiskMetricsMode::Derived,
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn fixed_single_trade_summary() {
    let trade = BacktestTrade {
        id: 1,
        entry_date: as_of(),
        exit_date: as_of(),
        direction: TradeSide::Buy,
        entry_price: 100.0,
        exit_price: 150.0,
        profit: 50.0,
        profit_percent: 50.0,
    };
    let r = summarize(
        vec![trade],
        10_000.0,
        RiskMetrics::Given {
            max_drawdown_percent: 5.0,
            sharpe_ratio: 1.0,
        },
    );
    assert_eq!(r.net_profit, 50.0);
    assert_eq!(
        r.equity_curve,
        vec![
            EquityPoint { label: "Start".into(), equity: 10_000.0 },
            EquityPoint { label: "Trade 1".into(), equity: 10_500.0 },
        ]
    );
}

#[test]
fn no_selection_means_no_backtest() {
    let board = SignalBoard::new();
    assert_eq!(
        BacktestRequest::from_row(board.rows().first(), as_of().date()).unwrap_err(),
        BacktestError::MissingContext
    );
}
