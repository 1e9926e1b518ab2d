//! Property tests for the aggregators, the duplicate guard and the backtest
//! summary.
//!
//! 1. Probability: strength bounded, ties neutral, threshold rule
//! 2. Accuracy: empty is 0, monotone as losers become winners
//! 3. Duplicate guard: existing pairs rejected, fresh pairs accepted
//! 4. Backtest summary: net identity, profit-factor rule, win rate, curve length

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use signaldesk_core::backtest::{summarize, BacktestTrade, RiskMetrics};
use signaldesk_core::board::is_duplicate;
use signaldesk_core::domain::{
    AccuracyHistory, AccuracyResult, Indicator, InstrumentCategory, Signal, SignalRow,
    TimeframeSignal, TradeSide,
};
use signaldesk_core::numeric::round_dp;
use signaldesk_core::signals::{accuracy, probability, PROBABILITY_THRESHOLD};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Sell), Just(Signal::Neutral)]
}

fn arb_slots() -> impl Strategy<Value = Vec<TimeframeSignal>> {
    prop::collection::vec(arb_signal(), 0..12).prop_map(|signals| {
        signals
            .into_iter()
            .enumerate()
            .map(|(i, s)| TimeframeSignal::new(format!("tf{i}"), s))
            .collect()
    })
}

fn arb_profit() -> impl Strategy<Value = f64> {
    (-500.0..500.0_f64).prop_map(|p| round_dp(p, 2))
}

fn arb_indicator() -> impl Strategy<Value = Indicator> {
    (0..Indicator::ALL.len()).prop_map(|i| Indicator::ALL[i])
}

fn arb_symbol() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["AAPL", "MSFT", "BTC/USD", "EUR/USD"]).prop_map(String::from)
}

fn at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn trade(id: usize, profit: f64) -> BacktestTrade {
    BacktestTrade {
        id,
        entry_date: at(),
        exit_date: at(),
        direction: TradeSide::Buy,
        entry_price: 100.0,
        exit_price: 100.0 + profit,
        profit,
        profit_percent: profit,
    }
}

fn row(id: usize, symbol: &str, indicator: Indicator) -> SignalRow {
    SignalRow {
        id: format!("row{id}"),
        symbol: symbol.to_string(),
        instrument_name: symbol.to_string(),
        category: InstrumentCategory::UsStocks,
        indicator,
        indicator_params: indicator.default_params(),
        timeframes: Vec::new(),
        last_price: 0.0,
        price_change: 0.0,
        price_change_percent: 0.0,
        accuracy_history: AccuracyHistory::new(),
        probability_mode_enabled: false,
    }
}

// ── 1. Probability ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn strength_is_a_percentage(slots in arb_slots()) {
        let p = probability(&slots);
        prop_assert!(p.strength <= 100);
    }

    #[test]
    fn equal_counts_are_neutral(slots in arb_slots()) {
        let buys = slots.iter().filter(|s| s.signal == Signal::Buy).count();
        let sells = slots.iter().filter(|s| s.signal == Signal::Sell).count();
        if buys == sells {
            prop_assert_eq!(probability(&slots).signal, Signal::Neutral);
        }
    }

    #[test]
    fn buy_majority_over_threshold(slots in arb_slots()) {
        let n = slots.len();
        let buys = slots.iter().filter(|s| s.signal == Signal::Buy).count();
        let sells = slots.iter().filter(|s| s.signal == Signal::Sell).count();
        let buy_pct = if n == 0 { 0.0 } else { 100.0 * buys as f64 / n as f64 };
        if buys > sells && buy_pct >= PROBABILITY_THRESHOLD {
            let p = probability(&slots);
            prop_assert_eq!(p.signal, Signal::Buy);
            prop_assert_eq!(p.strength as f64, buy_pct.round());
        }
    }
}

// ── 2. Accuracy ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn accuracy_monotone_under_improvement(profits in prop::collection::vec(arb_profit(), 1..10), idx in 0usize..10) {
        let mut history: Vec<AccuracyResult> = profits
            .iter()
            .map(|p| AccuracyResult { profit_amount: *p, signal: TradeSide::Buy })
            .collect();
        let before = accuracy(&history);
        let i = idx % history.len();
        history[i].profit_amount = 1.0;
        prop_assert!(accuracy(&history) >= before);
    }
}

#[test]
fn accuracy_of_empty_history_is_zero() {
    assert_eq!(accuracy(&[]), 0);
}

// ── 3. Duplicate guard ───────────────────────────────────────────────

proptest! {
    #[test]
    fn existing_pair_always_rejected(
        pairs in prop::collection::vec((arb_symbol(), arb_indicator()), 1..8),
        pick in 0usize..8,
    ) {
        let rows: Vec<SignalRow> = pairs
            .iter()
            .enumerate()
            .map(|(i, (s, ind))| row(i, s, *ind))
            .collect();
        let target = &rows[pick % rows.len()];
        prop_assert!(is_duplicate(&rows, &target.symbol, target.indicator, None));
        prop_assert!(is_duplicate(&rows, &target.symbol, target.indicator, Some("someone-else")));
    }

    #[test]
    fn fresh_pair_always_accepted(
        pairs in prop::collection::vec((arb_symbol(), arb_indicator()), 0..8),
        indicator in arb_indicator(),
    ) {
        let rows: Vec<SignalRow> = pairs
            .iter()
            .enumerate()
            .map(|(i, (s, ind))| row(i, s, *ind))
            .collect();
        prop_assert!(!is_duplicate(&rows, "NOT-LISTED", indicator, None));
    }

    #[test]
    fn a_row_never_collides_with_itself(symbol in arb_symbol(), indicator in arb_indicator()) {
        let rows = vec![row(0, &symbol, indicator)];
        prop_assert!(!is_duplicate(&rows, &symbol, indicator, Some("row0")));
    }
}

// ── 4. Backtest summary ──────────────────────────────────────────────

proptest! {
    #[test]
    fn summary_identities(profits in prop::collection::vec(arb_profit(), 1..80), capital in 100.0..1_000_000.0_f64) {
        let trades: Vec<BacktestTrade> = profits
            .iter()
            .enumerate()
            .map(|(i, p)| trade(i + 1, *p))
            .collect();
        let r = summarize(trades, capital, RiskMetrics::Derived);

        prop_assert_eq!(r.net_profit, r.total_profit - r.total_loss);
        prop_assert_eq!(r.equity_curve.len(), r.total_trades + 1);
        prop_assert_eq!(r.win_count + r.loss_count, r.total_trades);

        let expected_rate = round_dp(100.0 * r.win_count as f64 / r.total_trades as f64, 1);
        prop_assert_eq!(r.win_rate, expected_rate);

        if r.total_loss > 0.0 {
            prop_assert_eq!(r.profit_factor, round_dp(r.total_profit / r.total_loss, 2));
        } else {
            prop_assert_eq!(r.profit_factor, r.total_profit);
        }
        prop_assert!(r.max_drawdown_percent >= 0.0);
    }
}
