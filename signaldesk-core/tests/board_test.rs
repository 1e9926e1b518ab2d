//! Signal board end to end: build a board from the catalog, mutate it, and
//! read trade intents the way the dashboard does.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use signaldesk_core::board::{BoardError, SignalBoard};
use signaldesk_core::catalog;
use signaldesk_core::domain::{Indicator, Signal, Template};
use signaldesk_core::signals::probability;

fn template(symbol: &str, indicator: Indicator, timeframes: &[&str]) -> Template {
    let inst = catalog::find_instrument(symbol).unwrap();
    let now = Utc::now();
    Template {
        id: "template_1".into(),
        name: "Swing".into(),
        symbol: inst.symbol,
        symbol_name: inst.name,
        indicator,
        indicator_params: indicator.default_params(),
        timeframes: timeframes.iter().map(|s| s.to_string()).collect(),
        initial_capital: 5_000.0,
        position_size: 5.0,
        stop_loss: 1.0,
        take_profit: 3.0,
        created_at: now,
        updated_at: now,
        last_results: None,
    }
}

#[test]
fn board_survives_json_round_trip() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut board = SignalBoard::new();
    let instruments = catalog::instruments();
    for _ in 0..4 {
        board.add_row(&instruments, &mut rng, Utc::now()).unwrap();
    }
    let json = serde_json::to_string(&board).unwrap();
    assert!(json.starts_with('['));
    let back: SignalBoard = serde_json::from_str(&json).unwrap();
    assert_eq!(back, board);
}

#[test]
fn apply_template_copies_pair_and_timeframes() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut board = SignalBoard::new();
    board.add_row(&catalog::instruments(), &mut rng, Utc::now()).unwrap();
    let id = board.rows()[0].id.clone();

    let t = template("ETH/USD", Indicator::Bollinger, &["5m", "4h"]);
    let eth = catalog::find_instrument("ETH/USD");
    board.apply_template(&id, &t, eth.as_ref(), &mut rng).unwrap();

    let row = board.get(&id).unwrap();
    assert_eq!(row.symbol, "ETH/USD");
    assert_eq!(row.indicator, Indicator::Bollinger);
    assert_eq!(row.timeframe_labels(), vec!["5m", "4h"]);
    assert_eq!(row.last_price, 2285.40);
}

#[test]
fn apply_template_is_guarded() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut board = SignalBoard::new();
    let instruments = catalog::instruments();
    board.add_row(&instruments, &mut rng, Utc::now()).unwrap(); // AAPL RSI
    board.add_row(&instruments, &mut rng, Utc::now()).unwrap(); // AAPL MACD
    let second = board.rows()[1].id.clone();
    let before = board.clone();

    let t = template("AAPL", Indicator::Rsi, &["1m"]);
    let err = board.apply_template(&second, &t, None, &mut rng).unwrap_err();
    assert_eq!(
        err,
        BoardError::DuplicateEntry {
            symbol: "AAPL".into(),
            indicator: Indicator::Rsi
        }
    );
    assert_eq!(board, before);
}

#[test]
fn apply_template_rejects_repeated_timeframes() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut board = SignalBoard::new();
    board.add_row(&catalog::instruments(), &mut rng, Utc::now()).unwrap();
    let id = board.rows()[0].id.clone();
    let before = board.clone();

    let t = template("ETH/USD", Indicator::Bollinger, &["1m", "1m"]);
    let err = board.apply_template(&id, &t, None, &mut rng).unwrap_err();
    assert_eq!(err, BoardError::TimeframeInUse("1m".into()));
    assert_eq!(board, before);
}

#[test]
fn probability_mode_matches_aggregator() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut board = SignalBoard::new();
    board.add_row(&catalog::instruments(), &mut rng, Utc::now()).unwrap();
    let id = board.rows()[0].id.clone();
    board.set_probability_mode(&id, true).unwrap();

    let expected = probability(&board.get(&id).unwrap().timeframes);
    let intent = board.trade_intent(&id).unwrap();
    assert_eq!(intent.signal, expected.signal);
    assert_eq!(intent.strength, Some(expected.strength));
    assert_eq!(intent.tradable, expected.signal != Signal::Neutral);
}

#[test]
fn delete_then_add_reuses_freed_pair() {
    let mut rng = StdRng::seed_from_u64(21);
    let mut board = SignalBoard::new();
    let instruments = catalog::instruments();
    board.add_row(&instruments, &mut rng, Utc::now()).unwrap();
    board.add_row(&instruments, &mut rng, Utc::now()).unwrap();
    let first = board.rows()[0].id.clone();
    board.delete_row(&first).unwrap();

    let row = board.add_row(&instruments, &mut rng, Utc::now()).unwrap();
    assert_eq!(row.symbol, "AAPL");
    assert_eq!(row.indicator, Indicator::Rsi);
}
