//! Open-position book helpers: demo seed, price ticks, totals.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::domain::{OpenPosition, TradeSide};

#[allow(clippy::too_many_arguments)]
fn demo(
    id: &str,
    symbol: &str,
    name: &str,
    side: TradeSide,
    entry_price: f64,
    current_price: f64,
    quantity: f64,
    opened_at: DateTime<Utc>,
) -> OpenPosition {
    let mut pos = OpenPosition {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        side,
        entry_price,
        current_price,
        quantity,
        entry_time: opened_at,
        pnl: 0.0,
        pnl_percent: 0.0,
    };
    pos.mark(current_price);
    pos
}

/// The three positions shown when the book is empty on first launch.
pub fn demo_positions(now: DateTime<Utc>) -> Vec<OpenPosition> {
    vec![
        demo("1", "AAPL", "Apple Inc.", TradeSide::Buy, 178.50, 182.30, 10.0, now - Duration::hours(2)),
        demo("2", "BTC/USD", "Bitcoin", TradeSide::Buy, 43_250.0, 42_800.0, 0.5, now - Duration::hours(5)),
        demo("3", "EUR/USD", "Euro/USD", TradeSide::Sell, 1.0892, 1.0875, 10_000.0, now - Duration::hours(1)),
    ]
}

/// Nudge every price by `U(-1, 1)` and re-mark.
pub fn tick<R: Rng + ?Sized>(positions: &mut [OpenPosition], rng: &mut R) {
    for pos in positions {
        let price = pos.current_price + (rng.gen::<f64>() - 0.5) * 2.0;
        pos.mark(price);
    }
}

pub fn total_pnl(positions: &[OpenPosition]) -> f64 {
    positions.iter().map(|p| p.pnl).sum()
}
