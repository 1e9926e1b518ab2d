//! Mock trades mirrored from followed traders.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::ids::{next_id, prefix};
use crate::domain::{CopiedTrade, CopyStatus, FollowedTrader, TradeSide};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One open copied trade per followed trader that has auto-copy on and at
/// least one instrument.
pub fn generate_copied_trades<R: Rng + ?Sized>(
    followed: &[FollowedTrader],
    rng: &mut R,
    now: DateTime<Utc>,
) -> Vec<CopiedTrade> {
    followed
        .iter()
        .filter(|f| f.settings.auto_copy)
        .filter_map(|f| {
            let symbol = f.trader.instruments.choose(rng)?.clone();
            let entry_price = rng.gen::<f64>() * 1000.0 + 100.0;
            let current_price = entry_price * (1.0 + (rng.gen::<f64>() - 0.45) * 0.1);
            let side = TradeSide::random(rng);
            let pnl = (current_price - entry_price) * side.sign();
            let opened_at =
                now - Duration::milliseconds((rng.gen::<f64>() * MILLIS_PER_DAY) as i64);
            Some(CopiedTrade {
                id: next_id(prefix::COPY, now),
                trader_id: f.trader.id.clone(),
                trader_name: f.trader.name.clone(),
                symbol,
                side,
                entry_price,
                current_price,
                size: 0.1 * f.settings.copy_percentage / 100.0,
                pnl: pnl * 100.0,
                pnl_percent: pnl / entry_price * 100.0,
                opened_at,
                status: CopyStatus::Open,
                closed_at: None,
                close_price: None,
            })
        })
        .collect()
}
