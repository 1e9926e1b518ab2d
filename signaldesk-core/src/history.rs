//! Trade-history filtering and statistics.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountType, TradeHistoryItem, TradeSide};
use crate::numeric::{percent_of, round_dp};

/// Filter over closed trades. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Case-insensitive substring of the symbol.
    pub symbol: Option<String>,
    pub side: Option<TradeSide>,
    pub account: Option<AccountType>,
}

impl HistoryFilter {
    pub fn matches(&self, item: &TradeHistoryItem) -> bool {
        if let Some(q) = self.symbol.as_deref().filter(|q| !q.is_empty()) {
            if !item.symbol.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        self.side.map_or(true, |s| item.side == s)
            && self.account.map_or(true, |a| item.account_type == a)
    }

    pub fn apply<'a>(&self, items: &'a [TradeHistoryItem]) -> Vec<&'a TradeHistoryItem> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent, one decimal.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub average_pnl: f64,
}

impl HistoryStats {
    pub fn compute<'a>(items: impl IntoIterator<Item = &'a TradeHistoryItem>) -> Self {
        let mut stats = HistoryStats::default();
        for item in items {
            stats.total_trades += 1;
            if item.pnl > 0.0 {
                stats.winning_trades += 1;
            } else {
                stats.losing_trades += 1;
            }
            stats.total_pnl += item.pnl;
        }
        stats.win_rate = round_dp(percent_of(stats.winning_trades, stats.total_trades), 1);
        if stats.total_trades > 0 {
            stats.average_pnl = stats.total_pnl / stats.total_trades as f64;
        }
        stats
    }
}
