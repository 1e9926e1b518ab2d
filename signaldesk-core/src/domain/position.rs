//! Open positions and closed-trade history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountType;
use super::ids::{next_id, prefix};
use super::signal::TradeSide;
use crate::numeric::round_dp;

/// An open (simulated) position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub side: TradeSide,
    pub entry_price: f64,
    pub current_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub pnl: f64,
    pub pnl_percent: f64,
}

impl OpenPosition {
    /// Signed PnL if the position were marked at `price`.
    pub fn pnl_at(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.quantity * self.side.sign()
    }

    /// PnL as a percent of the entry notional.
    pub fn pnl_percent_at(&self, price: f64) -> f64 {
        let notional = self.entry_price * self.quantity;
        if notional == 0.0 {
            return 0.0;
        }
        self.pnl_at(price) / notional * 100.0
    }

    /// Price precision: 4 decimals for pairs (`EUR/USD`), 2 otherwise.
    pub fn price_decimals(&self) -> i32 {
        if self.symbol.contains('/') {
            4
        } else {
            2
        }
    }

    /// Re-mark at `price`, refreshing rounded PnL fields.
    pub fn mark(&mut self, price: f64) {
        self.current_price = round_dp(price, self.price_decimals());
        self.pnl = round_dp(self.pnl_at(price), 2);
        self.pnl_percent = round_dp(self.pnl_percent_at(price), 2);
    }

    /// Close at `exit_price`, producing the history record.
    pub fn close(
        &self,
        exit_price: f64,
        account_type: AccountType,
        now: DateTime<Utc>,
    ) -> TradeHistoryItem {
        TradeHistoryItem {
            id: next_id(prefix::TRADE, now),
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            side: self.side,
            entry_price: self.entry_price,
            exit_price,
            quantity: self.quantity,
            entry_time: self.entry_time,
            exit_time: now,
            pnl: round_dp(self.pnl_at(exit_price), 2),
            pnl_percent: round_dp(self.pnl_percent_at(exit_price), 2),
            account_type,
            indicator: None,
            timeframes: None,
        }
    }
}

/// A closed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeHistoryItem {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub side: TradeSide,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframes: Option<Vec<String>>,
}
