//! Open positions: opening, closing into history, price ticks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use signaldesk_core::domain::ids::{next_id, prefix};
use signaldesk_core::domain::{OpenPosition, TradeHistoryItem, TradeSide};
use signaldesk_core::portfolio::{demo_positions, tick, total_pnl};

use crate::account::AccountService;
use crate::history::HistoryService;
use crate::repository::Collection;
use crate::store::StoreError;

pub struct PositionService {
    positions: Collection<OpenPosition>,
    history: Arc<HistoryService>,
    account: Arc<AccountService>,
}

impl PositionService {
    pub fn new(
        positions: Collection<OpenPosition>,
        history: Arc<HistoryService>,
        account: Arc<AccountService>,
    ) -> Self {
        Self {
            positions,
            history,
            account,
        }
    }

    pub fn list(&self) -> Vec<OpenPosition> {
        self.positions.list()
    }

    pub fn add(&self, position: OpenPosition) -> Result<OpenPosition, StoreError> {
        self.positions.create(position)
    }

    /// Open a new position at `price`.
    pub fn open(
        &self,
        symbol: &str,
        name: &str,
        side: TradeSide,
        price: f64,
        quantity: f64,
        now: DateTime<Utc>,
    ) -> Result<OpenPosition, StoreError> {
        let position = OpenPosition {
            id: next_id(prefix::POSITION, now),
            symbol: symbol.to_string(),
            name: name.to_string(),
            side,
            entry_price: price,
            current_price: price,
            quantity,
            entry_time: now,
            pnl: 0.0,
            pnl_percent: 0.0,
        };
        info!(id = %position.id, symbol, side = %side, quantity, "position opened");
        self.add(position)
    }

    /// Close at `exit_price`; the position moves to history tagged with the
    /// configured account type.
    pub fn close(&self, id: &str, exit_price: f64, now: DateTime<Utc>) -> Result<TradeHistoryItem, StoreError> {
        let position = self
            .positions
            .find(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let item = position.close(exit_price, self.account.load().account_type, now);
        self.history.add(item.clone())?;
        self.positions.delete(id)?;
        info!(id, symbol = %item.symbol, pnl = item.pnl, "position closed");
        Ok(item)
    }

    /// Close every position at its current price.
    pub fn close_all(&self, now: DateTime<Utc>) -> Result<Vec<TradeHistoryItem>, StoreError> {
        let account_type = self.account.load().account_type;
        let items: Vec<TradeHistoryItem> = self
            .positions
            .list()
            .iter()
            .map(|p| p.close(p.current_price, account_type, now))
            .collect();
        if items.is_empty() {
            return Ok(items);
        }
        self.history.add_many(items.iter().rev().cloned().collect())?;
        self.positions.clear()?;
        Ok(items)
    }

    /// One simulated price update for every position.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<OpenPosition>, StoreError> {
        let mut positions = self.positions.list();
        if positions.is_empty() {
            return Ok(positions);
        }
        tick(&mut positions, rng);
        self.positions.replace(positions)
    }

    pub fn total_pnl(&self) -> f64 {
        total_pnl(&self.positions.list())
    }

    /// Seed the demo book when nothing is stored. Returns whether it seeded.
    pub fn seed_demo_positions(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        if !self.positions.list().is_empty() {
            return Ok(false);
        }
        self.positions.replace(demo_positions(now))?;
        Ok(true)
    }
}
