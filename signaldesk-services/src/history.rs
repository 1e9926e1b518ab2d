//! Closed-trade history, newest first.

use signaldesk_core::domain::TradeHistoryItem;
use signaldesk_core::history::{HistoryFilter, HistoryStats};

use crate::repository::Collection;
use crate::store::StoreError;

pub struct HistoryService {
    history: Collection<TradeHistoryItem>,
}

impl HistoryService {
    pub fn new(history: Collection<TradeHistoryItem>) -> Self {
        Self { history }
    }

    pub fn list(&self) -> Vec<TradeHistoryItem> {
        self.history.list()
    }

    pub fn add(&self, item: TradeHistoryItem) -> Result<TradeHistoryItem, StoreError> {
        self.history.prepend(item)
    }

    /// Prepend several items keeping their relative order.
    pub fn add_many(&self, items: Vec<TradeHistoryItem>) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut all = items;
        all.extend(self.history.list());
        self.history.replace(all).map(|_| ())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.history.clear()
    }

    pub fn filter(&self, filter: &HistoryFilter) -> Vec<TradeHistoryItem> {
        self.history
            .list()
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect()
    }

    pub fn stats(&self, filter: &HistoryFilter) -> HistoryStats {
        HistoryStats::compute(&self.filter(filter))
    }
}
