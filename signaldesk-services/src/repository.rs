//! Generic JSON-array collection over a [`KeyValueStore`].
//!
//! Every mutation re-reads the stored list, applies the change, writes the
//! whole list back and publishes it on the [`EventBus`]. A list that cannot
//! be read or parsed is treated as empty.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use signaldesk_core::domain::{
    CopiedTrade, FollowedTrader, OpenPosition, PnlAlert, SignalRow, Template, TradeHistoryItem,
};

use crate::events::{EventBus, StoreEvent};
use crate::store::{KeyValueStore, StoreError};

/// A stored record with a string id.
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;
}

macro_rules! record_by_field {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

record_by_field!(Template, CopiedTrade, OpenPosition, TradeHistoryItem, PnlAlert, SignalRow);

impl Record for FollowedTrader {
    fn id(&self) -> &str {
        FollowedTrader::id(self)
    }
}

/// Storage keys.
pub mod keys {
    pub const TEMPLATES: &str = "backtest_templates";
    pub const FOLLOWING: &str = "copy_trading_following";
    pub const COPIED: &str = "copy_trading_copied";
    pub const POSITIONS: &str = "openPositions";
    pub const HISTORY: &str = "tradeHistory";
    pub const ALERTS: &str = "pnlAlerts";
    pub const DASHBOARD: &str = "dashboard_data";
    pub const ACCOUNT: &str = "trading_account_config";
}

/// Read a JSON value, falling back to `None` with a warning when the stored
/// text is unreadable or malformed.
pub(crate) fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored data");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "stored data is corrupt, using defaults");
            None
        }
    }
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json).map_err(|e| {
        error!(key, error = %e, "failed to write stored data");
        e
    })
}

pub struct Collection<T> {
    store: Arc<dyn KeyValueStore>,
    bus: Arc<EventBus>,
    key: &'static str,
    event: fn(Vec<T>) -> StoreEvent,
    _record: PhantomData<T>,
}

impl<T: Record> Collection<T> {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        bus: Arc<EventBus>,
        key: &'static str,
        event: fn(Vec<T>) -> StoreEvent,
    ) -> Self {
        Self {
            store,
            bus,
            key,
            event,
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn list(&self) -> Vec<T> {
        read_json(self.store.as_ref(), self.key).unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list().iter().any(|r| r.id() == id)
    }

    /// Overwrite the whole list and announce it.
    pub fn replace(&self, items: Vec<T>) -> Result<Vec<T>, StoreError> {
        write_json(self.store.as_ref(), self.key, &items)?;
        debug!(key = self.key, len = items.len(), "collection updated");
        self.bus.publish((self.event)(items.clone()));
        Ok(items)
    }

    pub fn create(&self, item: T) -> Result<T, StoreError> {
        let mut items = self.list();
        items.push(item.clone());
        self.replace(items)?;
        Ok(item)
    }

    /// Insert at the front (newest first).
    pub fn prepend(&self, item: T) -> Result<T, StoreError> {
        let mut items = self.list();
        items.insert(0, item.clone());
        self.replace(items)?;
        Ok(item)
    }

    pub fn update(&self, id: &str, patch: impl FnOnce(&mut T)) -> Result<T, StoreError> {
        let mut items = self.list();
        let item = items
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch(item);
        let updated = item.clone();
        self.replace(items)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> Result<T, StoreError> {
        let mut items = self.list();
        let idx = items
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let removed = items.remove(idx);
        self.replace(items)?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.replace(Vec::new()).map(|_| ())
    }
}
