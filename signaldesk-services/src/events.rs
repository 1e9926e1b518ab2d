//! Change notification.
//!
//! Each service mutation publishes one [`StoreEvent`] carrying the new full
//! list. Subscribers get an `mpsc::Receiver`; dropping it ends the
//! subscription and the bus prunes the dead sender on the next publish.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use signaldesk_core::domain::{
    AccountSettings, CopiedTrade, FollowedTrader, OpenPosition, PnlAlert, SignalRow, Template,
    TradeHistoryItem,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    TemplatesUpdated(Vec<Template>),
    FollowedTradersUpdated(Vec<FollowedTrader>),
    CopiedTradesUpdated(Vec<CopiedTrade>),
    PositionsUpdated(Vec<OpenPosition>),
    TradeHistoryUpdated(Vec<TradeHistoryItem>),
    PnlAlertsUpdated(Vec<PnlAlert>),
    DashboardUpdated(Vec<SignalRow>),
    AccountSettingsUpdated(AccountSettings),
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::TemplatesUpdated(_) => "templatesUpdated",
            StoreEvent::FollowedTradersUpdated(_) => "followedTradersUpdated",
            StoreEvent::CopiedTradesUpdated(_) => "copiedTradesUpdated",
            StoreEvent::PositionsUpdated(_) => "positionsUpdated",
            StoreEvent::TradeHistoryUpdated(_) => "tradeHistoryUpdated",
            StoreEvent::PnlAlertsUpdated(_) => "pnlAlertsUpdated",
            StoreEvent::DashboardUpdated(_) => "dashboardUpdated",
            StoreEvent::AccountSettingsUpdated(_) => "accountSettingsUpdated",
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriber list, recovered from a poisoned lock.
    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers().push(tx);
        rx
    }

    /// Deliver to every live subscriber.
    pub fn publish(&self, event: StoreEvent) {
        self.subscribers().retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}
