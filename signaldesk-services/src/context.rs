//! The full service set over one store and one event bus.

use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use tracing::debug;

use signaldesk_core::backtest::BacktestSettings;
use signaldesk_core::rng::session_rng;

use crate::account::{AccountService, MemorySecretStore, SecretStore};
use crate::alerts::AlertService;
use crate::config::{AppConfig, StoreBackend};
use crate::dashboard::DashboardService;
use crate::events::{EventBus, StoreEvent};
use crate::following::FollowingService;
use crate::history::HistoryService;
use crate::positions::PositionService;
use crate::repository::{keys, Collection};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::templates::TemplateService;

pub struct SignalDesk {
    pub config: AppConfig,
    pub bus: Arc<EventBus>,
    pub templates: TemplateService,
    pub following: FollowingService,
    pub positions: PositionService,
    pub history: Arc<HistoryService>,
    pub alerts: AlertService,
    pub account: Arc<AccountService>,
    pub dashboard: DashboardService,
}

impl SignalDesk {
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>, secrets: Arc<dyn SecretStore>) -> Self {
        let bus = Arc::new(EventBus::new());
        let history = Arc::new(HistoryService::new(Collection::new(
            store.clone(),
            bus.clone(),
            keys::HISTORY,
            StoreEvent::TradeHistoryUpdated,
        )));
        let account = Arc::new(AccountService::new(store.clone(), bus.clone(), secrets));

        Self {
            templates: TemplateService::new(Collection::new(
                store.clone(),
                bus.clone(),
                keys::TEMPLATES,
                StoreEvent::TemplatesUpdated,
            )),
            following: FollowingService::new(
                Collection::new(
                    store.clone(),
                    bus.clone(),
                    keys::FOLLOWING,
                    StoreEvent::FollowedTradersUpdated,
                ),
                Collection::new(store.clone(), bus.clone(), keys::COPIED, StoreEvent::CopiedTradesUpdated),
            ),
            positions: PositionService::new(
                Collection::new(store.clone(), bus.clone(), keys::POSITIONS, StoreEvent::PositionsUpdated),
                history.clone(),
                account.clone(),
            ),
            alerts: AlertService::new(Collection::new(
                store.clone(),
                bus.clone(),
                keys::ALERTS,
                StoreEvent::PnlAlertsUpdated,
            )),
            dashboard: DashboardService::new(Collection::new(
                store,
                bus.clone(),
                keys::DASHBOARD,
                StoreEvent::DashboardUpdated,
            )),
            history,
            account,
            bus,
            config,
        }
    }

    /// Memory-backed desk with default configuration.
    pub fn in_memory() -> Self {
        Self::new(
            AppConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemorySecretStore::new()),
        )
    }

    /// Desk over the backend named in `config`. Credentials are held in
    /// memory for the lifetime of the process.
    pub fn open(config: AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = match config.store.backend {
            StoreBackend::File => Arc::new(JsonFileStore::new(config.store.dir.clone())),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        debug!(backend = ?config.store.backend, dir = %config.store.dir.display(), "opening store");
        Self::new(config, store, Arc::new(MemorySecretStore::new()))
    }

    /// RNG for one operation; deterministic when `backtest.seed` is set.
    pub fn rng(&self, scope: &str, key: &str) -> StdRng {
        session_rng(self.config.backtest.seed, scope, key)
    }

    pub fn backtest_defaults(&self, today: NaiveDate) -> BacktestSettings {
        self.config.backtest.settings(today)
    }
}
