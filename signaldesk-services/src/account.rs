//! Trading-account settings and broker credentials.
//!
//! Settings are persisted as a single JSON record. API keys never go there:
//! they are handed to a [`SecretStore`], and `has_credentials` is read back
//! from that store on every load, so a non-durable secret store never leaves
//! a stale flag behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use signaldesk_core::domain::{AccountSettings, BrokerCredentials};

use crate::events::{EventBus, StoreEvent};
use crate::repository::{keys, read_json, write_json};
use crate::store::{KeyValueStore, StoreError};

/// Where broker credentials live. Implementations decide how they are kept
/// (memory, OS keychain, ...).
pub trait SecretStore: Send + Sync {
    fn put(&self, broker: &str, credentials: BrokerCredentials) -> Result<(), StoreError>;
    fn get(&self, broker: &str) -> Result<Option<BrokerCredentials>, StoreError>;
    fn delete(&self, broker: &str) -> Result<(), StoreError>;
}

/// Process-lifetime secret store; nothing touches disk.
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, BrokerCredentials>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, BrokerCredentials>>, StoreError> {
        self.secrets
            .lock()
            .map_err(|_| StoreError::Storage("secret store lock poisoned".into()))
    }
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.secrets.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("MemorySecretStore").field("entries", &count).finish()
    }
}

impl SecretStore for MemorySecretStore {
    fn put(&self, broker: &str, credentials: BrokerCredentials) -> Result<(), StoreError> {
        self.lock()?.insert(broker.to_string(), credentials);
        Ok(())
    }

    fn get(&self, broker: &str) -> Result<Option<BrokerCredentials>, StoreError> {
        Ok(self.lock()?.get(broker).cloned())
    }

    fn delete(&self, broker: &str) -> Result<(), StoreError> {
        self.lock()?.remove(broker);
        Ok(())
    }
}

pub struct AccountService {
    store: Arc<dyn KeyValueStore>,
    bus: Arc<EventBus>,
    secrets: Arc<dyn SecretStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn KeyValueStore>, bus: Arc<EventBus>, secrets: Arc<dyn SecretStore>) -> Self {
        Self { store, bus, secrets }
    }

    /// Stored settings, or defaults when absent or unreadable.
    /// `has_credentials` reflects what the secret store holds right now.
    pub fn load(&self) -> AccountSettings {
        let mut settings: AccountSettings =
            read_json(self.store.as_ref(), keys::ACCOUNT).unwrap_or_default();
        settings.has_credentials = match self.secrets.get(&settings.broker) {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(error = %e, "secret store unavailable; reporting no credentials");
                false
            }
        };
        settings
    }

    pub fn save(&self, settings: &AccountSettings) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), keys::ACCOUNT, settings)?;
        info!(
            account_type = %settings.account_type,
            broker = %settings.broker,
            "account settings saved"
        );
        self.bus.publish(StoreEvent::AccountSettingsUpdated(settings.clone()));
        Ok(())
    }

    /// Store credentials for the configured broker and flag their presence.
    pub fn set_credentials(&self, credentials: BrokerCredentials) -> Result<AccountSettings, StoreError> {
        let mut settings = self.load();
        self.secrets.put(&settings.broker, credentials)?;
        settings.has_credentials = true;
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn credentials(&self) -> Result<Option<BrokerCredentials>, StoreError> {
        self.secrets.get(&self.load().broker)
    }

    pub fn clear_credentials(&self) -> Result<AccountSettings, StoreError> {
        let mut settings = self.load();
        self.secrets.delete(&settings.broker)?;
        settings.has_credentials = false;
        self.save(&settings)?;
        Ok(settings)
    }
}
