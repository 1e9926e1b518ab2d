//! SignalDesk services: persisted collections over a key-value store, change
//! events, exports and configuration.
//!
//! Every service is a thin layer over [`repository::Collection`]; the
//! [`SignalDesk`] bundle wires them to one store and one [`EventBus`].

pub mod account;
pub mod alerts;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod events;
pub mod export;
pub mod following;
pub mod history;
pub mod positions;
pub mod repository;
pub mod store;
pub mod templates;

pub use account::{AccountService, MemorySecretStore, SecretStore};
pub use config::{AppConfig, ConfigError, StoreBackend};
pub use context::SignalDesk;
pub use events::{EventBus, StoreEvent};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use templates::{NewTemplate, TemplatePatch, MAX_TEMPLATES};
