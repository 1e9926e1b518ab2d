//! P&L alert rules.

use chrono::{DateTime, Utc};

use signaldesk_core::alerts::check_alerts;
use signaldesk_core::domain::ids::{next_id, prefix};
use signaldesk_core::domain::{AlertKind, OpenPosition, PnlAlert};

use crate::repository::Collection;
use crate::store::StoreError;

pub struct AlertService {
    alerts: Collection<PnlAlert>,
}

impl AlertService {
    pub fn new(alerts: Collection<PnlAlert>) -> Self {
        Self { alerts }
    }

    pub fn list(&self) -> Vec<PnlAlert> {
        self.alerts.list()
    }

    /// Add an enabled alert. A blank symbol means the whole book.
    pub fn add(
        &self,
        kind: AlertKind,
        threshold: f64,
        symbol: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PnlAlert, StoreError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(StoreError::InvalidThreshold(threshold));
        }
        let symbol = symbol
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.alerts.create(PnlAlert {
            id: next_id(prefix::ALERT, now),
            kind,
            threshold,
            enabled: true,
            symbol,
            created_at: now,
        })
    }

    pub fn delete(&self, id: &str) -> Result<PnlAlert, StoreError> {
        self.alerts.delete(id)
    }

    pub fn toggle(&self, id: &str) -> Result<PnlAlert, StoreError> {
        self.alerts.update(id, |a| a.enabled = !a.enabled)
    }

    /// Alerts that currently fire.
    pub fn check(&self, total_pnl: f64, positions: &[OpenPosition]) -> Vec<PnlAlert> {
        let alerts = self.alerts.list();
        check_alerts(&alerts, total_pnl, positions)
            .into_iter()
            .cloned()
            .collect()
    }
}
