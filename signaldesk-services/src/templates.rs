//! Saved backtest templates, capped at [`MAX_TEMPLATES`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use signaldesk_core::backtest::BacktestRequest;
use signaldesk_core::domain::ids::{next_id, prefix};
use signaldesk_core::domain::{Indicator, IndicatorParams, Template, TemplateResults};

use crate::repository::Collection;
use crate::store::StoreError;

pub const MAX_TEMPLATES: usize = 10;

/// A template before it is stored (no id or timestamps yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub symbol: String,
    pub symbol_name: String,
    pub indicator: Indicator,
    pub indicator_params: IndicatorParams,
    pub timeframes: Vec<String>,
    pub initial_capital: f64,
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub last_results: Option<TemplateResults>,
}

impl NewTemplate {
    /// Capture the configuration of a backtest request under `name`.
    pub fn from_request(name: impl Into<String>, request: &BacktestRequest) -> Self {
        Self {
            name: name.into(),
            symbol: request.symbol.clone(),
            symbol_name: request.name.clone(),
            indicator: request.indicator,
            indicator_params: request.indicator_params.clone(),
            timeframes: request.timeframes.clone(),
            initial_capital: request.settings.initial_capital,
            position_size: request.settings.position_size,
            stop_loss: request.settings.stop_loss,
            take_profit: request.settings.take_profit,
            last_results: None,
        }
    }
}

/// Partial update; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub indicator_params: Option<IndicatorParams>,
    pub timeframes: Option<Vec<String>>,
    pub initial_capital: Option<f64>,
    pub position_size: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub last_results: Option<TemplateResults>,
}

pub struct TemplateService {
    templates: Collection<Template>,
}

impl TemplateService {
    pub fn new(templates: Collection<Template>) -> Self {
        Self { templates }
    }

    pub fn list(&self) -> Vec<Template> {
        self.templates.list()
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.templates.find(id)
    }

    pub fn save(&self, new: NewTemplate, now: DateTime<Utc>) -> Result<Template, StoreError> {
        if self.templates.list().len() >= MAX_TEMPLATES {
            return Err(StoreError::CapacityExceeded { max: MAX_TEMPLATES });
        }
        let template = Template {
            id: next_id(prefix::TEMPLATE, now),
            name: new.name,
            symbol: new.symbol,
            symbol_name: new.symbol_name,
            indicator: new.indicator,
            indicator_params: new.indicator_params,
            timeframes: new.timeframes,
            initial_capital: new.initial_capital,
            position_size: new.position_size,
            stop_loss: new.stop_loss,
            take_profit: new.take_profit,
            created_at: now,
            updated_at: now,
            last_results: new.last_results,
        };
        info!(id = %template.id, name = %template.name, "template saved");
        self.templates.create(template)
    }

    /// Apply `patch` and bump `updated_at`.
    pub fn update(&self, id: &str, patch: TemplatePatch, now: DateTime<Utc>) -> Result<Template, StoreError> {
        self.templates.update(id, |t| {
            if let Some(v) = patch.name {
                t.name = v;
            }
            if let Some(v) = patch.indicator_params {
                t.indicator_params = v;
            }
            if let Some(v) = patch.timeframes {
                t.timeframes = v;
            }
            if let Some(v) = patch.initial_capital {
                t.initial_capital = v;
            }
            if let Some(v) = patch.position_size {
                t.position_size = v;
            }
            if let Some(v) = patch.stop_loss {
                t.stop_loss = v;
            }
            if let Some(v) = patch.take_profit {
                t.take_profit = v;
            }
            if let Some(v) = patch.last_results {
                t.last_results = Some(v);
            }
            t.updated_at = now;
        })
    }

    pub fn record_results(
        &self,
        id: &str,
        results: TemplateResults,
        now: DateTime<Utc>,
    ) -> Result<Template, StoreError> {
        self.update(
            id,
            TemplatePatch {
                last_results: Some(results),
                ..TemplatePatch::default()
            },
            now,
        )
    }

    pub fn delete(&self, id: &str) -> Result<Template, StoreError> {
        self.templates.delete(id)
    }
}
