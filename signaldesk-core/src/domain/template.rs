use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicator::{Indicator, IndicatorParams};

/// Headline numbers from the last backtest run with a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResults {
    pub win_rate: f64,
    pub net_profit: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
}

/// A saved backtest configuration that can be reapplied to a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_results: Option<TemplateResults>,
}
