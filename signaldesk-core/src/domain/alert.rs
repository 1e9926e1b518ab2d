use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Fires when PnL reaches `+threshold` dollars.
    Profit,
    /// Fires when PnL falls to `-threshold` dollars.
    Loss,
    /// Fires when |PnL %| reaches `threshold`. Only meaningful for a symbol.
    Percent,
}

/// A P&L threshold alert, either for one symbol or for the whole book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlAlert {
    pub id: String,
    pub kind: AlertKind,
    pub threshold: f64,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub created_at: DateTime<Utc>,
}
