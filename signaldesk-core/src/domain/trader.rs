//! Copy-trading records: catalog traders, follows and mirrored trades.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signal::TradeSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// A trader from the static leaderboard catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTrader {
    pub id: String,
    pub name: String,
    pub username: String,
    pub avatar: String,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub total_trades: u32,
    pub followers: u32,
    pub monthly_return: f64,
    pub risk_level: RiskLevel,
    pub trading_style: String,
    pub instruments: Vec<String>,
    pub is_verified: bool,
}

/// How a followed trader's trades are mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowSettings {
    /// Share of the trader's size to copy, 1–100.
    pub copy_percentage: f64,
    /// Loss after which copying stops.
    pub max_loss_limit: f64,
    pub auto_copy: bool,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            copy_percentage: 50.0,
            max_loss_limit: 500.0,
            auto_copy: true,
        }
    }
}

/// Partial update of [`FollowSettings`]; `None` fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowSettingsPatch {
    pub copy_percentage: Option<f64>,
    pub max_loss_limit: Option<f64>,
    pub auto_copy: Option<bool>,
}

impl FollowSettings {
    pub fn apply(&mut self, patch: &FollowSettingsPatch) {
        if let Some(v) = patch.copy_percentage {
            self.copy_percentage = v.clamp(1.0, 100.0);
        }
        if let Some(v) = patch.max_loss_limit {
            self.max_loss_limit = v;
        }
        if let Some(v) = patch.auto_copy {
            self.auto_copy = v;
        }
    }
}

/// A catalog trader the user follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowedTrader {
    #[serde(flatten)]
    pub trader: TopTrader,
    pub followed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub settings: FollowSettings,
}

impl FollowedTrader {
    pub fn new(trader: TopTrader, settings: FollowSettings, followed_at: DateTime<Utc>) -> Self {
        let mut settings = settings;
        settings.copy_percentage = settings.copy_percentage.clamp(1.0, 100.0);
        Self {
            trader,
            followed_at,
            settings,
        }
    }

    pub fn id(&self) -> &str {
        &self.trader.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Open,
    Closed,
}

/// A trade mirrored from a followed trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopiedTrade {
    pub id: String,
    pub trader_id: String,
    pub trader_name: String,
    pub symbol: String,
    pub side: TradeSide,
    pub entry_price: f64,
    pub current_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub opened_at: DateTime<Utc>,
    pub status: CopyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_given_fields() {
        let mut s = FollowSettings::default();
        s.apply(&FollowSettingsPatch {
            auto_copy: Some(false),
            ..Default::default()
        });
        assert!(!s.auto_copy);
        assert_eq!(s.copy_percentage, 50.0);
        assert_eq!(s.max_loss_limit, 500.0);
    }

    #[test]
    fn copy_percentage_is_clamped() {
        let mut s = FollowSettings::default();
        s.apply(&FollowSettingsPatch {
            copy_percentage: Some(250.0),
            ..Default::default()
        });
        assert_eq!(s.copy_percentage, 100.0);
    }
}
