//! Followed traders and the trades copied from them.
//!
//! A trader is either not followed or followed exactly once; settings can be
//! patched any number of times while following.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use signaldesk_core::copy_trading::generate_copied_trades;
use signaldesk_core::domain::{
    CopiedTrade, CopyStatus, FollowSettings, FollowSettingsPatch, FollowedTrader, TopTrader,
};
use signaldesk_core::numeric::round_dp;

use crate::repository::Collection;
use crate::store::StoreError;

pub struct FollowingService {
    followed: Collection<FollowedTrader>,
    copied: Collection<CopiedTrade>,
}

impl FollowingService {
    pub fn new(followed: Collection<FollowedTrader>, copied: Collection<CopiedTrade>) -> Self {
        Self { followed, copied }
    }

    pub fn list(&self) -> Vec<FollowedTrader> {
        self.followed.list()
    }

    pub fn is_following(&self, trader_id: &str) -> bool {
        self.followed.contains(trader_id)
    }

    pub fn follow(
        &self,
        trader: TopTrader,
        settings: FollowSettings,
        now: DateTime<Utc>,
    ) -> Result<FollowedTrader, StoreError> {
        if self.is_following(&trader.id) {
            return Err(StoreError::AlreadyFollowing(trader.id));
        }
        let follow = FollowedTrader::new(trader, settings, now);
        info!(trader = %follow.id(), copy_pct = follow.settings.copy_percentage, "following trader");
        self.followed.create(follow)
    }

    pub fn unfollow(&self, trader_id: &str) -> Result<FollowedTrader, StoreError> {
        self.followed.delete(trader_id)
    }

    pub fn update_settings(
        &self,
        trader_id: &str,
        patch: &FollowSettingsPatch,
    ) -> Result<FollowedTrader, StoreError> {
        self.followed.update(trader_id, |f| f.settings.apply(patch))
    }

    // ─── Copied trades ──────────────────────────────────────────────

    pub fn copied_trades(&self) -> Vec<CopiedTrade> {
        self.copied.list()
    }

    /// Mirror one fresh mock trade for each auto-copying followed trader and
    /// store them.
    pub fn generate_for_followed<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Vec<CopiedTrade>, StoreError> {
        let fresh = generate_copied_trades(&self.followed.list(), rng, now);
        if fresh.is_empty() {
            return Ok(fresh);
        }
        let mut all = self.copied.list();
        all.extend(fresh.iter().cloned());
        self.copied.replace(all)?;
        Ok(fresh)
    }

    pub fn record(&self, trade: CopiedTrade) -> Result<CopiedTrade, StoreError> {
        self.copied.create(trade)
    }

    /// Close an open copied trade at `price`.
    pub fn close(&self, id: &str, price: f64, now: DateTime<Utc>) -> Result<CopiedTrade, StoreError> {
        self.copied.update(id, |t| {
            let pnl = (price - t.entry_price) * t.side.sign();
            t.current_price = price;
            t.pnl = round_dp(pnl * 100.0, 2);
            t.pnl_percent = round_dp(pnl / t.entry_price * 100.0, 2);
            t.status = CopyStatus::Closed;
            t.closed_at = Some(now);
            t.close_price = Some(price);
        })
    }
}
