//! Record identifiers.
//!
//! Every persisted record carries a string id of the form
//! `{prefix}_{unix_millis}_{sequence}`. The millisecond timestamp keeps ids
//! roughly time-ordered; the process-wide sequence keeps ids unique when
//! several records are created within the same millisecond.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Id prefixes used by the record kinds.
pub mod prefix {
    pub const ROW: &str = "row";
    pub const TEMPLATE: &str = "template";
    pub const POSITION: &str = "pos";
    pub const TRADE: &str = "trade";
    pub const ALERT: &str = "alert";
    pub const COPY: &str = "copy";
}

/// Generate a fresh id for a record created at `now`.
pub fn next_id(prefix: &str, now: DateTime<Utc>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{}_{seq}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let now = Utc::now();
        let a = next_id(prefix::TEMPLATE, now);
        let b = next_id(prefix::TEMPLATE, now);
        assert_ne!(a, b);
        assert!(a.starts_with("template_"));
    }
}
