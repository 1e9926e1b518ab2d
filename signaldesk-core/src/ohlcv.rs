//! Mock one-minute OHLCV bars for the per-slot CSV download.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bars in one download: the current minute plus the 50 before it.
pub const MOCK_BAR_COUNT: usize = 51;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Random-walk bars ending at `as_of`, oldest first. Each bar opens at the
/// previous close.
pub fn generate_mock_bars<R: Rng + ?Sized>(rng: &mut R, as_of: DateTime<Utc>) -> Vec<MockBar> {
    let mut base = rng.gen::<f64>() * 1000.0 + 100.0;
    (0..MOCK_BAR_COUNT)
        .rev()
        .map(|minutes_back| {
            let open = base;
            let close = open + (rng.gen::<f64>() - 0.5) * 10.0;
            let high = open.max(close) + rng.gen::<f64>() * 5.0;
            let low = open.min(close) - rng.gen::<f64>() * 5.0;
            let volume = rng.gen_range(0..100_000u64) + 10_000;
            base = close;
            MockBar {
                timestamp: as_of - Duration::minutes(minutes_back as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bars_chain_and_bracket() {
        let now = Utc::now();
        let bars = generate_mock_bars(&mut StdRng::seed_from_u64(8), now);
        assert_eq!(bars.len(), MOCK_BAR_COUNT);
        assert_eq!(bars.last().unwrap().timestamp, now);
        assert_eq!(bars[0].timestamp, now - Duration::minutes(50));
        for w in bars.windows(2) {
            assert_eq!(w[1].open, w[0].close);
        }
        for b in &bars {
            assert!(b.high >= b.open.max(b.close));
            assert!(b.low <= b.open.min(b.close));
            assert!((10_000..110_000).contains(&b.volume));
        }
    }
}
