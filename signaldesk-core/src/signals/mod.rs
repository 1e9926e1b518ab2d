//! Mock signal generation and aggregation.

pub mod aggregate;

pub use aggregate::{
    accuracy, probability, selected_call, Probability, SelectedCall, PROBABILITY_THRESHOLD,
};

use rand::Rng;

use crate::domain::{Signal, TimeframeSignal};

/// Fresh random signals for the given timeframe labels, none selected.
pub fn generate_timeframe_signals<R, S>(rng: &mut R, labels: &[S]) -> Vec<TimeframeSignal>
where
    R: Rng + ?Sized,
    S: AsRef<str>,
{
    labels
        .iter()
        .map(|tf| TimeframeSignal::new(tf.as_ref(), Signal::random(rng)))
        .collect()
}

/// Redraw every slot's signal in place, keeping labels and selection.
pub fn refresh_signals<R: Rng + ?Sized>(rng: &mut R, timeframes: &mut [TimeframeSignal]) {
    for tf in timeframes {
        tf.signal = Signal::random(rng);
    }
}

/// Buy / sell / neutral totals across many slots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub neutral: usize,
}

impl SignalCounts {
    pub fn total(&self) -> usize {
        self.buy + self.sell + self.neutral
    }
}

pub fn count_signals<'a>(slots: impl IntoIterator<Item = &'a TimeframeSignal>) -> SignalCounts {
    let mut counts = SignalCounts::default();
    for s in slots {
        match s.signal {
            Signal::Buy => counts.buy += 1,
            Signal::Sell => counts.sell += 1,
            Signal::Neutral => counts.neutral += 1,
        }
    }
    counts
}
