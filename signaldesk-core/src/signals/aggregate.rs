//! Aggregators that fold per-timeframe signals into one call.
//!
//! - [`probability`]: majority with a minimum-share threshold, plus a
//!   confidence percentage.
//! - [`selected_call`]: strict majority over the user-selected slots.
//! - [`accuracy`]: hit rate of a row's rolling outcome window.

use serde::{Deserialize, Serialize};

use crate::domain::{AccuracyResult, Signal, TimeframeSignal};
use crate::numeric::percent_of;

/// Minimum share (percent) of slots that must agree before the probability
/// aggregate leaves neutral.
pub const PROBABILITY_THRESHOLD: f64 = 40.0;

/// Combined call with its confidence in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    pub signal: Signal,
    pub strength: u8,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    buy: usize,
    sell: usize,
    total: usize,
}

fn tally<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> Tally {
    let mut t = Tally::default();
    for s in signals {
        t.total += 1;
        match s {
            Signal::Buy => t.buy += 1,
            Signal::Sell => t.sell += 1,
            Signal::Neutral => {}
        }
    }
    t
}

fn strength(pct: f64) -> u8 {
    pct.round().clamp(0.0, 100.0) as u8
}

/// Probability aggregate over every slot of a row.
///
/// Buy when buys outnumber sells and reach [`PROBABILITY_THRESHOLD`]; sell
/// symmetrically; otherwise neutral carrying the larger share. Equal counts
/// are always neutral, and an empty slice is neutral with strength 0.
pub fn probability(timeframes: &[TimeframeSignal]) -> Probability {
    let t = tally(timeframes.iter().map(|tf| &tf.signal));
    let buy_pct = percent_of(t.buy, t.total);
    let sell_pct = percent_of(t.sell, t.total);

    if buy_pct > sell_pct && buy_pct >= PROBABILITY_THRESHOLD {
        Probability {
            signal: Signal::Buy,
            strength: strength(buy_pct),
        }
    } else if sell_pct > buy_pct && sell_pct >= PROBABILITY_THRESHOLD {
        Probability {
            signal: Signal::Sell,
            strength: strength(sell_pct),
        }
    } else {
        Probability {
            signal: Signal::Neutral,
            strength: strength(buy_pct.max(sell_pct)),
        }
    }
}

/// Majority call over the selected slots, with the labels that fed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedCall {
    pub signal: Signal,
    pub timeframes: Vec<String>,
}

pub fn selected_call(timeframes: &[TimeframeSignal]) -> SelectedCall {
    let selected: Vec<&TimeframeSignal> = timeframes.iter().filter(|t| t.selected).collect();
    let t = tally(selected.iter().map(|tf| &tf.signal));
    let signal = if t.buy > t.sell {
        Signal::Buy
    } else if t.sell > t.buy {
        Signal::Sell
    } else {
        Signal::Neutral
    };
    SelectedCall {
        signal,
        timeframes: selected.iter().map(|t| t.timeframe.clone()).collect(),
    }
}

/// Percentage of profitable outcomes, rounded to a whole percent.
pub fn accuracy(history: &[AccuracyResult]) -> u8 {
    let wins = history.iter().filter(|r| r.is_profitable()).count();
    strength(percent_of(wins, history.len()))
}
