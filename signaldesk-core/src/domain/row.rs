//! Board rows: one instrument × indicator pair with its timeframe signals.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::indicator::{Indicator, IndicatorParams};
use super::instrument::{Instrument, InstrumentCategory};
use super::signal::{Signal, TradeSide};

/// Number of outcomes kept in a row's rolling accuracy window.
pub const ACCURACY_WINDOW: usize = 10;

/// One timeframe slot of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSignal {
    pub timeframe: String,
    pub signal: Signal,
    #[serde(default)]
    pub selected: bool,
}

impl TimeframeSignal {
    pub fn new(timeframe: impl Into<String>, signal: Signal) -> Self {
        Self {
            timeframe: timeframe.into(),
            signal,
            selected: false,
        }
    }
}

/// Outcome of one past call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub profit_amount: f64,
    pub signal: TradeSide,
}

impl AccuracyResult {
    pub fn is_profitable(&self) -> bool {
        self.profit_amount > 0.0
    }
}

/// Rolling window of the last [`ACCURACY_WINDOW`] outcomes, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccuracyHistory(Vec<AccuracyResult>);

impl AccuracyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a window from existing results, keeping the most recent ones.
    pub fn from_results(results: Vec<AccuracyResult>) -> Self {
        let mut history = Self::new();
        for r in results {
            history.record(r);
        }
        history
    }

    /// Mock history for a freshly added row: 60% winners in `(0, 5)`,
    /// otherwise losers in `(-3, 0]`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let results = (0..ACCURACY_WINDOW)
            .map(|_| {
                let profit_amount = if rng.gen::<f64>() > 0.4 {
                    rng.gen::<f64>() * 5.0
                } else {
                    -rng.gen::<f64>() * 3.0
                };
                AccuracyResult {
                    profit_amount,
                    signal: TradeSide::random(rng),
                }
            })
            .collect();
        Self(results)
    }

    /// Append an outcome, evicting the oldest once the window is full.
    pub fn record(&mut self, result: AccuracyResult) {
        if self.0.len() == ACCURACY_WINDOW {
            self.0.remove(0);
        }
        self.0.push(result);
    }

    pub fn as_slice(&self) -> &[AccuracyResult] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A configured row on the signal board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub id: String,
    pub symbol: String,
    pub instrument_name: String,
    pub category: InstrumentCategory,
    pub indicator: Indicator,
    pub indicator_params: IndicatorParams,
    pub timeframes: Vec<TimeframeSignal>,
    pub last_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub accuracy_history: AccuracyHistory,
    #[serde(default)]
    pub probability_mode_enabled: bool,
}

impl SignalRow {
    /// Copy symbol, name, category and quote from an instrument.
    pub fn set_instrument(&mut self, instrument: &Instrument) {
        self.symbol = instrument.symbol.clone();
        self.instrument_name = instrument.name.clone();
        self.category = instrument.category;
        self.last_price = instrument.price;
        self.price_change = instrument.change;
        self.price_change_percent = instrument.change_percent;
    }

    pub fn timeframe_labels(&self) -> Vec<String> {
        self.timeframes.iter().map(|t| t.timeframe.clone()).collect()
    }

    pub fn selected_timeframes(&self) -> impl Iterator<Item = &TimeframeSignal> {
        self.timeframes.iter().filter(|t| t.selected)
    }
}
