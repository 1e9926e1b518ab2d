//! The signal board: the ordered list of rows and every row mutation.
//!
//! Each mutation that could create a second row with the same
//! (symbol, indicator) pair consults [`is_duplicate`] first and returns
//! [`BoardError::DuplicateEntry`] without touching the board.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{is_known_timeframe, DEFAULT_TIMEFRAMES};
use crate::domain::ids::{next_id, prefix};
use crate::domain::{
    AccuracyHistory, Indicator, IndicatorParams, Instrument, InstrumentCategory, Signal,
    SignalRow, Template, TimeframeSignal, UnknownIndicator,
};
use crate::signals::{
    count_signals, generate_timeframe_signals, probability, refresh_signals, selected_call,
    SignalCounts,
};

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("{symbol} + {indicator} combination already exists")]
    DuplicateEntry { symbol: String, indicator: Indicator },

    #[error("row not found: {0}")]
    RowNotFound(String),

    #[error("all symbol + indicator combinations are already in use")]
    Exhausted,

    #[error("timeframe {0} is already used by another slot")]
    TimeframeInUse(String),

    #[error("unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("slot {slot} out of range (row has {len} slots)")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error(transparent)]
    UnknownIndicator(#[from] UnknownIndicator),
}

/// Every label must be a known timeframe, and no label may repeat.
pub fn check_timeframe_set<S: AsRef<str>>(labels: &[S]) -> Result<(), BoardError> {
    for (i, tf) in labels.iter().enumerate() {
        let tf = tf.as_ref();
        if !is_known_timeframe(tf) {
            return Err(BoardError::UnknownTimeframe(tf.to_string()));
        }
        if labels[..i].iter().any(|prev| prev.as_ref() == tf) {
            return Err(BoardError::TimeframeInUse(tf.to_string()));
        }
    }
    Ok(())
}

/// True iff a row other than `exclude_id` already holds `(symbol, indicator)`.
pub fn is_duplicate(
    rows: &[SignalRow],
    symbol: &str,
    indicator: Indicator,
    exclude_id: Option<&str>,
) -> bool {
    rows.iter().any(|row| {
        row.symbol == symbol && row.indicator == indicator && Some(row.id.as_str()) != exclude_id
    })
}

/// What the trade button would do for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub row_id: String,
    pub symbol: String,
    pub signal: Signal,
    /// Confidence, only present in probability mode.
    pub strength: Option<u8>,
    pub timeframes: Vec<String>,
    pub probability_mode: bool,
    pub tradable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalBoard {
    rows: Vec<SignalRow>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<SignalRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SignalRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SignalRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn is_duplicate(&self, symbol: &str, indicator: Indicator, exclude_id: Option<&str>) -> bool {
        is_duplicate(&self.rows, symbol, indicator, exclude_id)
    }

    fn guard(&self, symbol: &str, indicator: Indicator, exclude_id: Option<&str>) -> Result<(), BoardError> {
        if self.is_duplicate(symbol, indicator, exclude_id) {
            return Err(BoardError::DuplicateEntry {
                symbol: symbol.to_string(),
                indicator,
            });
        }
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize, BoardError> {
        self.rows
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BoardError::RowNotFound(id.to_string()))
    }

    fn row_mut(&mut self, id: &str) -> Result<&mut SignalRow, BoardError> {
        let idx = self.index_of(id)?;
        Ok(&mut self.rows[idx])
    }

    /// Append a row for the first free (instrument, indicator) pair, scanning
    /// instruments in order and indicators in catalog order.
    pub fn add_row<R: Rng + ?Sized>(
        &mut self,
        instruments: &[Instrument],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<&SignalRow, BoardError> {
        self.add_row_with_timeframes(instruments, &DEFAULT_TIMEFRAMES, rng, now)
    }

    /// Like [`add_row`](Self::add_row) with an explicit starting timeframe set.
    pub fn add_row_with_timeframes<R: Rng + ?Sized, S: AsRef<str>>(
        &mut self,
        instruments: &[Instrument],
        timeframes: &[S],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<&SignalRow, BoardError> {
        check_timeframe_set(timeframes)?;
        let (instrument, indicator) = instruments
            .iter()
            .flat_map(|inst| Indicator::ALL.into_iter().map(move |ind| (inst, ind)))
            .find(|(inst, ind)| !self.is_duplicate(&inst.symbol, *ind, None))
            .ok_or(BoardError::Exhausted)?;

        let row = SignalRow {
            id: next_id(prefix::ROW, now),
            symbol: instrument.symbol.clone(),
            instrument_name: instrument.name.clone(),
            category: instrument.category,
            indicator,
            indicator_params: indicator.default_params(),
            timeframes: generate_timeframe_signals(rng, timeframes),
            last_price: instrument.price,
            price_change: instrument.change,
            price_change_percent: instrument.change_percent,
            accuracy_history: AccuracyHistory::generate(rng),
            probability_mode_enabled: false,
        };
        self.rows.push(row);
        let last = self.rows.len() - 1;
        Ok(&self.rows[last])
    }

    pub fn delete_row(&mut self, id: &str) -> Result<SignalRow, BoardError> {
        let idx = self.index_of(id)?;
        Ok(self.rows.remove(idx))
    }

    pub fn change_instrument(&mut self, id: &str, instrument: &Instrument) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        let indicator = self.rows[idx].indicator;
        self.guard(&instrument.symbol, indicator, Some(id))?;
        self.rows[idx].set_instrument(instrument);
        Ok(())
    }

    /// Switch indicator: params reset to defaults, every slot redrawn.
    pub fn change_indicator<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        indicator: Indicator,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        let symbol = self.rows[idx].symbol.clone();
        self.guard(&symbol, indicator, Some(id))?;

        let row = &mut self.rows[idx];
        row.indicator = indicator;
        row.indicator_params = indicator.default_params();
        let labels = row.timeframe_labels();
        row.timeframes = generate_timeframe_signals(rng, &labels);
        Ok(())
    }

    pub fn update_params(&mut self, id: &str, params: IndicatorParams) -> Result<(), BoardError> {
        self.row_mut(id)?.indicator_params = params;
        Ok(())
    }

    /// Point slot `slot` at a new timeframe. The slot gets a fresh signal and
    /// loses its selection.
    pub fn change_timeframe<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        slot: usize,
        timeframe: &str,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        if !is_known_timeframe(timeframe) {
            return Err(BoardError::UnknownTimeframe(timeframe.to_string()));
        }
        let row = self.row_mut(id)?;
        let len = row.timeframes.len();
        if slot >= len {
            return Err(BoardError::SlotOutOfRange { slot, len });
        }
        let in_use = row
            .timeframes
            .iter()
            .enumerate()
            .any(|(i, t)| i != slot && t.timeframe == timeframe);
        if in_use {
            return Err(BoardError::TimeframeInUse(timeframe.to_string()));
        }
        row.timeframes[slot] = TimeframeSignal::new(timeframe, Signal::random(rng));
        Ok(())
    }

    /// Timeframes a slot may switch to: everything not held by another slot.
    pub fn available_timeframes(&self, id: &str, slot: usize) -> Result<Vec<&'static str>, BoardError> {
        let row = self.get(id).ok_or_else(|| BoardError::RowNotFound(id.to_string()))?;
        let taken: Vec<&str> = row
            .timeframes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .map(|(_, t)| t.timeframe.as_str())
            .collect();
        Ok(crate::catalog::ALL_TIMEFRAMES
            .iter()
            .copied()
            .filter(|tf| !taken.contains(tf))
            .collect())
    }

    /// Flip a slot's selection; returns the new state.
    pub fn toggle_timeframe(&mut self, id: &str, slot: usize) -> Result<bool, BoardError> {
        let row = self.row_mut(id)?;
        let len = row.timeframes.len();
        let tf = row
            .timeframes
            .get_mut(slot)
            .ok_or(BoardError::SlotOutOfRange { slot, len })?;
        tf.selected = !tf.selected;
        Ok(tf.selected)
    }

    pub fn set_probability_mode(&mut self, id: &str, enabled: bool) -> Result<(), BoardError> {
        self.row_mut(id)?.probability_mode_enabled = enabled;
        Ok(())
    }

    /// Load a template onto a row. The instrument comes from `instrument` when
    /// the caller resolved it, otherwise from the template's own symbol fields.
    pub fn apply_template<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        template: &Template,
        instrument: Option<&Instrument>,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        let idx = self.index_of(id)?;
        self.guard(&template.symbol, template.indicator, Some(id))?;
        check_timeframe_set(template.timeframes.as_slice())?;

        let row = &mut self.rows[idx];
        match instrument {
            Some(inst) => row.set_instrument(inst),
            None => {
                row.symbol = template.symbol.clone();
                row.instrument_name = template.symbol_name.clone();
            }
        }
        row.indicator = template.indicator;
        row.indicator_params = template.indicator_params.clone();
        if !template.timeframes.is_empty() {
            row.timeframes = generate_timeframe_signals(rng, &template.timeframes);
        } else {
            refresh_signals(rng, &mut row.timeframes);
        }
        Ok(())
    }

    /// Redraw every row's signals (the periodic "live" refresh).
    pub fn refresh_all<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for row in &mut self.rows {
            refresh_signals(rng, &mut row.timeframes);
        }
    }

    pub fn trade_intent(&self, id: &str) -> Result<TradeIntent, BoardError> {
        let row = self.get(id).ok_or_else(|| BoardError::RowNotFound(id.to_string()))?;
        let (signal, strength, timeframes) = if row.probability_mode_enabled {
            let p = probability(&row.timeframes);
            (p.signal, Some(p.strength), row.timeframe_labels())
        } else {
            let call = selected_call(&row.timeframes);
            (call.signal, None, call.timeframes)
        };
        let tradable = signal != Signal::Neutral
            && (row.probability_mode_enabled || !timeframes.is_empty());
        Ok(TradeIntent {
            row_id: row.id.clone(),
            symbol: row.symbol.clone(),
            signal,
            strength,
            timeframes,
            probability_mode: row.probability_mode_enabled,
            tradable,
        })
    }

    /// Rows grouped by category in display order; empty groups are skipped.
    pub fn grouped(&self) -> Vec<(InstrumentCategory, Vec<&SignalRow>)> {
        InstrumentCategory::ORDER
            .iter()
            .map(|cat| (*cat, self.rows.iter().filter(|r| r.category == *cat).collect::<Vec<_>>()))
            .filter(|(_, rows)| !rows.is_empty())
            .collect()
    }

    pub fn signal_counts(&self) -> SignalCounts {
        count_signals(self.rows.iter().flat_map(|r| r.timeframes.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board_with_rows(n: usize) -> (SignalBoard, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut board = SignalBoard::new();
        let instruments = catalog::instruments();
        for _ in 0..n {
            board.add_row(&instruments, &mut rng, Utc::now()).unwrap();
        }
        (board, rng)
    }

    #[test]
    fn add_row_scans_indicators_first() {
        let (board, _) = board_with_rows(2);
        assert_eq!(board.rows()[0].symbol, "AAPL");
        assert_eq!(board.rows()[0].indicator, Indicator::Rsi);
        assert_eq!(board.rows()[1].symbol, "AAPL");
        assert_eq!(board.rows()[1].indicator, Indicator::Macd);
        assert_eq!(board.rows()[0].timeframes.len(), DEFAULT_TIMEFRAMES.len());
        assert_eq!(board.rows()[0].accuracy_history.len(), 10);
    }

    #[test]
    fn add_row_exhausts() {
        let mut rng = StdRng::seed_from_u64(1);
        let one = vec![catalog::instruments().remove(0)];
        let mut board = SignalBoard::new();
        for _ in 0..Indicator::ALL.len() {
            board.add_row(&one, &mut rng, Utc::now()).unwrap();
        }
        let err = board.add_row(&one, &mut rng, Utc::now()).unwrap_err();
        assert_eq!(err, BoardError::Exhausted);
        assert_eq!(board.len(), Indicator::ALL.len());
    }

    #[test]
    fn change_indicator_rejects_duplicate_and_leaves_row() {
        let (mut board, mut rng) = board_with_rows(2);
        let id = board.rows()[1].id.clone();
        let before = board.clone();
        let err = board.change_indicator(&id, Indicator::Rsi, &mut rng).unwrap_err();
        assert!(matches!(err, BoardError::DuplicateEntry { .. }));
        assert_eq!(board, before);
    }

    #[test]
    fn change_indicator_to_own_pair_is_allowed() {
        let (mut board, mut rng) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        board.change_indicator(&id, Indicator::Rsi, &mut rng).unwrap();
    }

    #[test]
    fn change_indicator_resets_params_keeps_labels() {
        let (mut board, mut rng) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        board
            .update_params(&id, IndicatorParams::from([("period".to_string(), 3.0)]))
            .unwrap();
        board.change_indicator(&id, Indicator::Ema, &mut rng).unwrap();
        let row = board.get(&id).unwrap();
        assert_eq!(row.indicator_params, Indicator::Ema.default_params());
        assert_eq!(row.timeframe_labels(), DEFAULT_TIMEFRAMES);
    }

    #[test]
    fn change_instrument_guarded() {
        let (mut board, _) = board_with_rows(1);
        let mut rng = StdRng::seed_from_u64(5);
        let msft = catalog::find_instrument("MSFT").unwrap();
        board.add_row(&[msft.clone()], &mut rng, Utc::now()).unwrap();
        let first = board.rows()[0].id.clone();
        let err = board.change_instrument(&first, &msft).unwrap_err();
        assert!(matches!(err, BoardError::DuplicateEntry { .. }));

        let tsla = catalog::find_instrument("TSLA").unwrap();
        board.change_instrument(&first, &tsla).unwrap();
        assert_eq!(board.rows()[0].symbol, "TSLA");
        assert_eq!(board.rows()[0].last_price, tsla.price);
    }

    #[test]
    fn timeframe_slots_stay_distinct() {
        let (mut board, mut rng) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        let err = board.change_timeframe(&id, 0, "5m", &mut rng).unwrap_err();
        assert_eq!(err, BoardError::TimeframeInUse("5m".into()));
        board.change_timeframe(&id, 0, "4h", &mut rng).unwrap();
        assert_eq!(board.rows()[0].timeframes[0].timeframe, "4h");
        assert!(matches!(
            board.change_timeframe(&id, 9, "2h", &mut rng),
            Err(BoardError::SlotOutOfRange { slot: 9, len: 5 })
        ));
        assert!(matches!(
            board.change_timeframe(&id, 0, "7m", &mut rng),
            Err(BoardError::UnknownTimeframe(_))
        ));
    }

    #[test]
    fn available_timeframes_exclude_other_slots() {
        let (board, _) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        let avail = board.available_timeframes(&id, 0).unwrap();
        assert!(avail.contains(&"1m"));
        assert!(!avail.contains(&"5m"));
        assert_eq!(avail.len(), catalog::ALL_TIMEFRAMES.len() - 4);
    }

    #[test]
    fn trade_intent_needs_selection_outside_probability_mode() {
        let (mut board, _) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        let intent = board.trade_intent(&id).unwrap();
        assert_eq!(intent.signal, Signal::Neutral);
        assert!(!intent.tradable);
        assert!(intent.strength.is_none());

        {
            let row = board.row_mut(&id).unwrap();
            row.timeframes[0].signal = Signal::Sell;
        }
        board.toggle_timeframe(&id, 0).unwrap();
        let intent = board.trade_intent(&id).unwrap();
        assert_eq!(intent.signal, Signal::Sell);
        assert!(intent.tradable);
        assert_eq!(intent.timeframes, vec!["1m"]);
    }

    #[test]
    fn trade_intent_in_probability_mode() {
        let (mut board, _) = board_with_rows(1);
        let id = board.rows()[0].id.clone();
        {
            let row = board.row_mut(&id).unwrap();
            for (i, s) in [Signal::Buy, Signal::Buy, Signal::Buy, Signal::Sell, Signal::Neutral]
                .into_iter()
                .enumerate()
            {
                row.timeframes[i].signal = s;
            }
        }
        board.set_probability_mode(&id, true).unwrap();
        let intent = board.trade_intent(&id).unwrap();
        assert_eq!(intent.signal, Signal::Buy);
        assert_eq!(intent.strength, Some(60));
        assert!(intent.tradable);
    }

    #[test]
    fn grouped_follows_display_order() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut board = SignalBoard::new();
        let eur = catalog::find_instrument("EUR/USD").unwrap();
        let aapl = catalog::find_instrument("AAPL").unwrap();
        board.add_row(&[eur], &mut rng, Utc::now()).unwrap();
        board.add_row(&[aapl], &mut rng, Utc::now()).unwrap();
        let groups = board.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, InstrumentCategory::UsStocks);
        assert_eq!(groups[1].0, InstrumentCategory::Forex);
    }

    #[test]
    fn unknown_row() {
        let (mut board, _) = board_with_rows(0);
        assert_eq!(
            board.delete_row("nope").unwrap_err(),
            BoardError::RowNotFound("nope".into())
        );
    }

    #[test]
    fn signal_counts_cover_all_slots() {
        let (board, _) = board_with_rows(3);
        assert_eq!(board.signal_counts().total(), 15);
    }

    #[test]
    fn add_row_with_custom_timeframes() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut board = SignalBoard::new();
        let instruments = catalog::instruments();
        let row = board
            .add_row_with_timeframes(&instruments, &["4h", "1d"], &mut rng, Utc::now())
            .unwrap();
        assert_eq!(row.timeframe_labels(), vec!["4h", "1d"]);

        let err = board
            .add_row_with_timeframes(&instruments, &["7m"], &mut rng, Utc::now())
            .unwrap_err();
        assert_eq!(err, BoardError::UnknownTimeframe("7m".into()));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn repeated_timeframes_are_rejected() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut board = SignalBoard::new();
        let err = board
            .add_row_with_timeframes(&catalog::instruments(), &["1m", "1h", "1m"], &mut rng, Utc::now())
            .unwrap_err();
        assert_eq!(err, BoardError::TimeframeInUse("1m".into()));
        assert!(board.is_empty());
        assert!(check_timeframe_set(&["1m", "5m", "1h"]).is_ok());
    }
}
