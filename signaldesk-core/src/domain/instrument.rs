use serde::{Deserialize, Serialize};
use std::fmt;

/// Market segment an instrument belongs to. Rows on the board are grouped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentCategory {
    UsStocks,
    Crypto,
    Forex,
}

impl InstrumentCategory {
    /// Display order on the board.
    pub const ORDER: [InstrumentCategory; 3] = [
        InstrumentCategory::UsStocks,
        InstrumentCategory::Crypto,
        InstrumentCategory::Forex,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InstrumentCategory::UsStocks => "US Stocks",
            InstrumentCategory::Crypto => "Cryptocurrency",
            InstrumentCategory::Forex => "Forex / Currency",
        }
    }
}

impl fmt::Display for InstrumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tradable instrument with its latest quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub category: InstrumentCategory,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        category: InstrumentCategory,
        price: f64,
        change: f64,
        change_percent: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            category,
            price,
            change,
            change_percent,
        }
    }

    /// Case-insensitive match on symbol or name.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.symbol.to_lowercase().contains(&q) || self.name.to_lowercase().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&InstrumentCategory::UsStocks).unwrap();
        assert_eq!(json, "\"us_stocks\"");
    }

    #[test]
    fn search_matches_symbol_or_name() {
        let inst = Instrument::new("AAPL", "Apple Inc.", InstrumentCategory::UsStocks, 182.3, 1.2, 0.66);
        assert!(inst.matches("aap"));
        assert!(inst.matches("APPLE"));
        assert!(!inst.matches("msft"));
    }
}
