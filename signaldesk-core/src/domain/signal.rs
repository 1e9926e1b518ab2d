//! Directional calls: the three-way `Signal` and the two-way `TradeSide`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directional recommendation for one timeframe slot or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Buy, Signal::Sell, Signal::Neutral];

    /// Uniform draw over buy / sell / neutral.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Neutral => "neutral",
        }
    }

    /// The tradable side, if any.
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            Signal::Buy => Some(TradeSide::Buy),
            Signal::Sell => Some(TradeSide::Sell),
            Signal::Neutral => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of an executed (or simulated) trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Coin flip between buy and sell.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        }
    }

    /// +1 for buy, -1 for sell. Multiplies a price move into a signed PnL.
    pub fn sign(&self) -> f64 {
        match self {
            TradeSide::Buy => 1.0,
            TradeSide::Sell => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TradeSide> for Signal {
    fn from(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Signal::Buy,
            TradeSide::Sell => Signal::Sell,
        }
    }
}

/// Error returned when a side string is neither `buy` nor `sell`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade side '{0}'")]
pub struct ParseSideError(pub String);

impl FromStr for TradeSide {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "long" => Ok(TradeSide::Buy),
            "sell" | "short" => Ok(TradeSide::Sell),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}
