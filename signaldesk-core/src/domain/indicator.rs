//! Technical indicators offered on the board.
//!
//! An indicator's only modeled effect is its parameter set and the fact that
//! changing it regenerates a row's signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named numeric indicator parameters (`period`, `fast`, `stdDev`, ...).
pub type IndicatorParams = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "Bollinger")]
    Bollinger,
    #[serde(rename = "Stochastic")]
    Stochastic,
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "ADX")]
    Adx,
    #[serde(rename = "ATR")]
    Atr,
    #[serde(rename = "CCI")]
    Cci,
    #[serde(rename = "Williams %R")]
    WilliamsR,
}

impl Indicator {
    /// Catalog order. `add_row` scans indicators in this order.
    pub const ALL: [Indicator; 10] = [
        Indicator::Rsi,
        Indicator::Macd,
        Indicator::Ema,
        Indicator::Bollinger,
        Indicator::Stochastic,
        Indicator::Sma,
        Indicator::Adx,
        Indicator::Atr,
        Indicator::Cci,
        Indicator::WilliamsR,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::Rsi => "RSI",
            Indicator::Macd => "MACD",
            Indicator::Ema => "EMA",
            Indicator::Bollinger => "Bollinger",
            Indicator::Stochastic => "Stochastic",
            Indicator::Sma => "SMA",
            Indicator::Adx => "ADX",
            Indicator::Atr => "ATR",
            Indicator::Cci => "CCI",
            Indicator::WilliamsR => "Williams %R",
        }
    }

    fn default_param_table(&self) -> &'static [(&'static str, f64)] {
        match self {
            Indicator::Rsi => &[("period", 14.0), ("overbought", 70.0), ("oversold", 30.0)],
            Indicator::Macd => &[("fast", 12.0), ("slow", 26.0), ("signal", 9.0)],
            Indicator::Ema | Indicator::Sma => &[("period", 20.0)],
            Indicator::Bollinger => &[("period", 20.0), ("stdDev", 2.0)],
            Indicator::Stochastic => &[("kPeriod", 14.0), ("dPeriod", 3.0), ("smooth", 3.0)],
            Indicator::Adx | Indicator::Atr | Indicator::WilliamsR => &[("period", 14.0)],
            Indicator::Cci => &[("period", 20.0)],
        }
    }

    /// Fresh copy of the default parameters for this indicator.
    pub fn default_params(&self) -> IndicatorParams {
        self.default_param_table()
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown indicator '{0}'")]
pub struct UnknownIndicator(pub String);

impl FromStr for Indicator {
    type Err = UnknownIndicator;

    /// Accepts the display name case-insensitively, plus `williams_r` / `williamsr`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Indicator::ALL
            .into_iter()
            .find(|ind| ind.name().to_ascii_lowercase() == needle)
            .or(match needle.as_str() {
                "williams_r" | "williamsr" | "williams" => Some(Indicator::WilliamsR),
                _ => None,
            })
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

/// Render the first two parameter values as a compact `14/70` label.
pub fn params_label(params: &IndicatorParams) -> String {
    params
        .values()
        .take(2)
        .map(|v| format!("{v}"))
        .collect::<Vec<_>>()
        .join("/")
}
