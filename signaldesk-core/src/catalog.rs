//! Static catalogs: timeframes, instruments, top traders, brokers.

use crate::domain::{Instrument, InstrumentCategory, RiskLevel, TopTrader};

/// Every timeframe a slot may take, shortest first.
pub const ALL_TIMEFRAMES: [&str; 11] = [
    "1m", "3m", "5m", "10m", "15m", "30m", "1h", "2h", "3h", "4h", "1d",
];

/// Timeframe slots of a freshly added row.
pub const DEFAULT_TIMEFRAMES: [&str; 5] = ["1m", "5m", "15m", "1h", "1d"];

pub fn is_known_timeframe(tf: &str) -> bool {
    ALL_TIMEFRAMES.contains(&tf)
}

/// Supported broker integrations as `(value, label)`.
pub const BROKERS: [(&str, &str); 7] = [
    ("alpaca", "Alpaca"),
    ("ibkr", "Interactive Brokers"),
    ("tradier", "Tradier"),
    ("tdameritrade", "TD Ameritrade"),
    ("binance", "Binance"),
    ("coinbase", "Coinbase"),
    ("custom", "Custom API"),
];

pub fn broker_label(value: &str) -> Option<&'static str> {
    BROKERS
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

/// Tradable instruments with their reference quotes.
pub fn instruments() -> Vec<Instrument> {
    use InstrumentCategory::*;
    vec![
        Instrument::new("AAPL", "Apple Inc.", UsStocks, 178.50, 2.35, 1.33),
        Instrument::new("MSFT", "Microsoft Corporation", UsStocks, 378.91, -1.24, -0.33),
        Instrument::new("GOOGL", "Alphabet Inc.", UsStocks, 141.80, 0.95, 0.67),
        Instrument::new("AMZN", "Amazon.com Inc.", UsStocks, 153.42, 1.87, 1.23),
        Instrument::new("TSLA", "Tesla Inc.", UsStocks, 248.50, -5.20, -2.05),
        Instrument::new("NVDA", "NVIDIA Corporation", UsStocks, 495.22, 8.14, 1.67),
        Instrument::new("SPY", "SPDR S&P 500 ETF", UsStocks, 476.69, 1.12, 0.24),
        Instrument::new("QQQ", "Invesco QQQ Trust", UsStocks, 409.52, 2.03, 0.50),
        Instrument::new("BTC/USD", "Bitcoin", Crypto, 43250.00, -892.00, -2.02),
        Instrument::new("ETH/USD", "Ethereum", Crypto, 2285.40, 45.20, 2.02),
        Instrument::new("SOL/USD", "Solana", Crypto, 98.75, 3.42, 3.59),
        Instrument::new("EUR/USD", "Euro / US Dollar", Forex, 1.0892, 0.0023, 0.21),
        Instrument::new("GBP/USD", "British Pound / US Dollar", Forex, 1.2654, -0.0045, -0.35),
        Instrument::new("USD/JPY", "US Dollar / Japanese Yen", Forex, 149.82, 0.56, 0.38),
        Instrument::new("XAU/USD", "Gold / US Dollar", Forex, 2024.50, 12.30, 0.61),
    ]
}

pub fn find_instrument(symbol: &str) -> Option<Instrument> {
    instruments().into_iter().find(|i| i.symbol == symbol)
}

/// Case-insensitive search over symbol and name.
pub fn search_instruments(query: &str) -> Vec<Instrument> {
    instruments()
        .into_iter()
        .filter(|i| i.matches(query))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn trader(
    id: &str,
    name: &str,
    username: &str,
    win_rate: f64,
    total_pnl: f64,
    total_trades: u32,
    followers: u32,
    monthly_return: f64,
    risk_level: RiskLevel,
    trading_style: &str,
    instruments: [&str; 3],
    is_verified: bool,
) -> TopTrader {
    let avatar = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect();
    TopTrader {
        id: id.into(),
        name: name.into(),
        username: username.into(),
        avatar,
        win_rate,
        total_pnl,
        total_trades,
        followers,
        monthly_return,
        risk_level,
        trading_style: trading_style.into(),
        instruments: instruments.iter().map(|s| s.to_string()).collect(),
        is_verified,
    }
}

/// The leaderboard shown on the copy-trading screen.
pub fn top_traders() -> Vec<TopTrader> {
    use RiskLevel::*;
    vec![
        trader(
            "trader_1", "Alex Chen", "alex_trades", 78.0, 125_340.0, 1247, 3421, 12.5,
            Medium, "Swing Trading", ["AAPL", "TSLA", "BTC/USD"], true,
        ),
        trader(
            "trader_2", "Sarah Miller", "sarah_fx", 82.0, 89_750.0, 892, 2156, 8.3,
            Low, "Day Trading", ["EUR/USD", "GBP/USD", "USD/JPY"], true,
        ),
        trader(
            "trader_3", "Mike Johnson", "crypto_mike", 71.0, 203_890.0, 2341, 5678, 18.7,
            High, "Scalping", ["BTC/USD", "ETH/USD", "SOL/USD"], true,
        ),
        trader(
            "trader_4", "Emma Wilson", "emma_stocks", 75.0, 67_890.0, 567, 1234, 9.2,
            Low, "Position Trading", ["MSFT", "GOOGL", "AMZN"], false,
        ),
        trader(
            "trader_5", "David Park", "david_algo", 85.0, 156_780.0, 3456, 4321, 14.1,
            Medium, "Algorithmic", ["SPY", "QQQ", "BTC/USD"], true,
        ),
    ]
}

pub fn find_trader(id: &str) -> Option<TopTrader> {
    top_traders().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_timeframes_are_known_and_distinct() {
        let set: HashSet<_> = DEFAULT_TIMEFRAMES.iter().collect();
        assert_eq!(set.len(), DEFAULT_TIMEFRAMES.len());
        assert!(DEFAULT_TIMEFRAMES.iter().all(|tf| is_known_timeframe(tf)));
    }

    #[test]
    fn instrument_symbols_are_unique() {
        let all = instruments();
        let set: HashSet<_> = all.iter().map(|i| i.symbol.as_str()).collect();
        assert_eq!(set.len(), all.len());
    }

    #[test]
    fn traders_have_initials_as_avatar() {
        let alex = find_trader("trader_1").unwrap();
        assert_eq!(alex.avatar, "AC");
        assert_eq!(top_traders().len(), 5);
    }

    #[test]
    fn broker_lookup() {
        assert_eq!(broker_label("ibkr"), Some("Interactive Brokers"));
        assert_eq!(broker_label("nope"), None);
    }

    #[test]
    fn search_is_case_insensitive() {
        let hits = search_instruments("bit");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "BTC/USD");
    }
}
