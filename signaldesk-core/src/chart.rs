/// Exchange-qualified symbol for the embedded chart widget.
///
/// `BTC/USD` → `BINANCE:BTCUSDT`, `EUR/GBP` → `FX:EURGBP`, `AAPL` → `NASDAQ:AAPL`.
pub fn chart_symbol(symbol: &str) -> String {
    match symbol.split_once('/') {
        Some((base, "USD")) => format!("BINANCE:{base}USDT"),
        Some((base, quote)) => format!("FX:{base}{quote}"),
        None => format!("NASDAQ:{symbol}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translations() {
        assert_eq!(chart_symbol("BTC/USD"), "BINANCE:BTCUSDT");
        assert_eq!(chart_symbol("EUR/GBP"), "FX:EURGBP");
        assert_eq!(chart_symbol("USD/JPY"), "FX:USDJPY");
        assert_eq!(chart_symbol("AAPL"), "NASDAQ:AAPL");
    }
}
