//! File exports: backtest results (CSV and plain-text report), trade history
//! CSV and mock OHLCV CSV.
//!
//! Column order of every CSV is fixed; spreadsheets downstream rely on it.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use signaldesk_core::backtest::summary::TRADE_TIME_FORMAT;
use signaldesk_core::backtest::{BacktestRequest, BacktestResult};
use signaldesk_core::domain::{AccountType, TradeHistoryItem, TradeSide};
use signaldesk_core::ohlcv::MockBar;

/// Header of the backtest trade CSV.
pub const BACKTEST_CSV_HEADER: [&str; 8] = [
    "Trade ID",
    "Entry Date",
    "Exit Date",
    "Type",
    "Entry Price",
    "Exit Price",
    "Profit",
    "Profit %",
];

/// Header of the trade-history CSV.
pub const HISTORY_CSV_HEADER: [&str; 11] = [
    "ID",
    "Symbol",
    "Type",
    "Entry Time",
    "Exit Time",
    "Entry Price",
    "Exit Price",
    "Quantity",
    "P&L",
    "P&L %",
    "Account",
];

pub const OHLCV_CSV_HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn file_safe(s: &str) -> String {
    s.replace('/', "_")
}

// ─── Backtest ───────────────────────────────────────────────────────

/// Trades followed by a blank line and a `Summary` block.
pub fn backtest_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(BACKTEST_CSV_HEADER)?;
    for t in &result.trades {
        wtr.write_record([
            t.id.to_string(),
            t.entry_date.format(TRADE_TIME_FORMAT).to_string(),
            t.exit_date.format(TRADE_TIME_FORMAT).to_string(),
            t.direction.as_str().to_string(),
            t.entry_price.to_string(),
            t.exit_price.to_string(),
            t.profit.to_string(),
            format!("{}%", t.profit_percent),
        ])?;
    }
    let mut out = finish(wtr)?;

    out.push_str("\nSummary\n");
    out.push_str(&format!("Total Trades,{}\n", result.total_trades));
    out.push_str(&format!("Win Rate,{}%\n", result.win_rate));
    out.push_str(&format!("Net Profit,${}\n", result.net_profit));
    out.push_str(&format!("Profit Factor,{}\n", result.profit_factor));
    out.push_str(&format!("Max Drawdown,{}%\n", result.max_drawdown_percent));
    out.push_str(&format!("Sharpe Ratio,{}\n", result.sharpe_ratio));
    Ok(out)
}

/// Human-readable report of a run.
pub fn backtest_report(request: &BacktestRequest, result: &BacktestResult) -> String {
    let settings = &request.settings;
    let mut out = format!(
        "Backtest Results for {} - {}\n",
        request.symbol, request.indicator
    );
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Date Range: {} to {}\n",
        settings.start_date.format("%Y-%m-%d"),
        settings.end_date.format("%Y-%m-%d")
    ));
    out.push_str(&format!("Timeframe: {}\n", settings.timeframe));
    out.push_str(&format!("Initial Capital: ${}\n\n", settings.initial_capital));

    out.push_str("SUMMARY\n");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    out.push_str(&format!("Total Trades: {}\n", result.total_trades));
    out.push_str(&format!("Winning Trades: {}\n", result.win_count));
    out.push_str(&format!("Losing Trades: {}\n", result.loss_count));
    out.push_str(&format!("Win Rate: {}%\n", result.win_rate));
    out.push_str(&format!("Net Profit: ${}\n", result.net_profit));
    out.push_str(&format!("Profit Factor: {}\n", result.profit_factor));
    out.push_str(&format!("Max Drawdown: {}%\n", result.max_drawdown_percent));
    out.push_str(&format!("Sharpe Ratio: {}\n\n", result.sharpe_ratio));

    out.push_str("TRADE DETAILS\n");
    out.push_str(&"-".repeat(30));
    out.push('\n');
    for t in &result.trades {
        out.push_str(&format!(
            "#{} | {} | Entry: ${} @ {} | Exit: ${} @ {} | P/L: ${} ({}%)\n",
            t.id,
            t.direction.as_str().to_uppercase(),
            t.entry_price,
            t.entry_date.format(TRADE_TIME_FORMAT),
            t.exit_price,
            t.exit_date.format(TRADE_TIME_FORMAT),
            t.profit,
            t.profit_percent
        ));
    }
    out
}

/// `backtest_{symbol}_{indicator}_{yyyymmdd}.{ext}`
pub fn backtest_filename(request: &BacktestRequest, date: NaiveDate, ext: &str) -> String {
    format!(
        "backtest_{}_{}_{}.{}",
        file_safe(&request.symbol),
        request.indicator,
        date.format("%Y%m%d"),
        ext
    )
}

// ─── Trade history ──────────────────────────────────────────────────

pub fn history_csv(items: &[TradeHistoryItem]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(HISTORY_CSV_HEADER)?;
    for t in items {
        wtr.write_record([
            t.id.clone(),
            t.symbol.clone(),
            t.side.as_str().to_string(),
            t.entry_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            t.exit_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            t.entry_price.to_string(),
            t.exit_price.to_string(),
            t.quantity.to_string(),
            t.pnl.to_string(),
            format!("{}%", t.pnl_percent),
            t.account_type.as_str().to_string(),
        ])?;
    }
    finish(wtr)
}

fn parse_f64(field: &str, column: &str, line: usize) -> Result<f64> {
    field
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .with_context(|| format!("line {line}: invalid {column} '{field}'"))
}

fn parse_time(field: &str, column: &str, line: usize) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(field.trim())
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("line {line}: invalid {column} '{field}'"))
}

/// Read back a file produced by [`history_csv`]. Instrument names are not
/// part of the export, so `name` is left empty.
pub fn parse_history_csv(data: &str) -> Result<Vec<TradeHistoryItem>> {
    let mut rdr = csv::Reader::from_reader(data.as_bytes());
    let headers = rdr.headers().context("failed to read CSV header")?.clone();
    if headers.iter().ne(HISTORY_CSV_HEADER.iter().copied()) {
        bail!("unexpected trade history header: {:?}", headers);
    }

    let mut items = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 2;
        let r = record.with_context(|| format!("line {line}: malformed record"))?;
        let side: TradeSide = r[2]
            .parse()
            .with_context(|| format!("line {line}: invalid Type"))?;
        let account_type: AccountType = r[10]
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("line {line}: invalid Account"))?;
        items.push(TradeHistoryItem {
            id: r[0].to_string(),
            symbol: r[1].to_string(),
            name: String::new(),
            side,
            entry_time: parse_time(&r[3], "Entry Time", line)?,
            exit_time: parse_time(&r[4], "Exit Time", line)?,
            entry_price: parse_f64(&r[5], "Entry Price", line)?,
            exit_price: parse_f64(&r[6], "Exit Price", line)?,
            quantity: parse_f64(&r[7], "Quantity", line)?,
            pnl: parse_f64(&r[8], "P&L", line)?,
            pnl_percent: parse_f64(&r[9], "P&L %", line)?,
            account_type,
            indicator: None,
            timeframes: None,
        });
    }
    Ok(items)
}

/// `trade_history_{yyyymmdd_hhmmss}.csv`
pub fn history_filename(now: DateTime<Utc>) -> String {
    format!("trade_history_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

// ─── OHLCV ──────────────────────────────────────────────────────────

/// Bars with prices at two decimals and ISO-8601 timestamps.
pub fn ohlcv_csv(bars: &[MockBar]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(OHLCV_CSV_HEADER)?;
    for b in bars {
        wtr.write_record([
            b.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            format!("{:.2}", b.open),
            format!("{:.2}", b.high),
            format!("{:.2}", b.low),
            format!("{:.2}", b.close),
            b.volume.to_string(),
        ])?;
    }
    finish(wtr)
}

/// `{symbol}_{timeframe}_{yyyy-mm-dd}.csv` with `/` replaced.
pub fn ohlcv_filename(symbol: &str, timeframe: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.csv",
        file_safe(symbol),
        timeframe,
        date.format("%Y-%m-%d")
    )
}
