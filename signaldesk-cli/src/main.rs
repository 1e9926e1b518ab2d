//! SignalDesk CLI: signal board, mock backtests, templates, copy trading,
//! positions, history, alerts and exports.
//!
//! State lives in the store configured by `signaldesk.toml` (`.signaldesk/`
//! by default). Set `RUST_LOG=debug` to see every store mutation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use signaldesk_core::backtest::{run_mock_backtest, BacktestRequest, BacktestResult, RiskMetricsMode};
use signaldesk_core::board::SignalBoard;
use signaldesk_core::catalog;
use signaldesk_core::chart::chart_symbol;
use signaldesk_core::domain::{
    params_label, AccountType, AlertKind, BrokerCredentials, FollowSettings, FollowSettingsPatch,
    Indicator, IndicatorParams, TradeSide,
};
use signaldesk_core::history::HistoryFilter;
use signaldesk_core::ohlcv::generate_mock_bars;
use signaldesk_core::rng::scope;
use signaldesk_core::signals::{accuracy, probability, selected_call};
use signaldesk_services::config::DEFAULT_CONFIG_FILE;
use signaldesk_services::export;
use signaldesk_services::{AppConfig, NewTemplate, SignalDesk};

#[derive(Parser)]
#[command(name = "signaldesk", about = "SignalDesk CLI: mock trading signals dashboard")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Signal board rows.
    Signals {
        #[command(subcommand)]
        action: SignalsAction,
    },
    /// Search the instrument catalog.
    Instruments {
        /// Case-insensitive match on symbol or name.
        query: Option<String>,
    },
    /// Run a mock backtest for a board row or a saved template.
    Backtest {
        #[arg(long, conflicts_with = "template")]
        row: Option<String>,
        #[arg(long)]
        template: Option<String>,
        #[arg(long)]
        capital: Option<f64>,
        #[arg(long)]
        timeframe: Option<String>,
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,
        /// Overrides `backtest.risk_metrics`.
        #[arg(long, value_enum)]
        risk: Option<RiskArg>,
        /// Write the results as CSV or a text report.
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Save the configuration (and results) as a template with this name.
        #[arg(long)]
        save_template: Option<String>,
    },
    /// Saved backtest templates.
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
    /// Top traders and copy trading.
    Traders {
        #[command(subcommand)]
        action: TradersAction,
    },
    /// Open positions.
    Positions {
        #[command(subcommand)]
        action: PositionsAction,
    },
    /// Closed-trade history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// P&L alerts.
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },
    /// Trading account settings.
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Write a mock OHLCV CSV for a symbol.
    Ohlcv {
        symbol: String,
        #[arg(long, default_value = "1m")]
        timeframe: String,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Print the charting-widget symbol for an instrument.
    Chart { symbol: String },
}

#[derive(Subcommand)]
enum SignalsAction {
    /// Show the board grouped by category.
    List,
    /// Add a row with the first free instrument/indicator pair.
    Add,
    Remove { id: String },
    /// Switch a row's instrument.
    Instrument { id: String, symbol: String },
    /// Switch a row's indicator; parameters reset to defaults.
    Indicator { id: String, indicator: String },
    /// Replace indicator parameters, e.g. `period=14 overbought=70`.
    Params {
        id: String,
        #[arg(required = true)]
        params: Vec<String>,
    },
    /// Point a slot at another timeframe.
    Timeframe { id: String, slot: usize, timeframe: String },
    /// Select or deselect a slot.
    Toggle { id: String, slot: usize },
    /// Enable or disable probability mode.
    Probability {
        id: String,
        #[arg(value_enum)]
        state: OnOff,
    },
    /// Redraw every signal.
    Refresh,
    /// Show the trade a row would place.
    Trade { id: String },
    /// Load a saved template onto a row.
    ApplyTemplate { id: String, template: String },
}

#[derive(Subcommand)]
enum TemplatesAction {
    List,
    Rename { id: String, name: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum TradersAction {
    /// List the top traders.
    List,
    Follow {
        id: String,
        #[arg(long, default_value_t = 50.0)]
        copy_pct: f64,
        #[arg(long, default_value_t = 500.0)]
        max_loss: f64,
        #[arg(long, default_value_t = false)]
        no_auto_copy: bool,
    },
    Unfollow { id: String },
    /// Patch copy settings of a followed trader.
    Settings {
        id: String,
        #[arg(long)]
        copy_pct: Option<f64>,
        #[arg(long)]
        max_loss: Option<f64>,
        #[arg(long)]
        auto_copy: Option<bool>,
    },
    /// Followed traders.
    Following,
    /// Generate one mock trade per auto-copying trader.
    Copy,
    /// Copied trades.
    Copied,
    /// Close a copied trade.
    CloseCopied { id: String, price: f64 },
}

#[derive(Subcommand)]
enum PositionsAction {
    List,
    Open {
        symbol: String,
        #[arg(value_enum)]
        side: SideArg,
        quantity: f64,
        /// Defaults to the catalog price.
        #[arg(long)]
        price: Option<f64>,
    },
    /// Close at `price`, or at the current price.
    Close {
        id: String,
        #[arg(long)]
        price: Option<f64>,
    },
    CloseAll,
    /// One simulated price update.
    Tick,
    /// Seed the demo positions when the book is empty.
    Seed,
}

#[derive(Subcommand)]
enum HistoryAction {
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    Clear,
}

#[derive(clap::Args)]
struct FilterArgs {
    #[arg(long)]
    symbol: Option<String>,
    #[arg(long, value_enum)]
    side: Option<SideArg>,
    #[arg(long, value_enum)]
    account: Option<AccountArg>,
}

#[derive(Subcommand)]
enum AlertsAction {
    List,
    Add {
        #[arg(value_enum)]
        kind: AlertKindArg,
        threshold: f64,
        #[arg(long)]
        symbol: Option<String>,
    },
    Toggle { id: String },
    Delete { id: String },
    /// Evaluate alerts against the open positions.
    Check,
}

#[derive(Subcommand)]
enum AccountAction {
    Show,
    Set {
        #[arg(long, value_enum)]
        account_type: Option<AccountArg>,
        #[arg(long)]
        paper_balance: Option<f64>,
        #[arg(long)]
        broker: Option<String>,
        #[arg(long)]
        server_url: Option<String>,
    },
    /// Store broker API credentials for this session.
    Credentials {
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        api_secret: String,
    },
    ClearCredentials,
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for TradeSide {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Buy => TradeSide::Buy,
            SideArg::Sell => TradeSide::Sell,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AccountArg {
    Paper,
    Live,
}

impl From<AccountArg> for AccountType {
    fn from(a: AccountArg) -> Self {
        match a {
            AccountArg::Paper => AccountType::Paper,
            AccountArg::Live => AccountType::Live,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AlertKindArg {
    Profit,
    Loss,
    Percent,
}

impl From<AlertKindArg> for AlertKind {
    fn from(k: AlertKindArg) -> Self {
        match k {
            AlertKindArg::Profit => AlertKind::Profit,
            AlertKindArg::Loss => AlertKind::Loss,
            AlertKindArg::Percent => AlertKind::Percent,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RiskArg {
    Mock,
    Derived,
}

impl From<RiskArg> for RiskMetricsMode {
    fn from(r: RiskArg) -> Self {
        match r {
            RiskArg::Mock => RiskMetricsMode::Mock,
            RiskArg::Derived => RiskMetricsMode::Derived,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Txt,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnOff {
    On,
    Off,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let desk = SignalDesk::open(config);

    match cli.command {
        Commands::Signals { action } => run_signals(&desk, action),
        Commands::Instruments { query } => {
            run_instruments(query.as_deref());
            Ok(())
        }
        Commands::Backtest {
            row,
            template,
            capital,
            timeframe,
            start,
            end,
            risk,
            export,
            output_dir,
            save_template,
        } => run_backtest_cmd(
            &desk,
            BacktestArgs {
                row,
                template,
                capital,
                timeframe,
                start,
                end,
                risk,
                export,
                output_dir,
                save_template,
            },
        ),
        Commands::Templates { action } => run_templates(&desk, action),
        Commands::Traders { action } => run_traders(&desk, action),
        Commands::Positions { action } => run_positions(&desk, action),
        Commands::History { action } => run_history(&desk, action),
        Commands::Alerts { action } => run_alerts(&desk, action),
        Commands::Account { action } => run_account(&desk, action),
        Commands::Ohlcv {
            symbol,
            timeframe,
            output_dir,
        } => run_ohlcv(&desk, &symbol, &timeframe, &output_dir),
        Commands::Chart { symbol } => {
            println!("{}", chart_symbol(&symbol));
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn write_output(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

// ─── Signals ────────────────────────────────────────────────────────

fn run_signals(desk: &SignalDesk, action: SignalsAction) -> Result<()> {
    let mut board = desk.dashboard.load_board();
    let mut rng = desk.rng(scope::SIGNALS, &Utc::now().timestamp_millis().to_string());

    match action {
        SignalsAction::List => {
            print_board(&board);
            return Ok(());
        }
        SignalsAction::Trade { id } => {
            let intent = board.trade_intent(&id)?;
            if !intent.tradable {
                println!("{}: no actionable signal ({})", intent.symbol, intent.signal);
                return Ok(());
            }
            let strength = intent
                .strength
                .map(|s| format!(" at {s}%"))
                .unwrap_or_default();
            println!(
                "{} {}{} on [{}]",
                intent.signal.as_str().to_uppercase(),
                intent.symbol,
                strength,
                intent.timeframes.join(", ")
            );
            return Ok(());
        }
        SignalsAction::Add => {
            let timeframes = desk.config.signals.default_timeframes.clone();
            let row = board.add_row_with_timeframes(&catalog::instruments(), &timeframes, &mut rng, Utc::now())?;
            println!("Added {} {} ({})", row.symbol, row.indicator, row.id);
        }
        SignalsAction::Remove { id } => {
            let row = board.delete_row(&id)?;
            println!("Removed {} {}", row.symbol, row.indicator);
        }
        SignalsAction::Instrument { id, symbol } => {
            let instrument =
                catalog::find_instrument(&symbol).with_context(|| format!("unknown instrument '{symbol}'"))?;
            board.change_instrument(&id, &instrument)?;
        }
        SignalsAction::Indicator { id, indicator } => {
            let indicator: Indicator = indicator.parse()?;
            board.change_indicator(&id, indicator, &mut rng)?;
        }
        SignalsAction::Params { id, params } => {
            board.update_params(&id, parse_params(&params)?)?;
        }
        SignalsAction::Timeframe { id, slot, timeframe } => {
            board.change_timeframe(&id, slot, &timeframe, &mut rng)?;
        }
        SignalsAction::Toggle { id, slot } => {
            let selected = board.toggle_timeframe(&id, slot)?;
            println!("slot {slot} {}", if selected { "selected" } else { "deselected" });
        }
        SignalsAction::Probability { id, state } => {
            board.set_probability_mode(&id, matches!(state, OnOff::On))?;
        }
        SignalsAction::Refresh => board.refresh_all(&mut rng),
        SignalsAction::ApplyTemplate { id, template } => {
            let template = desk
                .templates
                .get(&template)
                .with_context(|| format!("template '{template}' not found"))?;
            let instrument = catalog::find_instrument(&template.symbol);
            board.apply_template(&id, &template, instrument.as_ref(), &mut rng)?;
        }
    }

    desk.dashboard.save_board(&board)?;
    print_board(&board);
    Ok(())
}

fn parse_params(pairs: &[String]) -> Result<IndicatorParams> {
    pairs
        .iter()
        .map(|pair| {
            let (k, v) = pair
                .split_once('=')
                .with_context(|| format!("expected key=value, got '{pair}'"))?;
            let v: f64 = v
                .trim()
                .parse()
                .with_context(|| format!("parameter '{k}' is not a number"))?;
            Ok((k.trim().to_string(), v))
        })
        .collect()
}

fn print_board(board: &SignalBoard) {
    if board.is_empty() {
        println!("Board is empty. Add a row with `signaldesk signals add`.");
        return;
    }
    for (category, rows) in board.grouped() {
        println!("── {category} ──");
        for row in rows {
            let slots: Vec<String> = row
                .timeframes
                .iter()
                .map(|t| {
                    let mark = if t.selected { "*" } else { "" };
                    format!("{}{}:{}", t.timeframe, mark, t.signal)
                })
                .collect();
            let call = if row.probability_mode_enabled {
                let p = probability(&row.timeframes);
                format!("{} {}%", p.signal, p.strength)
            } else {
                let c = selected_call(&row.timeframes);
                format!("{} [{}]", c.signal, c.timeframes.join(","))
            };
            println!(
                "  {:<28} {:<8} {:<10} {:<11} {:>10.2} ({:+.2}%)  acc {:>3}%  {}  => {}",
                row.id,
                row.symbol,
                row.indicator,
                params_label(&row.indicator_params),
                row.last_price,
                row.price_change_percent,
                accuracy(row.accuracy_history.as_slice()),
                slots.join(" "),
                call
            );
        }
    }
    let counts = board.signal_counts();
    println!(
        "\n{} rows | buy {} | sell {} | neutral {}",
        board.len(),
        counts.buy,
        counts.sell,
        counts.neutral
    );
}

fn run_instruments(query: Option<&str>) {
    let found = match query {
        Some(q) => catalog::search_instruments(q),
        None => catalog::instruments(),
    };
    for inst in found {
        println!(
            "{:<8} {:<28} {:<18} {:>12.4}",
            inst.symbol, inst.name, inst.category, inst.price
        );
    }
}

// ─── Backtest ───────────────────────────────────────────────────────

struct BacktestArgs {
    row: Option<String>,
    template: Option<String>,
    capital: Option<f64>,
    timeframe: Option<String>,
    start: Option<String>,
    end: Option<String>,
    risk: Option<RiskArg>,
    export: Option<ExportFormat>,
    output_dir: PathBuf,
    save_template: Option<String>,
}

fn run_backtest_cmd(desk: &SignalDesk, args: BacktestArgs) -> Result<()> {
    let today = today();
    let mut request = match (&args.row, &args.template) {
        (_, Some(id)) => {
            let template = desk
                .templates
                .get(id)
                .with_context(|| format!("template '{id}' not found"))?;
            BacktestRequest::from_template(&template, today)
        }
        (row_id, None) => {
            let board = desk.dashboard.load_board();
            let row = match row_id {
                Some(id) => Some(board.get(id).with_context(|| format!("row '{id}' not found"))?),
                None => None,
            };
            let mut request = BacktestRequest::from_row(row, today)?;
            let defaults = desk.backtest_defaults(today);
            request.settings.initial_capital = defaults.initial_capital;
            request.settings.position_size = defaults.position_size;
            request.settings.stop_loss = defaults.stop_loss;
            request.settings.take_profit = defaults.take_profit;
            request
        }
    };

    if let Some(capital) = args.capital {
        request.settings.initial_capital = capital;
    }
    if let Some(tf) = args.timeframe {
        request.settings.timeframe = tf;
    }
    if let Some(start) = args.start.as_deref() {
        request.settings.start_date = parse_date(start)?;
    }
    if let Some(end) = args.end.as_deref() {
        request.settings.end_date = parse_date(end)?;
    }

    let mode = args
        .risk
        .map(RiskMetricsMode::from)
        .unwrap_or(desk.config.backtest.risk_metrics);
    let mut rng = desk.rng(scope::BACKTEST, &request.symbol);
    let as_of = Local::now().naive_local();
    let result = run_mock_backtest(&request, &mut rng, as_of, mode).context("backtest rejected")?;

    print_summary(&request, &result);

    if let Some(format) = args.export {
        let (ext, content) = match format {
            ExportFormat::Csv => ("csv", export::backtest_csv(&result)?),
            ExportFormat::Txt => ("txt", export::backtest_report(&request, &result)),
        };
        let path = write_output(&args.output_dir, &export::backtest_filename(&request, today, ext), &content)?;
        println!("Exported to {}", path.display());
    }

    if let Some(name) = args.save_template {
        let mut new = NewTemplate::from_request(name, &request);
        new.last_results = Some(result.last_results());
        let template = desk.templates.save(new, Utc::now())?;
        println!("Saved template {} ({})", template.name, template.id);
    } else if let Some(id) = args.template.as_deref() {
        desk.templates.record_results(id, result.last_results(), Utc::now())?;
    }
    Ok(())
}

fn print_summary(request: &BacktestRequest, result: &BacktestResult) {
    println!("=== Backtest: {} {} ===", request.symbol, request.indicator);
    println!(
        "Period:          {} to {} ({})",
        request.settings.start_date, request.settings.end_date, request.settings.timeframe
    );
    println!("Initial capital: ${:.2}", result.initial_capital);
    println!("Final equity:    ${:.2}", result.final_equity());
    println!(
        "Trades:          {} ({} won, {} lost)",
        result.total_trades, result.win_count, result.loss_count
    );
    println!("Win rate:        {:.1}%", result.win_rate);
    println!("Net profit:      ${:.2}", result.net_profit);
    println!("Profit factor:   {:.2}", result.profit_factor);
    println!("Max drawdown:    {:.2}%", result.max_drawdown_percent);
    println!("Sharpe ratio:    {:.2}", result.sharpe_ratio);
}

// ─── Templates ──────────────────────────────────────────────────────

fn run_templates(desk: &SignalDesk, action: TemplatesAction) -> Result<()> {
    match action {
        TemplatesAction::List => {
            for t in desk.templates.list() {
                let results = t
                    .last_results
                    .map(|r| format!("win {:.1}% net ${:.2} over {} trades", r.win_rate, r.net_profit, r.total_trades))
                    .unwrap_or_else(|| "never run".to_string());
                println!(
                    "{:<30} {:<20} {:<8} {:<10} [{}] {}",
                    t.id,
                    t.name,
                    t.symbol,
                    t.indicator,
                    t.timeframes.join(","),
                    results
                );
            }
        }
        TemplatesAction::Rename { id, name } => {
            let patch = signaldesk_services::TemplatePatch {
                name: Some(name),
                ..Default::default()
            };
            desk.templates.update(&id, patch, Utc::now())?;
        }
        TemplatesAction::Delete { id } => {
            desk.templates.delete(&id)?;
        }
    }
    Ok(())
}

// ─── Traders ────────────────────────────────────────────────────────

fn run_traders(desk: &SignalDesk, action: TradersAction) -> Result<()> {
    match action {
        TradersAction::List => {
            for t in catalog::top_traders() {
                let following = if desk.following.is_following(&t.id) { " (following)" } else { "" };
                println!(
                    "{:<4} {:<3} {:<18} win {:>5.1}%  month {:>+5.1}%  {:?} risk  {}{}",
                    t.id, t.avatar, t.name, t.win_rate, t.monthly_return, t.risk_level, t.trading_style, following
                );
            }
        }
        TradersAction::Follow {
            id,
            copy_pct,
            max_loss,
            no_auto_copy,
        } => {
            let trader = catalog::find_trader(&id).with_context(|| format!("unknown trader '{id}'"))?;
            let settings = FollowSettings {
                copy_percentage: copy_pct,
                max_loss_limit: max_loss,
                auto_copy: !no_auto_copy,
            };
            let followed = desk.following.follow(trader, settings, Utc::now())?;
            println!("Following {} at {}%", followed.trader.name, followed.settings.copy_percentage);
        }
        TradersAction::Unfollow { id } => {
            desk.following.unfollow(&id)?;
        }
        TradersAction::Settings {
            id,
            copy_pct,
            max_loss,
            auto_copy,
        } => {
            let patch = FollowSettingsPatch {
                copy_percentage: copy_pct,
                max_loss_limit: max_loss,
                auto_copy,
            };
            let updated = desk.following.update_settings(&id, &patch)?;
            println!("{:?}", updated.settings);
        }
        TradersAction::Following => {
            for f in desk.following.list() {
                println!(
                    "{:<4} {:<18} copy {:>5.1}%  max loss ${:.2}  auto {}  since {}",
                    f.trader.id,
                    f.trader.name,
                    f.settings.copy_percentage,
                    f.settings.max_loss_limit,
                    f.settings.auto_copy,
                    f.followed_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        TradersAction::Copy => {
            let mut rng = desk.rng(scope::COPY_TRADING, &Utc::now().timestamp_millis().to_string());
            let fresh = desk.following.generate_for_followed(&mut rng, Utc::now())?;
            println!("Copied {} trades", fresh.len());
        }
        TradersAction::Copied => {
            for t in desk.following.copied_trades() {
                println!(
                    "{:<28} {:<16} {:<8} {:<4} {:>12.4} {:>10.2} ({:+.2}%) {:?}",
                    t.id, t.trader_name, t.symbol, t.side, t.entry_price, t.pnl, t.pnl_percent, t.status
                );
            }
        }
        TradersAction::CloseCopied { id, price } => {
            let closed = desk.following.close(&id, price, Utc::now())?;
            println!("Closed {} with P&L {:.2}", closed.symbol, closed.pnl);
        }
    }
    Ok(())
}

// ─── Positions ──────────────────────────────────────────────────────

fn run_positions(desk: &SignalDesk, action: PositionsAction) -> Result<()> {
    match action {
        PositionsAction::List => {}
        PositionsAction::Open {
            symbol,
            side,
            quantity,
            price,
        } => {
            let instrument = catalog::find_instrument(&symbol);
            let price = match (price, &instrument) {
                (Some(p), _) => p,
                (None, Some(inst)) => inst.price,
                (None, None) => bail!("unknown instrument '{symbol}'; pass --price"),
            };
            let name = instrument.map(|i| i.name).unwrap_or_else(|| symbol.clone());
            desk.positions
                .open(&symbol, &name, side.into(), price, quantity, Utc::now())?;
        }
        PositionsAction::Close { id, price } => {
            let price = match price {
                Some(p) => p,
                None => desk
                    .positions
                    .list()
                    .into_iter()
                    .find(|p| p.id == id)
                    .map(|p| p.current_price)
                    .with_context(|| format!("position '{id}' not found"))?,
            };
            let item = desk.positions.close(&id, price, Utc::now())?;
            println!("Closed {} with P&L {:.2}", item.symbol, item.pnl);
        }
        PositionsAction::CloseAll => {
            let closed = desk.positions.close_all(Utc::now())?;
            println!("Closed {} positions", closed.len());
        }
        PositionsAction::Tick => {
            let mut rng = desk.rng(scope::TICK, &Utc::now().timestamp_millis().to_string());
            desk.positions.tick(&mut rng)?;
        }
        PositionsAction::Seed => {
            if !desk.positions.seed_demo_positions(Utc::now())? {
                println!("Positions already present; nothing seeded");
            }
        }
    }

    let positions = desk.positions.list();
    for p in &positions {
        println!(
            "{:<28} {:<8} {:<4} {:>10} @ {:>12.4} -> {:>12.4}  {:>10.2} ({:+.2}%)",
            p.id, p.symbol, p.side, p.quantity, p.entry_price, p.current_price, p.pnl, p.pnl_percent
        );
    }
    println!("Total P&L: {:.2}", desk.positions.total_pnl());
    Ok(())
}

// ─── History ────────────────────────────────────────────────────────

impl From<FilterArgs> for HistoryFilter {
    fn from(f: FilterArgs) -> Self {
        HistoryFilter {
            symbol: f.symbol,
            side: f.side.map(TradeSide::from),
            account: f.account.map(AccountType::from),
        }
    }
}

fn run_history(desk: &SignalDesk, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List { filter } => {
            for t in desk.history.filter(&filter.into()) {
                println!(
                    "{:<28} {:<8} {:<4} {:>12.4} -> {:>12.4}  {:>10.2} ({:+.2}%)  {}  {}",
                    t.id,
                    t.symbol,
                    t.side,
                    t.entry_price,
                    t.exit_price,
                    t.pnl,
                    t.pnl_percent,
                    t.account_type,
                    t.exit_time.format("%Y-%m-%d %H:%M")
                );
            }
        }
        HistoryAction::Stats { filter } => {
            let s = desk.history.stats(&filter.into());
            println!("Trades:      {}", s.total_trades);
            println!("Won / lost:  {} / {}", s.winning_trades, s.losing_trades);
            println!("Win rate:    {:.1}%", s.win_rate);
            println!("Total P&L:   {:.2}", s.total_pnl);
            println!("Average P&L: {:.2}", s.average_pnl);
        }
        HistoryAction::Export { filter, output_dir } => {
            let items = desk.history.filter(&filter.into());
            if items.is_empty() {
                bail!("no trades to export");
            }
            let csv = export::history_csv(&items)?;
            let path = write_output(&output_dir, &export::history_filename(Utc::now()), &csv)?;
            println!("Exported {} trades to {}", items.len(), path.display());
        }
        HistoryAction::Clear => desk.history.clear()?,
    }
    Ok(())
}

// ─── Alerts ─────────────────────────────────────────────────────────

fn run_alerts(desk: &SignalDesk, action: AlertsAction) -> Result<()> {
    match action {
        AlertsAction::List => {
            for a in desk.alerts.list() {
                println!(
                    "{:<28} {:<8} {:>10.2} {:<8} {}",
                    a.id,
                    format!("{:?}", a.kind).to_lowercase(),
                    a.threshold,
                    a.symbol.as_deref().unwrap_or("(all)"),
                    if a.enabled { "on" } else { "off" }
                );
            }
        }
        AlertsAction::Add { kind, threshold, symbol } => {
            let alert = desk
                .alerts
                .add(kind.into(), threshold, symbol.as_deref(), Utc::now())?;
            println!("Added alert {}", alert.id);
        }
        AlertsAction::Toggle { id } => {
            let alert = desk.alerts.toggle(&id)?;
            println!("{} is {}", alert.id, if alert.enabled { "on" } else { "off" });
        }
        AlertsAction::Delete { id } => {
            desk.alerts.delete(&id)?;
        }
        AlertsAction::Check => {
            let positions = desk.positions.list();
            let fired = desk.alerts.check(desk.positions.total_pnl(), &positions);
            if fired.is_empty() {
                println!("No alerts triggered");
            }
            for a in fired {
                println!(
                    "TRIGGERED {:?} {} {}",
                    a.kind,
                    a.threshold,
                    a.symbol.as_deref().unwrap_or("(portfolio)")
                );
            }
        }
    }
    Ok(())
}

// ─── Account ────────────────────────────────────────────────────────

fn run_account(desk: &SignalDesk, action: AccountAction) -> Result<()> {
    match action {
        AccountAction::Show => {}
        AccountAction::Set {
            account_type,
            paper_balance,
            broker,
            server_url,
        } => {
            let mut settings = desk.account.load();
            if let Some(t) = account_type {
                settings.account_type = t.into();
            }
            if let Some(b) = paper_balance {
                if !b.is_finite() || b <= 0.0 {
                    bail!("paper balance must be positive");
                }
                settings.paper_balance = b;
            }
            if let Some(b) = broker {
                if catalog::broker_label(&b).is_none() {
                    bail!("unknown broker '{b}'");
                }
                settings.broker = b;
            }
            if let Some(url) = server_url {
                settings.server_url = url;
            }
            desk.account.save(&settings)?;
        }
        AccountAction::Credentials { api_key, api_secret } => {
            desk.account
                .set_credentials(BrokerCredentials { api_key, api_secret })?;
        }
        AccountAction::ClearCredentials => {
            desk.account.clear_credentials()?;
        }
    }

    let s = desk.account.load();
    println!("Account type:  {}", s.account_type);
    println!("Paper balance: ${:.2}", s.paper_balance);
    println!(
        "Broker:        {}",
        catalog::broker_label(&s.broker).unwrap_or(s.broker.as_str())
    );
    println!("Server URL:    {}", s.server_url);
    println!("Credentials:   {}", if s.has_credentials { "stored" } else { "none" });
    Ok(())
}

// ─── OHLCV ──────────────────────────────────────────────────────────

fn run_ohlcv(desk: &SignalDesk, symbol: &str, timeframe: &str, output_dir: &Path) -> Result<()> {
    if !catalog::is_known_timeframe(timeframe) {
        bail!("unknown timeframe '{timeframe}'");
    }
    let mut rng = desk.rng(scope::OHLCV, symbol);
    let bars = generate_mock_bars(&mut rng, Utc::now());
    let csv = export::ohlcv_csv(&bars)?;
    let path = write_output(output_dir, &export::ohlcv_filename(symbol, timeframe, today()), &csv)?;
    println!("Wrote {} bars to {}", bars.len(), path.display());
    Ok(())
}
