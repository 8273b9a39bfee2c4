//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_log_adapter::CsvTradeLogAdapter;
use crate::adapters::csv_price_adapter::{CsvPriceAdapter, TIMESTAMP_FORMAT};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_session_adapter::FileSessionAdapter;
use crate::domain::backtest::run_backtest;
use crate::domain::config::{EngineConfig, MarketConfig};
use crate::domain::engine::run_refresh;
use crate::domain::error::ZenithError;
use crate::domain::portfolio::PortfolioState;
use crate::ports::config_port::ConfigPort;
use crate::ports::log_port::TradeLogPort;
use crate::ports::price_port::PricePort;
use crate::ports::session_port::SessionPort;

#[derive(Parser, Debug)]
#[command(name = "zenith", about = "MA-crossover signal engine and paper trader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one live refresh cycle and update the session portfolio
    Monitor {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        session: Option<String>,
    },
    /// Replay the strategy over historical data
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the recorded trade history for a session
    History {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        session: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range available for the configured symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Monitor {
            config,
            symbol,
            session,
        } => run_monitor(&config, symbol.as_deref(), session.as_deref()),
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest_command(&config, symbol.as_deref(), output.as_deref()),
        Command::History { config, session } => run_history(&config, session.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ZenithError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

struct Context {
    engine: EngineConfig,
    market: MarketConfig,
    prices_dir: PathBuf,
    session_dir: PathBuf,
    session: String,
}

fn build_context(
    adapter: &FileConfigAdapter,
    symbol_override: Option<&str>,
    session_override: Option<&str>,
) -> Result<Context, ZenithError> {
    let engine = EngineConfig::from_config(adapter)?;
    let mut market = MarketConfig::from_config(adapter)?;
    if let Some(symbol) = symbol_override {
        market.symbol = symbol.to_uppercase();
    }

    let prices_dir = PathBuf::from(
        adapter
            .get_string("data", "prices_dir")
            .unwrap_or_else(|| "data".to_string()),
    );
    let session_dir = PathBuf::from(
        adapter
            .get_string("session", "dir")
            .unwrap_or_else(|| "sessions".to_string()),
    );
    let session = session_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("session", "name"))
        .unwrap_or_else(|| "default".to_string());

    Ok(Context {
        engine,
        market,
        prices_dir,
        session_dir,
        session,
    })
}

fn fail(err: &ZenithError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn run_monitor(
    config_path: &Path,
    symbol_override: Option<&str>,
    session_override: Option<&str>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let ctx = match build_context(&adapter, symbol_override, session_override) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let price_port = CsvPriceAdapter::new(ctx.prices_dir.clone());
    let session_port = FileSessionAdapter::new(ctx.session_dir.clone());
    let trade_log = CsvTradeLogAdapter::new(ctx.session_dir.clone());

    let mut portfolio = match session_port.load(&ctx.session) {
        Ok(Some(state)) => state,
        Ok(None) => PortfolioState::new(ctx.engine.starting_capital),
        Err(e) => return fail(&e),
    };

    let report = match run_refresh(
        &price_port,
        &session_port,
        &trade_log,
        &mut portfolio,
        &ctx.session,
        &ctx.engine,
        &ctx.market,
    ) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    println!("{:<12} ${:.2}", report.symbol, report.price);
    println!("{:<12} {}", "Sentiment", report.signal);
    match report.snapshot.oscillator {
        Some(osc) => println!("{:<12} {:.2} ({})", "Oscillator", osc, report.risk),
        None => println!("{:<12} - ({})", "Oscillator", report.risk),
    }
    println!(
        "{:<12} ${:.2} (profit ${:+.2})",
        "Vault", report.valuation, report.profit
    );
    if let Some(transition) = &report.transition {
        println!(
            "{:<12} {} -> {} at ${:.2}",
            "Transition", transition.from, transition.to, transition.price
        );
    }

    ExitCode::SUCCESS
}

fn run_backtest_command(
    config_path: &Path,
    symbol_override: Option<&str>,
    output: Option<&Path>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let ctx = match build_context(&adapter, symbol_override, None) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let price_port = CsvPriceAdapter::new(ctx.prices_dir.clone());
    let prices = match price_port.fetch(
        &ctx.market.symbol,
        ctx.market.backtest_interval,
        ctx.market.backtest_lookback,
    ) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!(
        "Backtesting {} over {} points ({}/{} MA cross)",
        ctx.market.symbol,
        prices.len(),
        ctx.engine.fast_window,
        ctx.engine.slow_window,
    );

    let result = match run_backtest(&prices, &ctx.engine) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    println!("Strategy ROI: {:+.2}%", result.total_roi * 100.0);

    if let Some(path) = output {
        if let Err(e) = write_roi_curve(path, &result.cumulative_roi) {
            return fail(&e);
        }
        eprintln!("Wrote ROI curve to {}", path.display());
    }

    ExitCode::SUCCESS
}

fn write_roi_curve(
    path: &Path,
    curve: &[crate::domain::backtest::RoiPoint],
) -> Result<(), ZenithError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| ZenithError::DataSource {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;
    wtr.write_record(["timestamp", "cumulative_roi"])
        .map_err(|e| ZenithError::DataSource {
            reason: format!("failed to write curve: {}", e),
        })?;
    for point in curve {
        wtr.write_record([
            point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{}", point.roi),
        ])
        .map_err(|e| ZenithError::DataSource {
            reason: format!("failed to write curve: {}", e),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_history(config_path: &Path, session_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let ctx = match build_context(&adapter, None, session_override) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let trade_log = CsvTradeLogAdapter::new(ctx.session_dir.clone());
    let records = match trade_log.read_all(&ctx.session) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if records.is_empty() {
        println!("No trades recorded for session '{}'", ctx.session);
        return ExitCode::SUCCESS;
    }

    println!(
        "{:<20} {:<10} {:<10} {:>12} {:>14}",
        "timestamp", "from", "to", "price", "valuation"
    );
    for record in &records {
        println!(
            "{:<20} {:<10} {:<10} {:>12.2} {:>14.2}",
            record.timestamp.format(TIMESTAMP_FORMAT),
            record.from.to_string(),
            record.to.to_string(),
            record.price,
            record.valuation
        );
    }

    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let ctx = match build_context(&adapter, None, None) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    println!("Configuration OK");
    println!(
        "  symbol {} / windows {}/{}/{} / thresholds {}/{} / capital {}",
        ctx.market.symbol,
        ctx.engine.fast_window,
        ctx.engine.slow_window,
        ctx.engine.oscillator_window,
        ctx.engine.oversold_threshold,
        ctx.engine.overbought_threshold,
        ctx.engine.starting_capital
    );
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, symbol_override: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let ctx = match build_context(&adapter, symbol_override, None) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let price_port = CsvPriceAdapter::new(ctx.prices_dir.clone());
    for interval in [ctx.market.live_interval, ctx.market.backtest_interval] {
        match price_port.data_range(&ctx.market.symbol, interval) {
            Ok(Some((first, last, count))) => println!(
                "{} @{}: {} points, {} .. {}",
                ctx.market.symbol,
                interval,
                count,
                first.format(TIMESTAMP_FORMAT),
                last.format(TIMESTAMP_FORMAT)
            ),
            Ok(None) => println!("{} @{}: no data", ctx.market.symbol, interval),
            Err(e) => return fail(&e),
        }
    }

    ExitCode::SUCCESS
}
