//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::bar::Bar;
use crate::domain::config_validation::{load_parameter_store, load_settings, ReplaySettings};
use crate::domain::error::TrailscanError;
use crate::domain::params::ParameterStore;
use crate::domain::replay::replay;
use crate::domain::scanner::{Scanner, SymbolDiagnostics};
use crate::ports::data_port::MarketDataPort;
use crate::ports::trade_log_port::TradeLogPort;

#[derive(Parser, Debug)]
#[command(name = "trailscan", about = "Signal scanner and trailing-stop replay engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay historical bars through the scanner and position manager
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scan the configured universe once and report entry readiness
    Scan {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range and resolved parameters for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Replay { config, output } => run_replay(&config, output.as_ref()),
        Command::Scan { config } => run_scan(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TrailscanError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_all(path: &PathBuf) -> Result<(ReplaySettings, ParameterStore), ExitCode> {
    let adapter = load_config(path)?;
    let settings = load_settings(&adapter).map_err(report)?;
    let store = load_parameter_store(&adapter).map_err(report)?;
    Ok((settings, store))
}

fn report(e: TrailscanError) -> ExitCode {
    eprintln!("error: {e}");
    ExitCode::from(&e)
}

/// Fetch bars for every configured symbol. A symbol whose file is missing
/// or unreadable is skipped with a warning rather than aborting the run.
fn fetch_universe(
    data_port: &dyn MarketDataPort,
    symbols: &[String],
) -> BTreeMap<String, Vec<Bar>> {
    let mut market = BTreeMap::new();
    for symbol in symbols {
        match data_port.fetch_bars(symbol) {
            Ok(bars) => {
                market.insert(symbol.clone(), bars);
            }
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
            }
        }
    }
    market
}

fn run_replay(config_path: &PathBuf, output_override: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let (settings, store) = match load_all(config_path) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let market = fetch_universe(&data_port, &settings.symbols);
    if market.is_empty() {
        eprintln!("error: no symbols with data to replay");
        return ExitCode::from(3);
    }

    eprintln!(
        "Replaying {} symbols from {}",
        market.len(),
        settings.data_dir.display()
    );

    let result = match replay(&market, &store, settings.manager) {
        Ok(r) => r,
        Err(e) => return report(e),
    };

    eprintln!("\n=== Replay Results ===");
    eprintln!("Total Trades:     {}", result.stats.total_trades);
    eprintln!("Winning:          {}", result.stats.winning_trades);
    eprintln!("Losing:           {}", result.stats.losing_trades);
    eprintln!("Win Rate:         {:.1}%", result.stats.win_rate);
    eprintln!("Total PnL:        {:.2}", result.stats.total_pnl);
    eprintln!("Avg PnL/Trade:    {:.2}", result.stats.avg_pnl);

    let output = output_override.cloned().or(settings.output);
    if let Some(path) = output {
        if let Err(e) = CsvTradeLogAdapter.write(&result.trades, &path) {
            return report(e);
        }
        eprintln!("\nTrade log written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

fn run_scan(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let (settings, store) = match load_all(config_path) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let market: HashMap<String, Vec<Bar>> =
        fetch_universe(&data_port, &settings.symbols).into_iter().collect();
    if market.is_empty() {
        eprintln!("error: no symbols with data to scan");
        return ExitCode::from(3);
    }

    let scanner = Scanner::new(&store);

    match scanner.scan_universe(&market) {
        Some(opp) => {
            println!(
                "{} {} @ {:.4} (score {:.1})",
                opp.symbol, opp.direction, opp.entry_price, opp.score
            );
        }
        None => eprintln!("No entry-ready symbol in this scan"),
    }

    eprintln!("\n=== Signal Diagnostics ===");
    for (symbol, diag) in scanner.signal_diagnostics(&market) {
        match diag {
            SymbolDiagnostics::Ready {
                price,
                oscillator,
                volume_ratio,
                atr_ratio,
                buy_ready,
                sell_ready,
                missing_buy,
                missing_sell,
            } => {
                let state = if buy_ready {
                    "BUY ready".to_string()
                } else if sell_ready {
                    "SELL ready".to_string()
                } else if missing_buy.len() <= missing_sell.len() {
                    format!("waiting (buy needs {:?})", missing_buy)
                } else {
                    format!("waiting (sell needs {:?})", missing_sell)
                };
                eprintln!(
                    "  {}: price {:.4}, osc {:.1}, vol x{:.2}, atr x{:.2} | {}",
                    symbol, price, oscillator, volume_ratio, atr_ratio, state
                );
            }
            SymbolDiagnostics::InsufficientData { bars } => {
                eprintln!("  {}: insufficient data ({} bars)", symbol, bars);
            }
            SymbolDiagnostics::Failed { reason } => {
                eprintln!("  {}: failed ({})", symbol, reason);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let (settings, store) = match load_all(config_path) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    eprintln!("  data_dir:      {}", settings.data_dir.display());
    eprintln!("  symbols:       {}", settings.symbols.join(", "));
    eprintln!("  max_positions: {}", settings.manager.max_positions);
    eprintln!("  trail:         {:?}", settings.manager.trail_priority);
    for symbol in &settings.symbols {
        let p = store.resolve(symbol);
        eprintln!(
            "  {}: osc {}/{:.0}/{:.0}, cross {}/{}/{}, stop {:.1}%",
            symbol,
            p.osc_window,
            p.oversold,
            p.overbought,
            p.macd_fast,
            p.macd_slow,
            p.macd_signal,
            p.stop_loss_pct
        );
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, symbol_override: Option<&str>) -> ExitCode {
    let (settings, store) = match load_all(config_path) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    let symbols: Vec<String> = match symbol_override {
        Some(s) => vec![s.to_uppercase()],
        None => settings.symbols.clone(),
    };

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    for symbol in &symbols {
        match data_port.fetch_bars(symbol) {
            Ok(bars) if bars.is_empty() => {
                eprintln!("{}: no data found", symbol);
            }
            Ok(bars) => {
                let first = bars.first().map(|b| b.timestamp);
                let last = bars.last().map(|b| b.timestamp);
                if let (Some(first), Some(last)) = (first, last) {
                    println!("{}: {} bars, {} to {}", symbol, bars.len(), first, last);
                }
                let p = store.resolve(symbol);
                println!(
                    "  params: osc {}/{:.0}/{:.0}, stop {:.1}%, trails {:.1}%-{:.1}% / {:.1}%-{:.1}%",
                    p.osc_window,
                    p.oversold,
                    p.overbought,
                    p.stop_loss_pct,
                    p.early_trail_start,
                    p.early_trail_minus,
                    p.peak_trail_start,
                    p.peak_trail_minus
                );
            }
            Err(e) => {
                eprintln!("error reading {}: {}", symbol, e);
            }
        }
    }
    ExitCode::SUCCESS
}
