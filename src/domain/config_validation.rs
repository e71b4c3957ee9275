//! Configuration validation and typed settings construction.
//!
//! Everything is checked up front and materialized into strongly-typed
//! structures; the rest of the core never touches a raw config mapping.

use std::path::PathBuf;

use crate::domain::error::TrailscanError;
use crate::domain::manager::ManagerConfig;
use crate::domain::params::{ParameterStore, SymbolParams};
use crate::domain::position::TrailPriority;
use crate::ports::config_port::ConfigPort;

/// Section holding default symbol parameters. Per-symbol overrides live in
/// `params.<SYMBOL>` sections.
const PARAMS_SECTION: &str = "params";
const REPLAY_SECTION: &str = "replay";

#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub data_dir: PathBuf,
    pub symbols: Vec<String>,
    pub manager: ManagerConfig,
    pub output: Option<PathBuf>,
}

pub fn load_settings(config: &dyn ConfigPort) -> Result<ReplaySettings, TrailscanError> {
    let data_dir = config
        .get_string(REPLAY_SECTION, "data_dir")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| TrailscanError::ConfigMissing {
            section: REPLAY_SECTION.into(),
            key: "data_dir".into(),
        })?;

    let symbols_raw = config
        .get_string(REPLAY_SECTION, "symbols")
        .ok_or_else(|| TrailscanError::ConfigMissing {
            section: REPLAY_SECTION.into(),
            key: "symbols".into(),
        })?;
    let symbols = parse_symbols(&symbols_raw)?;

    let max_positions = config.get_int(REPLAY_SECTION, "max_positions", 1);
    if max_positions < 1 {
        return Err(invalid(
            REPLAY_SECTION,
            "max_positions",
            "must be at least 1",
        ));
    }

    let trail_priority = match config
        .get_string(REPLAY_SECTION, "trail_priority")
        .as_deref()
        .map(str::trim)
    {
        None | Some("peak_first") => TrailPriority::PeakFirst,
        Some("early_first") => TrailPriority::EarlyFirst,
        Some(other) => {
            return Err(invalid(
                REPLAY_SECTION,
                "trail_priority",
                &format!("unknown value {other:?}, expected peak_first or early_first"),
            ))
        }
    };

    let output = config
        .get_string(REPLAY_SECTION, "output")
        .map(PathBuf::from);

    Ok(ReplaySettings {
        data_dir: PathBuf::from(data_dir),
        symbols,
        manager: ManagerConfig {
            max_positions: max_positions as usize,
            trail_priority,
        },
        output,
    })
}

/// Comma-separated symbol list; rejects empty tokens and duplicates.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, TrailscanError> {
    let mut symbols: Vec<String> = Vec::new();
    for token in input.split(',') {
        let symbol = token.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(invalid(REPLAY_SECTION, "symbols", "empty token in list"));
        }
        if symbols.contains(&symbol) {
            return Err(invalid(
                REPLAY_SECTION,
                "symbols",
                &format!("duplicate symbol {symbol}"),
            ));
        }
        symbols.push(symbol);
    }
    Ok(symbols)
}

/// Build the parameter store: the `[params]` section overrides the built-in
/// defaults, and each `[params.<SYMBOL>]` section overrides that bundle for
/// one symbol.
pub fn load_parameter_store(config: &dyn ConfigPort) -> Result<ParameterStore, TrailscanError> {
    let default = read_params(config, PARAMS_SECTION, &SymbolParams::default())?;
    let mut store = ParameterStore::new(default.clone());

    for section in config.sections() {
        if let Some(symbol) = section.strip_prefix("params.") {
            let params = read_params(config, &section, &default)?;
            store.insert(symbol, params);
        }
    }
    Ok(store)
}

fn read_params(
    config: &dyn ConfigPort,
    section: &str,
    base: &SymbolParams,
) -> Result<SymbolParams, TrailscanError> {
    let params = SymbolParams {
        osc_window: read_period(config, section, "osc_window", base.osc_window)?,
        oversold: config.get_double(section, "oversold", base.oversold),
        overbought: config.get_double(section, "overbought", base.overbought),
        macd_fast: read_period(config, section, "macd_fast", base.macd_fast)?,
        macd_slow: read_period(config, section, "macd_slow", base.macd_slow)?,
        macd_signal: read_period(config, section, "macd_signal", base.macd_signal)?,
        volume_lookback: read_period(config, section, "volume_lookback", base.volume_lookback)?,
        volume_threshold: config.get_double(section, "volume_threshold", base.volume_threshold),
        atr_period: read_period(config, section, "atr_period", base.atr_period)?,
        atr_ma_period: read_period(config, section, "atr_ma_period", base.atr_ma_period)?,
        atr_threshold: config.get_double(section, "atr_threshold", base.atr_threshold),
        stop_loss_pct: config.get_double(section, "stop_loss_pct", base.stop_loss_pct),
        early_trail_start: config.get_double(section, "early_trail_start", base.early_trail_start),
        early_trail_minus: config.get_double(section, "early_trail_minus", base.early_trail_minus),
        peak_trail_start: config.get_double(section, "peak_trail_start", base.peak_trail_start),
        peak_trail_minus: config.get_double(section, "peak_trail_minus", base.peak_trail_minus),
        use_osc_exit: config.get_bool(section, "use_osc_exit", base.use_osc_exit),
        osc_exit_min_profit: config.get_double(
            section,
            "osc_exit_min_profit",
            base.osc_exit_min_profit,
        ),
        position_size: config.get_double(section, "position_size", base.position_size),
    };
    validate_params(section, &params)?;
    Ok(params)
}

fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, TrailscanError> {
    let value = config.get_int(section, key, default as i64);
    if value < 1 {
        return Err(invalid(section, key, "must be at least 1"));
    }
    Ok(value as usize)
}

fn validate_params(section: &str, params: &SymbolParams) -> Result<(), TrailscanError> {
    if !(0.0..100.0).contains(&params.oversold) {
        return Err(invalid(section, "oversold", "must be in [0, 100)"));
    }
    if !(0.0..=100.0).contains(&params.overbought) || params.overbought <= 0.0 {
        return Err(invalid(section, "overbought", "must be in (0, 100]"));
    }
    if params.oversold >= params.overbought {
        return Err(invalid(section, "oversold", "must be below overbought"));
    }
    if params.macd_fast >= params.macd_slow {
        return Err(invalid(section, "macd_fast", "must be below macd_slow"));
    }
    for (key, value) in [
        ("volume_threshold", params.volume_threshold),
        ("atr_threshold", params.atr_threshold),
        ("stop_loss_pct", params.stop_loss_pct),
        ("early_trail_start", params.early_trail_start),
        ("early_trail_minus", params.early_trail_minus),
        ("peak_trail_start", params.peak_trail_start),
        ("peak_trail_minus", params.peak_trail_minus),
        ("position_size", params.position_size),
    ] {
        if value <= 0.0 {
            return Err(invalid(section, key, "must be positive"));
        }
    }
    if params.osc_exit_min_profit < 0.0 {
        return Err(invalid(section, "osc_exit_min_profit", "must be non-negative"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TrailscanError {
    TrailscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
