//! Per-symbol tunable parameters and their lookup store.

use std::collections::HashMap;

/// Tunable bundle for one symbol. Thresholds and distances are percentages
/// (e.g. `stop_loss_pct = 2.0` means 2%).
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolParams {
    /// Rolling window of the range oscillator.
    pub osc_window: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Lookback for the volume and OBV moving averages.
    pub volume_lookback: usize,
    /// Entry requires volume_ratio at or above this multiplier.
    pub volume_threshold: f64,
    pub atr_period: usize,
    pub atr_ma_period: usize,
    /// Volatility counts as expanding when ATR > ATR MA × this multiplier.
    pub atr_threshold: f64,
    pub stop_loss_pct: f64,
    pub early_trail_start: f64,
    pub early_trail_minus: f64,
    pub peak_trail_start: f64,
    pub peak_trail_minus: f64,
    pub use_osc_exit: bool,
    /// Minimum unrealized profit (percent) before the oscillator-reversal
    /// exit is considered.
    pub osc_exit_min_profit: f64,
    /// Units bought or sold per entry.
    pub position_size: f64,
}

impl Default for SymbolParams {
    fn default() -> Self {
        SymbolParams {
            osc_window: 100,
            oversold: 30.0,
            overbought: 70.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_lookback: 20,
            volume_threshold: 1.2,
            atr_period: 14,
            atr_ma_period: 28,
            atr_threshold: 1.3,
            stop_loss_pct: 2.0,
            early_trail_start: 1.0,
            early_trail_minus: 15.0,
            peak_trail_start: 5.0,
            peak_trail_minus: 0.5,
            use_osc_exit: true,
            osc_exit_min_profit: 0.5,
            position_size: 1.0,
        }
    }
}

/// Explicit parameter store: a default bundle plus per-symbol overrides,
/// owned by the caller and passed where needed.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    default: SymbolParams,
    overrides: HashMap<String, SymbolParams>,
}

impl ParameterStore {
    pub fn new(default: SymbolParams) -> Self {
        ParameterStore {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: &str, params: SymbolParams) {
        self.overrides.insert(symbol.to_uppercase(), params);
    }

    pub fn default_params(&self) -> &SymbolParams {
        &self.default
    }

    /// Look up parameters for a symbol: exact match first, then the
    /// separator-stripped form ("BTC/USD" → "BTCUSD"), then the default
    /// bundle. Never fails for an unknown symbol.
    pub fn resolve(&self, symbol: &str) -> &SymbolParams {
        let upper = symbol.to_uppercase();
        if let Some(params) = self.overrides.get(&upper) {
            return params;
        }
        if let Some(params) = self.overrides.get(&normalize(&upper)) {
            return params;
        }
        &self.default
    }
}

fn normalize(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_'))
        .collect()
}
