#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use trailscan::domain::bar::Bar;
use trailscan::domain::error::TrailscanError;
use trailscan::domain::params::SymbolParams;
use trailscan::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, TrailscanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TrailscanError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrailscanError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(i as i64)
}

pub fn quiet_bar(i: usize, close: f64, volume: f64) -> Bar {
    Bar {
        timestamp: ts(i),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// Lookbacks shrunk so signals fit in short test series.
pub fn small_params() -> SymbolParams {
    SymbolParams {
        osc_window: 30,
        macd_fast: 5,
        macd_slow: 10,
        macd_signal: 3,
        volume_lookback: 5,
        atr_period: 5,
        atr_ma_period: 5,
        oversold: 35.0,
        ..SymbolParams::default()
    }
}

/// A slide that keeps the close near the range low, ending in a wide-range
/// volume-surge reversal bar that fires every BUY condition under
/// [`small_params`].
pub fn buy_setup_bars(n: usize) -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..n - 1)
        .map(|i| quiet_bar(i, 200.0 - i as f64, 1000.0))
        .collect();
    let prev = bars[n - 2].close;
    bars.push(Bar {
        timestamp: ts(n - 1),
        open: prev,
        high: prev + 30.0,
        low: prev - 1.0,
        close: prev + 3.0,
        volume: 9000.0,
    });
    bars
}

/// [`buy_setup_bars`] with the signal at `fire`, then a climb and a final
/// washout so a full entry/exit cycle happens inside one replay.
pub fn scripted_bars(n: usize, fire: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    for i in 0..fire {
        bars.push(quiet_bar(i, 200.0 - i as f64, 1000.0));
    }
    let base = 200.0 - (fire - 1) as f64;
    bars.push(Bar {
        timestamp: ts(fire),
        open: base,
        high: base + 30.0,
        low: base - 1.0,
        close: base + 3.0,
        volume: 9000.0,
    });
    for i in fire + 1..n {
        let offset = i - fire;
        let close = if i < n - 2 {
            base + 3.0 + offset as f64 * 2.0
        } else {
            base - 10.0
        };
        bars.push(quiet_bar(i, close, 1000.0));
    }
    bars
}

/// Render bars in the on-disk CSV layout the data adapter reads.
pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}
