//! OHLCV bar representation.

use chrono::NaiveDateTime;

use super::error::TrailscanError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check structural validity of a bar series: strictly increasing timestamps
/// and finite price/volume fields. Normal market data never fails here; a
/// failure means the upstream feed handed us garbage and the caller must stop.
pub fn validate_series(symbol: &str, bars: &[Bar]) -> Result<(), TrailscanError> {
    for (i, bar) in bars.iter().enumerate() {
        let fields = [bar.open, bar.high, bar.low, bar.close, bar.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(TrailscanError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: format!("non-finite field at bar {i}"),
            });
        }
        if bar.high < bar.low {
            return Err(TrailscanError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: format!("high below low at bar {i}"),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(TrailscanError::InvalidSeries {
                symbol: symbol.to_string(),
                reason: format!("non-monotonic timestamp at bar {i}"),
            });
        }
    }
    Ok(())
}
