//! Indicator engine: stateless batch transforms over a bar series.
//!
//! Each submodule computes one family of signals; [`compute_all`] composes
//! them into a per-bar [`Snapshot`] series aligned with the input bars.
//! Snapshots inside the warm-up window carry `valid = false` and must not
//! be treated as signals.

pub mod range_osc;
pub mod trend_cross;
pub mod volume;
pub mod volatility;

use chrono::NaiveDateTime;

use crate::domain::bar::{validate_series, Bar};
use crate::domain::error::TrailscanError;
use crate::domain::params::SymbolParams;

/// Derived feature vector for one bar.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    /// All configured lookbacks are satisfied at this bar.
    pub valid: bool,
    pub range_osc: f64,
    pub trend: f64,
    pub trend_signal: f64,
    pub trend_histogram: f64,
    pub bullish_cross: bool,
    pub bearish_cross: bool,
    pub volume_ma: f64,
    pub volume_ratio: f64,
    pub obv: f64,
    pub obv_ma: f64,
    pub bullish_volume: bool,
    pub bearish_volume: bool,
    pub atr: f64,
    pub atr_ma: f64,
    pub atr_ratio: f64,
    pub volatility_expanding: bool,
}

/// Number of leading bars that cannot produce a valid snapshot for these
/// parameters.
pub fn warmup_bars(params: &SymbolParams) -> usize {
    let osc = params.osc_window.saturating_sub(1);
    let cross = params.macd_slow.saturating_sub(1) + params.macd_signal.saturating_sub(1) + 1;
    let vol = params.volume_lookback.saturating_sub(1).max(1);
    let atr = params.atr_period.saturating_sub(1) + params.atr_ma_period.saturating_sub(1);
    osc.max(cross).max(vol).max(atr)
}

/// Compute every indicator family over `bars` and zip the results into one
/// snapshot series. Pure function; the only failure is a structurally
/// invalid bar series.
pub fn compute_all(
    symbol: &str,
    bars: &[Bar],
    params: &SymbolParams,
) -> Result<Vec<Snapshot>, TrailscanError> {
    validate_series(symbol, bars)?;

    let osc = range_osc::range_oscillator(bars, params.osc_window);
    let tc = trend_cross::trend_cross(
        bars,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );
    let vs = volume::volume_confirmation(bars, params.volume_lookback);
    let vf = volatility::volatility_filter(
        bars,
        params.atr_period,
        params.atr_ma_period,
        params.atr_threshold,
    );

    let warmup = warmup_bars(params);
    let mut snapshots = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        snapshots.push(Snapshot {
            timestamp: bar.timestamp,
            close: bar.close,
            valid: i >= warmup,
            range_osc: osc[i],
            trend: tc.trend[i],
            trend_signal: tc.signal[i],
            trend_histogram: tc.histogram[i],
            bullish_cross: tc.bullish_cross[i],
            bearish_cross: tc.bearish_cross[i],
            volume_ma: vs.volume_ma[i],
            volume_ratio: vs.volume_ratio[i],
            obv: vs.obv[i],
            obv_ma: vs.obv_ma[i],
            bullish_volume: vs.bullish[i],
            bearish_volume: vs.bearish[i],
            atr: vf.atr[i],
            atr_ma: vf.atr_ma[i],
            atr_ratio: vf.atr_ratio[i],
            volatility_expanding: vf.expanding[i],
        });
    }
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 10.0;
                Bar {
                    timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        + chrono::Duration::minutes(i as i64),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0 + (i % 7) as f64 * 100.0,
                }
            })
            .collect()
    }

    fn small_params() -> SymbolParams {
        SymbolParams {
            osc_window: 10,
            macd_fast: 5,
            macd_slow: 10,
            macd_signal: 3,
            volume_lookback: 5,
            atr_period: 5,
            atr_ma_period: 5,
            ..SymbolParams::default()
        }
    }

    #[test]
    fn snapshots_align_with_bars() {
        let bars = make_bars(60);
        let snaps = compute_all("TEST", &bars, &small_params()).unwrap();
        assert_eq!(snaps.len(), bars.len());
        for (bar, snap) in bars.iter().zip(&snaps) {
            assert_eq!(snap.timestamp, bar.timestamp);
            assert_relative_eq!(snap.close, bar.close);
        }
    }

    #[test]
    fn warmup_snapshots_are_invalid() {
        let params = small_params();
        let bars = make_bars(60);
        let snaps = compute_all("TEST", &bars, &params).unwrap();
        let warmup = warmup_bars(&params);
        for snap in &snaps[..warmup] {
            assert!(!snap.valid);
        }
        assert!(snaps[warmup].valid);
    }

    #[test]
    fn warmup_is_longest_lookback() {
        let params = small_params();
        // osc 9, cross 9+2+1=12, volume 4, atr 4+4=8 → 12
        assert_eq!(warmup_bars(&params), 12);

        let wide_osc = SymbolParams {
            osc_window: 100,
            ..small_params()
        };
        assert_eq!(warmup_bars(&wide_osc), 99);
    }

    #[test]
    fn invalid_series_fails_fast() {
        let mut bars = make_bars(10);
        bars[5].timestamp = bars[4].timestamp;
        let err = compute_all("TEST", &bars, &small_params()).unwrap_err();
        assert!(matches!(err, TrailscanError::InvalidSeries { .. }));
    }

    #[test]
    fn histogram_consistent_in_snapshots() {
        let bars = make_bars(60);
        let snaps = compute_all("TEST", &bars, &small_params()).unwrap();
        for snap in snaps.iter().filter(|s| s.valid) {
            assert_relative_eq!(snap.trend_histogram, snap.trend - snap.trend_signal);
        }
    }

    #[test]
    fn empty_series_yields_empty_snapshots() {
        let snaps = compute_all("TEST", &[], &small_params()).unwrap();
        assert!(snaps.is_empty());
    }
}
