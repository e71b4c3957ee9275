//! Volume confirmation: signed-volume accumulator (OBV) and volume
//! moving-average signals.
//!
//! OBV[0] = volume[0]; add volume on an up close, subtract on a down close,
//! hold on a tie. "High volume" means the bar's volume sits above its own
//! moving average. Bullish confirmation additionally requires an up close
//! and OBV above its moving average; bearish is the mirror.

use crate::domain::bar::Bar;

#[derive(Debug, Clone)]
pub struct VolumeSignals {
    pub obv: Vec<f64>,
    pub obv_ma: Vec<f64>,
    pub volume_ma: Vec<f64>,
    /// volume / volume_ma, 0.0 while the average is empty.
    pub volume_ratio: Vec<f64>,
    pub high_volume: Vec<bool>,
    pub bullish: Vec<bool>,
    pub bearish: Vec<bool>,
    pub warmup: usize,
}

pub fn volume_confirmation(bars: &[Bar], lookback: usize) -> VolumeSignals {
    let n = bars.len();
    let mut obv = Vec::with_capacity(n);
    let mut acc = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            acc = bar.volume;
        } else if bar.close > bars[i - 1].close {
            acc += bar.volume;
        } else if bar.close < bars[i - 1].close {
            acc -= bar.volume;
        }
        obv.push(acc);
    }

    let obv_ma = sma(&obv, lookback);
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let volume_ma = sma(&volumes, lookback);

    let mut volume_ratio = vec![0.0; n];
    let mut high_volume = vec![false; n];
    let mut bullish = vec![false; n];
    let mut bearish = vec![false; n];

    for i in 0..n {
        if volume_ma[i] > 0.0 {
            volume_ratio[i] = volumes[i] / volume_ma[i];
        }
        high_volume[i] = volumes[i] > volume_ma[i];
        if i == 0 {
            continue;
        }
        let price_up = bars[i].close > bars[i - 1].close;
        let price_down = bars[i].close < bars[i - 1].close;
        bullish[i] = high_volume[i] && price_up && obv[i] > obv_ma[i];
        bearish[i] = high_volume[i] && price_down && obv[i] < obv_ma[i];
    }

    VolumeSignals {
        obv,
        obv_ma,
        volume_ma,
        volume_ratio,
        high_volume,
        bullish,
        bearish,
        warmup: lookback.saturating_sub(1).max(1),
    }
}

/// Trailing SMA over a full window; 0.0 while the window is filling.
fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    if period == 0 {
        return out;
    }
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = sum / period as f64;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(cv: &[(f64, f64)]) -> Vec<Bar> {
        cv.iter()
            .enumerate()
            .map(|(i, &(close, volume))| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn obv_seeds_with_first_volume() {
        let vs = volume_confirmation(&make_bars(&[(100.0, 1000.0)]), 3);
        assert_relative_eq!(vs.obv[0], 1000.0);
    }

    #[test]
    fn obv_adds_on_up_close() {
        let vs = volume_confirmation(&make_bars(&[(100.0, 1000.0), (105.0, 500.0)]), 3);
        assert_relative_eq!(vs.obv[1], 1500.0);
    }

    #[test]
    fn obv_subtracts_on_down_close() {
        let vs = volume_confirmation(&make_bars(&[(100.0, 1000.0), (95.0, 300.0)]), 3);
        assert_relative_eq!(vs.obv[1], 700.0);
    }

    #[test]
    fn obv_holds_on_tie() {
        let vs = volume_confirmation(&make_bars(&[(100.0, 1000.0), (100.0, 500.0)]), 3);
        assert_relative_eq!(vs.obv[1], 1000.0);
    }

    #[test]
    fn volume_ratio_against_sma() {
        let bars = make_bars(&[(100.0, 100.0), (101.0, 100.0), (102.0, 400.0)]);
        let vs = volume_confirmation(&bars, 3);
        // volume MA at index 2 = 200; ratio = 400/200 = 2
        assert_relative_eq!(vs.volume_ma[2], 200.0);
        assert_relative_eq!(vs.volume_ratio[2], 2.0);
        assert!(vs.high_volume[2]);
    }

    #[test]
    fn ratio_zero_while_ma_empty() {
        let vs = volume_confirmation(&make_bars(&[(100.0, 100.0), (101.0, 100.0)]), 5);
        assert_relative_eq!(vs.volume_ratio[1], 0.0);
    }

    #[test]
    fn bullish_needs_all_three() {
        // Up close on high volume with OBV above its MA.
        let bars = make_bars(&[
            (100.0, 100.0),
            (99.0, 100.0),
            (100.0, 100.0),
            (103.0, 500.0),
        ]);
        let vs = volume_confirmation(&bars, 3);
        assert!(vs.bullish[3]);
        assert!(!vs.bearish[3]);
    }

    #[test]
    fn no_bullish_on_down_close() {
        let bars = make_bars(&[
            (100.0, 100.0),
            (101.0, 100.0),
            (102.0, 100.0),
            (99.0, 500.0),
        ]);
        let vs = volume_confirmation(&bars, 3);
        assert!(!vs.bullish[3]);
    }

    #[test]
    fn bearish_on_heavy_selling() {
        let bars = make_bars(&[
            (100.0, 100.0),
            (98.0, 300.0),
            (96.0, 400.0),
            (92.0, 900.0),
        ]);
        let vs = volume_confirmation(&bars, 3);
        assert!(vs.bearish[3]);
        assert!(!vs.bullish[3]);
    }

    #[test]
    fn empty_bars() {
        let vs = volume_confirmation(&[], 20);
        assert!(vs.obv.is_empty());
        assert!(vs.volume_ratio.is_empty());
    }

    #[test]
    fn sma_basic() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_relative_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 1.5);
        assert_relative_eq!(out[2], 2.5);
        assert_relative_eq!(out[3], 3.5);
    }
}
