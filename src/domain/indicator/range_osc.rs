//! Range oscillator: position of the close within the recent high/low range.
//!
//! (close − rolling_min(low, window)) / (rolling_max(high, window) − rolling_min(low, window)) × 100
//!
//! This measures where price sits inside the window's range, not momentum.
//! A zero range (all bars flat) is defined as neutral 50, never an error.
//! Bars before the window fills also report neutral 50; [`super::compute_all`]
//! flags them as not yet valid.

use crate::domain::bar::Bar;

pub const NEUTRAL: f64 = 50.0;

pub fn range_oscillator(bars: &[Bar], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![NEUTRAL; bars.len()];
    }

    let mut values = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i + 1 < window {
            values.push(NEUTRAL);
            continue;
        }

        let slice = &bars[i + 1 - window..=i];
        let highest = slice.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest = slice.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let range = highest - lowest;

        if range <= 0.0 {
            values.push(NEUTRAL);
        } else {
            values.push((bars[i].close - lowest) / range * 100.0);
        }
    }
    values
}
