//! Trend-cross indicator: fast/slow EMA difference plus a smoothed signal
//! line, with crossover detection.
//!
//! Trend line = EMA(fast) − EMA(slow)
//! Signal line = EMA(signal) of the trend line
//! Bullish cross: trend was at or below signal on the prior bar and is
//! strictly above it on this bar. Bearish is the mirror.
//!
//! EMAs use k = 2/(n+1), seeded with the first SMA. Warmup is
//! slow − 1 + signal − 1 bars.

use crate::domain::bar::Bar;

#[derive(Debug, Clone)]
pub struct TrendCross {
    pub trend: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
    pub bullish_cross: Vec<bool>,
    pub bearish_cross: Vec<bool>,
    pub warmup: usize,
}

pub fn trend_cross(bars: &[Bar], fast: usize, slow: usize, signal_period: usize) -> TrendCross {
    let n = bars.len();
    let warmup = slow.saturating_sub(1) + signal_period.saturating_sub(1);

    if n == 0 || fast == 0 || slow == 0 || signal_period == 0 {
        return TrendCross {
            trend: vec![0.0; n],
            signal: vec![0.0; n],
            histogram: vec![0.0; n],
            bullish_cross: vec![false; n],
            bearish_cross: vec![false; n],
            warmup,
        };
    }

    let ema_fast = ema_close(bars, fast);
    let ema_slow = ema_close(bars, slow);
    let trend: Vec<f64> = (0..n).map(|i| ema_fast[i] - ema_slow[i]).collect();

    // Signal line: EMA of the trend line, seeded with an SMA over the first
    // `signal_period` trend values after the slow EMA is established.
    let mut signal = vec![0.0; n];
    let trend_start = slow - 1;
    if trend_start + signal_period <= n {
        let seed_end = trend_start + signal_period;
        let mut ema = trend[trend_start..seed_end].iter().sum::<f64>() / signal_period as f64;
        signal[seed_end - 1] = ema;
        let k = 2.0 / (signal_period as f64 + 1.0);
        for i in seed_end..n {
            ema = trend[i] * k + ema * (1.0 - k);
            signal[i] = ema;
        }
    }

    let histogram: Vec<f64> = (0..n).map(|i| trend[i] - signal[i]).collect();

    let mut bullish_cross = vec![false; n];
    let mut bearish_cross = vec![false; n];
    for i in (warmup + 1)..n {
        let was_below = trend[i - 1] <= signal[i - 1];
        let was_above = trend[i - 1] >= signal[i - 1];
        bullish_cross[i] = was_below && trend[i] > signal[i];
        bearish_cross[i] = was_above && trend[i] < signal[i];
    }

    TrendCross {
        trend,
        signal,
        histogram,
        bullish_cross,
        bearish_cross,
        warmup,
    }
}

/// EMA over closes: 0.0 through the warmup, SMA seed at index period-1,
/// recursive thereafter.
fn ema_close(bars: &[Bar], period: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            sum += bar.close;
            values.push(0.0);
        } else if i == period - 1 {
            sum += bar.close;
            ema = sum / period as f64;
            values.push(ema);
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            values.push(ema);
        }
    }
    values
}
