//! True-range volatility filter.
//!
//! TR = max(high − low, |high − prev_close|, |low − prev_close|), with the
//! first bar using high − low. The volatility measure is a rolling mean of
//! TR; volatility counts as expanding when it exceeds its own moving
//! average times the configured multiplier.

use crate::domain::bar::Bar;

#[derive(Debug, Clone)]
pub struct VolatilityFilter {
    pub atr: Vec<f64>,
    pub atr_ma: Vec<f64>,
    /// atr / atr_ma, 0.0 while either average is empty.
    pub atr_ratio: Vec<f64>,
    pub expanding: Vec<bool>,
    pub warmup: usize,
}

pub fn volatility_filter(
    bars: &[Bar],
    period: usize,
    ma_period: usize,
    multiplier: f64,
) -> VolatilityFilter {
    let n = bars.len();
    let warmup = period.saturating_sub(1) + ma_period.saturating_sub(1);

    let mut tr = Vec::with_capacity(n);
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            tr.push(bar.high - bar.low);
        } else {
            tr.push(bar.true_range(bars[i - 1].close));
        }
    }

    let atr = rolling_mean(&tr, period);
    let atr_ma = rolling_mean(&atr[..], ma_period);

    let mut atr_ratio = vec![0.0; n];
    let mut expanding = vec![false; n];
    for i in 0..n {
        if atr_ma[i] > 0.0 {
            atr_ratio[i] = atr[i] / atr_ma[i];
            expanding[i] = atr[i] > atr_ma[i] * multiplier;
        }
    }

    VolatilityFilter {
        atr,
        atr_ma,
        atr_ratio,
        expanding,
        warmup,
    }
}

fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
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
