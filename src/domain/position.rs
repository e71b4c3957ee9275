//! Position state: fixed stop-loss plus dual trailing exits.
//!
//! A position opens with a stop-loss fixed from the entry price and never
//! recomputed. Two trailing stops arm independently once unrealized profit
//! reaches their start thresholds: the early trail (low threshold, wide
//! retrace) and the peak trail (higher threshold, tight retrace). Once
//! armed, a trail never disarms and its trigger price only tightens,
//! because it is derived from the monotonic favorable extreme.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::params::SymbolParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// How a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    EarlyTrail,
    PeakTrail,
    OscillatorReversal,
}

impl ExitReason {
    /// Single-letter code used in trade logs.
    pub fn code(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "S",
            ExitReason::EarlyTrail => "E",
            ExitReason::PeakTrail => "P",
            ExitReason::OscillatorReversal => "R",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExitReason::StopLoss => "stop_loss",
            ExitReason::EarlyTrail => "early_trail",
            ExitReason::PeakTrail => "peak_trail",
            ExitReason::OscillatorReversal => "oscillator_reversal",
        };
        write!(f, "{name}")
    }
}

/// Which trailing stop is evaluated first once both are armed. The peak
/// trail sits tighter to the extreme, so `PeakFirst` (the default) lets it
/// fire ahead of the early trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailPriority {
    #[default]
    PeakFirst,
    EarlyFirst,
}

#[derive(Debug, Clone)]
pub struct Position {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub size: f64,
    pub entry_time: NaiveDateTime,
    pub params: SymbolParams,
    pub current_price: f64,
    pub highest_price: f64,
    pub lowest_price: f64,
    pub stop_loss_price: f64,
    pub early_trail_active: bool,
    pub early_trail_price: Option<f64>,
    pub peak_trail_active: bool,
    pub peak_trail_price: Option<f64>,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
}

impl Position {
    pub fn open(
        symbol: &str,
        direction: Direction,
        entry_price: f64,
        size: f64,
        entry_time: NaiveDateTime,
        params: SymbolParams,
    ) -> Self {
        let stop_loss_price = match direction {
            Direction::Buy => entry_price * (1.0 - params.stop_loss_pct / 100.0),
            Direction::Sell => entry_price * (1.0 + params.stop_loss_pct / 100.0),
        };
        Position {
            symbol: symbol.to_string(),
            direction,
            entry_price,
            size,
            entry_time,
            params,
            current_price: entry_price,
            highest_price: entry_price,
            lowest_price: entry_price,
            stop_loss_price,
            early_trail_active: false,
            early_trail_price: None,
            peak_trail_active: false,
            peak_trail_price: None,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
        }
    }

    /// The extreme the trails are measured from: highest price since entry
    /// for a long, lowest for a short.
    pub fn favorable_extreme(&self) -> f64 {
        match self.direction {
            Direction::Buy => self.highest_price,
            Direction::Sell => self.lowest_price,
        }
    }

    /// Apply a new price: update extremes and unrealized PnL, arm and
    /// tighten the trails, then evaluate price-based exits in priority
    /// order. Returns the first exit that triggers.
    pub fn update_price(&mut self, price: f64, priority: TrailPriority) -> Option<ExitReason> {
        self.current_price = price;
        if price > self.highest_price {
            self.highest_price = price;
        }
        if price < self.lowest_price {
            self.lowest_price = price;
        }

        let signed_move = match self.direction {
            Direction::Buy => price - self.entry_price,
            Direction::Sell => self.entry_price - price,
        };
        self.unrealized_pnl = signed_move * self.size;
        self.unrealized_pnl_pct = signed_move / self.entry_price * 100.0;

        self.refresh_trails();

        if self.stop_loss_hit() {
            return Some(ExitReason::StopLoss);
        }
        let (first, second, first_reason, second_reason) = match priority {
            TrailPriority::PeakFirst => (
                self.peak_trail_hit(),
                self.early_trail_hit(),
                ExitReason::PeakTrail,
                ExitReason::EarlyTrail,
            ),
            TrailPriority::EarlyFirst => (
                self.early_trail_hit(),
                self.peak_trail_hit(),
                ExitReason::EarlyTrail,
                ExitReason::PeakTrail,
            ),
        };
        if first {
            return Some(first_reason);
        }
        if second {
            return Some(second_reason);
        }
        None
    }

    /// Oscillator-reversal exit: only with the feature enabled, at least
    /// the minimum profit locked in, and the oscillator back past the
    /// opposite threshold.
    pub fn oscillator_exit(&self, osc: f64) -> bool {
        if !self.params.use_osc_exit {
            return false;
        }
        if self.unrealized_pnl_pct < self.params.osc_exit_min_profit {
            return false;
        }
        match self.direction {
            Direction::Buy => osc >= self.params.overbought,
            Direction::Sell => osc <= self.params.oversold,
        }
    }

    fn refresh_trails(&mut self) {
        if !self.early_trail_active && self.unrealized_pnl_pct >= self.params.early_trail_start {
            self.early_trail_active = true;
            log::info!(
                "early trail armed for {} at {:.2}% profit",
                self.symbol,
                self.unrealized_pnl_pct
            );
        }
        if !self.peak_trail_active && self.unrealized_pnl_pct >= self.params.peak_trail_start {
            self.peak_trail_active = true;
            log::info!(
                "peak trail armed for {} at {:.2}% profit",
                self.symbol,
                self.unrealized_pnl_pct
            );
        }

        let extreme = self.favorable_extreme();
        if self.early_trail_active {
            self.early_trail_price = Some(match self.direction {
                Direction::Buy => extreme * (1.0 - self.params.early_trail_minus / 100.0),
                Direction::Sell => extreme * (1.0 + self.params.early_trail_minus / 100.0),
            });
        }
        if self.peak_trail_active {
            self.peak_trail_price = Some(match self.direction {
                Direction::Buy => extreme * (1.0 - self.params.peak_trail_minus / 100.0),
                Direction::Sell => extreme * (1.0 + self.params.peak_trail_minus / 100.0),
            });
        }
    }

    fn stop_loss_hit(&self) -> bool {
        match self.direction {
            Direction::Buy => self.current_price <= self.stop_loss_price,
            Direction::Sell => self.current_price >= self.stop_loss_price,
        }
    }

    fn early_trail_hit(&self) -> bool {
        match (self.early_trail_active, self.early_trail_price) {
            (true, Some(trail)) => match self.direction {
                Direction::Buy => self.current_price <= trail,
                Direction::Sell => self.current_price >= trail,
            },
            _ => false,
        }
    }

    fn peak_trail_hit(&self) -> bool {
        match (self.peak_trail_active, self.peak_trail_price) {
            (true, Some(trail)) => match self.direction {
                Direction::Buy => self.current_price <= trail,
                Direction::Sell => self.current_price >= trail,
            },
            _ => false,
        }
    }
}

/// Immutable record of a closed position.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub size: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
    pub highest_price: f64,
    pub lowest_price: f64,
}
