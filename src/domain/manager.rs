//! Position manager: registry of open positions, exit handling, running
//! statistics.
//!
//! Single-writer discipline: one logical control thread calls
//! [`PositionManager::enter`] / [`PositionManager::update`] per tick; the
//! manager holds no locks of its own.

use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::domain::error::TrailscanError;
use crate::domain::params::SymbolParams;
use crate::domain::position::{ExitReason, Position, TradeRecord, TrailPriority};
use crate::domain::scanner::Opportunity;

#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Maximum number of concurrently open positions.
    pub max_positions: usize,
    pub trail_priority: TrailPriority,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfig {
            max_positions: 1,
            trail_priority: TrailPriority::PeakFirst,
        }
    }
}

/// Aggregate trading statistics, derived from the closed-trade history.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage of closed trades with positive PnL.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub active_positions: usize,
}

#[derive(Debug, Default)]
pub struct PositionManager {
    config: ManagerConfig,
    positions: HashMap<String, Position>,
    history: Vec<TradeRecord>,
    total_trades: usize,
    winning_trades: usize,
    total_pnl: f64,
}

impl PositionManager {
    pub fn new(config: ManagerConfig) -> Self {
        PositionManager {
            config,
            ..PositionManager::default()
        }
    }

    pub fn can_enter(&self) -> bool {
        self.positions.len() < self.config.max_positions
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn has_any_position(&self) -> bool {
        !self.positions.is_empty()
    }

    pub fn open_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn open_symbols(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    pub fn history(&self) -> &[TradeRecord] {
        &self.history
    }

    /// Open a position from a scanned opportunity. Fails if a position is
    /// already tracked for the symbol or the position limit is reached.
    pub fn enter(
        &mut self,
        opportunity: &Opportunity,
        size: f64,
        entry_time: NaiveDateTime,
        params: &SymbolParams,
    ) -> Result<(), TrailscanError> {
        if self.positions.contains_key(&opportunity.symbol) {
            return Err(TrailscanError::PositionOpen {
                symbol: opportunity.symbol.clone(),
            });
        }
        if !self.can_enter() {
            return Err(TrailscanError::PositionLimit {
                limit: self.config.max_positions,
            });
        }

        let position = Position::open(
            &opportunity.symbol,
            opportunity.direction,
            opportunity.entry_price,
            size,
            entry_time,
            params.clone(),
        );
        log::info!(
            "entered {} {} @ {:.4} x {}",
            opportunity.direction,
            opportunity.symbol,
            opportunity.entry_price,
            size
        );
        self.positions.insert(opportunity.symbol.clone(), position);
        Ok(())
    }

    /// Feed a new price to the position tracked for `symbol`. Evaluates
    /// exits in priority order (stop loss, then the trails per the
    /// configured priority, then the oscillator reversal when an oscillator
    /// value is supplied). On exit the position is removed, statistics are
    /// updated, and the trade record is returned. Returns `None` when the
    /// symbol is flat or no exit triggered.
    pub fn update(
        &mut self,
        symbol: &str,
        price: f64,
        oscillator: Option<f64>,
        time: NaiveDateTime,
    ) -> Option<TradeRecord> {
        let position = self.positions.get_mut(symbol)?;

        let mut exit = position.update_price(price, self.config.trail_priority);
        if exit.is_none() {
            if let Some(osc) = oscillator {
                if position.oscillator_exit(osc) {
                    exit = Some(ExitReason::OscillatorReversal);
                }
            }
        }

        let reason = exit?;
        let position = self.positions.remove(symbol)?;

        let record = TradeRecord {
            symbol: position.symbol.clone(),
            direction: position.direction,
            entry_price: position.entry_price,
            exit_price: price,
            entry_time: position.entry_time,
            exit_time: time,
            size: position.size,
            pnl: position.unrealized_pnl,
            pnl_pct: position.unrealized_pnl_pct,
            exit_reason: reason,
            highest_price: position.highest_price,
            lowest_price: position.lowest_price,
        };

        self.total_trades += 1;
        self.total_pnl += record.pnl;
        if record.pnl > 0.0 {
            self.winning_trades += 1;
        }

        log::info!(
            "exited {} {} @ {:.4} | pnl {:.2} ({:.2}%) | exit {}",
            record.direction,
            record.symbol,
            record.exit_price,
            record.pnl,
            record.pnl_pct,
            record.exit_reason.code()
        );

        self.history.push(record.clone());
        Some(record)
    }

    /// Pure read; repeated calls without intervening mutation return
    /// identical values.
    pub fn statistics(&self) -> Statistics {
        let win_rate = if self.total_trades > 0 {
            self.winning_trades as f64 / self.total_trades as f64 * 100.0
        } else {
            0.0
        };
        let avg_pnl = if self.total_trades > 0 {
            self.total_pnl / self.total_trades as f64
        } else {
            0.0
        };
        Statistics {
            total_trades: self.total_trades,
            winning_trades: self.winning_trades,
            losing_trades: self.total_trades - self.winning_trades,
            win_rate,
            total_pnl: self.total_pnl,
            avg_pnl,
            active_positions: self.positions.len(),
        }
    }
}
