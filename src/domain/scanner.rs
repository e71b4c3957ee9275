//! Opportunity scanner: per-symbol condition evaluation and cross-symbol
//! scoring/selection.

use std::collections::{BTreeMap, HashMap};

use crate::domain::bar::Bar;
use crate::domain::error::TrailscanError;
use crate::domain::indicator::{compute_all, Snapshot};
use crate::domain::params::{ParameterStore, SymbolParams};
use crate::domain::position::Direction;

/// Minimum bars a symbol must have before it is scanned.
pub const MIN_SCAN_BARS: usize = 50;

/// One of the four confirmations an entry needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Oscillator,
    TrendCross,
    Volume,
    Volatility,
}

/// Which of the four entry conditions a snapshot satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryConditions {
    pub oscillator: bool,
    pub trend_cross: bool,
    pub volume: bool,
    pub volatility: bool,
}

impl EntryConditions {
    pub fn all(&self) -> bool {
        self.oscillator && self.trend_cross && self.volume && self.volatility
    }

    pub fn missing(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        if !self.oscillator {
            out.push(Condition::Oscillator);
        }
        if !self.trend_cross {
            out.push(Condition::TrendCross);
        }
        if !self.volume {
            out.push(Condition::Volume);
        }
        if !self.volatility {
            out.push(Condition::Volatility);
        }
        out
    }
}

/// A scored, directional trade candidate. Produced by one scan cycle and
/// consumed immediately or discarded.
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub score: f64,
    pub snapshot: Snapshot,
    pub conditions: EntryConditions,
}

/// Evaluate the four entry confirmations for one direction. All four must
/// hold simultaneously for an entry; the oscillator test makes BUY and SELL
/// mutually exclusive.
pub fn entry_conditions(
    snap: &Snapshot,
    params: &SymbolParams,
    direction: Direction,
) -> EntryConditions {
    let (oscillator, trend_cross) = match direction {
        Direction::Buy => (snap.range_osc <= params.oversold, snap.bullish_cross),
        Direction::Sell => (snap.range_osc >= params.overbought, snap.bearish_cross),
    };
    EntryConditions {
        oscillator,
        trend_cross,
        volume: snap.volume_ratio >= params.volume_threshold,
        volatility: snap.volatility_expanding,
    }
}

/// Desirability score for a qualifying snapshot, clamped to [0, 100]:
/// up to 40 points for oscillator depth past its threshold, a flat 30 for a
/// cross on this bar, up to 20 for volume above its average, up to 10 for
/// volatility above its average.
pub fn score(snap: &Snapshot, params: &SymbolParams, direction: Direction) -> f64 {
    let mut total = 0.0;

    match direction {
        Direction::Buy => {
            if snap.range_osc <= params.oversold && params.oversold > 0.0 {
                total += (params.oversold - snap.range_osc) / params.oversold * 40.0;
            }
            if snap.bullish_cross {
                total += 30.0;
            }
        }
        Direction::Sell => {
            if snap.range_osc >= params.overbought && params.overbought < 100.0 {
                total += (snap.range_osc - params.overbought) / (100.0 - params.overbought) * 40.0;
            }
            if snap.bearish_cross {
                total += 30.0;
            }
        }
    }

    if snap.volume_ratio >= params.volume_threshold {
        total += ((snap.volume_ratio - 1.0) * 10.0).min(20.0);
    }
    if snap.atr_ratio >= params.atr_threshold {
        total += ((snap.atr_ratio - 1.0) * 10.0).min(10.0);
    }

    total.clamp(0.0, 100.0)
}

/// Per-symbol diagnostics for monitoring surfaces. Read-only; never feeds
/// the trading decision.
#[derive(Debug, Clone)]
pub enum SymbolDiagnostics {
    Ready {
        price: f64,
        oscillator: f64,
        volume_ratio: f64,
        atr_ratio: f64,
        buy_ready: bool,
        sell_ready: bool,
        missing_buy: Vec<Condition>,
        missing_sell: Vec<Condition>,
    },
    InsufficientData {
        bars: usize,
    },
    Failed {
        reason: String,
    },
}

pub struct Scanner<'a> {
    params: &'a ParameterStore,
}

impl<'a> Scanner<'a> {
    pub fn new(params: &'a ParameterStore) -> Self {
        Scanner { params }
    }

    /// Scan one symbol. Returns an opportunity when one direction has all
    /// four confirmations on the latest bar, `None` when the symbol has
    /// fewer than [`MIN_SCAN_BARS`] bars or its latest snapshot is still in
    /// warm-up.
    pub fn scan_symbol(
        &self,
        symbol: &str,
        bars: &[Bar],
    ) -> Result<Option<Opportunity>, TrailscanError> {
        if bars.len() < MIN_SCAN_BARS {
            log::debug!("{symbol}: {} bars, below scan minimum", bars.len());
            return Ok(None);
        }

        let params = self.params.resolve(symbol);
        let snapshots = compute_all(symbol, bars, params)?;
        let Some(latest) = snapshots.last() else {
            return Ok(None);
        };
        if !latest.valid {
            log::debug!("{symbol}: latest snapshot still in warm-up");
            return Ok(None);
        }

        for direction in [Direction::Buy, Direction::Sell] {
            let conditions = entry_conditions(latest, params, direction);
            if conditions.all() {
                return Ok(Some(Opportunity {
                    symbol: symbol.to_string(),
                    direction,
                    entry_price: latest.close,
                    score: score(latest, params, direction),
                    snapshot: latest.clone(),
                    conditions,
                }));
            }
        }
        Ok(None)
    }

    /// Scan every symbol and return the highest-scoring opportunity. A
    /// failure in one symbol is logged and skipped so it cannot abort the
    /// rest of the scan. Symbols are visited in sorted order and ties go to
    /// the lexicographically smaller symbol, so the result is deterministic.
    pub fn scan_universe(&self, market_data: &HashMap<String, Vec<Bar>>) -> Option<Opportunity> {
        let mut symbols: Vec<&String> = market_data.keys().collect();
        symbols.sort();

        let mut best: Option<Opportunity> = None;
        for symbol in symbols {
            let opportunity = match self.scan_symbol(symbol, &market_data[symbol]) {
                Ok(Some(opp)) => opp,
                Ok(None) => continue,
                Err(e) => {
                    log::error!("error scanning {symbol}: {e}");
                    continue;
                }
            };
            log::debug!(
                "opportunity: {} {} (score {:.1})",
                opportunity.symbol,
                opportunity.direction,
                opportunity.score
            );
            let better = match &best {
                Some(current) => opportunity.score > current.score,
                None => true,
            };
            if better {
                best = Some(opportunity);
            }
        }

        if let Some(opp) = &best {
            log::info!(
                "best opportunity: {} {} (score {:.1})",
                opp.symbol,
                opp.direction,
                opp.score
            );
        }
        best
    }

    /// Non-blocking condition report for every symbol, keyed in sorted
    /// order.
    pub fn signal_diagnostics(
        &self,
        market_data: &HashMap<String, Vec<Bar>>,
    ) -> BTreeMap<String, SymbolDiagnostics> {
        let mut report = BTreeMap::new();
        for (symbol, bars) in market_data {
            report.insert(symbol.clone(), self.diagnose(symbol, bars));
        }
        report
    }

    fn diagnose(&self, symbol: &str, bars: &[Bar]) -> SymbolDiagnostics {
        if bars.len() < MIN_SCAN_BARS {
            return SymbolDiagnostics::InsufficientData { bars: bars.len() };
        }
        let params = self.params.resolve(symbol);
        let snapshots = match compute_all(symbol, bars, params) {
            Ok(s) => s,
            Err(e) => {
                return SymbolDiagnostics::Failed {
                    reason: e.to_string(),
                }
            }
        };
        let Some(latest) = snapshots.last() else {
            return SymbolDiagnostics::InsufficientData { bars: 0 };
        };
        if !latest.valid {
            return SymbolDiagnostics::InsufficientData { bars: bars.len() };
        }

        let buy = entry_conditions(latest, params, Direction::Buy);
        let sell = entry_conditions(latest, params, Direction::Sell);
        SymbolDiagnostics::Ready {
            price: latest.close,
            oscillator: latest.range_osc,
            volume_ratio: latest.volume_ratio,
            atr_ratio: latest.atr_ratio,
            buy_ready: buy.all(),
            sell_ready: sell.all(),
            missing_buy: buy.missing(),
            missing_sell: sell.missing(),
        }
    }
}
