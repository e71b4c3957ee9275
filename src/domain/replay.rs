//! Replay driver: feeds historical bars through the scanner and position
//! manager in lockstep.
//!
//! The reference consumer of the core. Indicators are computed once per
//! symbol over the full series (every transform is causal, so the snapshot
//! at index t only sees bars 0..=t), then each tick first updates any open
//! positions and then, if capacity remains, scans the tick's snapshots for
//! the best new entry.

use std::collections::BTreeMap;

use crate::domain::bar::Bar;
use crate::domain::error::TrailscanError;
use crate::domain::indicator::{compute_all, Snapshot};
use crate::domain::manager::{ManagerConfig, PositionManager, Statistics};
use crate::domain::params::ParameterStore;
use crate::domain::position::{Direction, TradeRecord};
use crate::domain::scanner::{entry_conditions, score, Opportunity, MIN_SCAN_BARS};

#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub trades: Vec<TradeRecord>,
    pub stats: Statistics,
}

/// Replay the given per-symbol bar series from start to finish. Symbols
/// with fewer than [`MIN_SCAN_BARS`] bars are skipped with a warning;
/// structurally invalid series fail the whole replay.
pub fn replay(
    market_data: &BTreeMap<String, Vec<Bar>>,
    params: &ParameterStore,
    config: ManagerConfig,
) -> Result<ReplayResult, TrailscanError> {
    let mut series: BTreeMap<&str, (&[Bar], Vec<Snapshot>)> = BTreeMap::new();
    for (symbol, bars) in market_data {
        if bars.len() < MIN_SCAN_BARS {
            log::warn!(
                "skipping {symbol}: only {} bars, minimum {} required",
                bars.len(),
                MIN_SCAN_BARS
            );
            continue;
        }
        let snapshots = compute_all(symbol, bars, params.resolve(symbol))?;
        series.insert(symbol, (bars.as_slice(), snapshots));
    }

    if series.is_empty() {
        return Err(TrailscanError::InsufficientData {
            symbol: "all".to_string(),
            bars: 0,
            minimum: MIN_SCAN_BARS,
        });
    }

    let ticks = series
        .values()
        .map(|(bars, _)| bars.len())
        .max()
        .unwrap_or(0);

    let mut manager = PositionManager::new(config);
    for t in 0..ticks {
        // Exits first: walk open positions against this tick's bar.
        for symbol in manager.open_symbols() {
            let Some((bars, snapshots)) = series.get(symbol.as_str()) else {
                continue;
            };
            let Some(bar) = bars.get(t) else { continue };
            let snap = &snapshots[t];
            let oscillator = snap.valid.then_some(snap.range_osc);
            manager.update(&symbol, bar.close, oscillator, bar.timestamp);
        }

        if !manager.can_enter() {
            continue;
        }

        // Entry: best qualifying symbol on this tick's snapshots.
        let mut best: Option<Opportunity> = None;
        for (symbol, (_, snapshots)) in &series {
            if t + 1 < MIN_SCAN_BARS || manager.has_position(symbol) {
                continue;
            }
            let Some(snap) = snapshots.get(t) else { continue };
            if !snap.valid {
                continue;
            }
            let symbol_params = params.resolve(symbol);
            for direction in [Direction::Buy, Direction::Sell] {
                let conditions = entry_conditions(snap, symbol_params, direction);
                if !conditions.all() {
                    continue;
                }
                let candidate = Opportunity {
                    symbol: symbol.to_string(),
                    direction,
                    entry_price: snap.close,
                    score: score(snap, symbol_params, direction),
                    snapshot: snap.clone(),
                    conditions,
                };
                let better = match &best {
                    Some(current) => candidate.score > current.score,
                    None => true,
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        if let Some(opportunity) = best {
            let symbol_params = params.resolve(&opportunity.symbol);
            manager.enter(
                &opportunity,
                symbol_params.position_size,
                opportunity.snapshot.timestamp,
                symbol_params,
            )?;
        }
    }

    Ok(ReplayResult {
        trades: manager.history().to_vec(),
        stats: manager.statistics(),
    })
}
