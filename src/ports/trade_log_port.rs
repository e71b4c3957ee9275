//! Trade-log output port trait.

use std::path::Path;

use crate::domain::error::TrailscanError;
use crate::domain::position::TradeRecord;

/// Port for persisting the closed-trade history.
pub trait TradeLogPort {
    fn write(&self, trades: &[TradeRecord], output_path: &Path) -> Result<(), TrailscanError>;
}
