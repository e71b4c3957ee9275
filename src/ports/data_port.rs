//! Market-data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::TrailscanError;

pub trait MarketDataPort {
    /// Fetch the full bar series for one symbol, ordered by timestamp.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, TrailscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, TrailscanError>;
}
