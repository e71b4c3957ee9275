//! CSV trade-log adapter.

use std::path::Path;

use crate::domain::error::TrailscanError;
use crate::domain::position::TradeRecord;
use crate::ports::trade_log_port::TradeLogPort;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvTradeLogAdapter;

impl TradeLogPort for CsvTradeLogAdapter {
    fn write(&self, trades: &[TradeRecord], output_path: &Path) -> Result<(), TrailscanError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| TrailscanError::Data {
            reason: format!("failed to open {}: {}", output_path.display(), e),
        })?;

        wtr.write_record([
            "symbol",
            "direction",
            "entry_time",
            "exit_time",
            "entry_price",
            "exit_price",
            "size",
            "pnl",
            "pnl_pct",
            "exit_code",
            "highest_price",
            "lowest_price",
        ])
        .map_err(write_error)?;

        for trade in trades {
            wtr.write_record([
                trade.symbol.as_str(),
                &trade.direction.to_string(),
                &trade.entry_time.format(TIME_FORMAT).to_string(),
                &trade.exit_time.format(TIME_FORMAT).to_string(),
                &format!("{:.8}", trade.entry_price),
                &format!("{:.8}", trade.exit_price),
                &format!("{:.8}", trade.size),
                &format!("{:.8}", trade.pnl),
                &format!("{:.4}", trade.pnl_pct),
                trade.exit_reason.code(),
                &format!("{:.8}", trade.highest_price),
                &format!("{:.8}", trade.lowest_price),
            ])
            .map_err(write_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn write_error(e: csv::Error) -> TrailscanError {
    TrailscanError::Data {
        reason: format!("trade log write error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{Direction, ExitReason};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_trade() -> TradeRecord {
        let entry = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TradeRecord {
            symbol: "BTC/USD".into(),
            direction: Direction::Buy,
            entry_price: 100.0,
            exit_price: 109.4,
            entry_time: entry,
            exit_time: entry + chrono::Duration::minutes(30),
            size: 1.0,
            pnl: 9.4,
            pnl_pct: 9.4,
            exit_reason: ExitReason::PeakTrail,
            highest_price: 110.0,
            lowest_price: 100.0,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvTradeLogAdapter.write(&[sample_trade()], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("symbol,direction,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("BTC/USD,BUY,2024-01-15 10:00:00,2024-01-15 10:30:00"));
        assert!(row.contains(",P,"));
    }

    #[test]
    fn empty_history_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvTradeLogAdapter.write(&[], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
