//! CSV file market-data adapter.
//!
//! One file per symbol under a base directory, named after the symbol with
//! path separators replaced ("BTC/USD" → `BTC-USD.csv`). Expected columns:
//! `timestamp,open,high,low,close,volume` with a header row.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

use crate::domain::bar::Bar;
use crate::domain::error::TrailscanError;
use crate::ports::data_port::MarketDataPort;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol.replace('/', "-")))
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TrailscanError> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    // Daily bars carry a bare date.
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        .map_err(|e| TrailscanError::Data {
            reason: format!("invalid timestamp {value:?}: {e}"),
        })
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, TrailscanError> {
    record.get(index).ok_or_else(|| TrailscanError::Data {
        reason: format!("missing {name} column"),
    })
}

fn parse_f64(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TrailscanError> {
    field(record, index, name)?
        .trim()
        .parse()
        .map_err(|e| TrailscanError::Data {
            reason: format!("invalid {name} value: {e}"),
        })
}

impl MarketDataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, TrailscanError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TrailscanError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TrailscanError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let timestamp = parse_timestamp(field(&record, 0, "timestamp")?.trim())?;
            bars.push(Bar {
                timestamp,
                open: parse_f64(&record, 1, "open")?,
                high: parse_f64(&record, 2, "high")?,
                low: parse_f64(&record, 3, "low")?,
                close: parse_f64(&record, 4, "close")?,
                volume: parse_f64(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TrailscanError> {
        let mut symbols = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        write!(file, "{}", content).unwrap();
    }

    const SAMPLE: &str = "\
timestamp,open,high,low,close,volume
2024-01-15 10:00:00,100.0,101.0,99.0,100.5,1500
2024-01-15 10:01:00,100.5,102.0,100.0,101.5,1800
";

    #[test]
    fn fetch_parses_bars() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BTC-USD.csv", SAMPLE);

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_bars("BTC/USD").unwrap();
        assert_eq!(bars.len(), 2);
        assert!((bars[0].close - 100.5).abs() < f64::EPSILON);
        assert!((bars[1].volume - 1800.0).abs() < f64::EPSILON);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn fetch_sorts_out_of_order_rows() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "ETH-USD.csv",
            "timestamp,open,high,low,close,volume\n\
             2024-01-15 10:05:00,1.0,2.0,0.5,1.5,100\n\
             2024-01-15 10:01:00,1.0,2.0,0.5,1.2,100\n",
        );

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_bars("ETH/USD").unwrap();
        assert!((bars[0].close - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn fetch_accepts_daily_dates() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "SPY.csv",
            "timestamp,open,high,low,close,volume\n2024-01-15,470,472,469,471,5000\n",
        );

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_bars("SPY").unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn fetch_missing_file_is_data_error() {
        let dir = TempDir::new().unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_bars("NOPE").unwrap_err();
        assert!(matches!(err, TrailscanError::Data { .. }));
    }

    #[test]
    fn fetch_bad_number_is_data_error() {
        let dir = TempDir::new().unwrap();
        write_csv(
            &dir,
            "BAD.csv",
            "timestamp,open,high,low,close,volume\n2024-01-15 10:00:00,x,101,99,100,1500\n",
        );
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter.fetch_bars("BAD").is_err());
    }

    #[test]
    fn list_symbols_finds_csv_stems() {
        let dir = TempDir::new().unwrap();
        write_csv(&dir, "BTC-USD.csv", SAMPLE);
        write_csv(&dir, "ETH-USD.csv", SAMPLE);
        write_csv(&dir, "notes.txt", "not data");

        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert_eq!(adapter.list_symbols().unwrap(), vec!["BTC-USD", "ETH-USD"]);
    }
}
