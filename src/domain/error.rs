//! Domain error types.

/// Top-level error type for trailscan.
#[derive(Debug, thiserror::Error)]
pub enum TrailscanError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("invalid bar series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("position already open for {symbol}")]
    PositionOpen { symbol: String },

    #[error("position limit reached ({limit} open)")]
    PositionLimit { limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TrailscanError> for std::process::ExitCode {
    fn from(err: &TrailscanError) -> Self {
        let code: u8 = match err {
            TrailscanError::Io(_) => 1,
            TrailscanError::ConfigParse { .. }
            | TrailscanError::ConfigMissing { .. }
            | TrailscanError::ConfigInvalid { .. } => 2,
            TrailscanError::Data { .. } => 3,
            TrailscanError::InvalidSeries { .. }
            | TrailscanError::NoData { .. }
            | TrailscanError::InsufficientData { .. } => 4,
            TrailscanError::PositionOpen { .. } | TrailscanError::PositionLimit { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_insufficient_data() {
        let err = TrailscanError::InsufficientData {
            symbol: "BTC/USD".into(),
            bars: 30,
            minimum: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for BTC/USD: have 30 bars, need 50"
        );
    }

    #[test]
    fn display_config_missing() {
        let err = TrailscanError::ConfigMissing {
            section: "replay".into(),
            key: "data_dir".into(),
        };
        assert_eq!(err.to_string(), "missing config key [replay] data_dir");
    }

    #[test]
    fn exit_codes_distinguish_categories() {
        use std::process::ExitCode;

        let config = TrailscanError::ConfigMissing {
            section: "replay".into(),
            key: "symbols".into(),
        };
        let data = TrailscanError::NoData {
            symbol: "ETH/USD".into(),
        };
        // ExitCode has no accessor, so just confirm the conversions compile
        // and run for each category.
        let _: ExitCode = (&config).into();
        let _: ExitCode = (&data).into();
        let _: ExitCode = (&TrailscanError::PositionLimit { limit: 1 }).into();
    }
}
