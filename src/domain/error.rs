//! Domain error types.

/// Top-level error type for zenith.
#[derive(Debug, thiserror::Error)]
pub enum ZenithError {
    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient history for {symbol}: have {points} points, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        points: usize,
        minimum: usize,
    },

    #[error("invalid price {price}: valuation undefined for non-positive prices")]
    InvalidPrice { price: f64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("session store error: {reason}")]
    SessionStore { reason: String },

    #[error("trade log error: {reason}")]
    TradeLog { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ZenithError> for std::process::ExitCode {
    fn from(err: &ZenithError) -> Self {
        let code: u8 = match err {
            ZenithError::Io(_) => 1,
            ZenithError::ConfigParse { .. } | ZenithError::ConfigInvalid { .. } => 2,
            ZenithError::DataSource { .. }
            | ZenithError::SessionStore { .. }
            | ZenithError::TradeLog { .. } => 3,
            ZenithError::InvalidPrice { .. } => 4,
            ZenithError::NoData { .. } | ZenithError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
