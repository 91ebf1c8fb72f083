use thiserror::Error;

/// Errors raised while talking to the venue or decoding its payloads
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint} reported success=false")]
    Rejected { endpoint: String },

    #[error("Failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Invalid market data for {symbol}: {reason}")]
    InvalidData { symbol: String, reason: String },
}

/// Errors raised while normalizing raw candles into a series
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("Candle at {timestamp} has a non-finite {field}")]
    NonFinite { timestamp: i64, field: &'static str },

    #[error("Candle at {timestamp} has a negative {field}: {value}")]
    Negative {
        timestamp: i64,
        field: &'static str,
        value: f64,
    },
}

/// Invalid scanner configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Universe size must be between 1 and {max}, got {value}")]
    TopNOutOfRange { value: usize, max: usize },

    #[error("Minimum candle count must be at least {floor}, got {value}")]
    MinCandlesTooLow { value: usize, floor: usize },

    #[error("Lookback multiplier must be at least 1, got {0}")]
    LookbackMultiplier(u32),

    #[error("History length ({history}) must cover the minimum candle count ({min_candles})")]
    HistoryTooShort { history: usize, min_candles: usize },

    #[error("Settlement asset must not be empty")]
    EmptySettlementAsset,
}
