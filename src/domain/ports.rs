use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, Instrument, Resolution};
use async_trait::async_trait;
use std::collections::HashMap;

/// Read-only view of the venue's public market data
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Full instrument catalog, in venue order
    async fn get_products(&self) -> Result<Vec<Instrument>, MarketDataError>;

    /// 24h volume keyed by symbol. Symbols without a reported volume are absent.
    async fn get_volumes(&self) -> Result<HashMap<String, f64>, MarketDataError>;

    /// Raw candles for `[start, end]` (unix seconds), in whatever order the venue returns them
    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        start: i64,
        end: i64,
    ) -> Result<Vec<Candle>, MarketDataError>;
}
