use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, Instrument, Resolution};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::TtlCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::debug;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

type CandleKey = (String, Resolution, i64, i64);

/// Caches successful venue responses for a fixed TTL.
///
/// Keys are the request parameters. Failures are never cached, so the next
/// call after an error goes back to the venue.
pub struct CachedMarketDataService {
    inner: Arc<dyn MarketDataService>,
    catalog: TtlCache<(), Vec<Instrument>>,
    volumes: TtlCache<(), HashMap<String, f64>>,
    candles: TtlCache<CandleKey, Vec<Candle>>,
}

impl CachedMarketDataService {
    pub fn new(inner: Arc<dyn MarketDataService>, ttl: Duration) -> Self {
        Self {
            inner,
            catalog: TtlCache::new(ttl),
            volumes: TtlCache::new(ttl),
            candles: TtlCache::new(ttl),
        }
    }

    pub fn with_default_ttl(inner: Arc<dyn MarketDataService>) -> Self {
        Self::new(inner, DEFAULT_CACHE_TTL)
    }
}

#[async_trait]
impl MarketDataService for CachedMarketDataService {
    async fn get_products(&self) -> Result<Vec<Instrument>, MarketDataError> {
        if let Some(products) = self.catalog.get(&()) {
            debug!("CachedMarketDataService: Catalog cache hit");
            return Ok(products);
        }

        let products = self.inner.get_products().await?;
        self.catalog.insert((), products.clone());
        Ok(products)
    }

    async fn get_volumes(&self) -> Result<HashMap<String, f64>, MarketDataError> {
        if let Some(volumes) = self.volumes.get(&()) {
            debug!("CachedMarketDataService: Volume cache hit");
            return Ok(volumes);
        }

        let volumes = self.inner.get_volumes().await?;
        self.volumes.insert((), volumes.clone());
        Ok(volumes)
    }

    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        start: i64,
        end: i64,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let key = (symbol.to_string(), resolution, start, end);
        if let Some(candles) = self.candles.get(&key) {
            debug!("CachedMarketDataService: Candle cache hit for {}", symbol);
            return Ok(candles);
        }

        // Catalog and volume entries are overwritten in place; candle windows roll over
        let purged = self.candles.purge_expired();
        if purged > 0 {
            debug!("CachedMarketDataService: Purged {} expired candle windows", purged);
        }

        let candles = self
            .inner
            .get_candles(symbol, resolution, start, end)
            .await?;
        self.candles.insert(key, candles.clone());
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::MockMarketDataService;

    fn venue() -> Arc<MockMarketDataService> {
        Arc::new(
            MockMarketDataService::new()
                .with_instrument(Instrument::live_perpetual("BTCUSDT", "USDT"), 1_000.0)
                .with_candles("BTCUSDT", vec![Candle::new(0, 1.0, 1.0, 1.0, 1.0, 1.0)]),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_cached_until_expiry() {
        let inner = venue();
        let cached = CachedMarketDataService::new(inner.clone(), Duration::from_secs(300));

        cached.get_products().await.unwrap();
        cached.get_products().await.unwrap();
        assert_eq!(inner.catalog_calls(), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        cached.get_products().await.unwrap();
        assert_eq!(inner.catalog_calls(), 2);
    }

    #[tokio::test]
    async fn test_candles_keyed_by_request() {
        let inner = venue();
        let cached = CachedMarketDataService::with_default_ttl(inner.clone());

        cached
            .get_candles("BTCUSDT", Resolution::OneHour, 0, 100)
            .await
            .unwrap();
        cached
            .get_candles("BTCUSDT", Resolution::OneHour, 0, 100)
            .await
            .unwrap();
        cached
            .get_candles("BTCUSDT", Resolution::FourHour, 0, 100)
            .await
            .unwrap();

        assert_eq!(inner.candle_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_candle_windows_purged_on_miss() {
        let inner = venue();
        let cached = CachedMarketDataService::new(inner.clone(), Duration::from_secs(60));

        for bar in 0..5 {
            let end = bar * 3600;
            cached
                .get_candles("BTCUSDT", Resolution::OneHour, end - 7200, end)
                .await
                .unwrap();
            tokio::time::advance(Duration::from_secs(61)).await;
        }

        // Only the window fetched last is still held
        assert_eq!(cached.candles.len(), 1);
        assert_eq!(inner.candle_requests().len(), 5);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner = Arc::new(MockMarketDataService::new().fail_catalog());
        let cached = CachedMarketDataService::with_default_ttl(inner.clone());

        assert!(cached.get_products().await.is_err());
        assert!(cached.get_products().await.is_err());
        assert_eq!(inner.catalog_calls(), 2);
    }
}
