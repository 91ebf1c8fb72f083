//! Delta Exchange Market Data Service
//!
//! Read-only access to the public REST endpoints:
//! - Product catalog
//! - 24h ticker volumes
//! - Historical candles

use super::common::{
    CANDLES_PATH, DEFAULT_BASE_URL, DeltaResponse, PRODUCTS_PATH, RawCandle, RawProduct,
    RawTicker, TICKERS_PATH,
};
use crate::domain::errors::MarketDataError;
use crate::domain::market::{Candle, Instrument, Resolution};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::core::HttpClientFactory;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DeltaMarketDataService {
    client: Client,
    base_url: String,
}

impl DeltaMarketDataService {
    pub fn builder() -> DeltaMarketDataServiceBuilder {
        DeltaMarketDataServiceBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path`, check the status and decode the envelope.
    ///
    /// Returns the `result` field, which the venue omits for empty answers.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| MarketDataError::Http {
                endpoint: path.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| MarketDataError::Http {
            endpoint: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(MarketDataError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let envelope: DeltaResponse<T> =
            serde_json::from_str(&body).map_err(|e| MarketDataError::Decode {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        if !envelope.success {
            return Err(MarketDataError::Rejected {
                endpoint: path.to_string(),
            });
        }

        Ok(envelope.result)
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> Result<T, MarketDataError> {
        self.get_json(path, &[])
            .await?
            .ok_or_else(|| MarketDataError::Decode {
                endpoint: path.to_string(),
                reason: "missing result field".to_string(),
            })
    }
}

#[derive(Default)]
pub struct DeltaMarketDataServiceBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
}

impl DeltaMarketDataServiceBuilder {
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> DeltaMarketDataService {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client = HttpClientFactory::create_client(
            self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        );

        info!("DeltaMarketDataService: Using {}", base_url);

        DeltaMarketDataService { client, base_url }
    }
}

#[async_trait]
impl MarketDataService for DeltaMarketDataService {
    async fn get_products(&self) -> Result<Vec<Instrument>, MarketDataError> {
        let products: Vec<RawProduct> = self.get_required(PRODUCTS_PATH).await?;
        debug!(
            "DeltaMarketDataService: Catalog returned {} products",
            products.len()
        );
        Ok(products.into_iter().map(Instrument::from).collect())
    }

    async fn get_volumes(&self) -> Result<HashMap<String, f64>, MarketDataError> {
        let tickers: Vec<RawTicker> = self.get_required(TICKERS_PATH).await?;

        let volumes: HashMap<String, f64> = tickers
            .into_iter()
            .filter_map(|t| t.volume.map(|v| (t.symbol, v)))
            .collect();

        debug!(
            "DeltaMarketDataService: Volumes for {} symbols",
            volumes.len()
        );
        Ok(volumes)
    }

    async fn get_candles(
        &self,
        symbol: &str,
        resolution: Resolution,
        start: i64,
        end: i64,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("resolution", resolution.to_delta_string().to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ];

        let raw: Vec<RawCandle> = self
            .get_json(CANDLES_PATH, &query)
            .await?
            .unwrap_or_default();
        if raw.is_empty() {
            warn!(
                "DeltaMarketDataService: No candles for {} ({}) in [{}, {}]",
                symbol, resolution, start, end
            );
        }

        Ok(raw.into_iter().map(Candle::from).collect())
    }
}
