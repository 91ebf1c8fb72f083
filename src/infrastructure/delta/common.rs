//! Wire types for the Delta Exchange public REST API

use crate::domain::market::{Candle, ContractType, Instrument, InstrumentState};
use serde::{Deserialize, Deserializer};

pub const DEFAULT_BASE_URL: &str = "https://api.delta.exchange";

pub const PRODUCTS_PATH: &str = "/v2/products";
pub const TICKERS_PATH: &str = "/v2/tickers";
pub const CANDLES_PATH: &str = "/v2/history/candles";

/// Envelope shared by every Delta endpoint
#[derive(Debug, Deserialize)]
pub struct DeltaResponse<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub result: Option<T>,
}

fn default_success() -> bool {
    true
}

/// Delta encodes most numerics as strings, some as JSON numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64(self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrString::deserialize(deserializer)?
        .into_f64()
        .ok_or_else(|| serde::de::Error::custom("expected a numeric value"))
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrString>::deserialize(deserializer)?.and_then(NumberOrString::into_f64))
}

#[derive(Debug, Deserialize)]
pub struct RawAsset {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct RawProduct {
    pub symbol: String,
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub state: String,
    pub quoting_asset: Option<RawAsset>,
}

impl From<RawProduct> for Instrument {
    fn from(raw: RawProduct) -> Self {
        Instrument::new(
            raw.symbol,
            ContractType::from_venue(&raw.contract_type),
            InstrumentState::from_venue(&raw.state),
            raw.quoting_asset.map(|a| a.symbol).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct RawTicker {
    pub symbol: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawCandle {
    pub time: i64,
    #[serde(deserialize_with = "de_f64")]
    pub open: f64,
    #[serde(deserialize_with = "de_f64")]
    pub high: f64,
    #[serde(deserialize_with = "de_f64")]
    pub low: f64,
    #[serde(deserialize_with = "de_f64")]
    pub close: f64,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub volume: Option<f64>,
}

impl From<RawCandle> for Candle {
    fn from(raw: RawCandle) -> Self {
        Candle::new(
            raw.time,
            raw.open,
            raw.high,
            raw.low,
            raw.close,
            raw.volume.unwrap_or(0.0),
        )
    }
}
