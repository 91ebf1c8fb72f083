//! Scanner configuration parsing from environment variables.
//!
//! Covers universe sizing, history depth, pacing, retention and the
//! indicator's volume window policy.

use crate::domain::market::Resolution;
use crate::domain::scan::{IndicatorParams, RetainMode, VolumeWindow};
use crate::infrastructure::cached_market_data::DEFAULT_CACHE_TTL;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Scanner environment configuration
#[derive(Debug, Clone)]
pub struct ScannerEnvConfig {
    pub resolution: Resolution,
    pub top_n: usize,
    pub history_candles: usize,
    pub lookback_multiplier: u32,
    pub request_delay: Duration,
    pub min_candles: usize,
    pub retain_mode: RetainMode,
    pub settlement_asset: String,
    pub volume_window: VolumeWindow,
    pub refresh_interval: Duration,
    /// Zero disables the response cache
    pub cache_ttl: Duration,
}

impl ScannerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let resolution = Resolution::from_str(
            &env::var("SCAN_RESOLUTION").unwrap_or_else(|_| "1h".to_string()),
        )
        .context("Failed to parse SCAN_RESOLUTION")?;

        let retain_mode = RetainMode::from_str(
            &env::var("SCAN_RETAIN_MODE").unwrap_or_else(|_| "signals".to_string()),
        )
        .context("Failed to parse SCAN_RETAIN_MODE")?;

        let volume_window = VolumeWindow::from_str(
            &env::var("SCAN_VOLUME_WINDOW").unwrap_or_else(|_| "inclusive".to_string()),
        )
        .context("Failed to parse SCAN_VOLUME_WINDOW")?;

        Ok(Self {
            resolution,
            top_n: Self::parse_usize("SCAN_TOP_N", 20)?,
            history_candles: Self::parse_usize("SCAN_HISTORY_CANDLES", 50)?,
            lookback_multiplier: env::var("SCAN_LOOKBACK_MULTIPLIER")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<u32>()
                .context("Failed to parse SCAN_LOOKBACK_MULTIPLIER")?,
            request_delay: Duration::from_millis(Self::parse_u64("SCAN_REQUEST_DELAY_MS", 100)?),
            min_candles: Self::parse_usize("SCAN_MIN_CANDLES", IndicatorParams::DEFAULT_MIN_CANDLES)?,
            retain_mode,
            settlement_asset: env::var("SCAN_SETTLEMENT_ASSET")
                .unwrap_or_else(|_| "USDT".to_string()),
            volume_window,
            refresh_interval: Duration::from_secs(Self::parse_u64(
                "SCAN_REFRESH_INTERVAL_SECS",
                300,
            )?),
            cache_ttl: Duration::from_secs(Self::parse_u64(
                "SCAN_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL.as_secs(),
            )?),
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_u64(key: &str, default: u64) -> Result<u64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))
    }
}
