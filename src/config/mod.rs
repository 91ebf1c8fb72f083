//! Configuration module for squeezescan.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Venue, Scanner, and Observability.

mod observability_config;
mod scanner_config;
mod venue_config;

pub use observability_config::{LogFormat, ObservabilityEnvConfig};
pub use scanner_config::ScannerEnvConfig;
pub use venue_config::VenueEnvConfig;

use crate::application::agents::ScanSettings;
use crate::domain::scan::IndicatorParams;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Where market data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Delta,
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "delta" => Ok(Mode::Delta),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'delta' or 'mock'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub venue: VenueEnvConfig,
    pub scanner: ScannerEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "delta".to_string());
        let mode = Mode::from_str(&mode_str)?;

        Ok(Self {
            mode,
            venue: VenueEnvConfig::from_env().context("Failed to load venue config")?,
            scanner: ScannerEnvConfig::from_env().context("Failed to load scanner config")?,
            observability: ObservabilityEnvConfig::from_env()
                .context("Failed to load observability config")?,
        })
    }

    /// Build validated scan settings from this Config
    pub fn to_scan_settings(&self) -> Result<ScanSettings> {
        let scanner = &self.scanner;
        let settings = ScanSettings {
            resolution: scanner.resolution,
            top_n: scanner.top_n,
            history_candles: scanner.history_candles,
            lookback_multiplier: scanner.lookback_multiplier,
            request_delay: scanner.request_delay,
            retain_mode: scanner.retain_mode,
            settlement_asset: scanner.settlement_asset.clone(),
            indicator: IndicatorParams {
                volume_window: scanner.volume_window,
                min_candles: scanner.min_candles,
                ..IndicatorParams::default()
            },
        };

        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid scanner config: {}", e))?;
        Ok(settings)
    }
}
