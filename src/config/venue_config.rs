//! Venue configuration parsing from environment variables.

use crate::infrastructure::delta::DEFAULT_BASE_URL;
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Delta Exchange connection settings
#[derive(Debug, Clone)]
pub struct VenueEnvConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for VenueEnvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl VenueEnvConfig {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = env::var("DELTA_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("Failed to parse DELTA_REQUEST_TIMEOUT_SECS")?;

        Ok(Self {
            base_url: env::var("DELTA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
