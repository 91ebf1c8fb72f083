//! Observability configuration parsing from environment variables.

use anyhow::Result;
use std::env;
use std::str::FromStr;

/// Console log rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => anyhow::bail!("Invalid LOG_FORMAT: {}. Must be 'pretty' or 'compact'", s),
        }
    }
}

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    /// Emit METRICS_JSON snapshots and keep the Prometheus registry
    pub enabled: bool,
    pub log_format: LogFormat,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_format: LogFormat::Compact,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            enabled: env::var("OBSERVABILITY_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse::<bool>()
                .unwrap_or(true),
            log_format: LogFormat::from_str(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
            )?,
        })
    }
}
