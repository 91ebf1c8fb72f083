use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle resolutions offered by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    FifteenMin,
    OneHour,
    FourHour,
}

impl Resolution {
    /// Returns the duration of this resolution in minutes
    pub fn to_minutes(&self) -> i64 {
        match self {
            Resolution::FifteenMin => 15,
            Resolution::OneHour => 60,
            Resolution::FourHour => 240,
        }
    }

    /// Returns the duration in seconds
    pub fn to_seconds(&self) -> i64 {
        self.to_minutes() * 60
    }

    /// Converts to the Delta Exchange `resolution` query value
    pub fn to_delta_string(&self) -> &'static str {
        match self {
            Resolution::FifteenMin => "15m",
            Resolution::OneHour => "1h",
            Resolution::FourHour => "4h",
        }
    }

    /// Length in seconds of a history request covering `candles` bars,
    /// widened by `multiplier` so gaps in the venue data still leave enough bars.
    ///
    /// Saturates at `i64::MAX` instead of overflowing.
    pub fn lookback_seconds(&self, candles: usize, multiplier: u32) -> i64 {
        i64::try_from(candles)
            .unwrap_or(i64::MAX)
            .saturating_mul(self.to_seconds())
            .saturating_mul(i64::from(multiplier))
    }

    /// Start of the bar containing `timestamp` (unix seconds)
    pub fn align_down(&self, timestamp: i64) -> i64 {
        timestamp - timestamp.rem_euclid(self.to_seconds())
    }
}

impl FromStr for Resolution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "15m" | "15min" | "fifteenmin" => Ok(Resolution::FifteenMin),
            "1h" | "1hour" | "onehour" | "60m" => Ok(Resolution::OneHour),
            "4h" | "4hour" | "fourhour" => Ok(Resolution::FourHour),
            _ => Err(anyhow!(
                "Invalid resolution: '{}'. Valid options: 15m, 1h, 4h",
                s
            )),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_delta_string())
    }
}
