use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of the last close relative to the 20-bar mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bull,
    Bear,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bull => write!(f, "BULL"),
            Trend::Bear => write!(f, "BEAR"),
        }
    }
}

/// Which bars feed the rolling volume mean the last bar is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VolumeWindow {
    /// Trailing window ending at (and including) the last bar
    #[default]
    Inclusive,
    /// The window of bars immediately before the last bar
    Exclusive,
}

impl FromStr for VolumeWindow {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inclusive" => Ok(VolumeWindow::Inclusive),
            "exclusive" => Ok(VolumeWindow::Exclusive),
            _ => anyhow::bail!(
                "Invalid volume window: {}. Must be 'inclusive' or 'exclusive'",
                s
            ),
        }
    }
}

/// Tunables of the squeeze engine. Defaults are the classic 20/2.0/1.5 setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub window: usize,
    pub bb_multiplier: f64,
    pub kc_multiplier: f64,
    pub volume_window: VolumeWindow,
    /// Caller-supplied floor; the engine never goes below `window + 1`
    pub min_candles: usize,
}

impl IndicatorParams {
    pub const DEFAULT_WINDOW: usize = 20;
    pub const DEFAULT_MIN_CANDLES: usize = Self::DEFAULT_WINDOW + 1;

    /// Number of candles a series must hold before a snapshot is produced
    pub fn required_candles(&self) -> usize {
        // `window` bars for the rolling stats plus one reference bar for the change
        self.min_candles.max(self.window + 1)
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            bb_multiplier: 2.0,
            kc_multiplier: 1.5,
            volume_window: VolumeWindow::Inclusive,
            min_candles: Self::DEFAULT_MIN_CANDLES,
        }
    }
}

/// Bollinger or Keltner envelope around the 20-bar mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Strict containment: touching bounds do not count as inside.
    pub fn strictly_inside(&self, outer: &Band) -> bool {
        self.upper < outer.upper && self.lower > outer.lower
    }
}

/// Indicator readings on the last bar of a series.
///
/// Only ever built whole by the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub squeeze_on: bool,
    pub bb_width: f64,
    pub volume_spike: bool,
    pub trend: Trend,
    pub change_pct: f64,

    pub sma: f64,
    pub std_dev: f64,
    pub atr: f64,
    pub bollinger: Band,
    pub keltner: Band,
    pub volume_mean: f64,
}
