use super::snapshot::IndicatorSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Breakout-readiness classification of one instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Squeeze,
    VolumeSpike,
    Neutral,
}

impl Status {
    /// Squeeze wins over a concurrent volume spike.
    pub fn classify(snapshot: &IndicatorSnapshot) -> Self {
        if snapshot.squeeze_on {
            Status::Squeeze
        } else if snapshot.volume_spike {
            Status::VolumeSpike
        } else {
            Status::Neutral
        }
    }

    /// Ranking key, lower sorts first
    pub fn priority(&self) -> u8 {
        match self {
            Status::Squeeze => 0,
            Status::VolumeSpike => 1,
            Status::Neutral => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Status::Squeeze => "SQUEEZE",
            Status::VolumeSpike => "VOL SPIKE",
            Status::Neutral => "NEUTRAL",
        }
    }

    pub fn is_signal(&self) -> bool {
        !matches!(self, Status::Neutral)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether a cycle keeps neutral instruments in its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RetainMode {
    #[default]
    SignalsOnly,
    All,
}

impl RetainMode {
    pub fn keeps(&self, status: Status) -> bool {
        match self {
            RetainMode::SignalsOnly => status.is_signal(),
            RetainMode::All => true,
        }
    }
}

impl FromStr for RetainMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signals" | "signals_only" | "signalsonly" => Ok(RetainMode::SignalsOnly),
            "all" => Ok(RetainMode::All),
            _ => anyhow::bail!("Invalid retain mode: {}. Must be 'signals' or 'all'", s),
        }
    }
}

/// One evaluated instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    pub status: Status,
}

impl ScanResult {
    pub fn new(symbol: impl Into<String>, snapshot: IndicatorSnapshot) -> Self {
        Self {
            symbol: symbol.into(),
            status: Status::classify(&snapshot),
            snapshot,
        }
    }
}

/// Why an instrument produced no result this cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    FetchFailed(String),
    MalformedData(String),
    InsufficientHistory { candles: usize, required: usize },
}

impl SkipReason {
    /// Stable label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::FetchFailed(_) => "fetch_failed",
            SkipReason::MalformedData(_) => "malformed_data",
            SkipReason::InsufficientHistory { .. } => "insufficient_history",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            SkipReason::MalformedData(e) => write!(f, "malformed data: {}", e),
            SkipReason::InsufficientHistory { candles, required } => {
                write!(f, "insufficient history: {} of {} candles", candles, required)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Why a cycle had nothing to iterate over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NothingToScanReason {
    /// Catalog or ticker request failed
    UniverseUnavailable(String),
    /// Venue answered, but no instrument passed the eligibility filter
    NoEligibleInstruments,
}

/// Terminal state of a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanOutcome {
    /// Every instrument was visited. `results` is ranked and may be empty.
    Completed { results: Vec<ScanResult> },
    NothingToScan(NothingToScanReason),
    /// Stopped early on request. `results` is ranked.
    Cancelled { results: Vec<ScanResult> },
}

impl ScanOutcome {
    pub fn results(&self) -> &[ScanResult] {
        match self {
            ScanOutcome::Completed { results } | ScanOutcome::Cancelled { results } => results,
            ScanOutcome::NothingToScan(_) => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Completed { .. } => "completed",
            ScanOutcome::NothingToScan(_) => "nothing_to_scan",
            ScanOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

/// Everything one scan cycle produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub outcome: ScanOutcome,
    pub universe_size: usize,
    pub skipped: Vec<SkippedInstrument>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn results(&self) -> &[ScanResult] {
        self.outcome.results()
    }

    pub fn count(&self, status: Status) -> usize {
        self.results().iter().filter(|r| r.status == status).count()
    }
}

/// Orchestrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanPhase {
    Idle,
    FetchingUniverse,
    Iterating,
    Done,
    Aborted,
}

/// Progress event published while a cycle runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub completed: usize,
    pub total: usize,
    pub current_symbol: Option<String>,
}

impl ScanProgress {
    /// Fraction of the universe processed, in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            match self.phase {
                ScanPhase::Done | ScanPhase::Aborted => 1.0,
                _ => 0.0,
            }
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scan::snapshot::{Band, Trend};

    fn snapshot(squeeze_on: bool, volume_spike: bool) -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 100.0,
            squeeze_on,
            bb_width: 4.0,
            volume_spike,
            trend: Trend::Bull,
            change_pct: 1.0,
            sma: 99.0,
            std_dev: 1.0,
            atr: 2.0,
            bollinger: Band {
                upper: 101.0,
                lower: 97.0,
            },
            keltner: Band {
                upper: 102.0,
                lower: 96.0,
            },
            volume_mean: 10.0,
        }
    }

    #[test]
    fn test_squeeze_takes_precedence() {
        assert_eq!(Status::classify(&snapshot(true, true)), Status::Squeeze);
        assert_eq!(Status::classify(&snapshot(true, false)), Status::Squeeze);
        assert_eq!(Status::classify(&snapshot(false, true)), Status::VolumeSpike);
        assert_eq!(Status::classify(&snapshot(false, false)), Status::Neutral);
    }

    #[test]
    fn test_retain_mode() {
        assert!(!RetainMode::SignalsOnly.keeps(Status::Neutral));
        assert!(RetainMode::SignalsOnly.keeps(Status::VolumeSpike));
        assert!(RetainMode::All.keeps(Status::Neutral));
        assert_eq!("ALL".parse::<RetainMode>().unwrap(), RetainMode::All);
    }

    #[test]
    fn test_progress_fraction() {
        let progress = ScanProgress {
            phase: ScanPhase::Iterating,
            completed: 1,
            total: 4,
            current_symbol: Some("BTCUSDT".to_string()),
        };
        assert_eq!(progress.fraction(), 0.25);

        let empty_done = ScanProgress {
            phase: ScanPhase::Done,
            completed: 0,
            total: 0,
            current_symbol: None,
        };
        assert_eq!(empty_done.fraction(), 1.0);
    }
}
