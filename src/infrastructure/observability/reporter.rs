//! Per-cycle JSON reporter
//!
//! Emits one structured snapshot per finished scan cycle to stdout.
//!
//! **Security**: This system only SENDS data, never accepts requests.

use crate::domain::scan::{ScanReport, Status};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Cycle snapshot for JSON output
#[derive(Debug, Serialize)]
pub struct CycleSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub outcome: String,
    pub started_at: String,
    pub duration_ms: u64,
    pub universe_size: usize,
    pub signals: SignalCounts,
    pub skipped: Vec<SkipSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct SignalCounts {
    pub squeeze: usize,
    pub volume_spike: usize,
    pub neutral: usize,
}

#[derive(Debug, Serialize)]
pub struct SkipSnapshot {
    pub symbol: String,
    pub reason: String,
}

pub struct CycleReporter {
    start_time: Instant,
}

impl Default for CycleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleReporter {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn snapshot(&self, report: &ScanReport) -> CycleSnapshot {
        CycleSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            outcome: report.outcome.label().to_string(),
            started_at: report.started_at.to_rfc3339(),
            duration_ms: report.duration_ms,
            universe_size: report.universe_size,
            signals: SignalCounts {
                squeeze: report.count(Status::Squeeze),
                volume_spike: report.count(Status::VolumeSpike),
                neutral: report.count(Status::Neutral),
            },
            skipped: report
                .skipped
                .iter()
                .map(|s| SkipSnapshot {
                    symbol: s.symbol.clone(),
                    reason: s.reason.kind().to_string(),
                })
                .collect(),
        }
    }

    /// Print the snapshot with a `METRICS_JSON:` prefix so logs can be filtered
    pub fn report(&self, report: &ScanReport) {
        let snapshot = self.snapshot(report);
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                println!("METRICS_JSON:{}", json);
                info!(
                    "CycleReporter: {} | Universe: {} | Squeeze: {} | Vol spike: {} | Skipped: {}",
                    snapshot.outcome,
                    snapshot.universe_size,
                    snapshot.signals.squeeze,
                    snapshot.signals.volume_spike,
                    snapshot.skipped.len()
                );
            }
            Err(e) => warn!("CycleReporter: Failed to serialize snapshot: {}", e),
        }
    }
}
