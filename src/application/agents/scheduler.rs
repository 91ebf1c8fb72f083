use crate::application::agents::scanner::{MarketScanner, ScanCancellation};
use crate::domain::scan::ScanReport;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::time::Duration;
use tracing::{info, warn};

/// Re-runs scan cycles on a fixed interval.
///
/// Sleep-then-repeat: the next cycle starts only after the previous one has
/// returned and the interval has elapsed, so cycles never overlap.
pub struct ScanScheduler {
    scanner: Arc<MarketScanner>,
    report_tx: Sender<ScanReport>,
    interval: Duration,
    cancellation: ScanCancellation,
}

impl ScanScheduler {
    pub fn new(
        scanner: Arc<MarketScanner>,
        report_tx: Sender<ScanReport>,
        interval: Duration,
    ) -> Self {
        let cancellation = scanner.cancellation().clone();
        Self {
            scanner,
            report_tx,
            interval,
            cancellation,
        }
    }

    pub async fn run(&self) {
        info!("ScanScheduler started. Interval: {:?}", self.interval);

        let mut cycle: u64 = 0;
        loop {
            if self.cancellation.is_cancelled() {
                break;
            }

            cycle += 1;
            info!("ScanScheduler: Starting cycle {}", cycle);
            let report = self.scanner.run_cycle().await;

            if self.report_tx.send(report).await.is_err() {
                warn!("ScanScheduler: Report receiver dropped, stopping");
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancellation.cancelled() => {}
            }
        }

        info!("ScanScheduler stopped after {} cycles", cycle);
    }
}
