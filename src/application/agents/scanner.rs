use crate::application::agents::ranker::rank_results;
use crate::application::agents::universe::{UniverseMember, UniverseSelector};
use crate::application::market_data::squeeze_indicator::SqueezeIndicator;
use crate::domain::errors::{ConfigError, MarketDataError};
use crate::domain::market::{CandleSeries, Resolution};
use crate::domain::ports::MarketDataService;
use crate::domain::scan::{
    IndicatorParams, NothingToScanReason, RetainMode, ScanOutcome, ScanPhase, ScanProgress,
    ScanReport, ScanResult, SkipReason, SkippedInstrument,
};
use crate::infrastructure::observability::ScanMetrics;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Notify, mpsc::UnboundedSender};
use tokio::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Caller-supplied knobs for one scan cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    pub resolution: Resolution,
    pub top_n: usize,
    /// Bars the history request is sized for, before the multiplier
    pub history_candles: usize,
    pub lookback_multiplier: u32,
    pub request_delay: Duration,
    pub retain_mode: RetainMode,
    pub settlement_asset: String,
    pub indicator: IndicatorParams,
}

impl ScanSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 || self.top_n > UniverseSelector::MAX_TOP_N {
            return Err(ConfigError::TopNOutOfRange {
                value: self.top_n,
                max: UniverseSelector::MAX_TOP_N,
            });
        }

        let floor = self.indicator.window + 1;
        if self.indicator.min_candles < floor {
            return Err(ConfigError::MinCandlesTooLow {
                value: self.indicator.min_candles,
                floor,
            });
        }

        if self.lookback_multiplier == 0 {
            return Err(ConfigError::LookbackMultiplier(self.lookback_multiplier));
        }

        if self.history_candles < self.indicator.min_candles {
            return Err(ConfigError::HistoryTooShort {
                history: self.history_candles,
                min_candles: self.indicator.min_candles,
            });
        }

        if self.settlement_asset.trim().is_empty() {
            return Err(ConfigError::EmptySettlementAsset);
        }

        Ok(())
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::OneHour,
            top_n: 20,
            history_candles: 50,
            lookback_multiplier: 2,
            request_delay: Duration::from_millis(100),
            retain_mode: RetainMode::SignalsOnly,
            settlement_asset: "USDT".to_string(),
            indicator: IndicatorParams::default(),
        }
    }
}

struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative stop signal shared between a signal handler and the scan loop.
///
/// The scanner checks it once per instrument; the scheduler also wakes on it
/// while sleeping between cycles.
#[derive(Clone)]
pub struct ScanCancellation {
    state: Arc<CancellationState>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self {
            state: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::cancel`] has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ScanCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScanCancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCancellation")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Runs one rate-limited pass over the universe.
///
/// Instruments are processed strictly one after another with a fixed pause
/// in between; the pause is the only throttle on outbound requests.
pub struct MarketScanner {
    market_service: Arc<dyn MarketDataService>,
    universe: UniverseSelector,
    indicator: SqueezeIndicator,
    settings: ScanSettings,
    progress_tx: Option<UnboundedSender<ScanProgress>>,
    cancellation: ScanCancellation,
    metrics: Option<ScanMetrics>,
}

impl MarketScanner {
    pub fn new(market_service: Arc<dyn MarketDataService>, settings: ScanSettings) -> Self {
        Self {
            market_service,
            universe: UniverseSelector::new(settings.settlement_asset.clone()),
            indicator: SqueezeIndicator::new(settings.indicator),
            settings,
            progress_tx: None,
            cancellation: ScanCancellation::new(),
            metrics: None,
        }
    }

    pub fn with_progress(mut self, progress_tx: UnboundedSender<ScanProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn with_cancellation(mut self, cancellation: ScanCancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_metrics(mut self, metrics: ScanMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn cancellation(&self) -> &ScanCancellation {
        &self.cancellation
    }

    /// Runs a single cycle: Idle -> FetchingUniverse -> Iterating -> Done.
    ///
    /// Never fails. A universe that cannot be loaded ends the cycle as
    /// `NothingToScan`; per-instrument failures land in `skipped`.
    pub async fn run_cycle(&self) -> ScanReport {
        let started_at = chrono::Utc::now();
        let clock = Instant::now();

        self.publish(ScanPhase::Idle, 0, 0, None);
        self.publish(ScanPhase::FetchingUniverse, 0, 0, None);

        let universe = match self
            .universe
            .load(self.market_service.as_ref(), self.settings.top_n)
            .await
        {
            Ok(members) => members,
            Err(e) => {
                error!("MarketScanner: Failed to load universe: {}", e);
                self.publish(ScanPhase::Aborted, 0, 0, None);
                return self.finish(
                    ScanOutcome::NothingToScan(NothingToScanReason::UniverseUnavailable(
                        e.to_string(),
                    )),
                    0,
                    Vec::new(),
                    started_at,
                    clock,
                );
            }
        };

        if universe.is_empty() {
            warn!(
                "MarketScanner: No live {} perpetuals in catalog, nothing to scan",
                self.universe.settlement_asset()
            );
            self.publish(ScanPhase::Done, 0, 0, None);
            return self.finish(
                ScanOutcome::NothingToScan(NothingToScanReason::NoEligibleInstruments),
                0,
                Vec::new(),
                started_at,
                clock,
            );
        }

        let total = universe.len();
        info!(
            "MarketScanner: Scanning {} instruments on {} candles",
            total, self.settings.resolution
        );
        self.publish(ScanPhase::Iterating, 0, total, None);

        let mut results = Vec::new();
        let mut skipped = Vec::new();

        for (idx, member) in universe.iter().enumerate() {
            if idx > 0 && !self.settings.request_delay.is_zero() {
                tokio::time::sleep(self.settings.request_delay).await;
            }

            if self.cancellation.is_cancelled() {
                info!(
                    "MarketScanner: Cancelled after {} of {} instruments",
                    idx, total
                );
                self.publish(ScanPhase::Aborted, idx, total, None);
                return self.finish(
                    ScanOutcome::Cancelled {
                        results: rank_results(results),
                    },
                    total,
                    skipped,
                    started_at,
                    clock,
                );
            }

            let symbol = member.instrument.symbol.as_str();
            match self.evaluate_member(member).await {
                Ok(result) => {
                    debug!("MarketScanner: {} -> {}", symbol, result.status);
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_evaluated(result.status);
                    }
                    if self.settings.retain_mode.keeps(result.status) {
                        results.push(result);
                    }
                }
                Err(reason) => {
                    warn!("MarketScanner: Skipping {}: {}", symbol, reason);
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_skipped(reason.kind());
                    }
                    skipped.push(SkippedInstrument {
                        symbol: symbol.to_string(),
                        reason,
                    });
                }
            }

            self.publish(
                ScanPhase::Iterating,
                idx + 1,
                total,
                Some(symbol.to_string()),
            );
        }

        self.publish(ScanPhase::Done, total, total, None);
        self.finish(
            ScanOutcome::Completed {
                results: rank_results(results),
            },
            total,
            skipped,
            started_at,
            clock,
        )
    }

    /// Fetch, normalize and evaluate one instrument
    async fn evaluate_member(&self, member: &UniverseMember) -> Result<ScanResult, SkipReason> {
        let symbol = &member.instrument.symbol;
        let resolution = self.settings.resolution;

        // Bar-aligned so repeated requests within one bar share a cache key
        let end = resolution.align_down(chrono::Utc::now().timestamp());
        let start = end.saturating_sub(resolution.lookback_seconds(
            self.settings.history_candles,
            self.settings.lookback_multiplier,
        ));

        let raw = self
            .market_service
            .get_candles(symbol, resolution, start, end)
            .await
            .map_err(|e| match e {
                MarketDataError::Decode { .. } | MarketDataError::InvalidData { .. } => {
                    SkipReason::MalformedData(e.to_string())
                }
                _ => SkipReason::FetchFailed(e.to_string()),
            })?;

        let series =
            CandleSeries::from_raw(raw).map_err(|e| SkipReason::MalformedData(e.to_string()))?;

        let required = self.indicator.params().required_candles();
        if series.len() < required {
            return Err(SkipReason::InsufficientHistory {
                candles: series.len(),
                required,
            });
        }

        let snapshot = self.indicator.evaluate(&series).ok_or_else(|| {
            SkipReason::MalformedData("indicator window produced no finite reading".to_string())
        })?;

        Ok(ScanResult::new(symbol.clone(), snapshot))
    }

    fn publish(
        &self,
        phase: ScanPhase,
        completed: usize,
        total: usize,
        current_symbol: Option<String>,
    ) {
        if let Some(tx) = &self.progress_tx {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(ScanProgress {
                phase,
                completed,
                total,
                current_symbol,
            });
        }
    }

    fn finish(
        &self,
        outcome: ScanOutcome,
        universe_size: usize,
        skipped: Vec<SkippedInstrument>,
        started_at: chrono::DateTime<chrono::Utc>,
        clock: Instant,
    ) -> ScanReport {
        let report = ScanReport {
            outcome,
            universe_size,
            skipped,
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
        };

        info!(
            "MarketScanner: Cycle {} in {}ms ({} results, {} skipped, universe {})",
            report.outcome.label(),
            report.duration_ms,
            report.results().len(),
            report.skipped.len(),
            report.universe_size
        );

        if let Some(metrics) = &self.metrics {
            metrics.observe_cycle(&report);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{Candle, Instrument};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Catalog of live USDT perps where every symbol gets the same coiled history
    struct StubService {
        symbols: Vec<String>,
        calls: Mutex<Vec<String>>,
        cancel_after: Option<(usize, ScanCancellation)>,
    }

    impl StubService {
        fn new(symbols: &[&str]) -> Self {
            Self {
                symbols: symbols.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
                cancel_after: None,
            }
        }
    }

    #[async_trait]
    impl MarketDataService for StubService {
        async fn get_products(&self) -> Result<Vec<Instrument>, MarketDataError> {
            Ok(self
                .symbols
                .iter()
                .map(|s| Instrument::live_perpetual(s.clone(), "USDT"))
                .collect())
        }

        async fn get_volumes(&self) -> Result<HashMap<String, f64>, MarketDataError> {
            Ok(HashMap::new())
        }

        async fn get_candles(
            &self,
            symbol: &str,
            _resolution: Resolution,
            _start: i64,
            _end: i64,
        ) -> Result<Vec<Candle>, MarketDataError> {
            let calls = {
                let mut guard = self.calls.lock().unwrap();
                guard.push(symbol.to_string());
                guard.len()
            };
            if let Some((after, cancellation)) = &self.cancel_after
                && calls == *after
            {
                cancellation.cancel();
            }

            Ok((0..25)
                .map(|i| {
                    let c = if i % 2 == 0 { 100.0 } else { 100.5 };
                    Candle::new(i * 3600, c, c + 5.0, c - 5.0, c, 10.0)
                })
                .collect())
        }
    }

    fn settings() -> ScanSettings {
        ScanSettings {
            request_delay: Duration::ZERO,
            ..ScanSettings::default()
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert_eq!(ScanSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_settings_validation() {
        let bad_top_n = ScanSettings {
            top_n: 51,
            ..ScanSettings::default()
        };
        assert!(matches!(
            bad_top_n.validate(),
            Err(ConfigError::TopNOutOfRange { value: 51, .. })
        ));

        let mut low_min = ScanSettings::default();
        low_min.indicator.min_candles = 10;
        assert_eq!(
            low_min.validate(),
            Err(ConfigError::MinCandlesTooLow {
                value: 10,
                floor: 21
            })
        );

        let no_multiplier = ScanSettings {
            lookback_multiplier: 0,
            ..ScanSettings::default()
        };
        assert_eq!(
            no_multiplier.validate(),
            Err(ConfigError::LookbackMultiplier(0))
        );
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_done() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scanner = MarketScanner::new(
            Arc::new(StubService::new(&["AUSDT", "BUSDT", "CUSDT"])),
            settings(),
        )
        .with_progress(tx);

        let report = scanner.run_cycle().await;
        drop(scanner);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        let fractions: Vec<f64> = events.iter().map(|e| e.fraction()).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(events.first().map(|e| e.phase), Some(ScanPhase::Idle));
        assert_eq!(events.last().map(|e| e.phase), Some(ScanPhase::Done));
        assert_eq!(events.last().map(|e| e.fraction()), Some(1.0));
        assert_eq!(report.results().len(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_results() {
        let cancellation = ScanCancellation::new();
        let mut service = StubService::new(&["AUSDT", "BUSDT", "CUSDT", "DUSDT"]);
        service.cancel_after = Some((2, cancellation.clone()));

        let scanner = MarketScanner::new(Arc::new(service), settings())
            .with_cancellation(cancellation.clone());
        let report = scanner.run_cycle().await;

        match &report.outcome {
            ScanOutcome::Cancelled { results } => {
                let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
                assert_eq!(symbols, vec!["AUSDT", "BUSDT"]);
            }
            other => panic!("expected Cancelled, got {:?}", other),
        }
        assert_eq!(report.universe_size, 4);
    }

    #[tokio::test]
    async fn test_cancellation_future_resolves() {
        let cancellation = ScanCancellation::new();
        let waiter = cancellation.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        cancellation.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancelled() should resolve")
            .expect("task should not panic");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_instruments_only() {
        let scanner = MarketScanner::new(
            Arc::new(StubService::new(&["AUSDT", "BUSDT", "CUSDT"])),
            ScanSettings {
                request_delay: Duration::from_millis(100),
                ..ScanSettings::default()
            },
        );

        let start = Instant::now();
        scanner.run_cycle().await;
        // Two gaps for three instruments
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200));
        assert!(elapsed < Duration::from_millis(300));
    }
}
