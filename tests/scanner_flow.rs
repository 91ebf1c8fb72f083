//! End-to-end scan cycles against the in-memory venue

use squeezescan::application::agents::{MarketScanner, ScanSettings};
use squeezescan::domain::market::{Candle, Instrument, Resolution};
use squeezescan::domain::scan::{
    NothingToScanReason, RetainMode, ScanOutcome, ScanPhase, SkipReason, Status,
};
use squeezescan::infrastructure::{CachedMarketDataService, MockMarketDataService};
use squeezescan::infrastructure::observability::ScanMetrics;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Flat closes with wide bars: Bollinger collapses inside Keltner
fn coiled(bars: usize) -> Vec<Candle> {
    (0..bars)
        .map(|i| {
            let close = if i % 2 == 0 { 100.0 } else { 100.1 };
            Candle::new(i as i64 * 3600, close, close + 2.0, close - 2.0, close, 1_000.0)
        })
        .collect()
}

/// Steady climb with narrow bars: no squeeze, flat volume
fn trending(bars: usize) -> Vec<Candle> {
    (0..bars)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle::new(i as i64 * 3600, close - 1.0, close + 0.2, close - 1.2, close, 1_000.0)
        })
        .collect()
}

fn settings() -> ScanSettings {
    ScanSettings {
        request_delay: Duration::ZERO,
        ..ScanSettings::default()
    }
}

#[tokio::test]
async fn test_cycle_skips_failures_and_keeps_signals() {
    let venue = MockMarketDataService::new()
        .with_instrument(Instrument::live_perpetual("XUSDT", "USDT"), 300.0)
        .with_candle_error("XUSDT")
        .with_instrument(Instrument::live_perpetual("YUSDT", "USDT"), 200.0)
        .with_candles("YUSDT", coiled(15))
        .with_instrument(Instrument::live_perpetual("ZUSDT", "USDT"), 100.0)
        .with_candles("ZUSDT", coiled(60));

    let scanner = MarketScanner::new(Arc::new(venue), settings());
    let report = scanner.run_cycle().await;

    let ScanOutcome::Completed { results } = &report.outcome else {
        panic!("Expected a completed cycle, got {:?}", report.outcome);
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].symbol, "ZUSDT");
    assert_eq!(results[0].status, Status::Squeeze);

    assert_eq!(report.universe_size, 3);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].symbol, "XUSDT");
    assert!(matches!(report.skipped[0].reason, SkipReason::FetchFailed(_)));
    assert_eq!(report.skipped[1].symbol, "YUSDT");
    assert_eq!(
        report.skipped[1].reason,
        SkipReason::InsufficientHistory {
            candles: 15,
            required: 21
        }
    );
}

#[tokio::test]
async fn test_repeated_cycles_reuse_cached_candles() {
    let venue = Arc::new(
        MockMarketDataService::new()
            .with_instrument(Instrument::live_perpetual("AUSDT", "USDT"), 200.0)
            .with_candles("AUSDT", coiled(40))
            .with_instrument(Instrument::live_perpetual("BUSDT", "USDT"), 100.0)
            .with_candles("BUSDT", trending(40)),
    );
    let cached = Arc::new(CachedMarketDataService::with_default_ttl(venue.clone()));

    let settings = ScanSettings {
        resolution: Resolution::FourHour,
        ..settings()
    };
    let scanner = MarketScanner::new(cached, settings);

    let first = scanner.run_cycle().await;
    let second = scanner.run_cycle().await;

    assert_eq!(venue.catalog_calls(), 1);
    assert_eq!(venue.candle_requests(), vec!["AUSDT", "BUSDT"]);
    assert_eq!(first.results(), second.results());
}

#[tokio::test]
async fn test_universe_failure_is_not_an_empty_scan() {
    let down = MockMarketDataService::new().fail_catalog();
    let report = MarketScanner::new(Arc::new(down), settings())
        .run_cycle()
        .await;
    assert!(matches!(
        report.outcome,
        ScanOutcome::NothingToScan(NothingToScanReason::UniverseUnavailable(_))
    ));

    let quiet = MockMarketDataService::new()
        .with_instrument(Instrument::live_perpetual("AUSDT", "USDT"), 10.0)
        .with_candles("AUSDT", trending(40));
    let report = MarketScanner::new(Arc::new(quiet), settings())
        .run_cycle()
        .await;
    assert!(matches!(&report.outcome, ScanOutcome::Completed { results } if results.is_empty()));
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn test_no_eligible_instruments() {
    let venue = MockMarketDataService::new()
        .with_instrument(Instrument::live_perpetual("BTCUSD", "USD"), 10_000.0);
    let report = MarketScanner::new(Arc::new(venue), settings())
        .run_cycle()
        .await;

    assert_eq!(
        report.outcome,
        ScanOutcome::NothingToScan(NothingToScanReason::NoEligibleInstruments)
    );
}

#[tokio::test]
async fn test_retain_all_ranks_neutral_last() {
    let venue = MockMarketDataService::new()
        .with_instrument(Instrument::live_perpetual("TRENDUSDT", "USDT"), 500.0)
        .with_candles("TRENDUSDT", trending(40))
        .with_instrument(Instrument::live_perpetual("COILUSDT", "USDT"), 100.0)
        .with_candles("COILUSDT", coiled(40));

    let settings = ScanSettings {
        retain_mode: RetainMode::All,
        ..settings()
    };
    let report = MarketScanner::new(Arc::new(venue), settings)
        .run_cycle()
        .await;

    let symbols: Vec<&str> = report.results().iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["COILUSDT", "TRENDUSDT"]);
    assert_eq!(report.results()[1].status, Status::Neutral);
}

#[tokio::test]
async fn test_instruments_fetched_in_volume_order() {
    let venue = Arc::new(
        MockMarketDataService::new()
            .with_instrument(Instrument::live_perpetual("LOWUSDT", "USDT"), 1.0)
            .with_instrument(Instrument::live_perpetual("HIGHUSDT", "USDT"), 9.0)
            .with_instrument(Instrument::live_perpetual("MIDUSDT", "USDT"), 5.0),
    );

    let settings = ScanSettings {
        top_n: 2,
        ..settings()
    };
    MarketScanner::new(venue.clone(), settings).run_cycle().await;

    assert_eq!(venue.candle_requests(), vec!["HIGHUSDT", "MIDUSDT"]);
}

#[tokio::test]
async fn test_progress_and_metrics() {
    let venue = MockMarketDataService::demo();
    let metrics = ScanMetrics::new().expect("Failed to create metrics");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let scanner = MarketScanner::new(Arc::new(venue), settings())
        .with_progress(tx)
        .with_metrics(metrics.clone());
    let report = scanner.run_cycle().await;
    drop(scanner);

    let mut phases = Vec::new();
    while let Some(progress) = rx.recv().await {
        phases.push(progress.phase);
    }
    assert_eq!(phases.first(), Some(&ScanPhase::Idle));
    assert_eq!(phases.last(), Some(&ScanPhase::Done));

    // Demo: two squeezes and a volume spike; XRP too short, ADA fails
    assert_eq!(report.universe_size, 6);
    assert_eq!(report.count(Status::Squeeze), 2);
    assert_eq!(report.count(Status::VolumeSpike), 1);
    assert_eq!(report.skipped.len(), 2);

    let rendered = metrics.render();
    assert!(rendered.contains("squeezescan_cycles_total{outcome=\"completed\"} 1"));
    assert!(rendered.contains("squeezescan_signals_current{status=\"SQUEEZE\"} 2"));
}
