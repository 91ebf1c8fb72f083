//! Prometheus metrics definitions for squeezescan
//!
//! All metrics use the `squeezescan_` prefix and are read-only.

use crate::domain::scan::{ScanReport, Status};
use prometheus::{
    Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the scan loop
#[derive(Clone)]
pub struct ScanMetrics {
    registry: Arc<Registry>,
    /// Completed cycles by outcome
    pub cycles_total: IntCounterVec,
    /// Instruments that produced an indicator snapshot
    pub instruments_evaluated_total: IntCounterVec,
    /// Instruments skipped, by reason
    pub instruments_skipped_total: IntCounterVec,
    /// Results of the latest cycle by status
    pub signals_current: IntGaugeVec,
    /// Universe size of the latest cycle
    pub universe_size: IntGauge,
    /// Wall-clock time of a cycle in seconds
    pub cycle_duration_seconds: HistogramVec,
    /// Unix time of the latest finished cycle
    pub last_cycle_timestamp: Gauge,
}

impl ScanMetrics {
    /// Create a new ScanMetrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let cycles_total = IntCounterVec::new(
            Opts::new("squeezescan_cycles_total", "Total scan cycles by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(cycles_total.clone()))?;

        let instruments_evaluated_total = IntCounterVec::new(
            Opts::new(
                "squeezescan_instruments_evaluated_total",
                "Instruments evaluated by resulting status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(instruments_evaluated_total.clone()))?;

        let instruments_skipped_total = IntCounterVec::new(
            Opts::new(
                "squeezescan_instruments_skipped_total",
                "Instruments skipped by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(instruments_skipped_total.clone()))?;

        let signals_current = IntGaugeVec::new(
            Opts::new(
                "squeezescan_signals_current",
                "Results of the latest cycle by status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(signals_current.clone()))?;

        let universe_size = IntGauge::with_opts(Opts::new(
            "squeezescan_universe_size",
            "Instruments selected for the latest cycle",
        ))?;
        registry.register(Box::new(universe_size.clone()))?;

        let cycle_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "squeezescan_cycle_duration_seconds",
                "Scan cycle duration in seconds",
            )
            .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 80.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(cycle_duration_seconds.clone()))?;

        let last_cycle_timestamp = Gauge::with_opts(Opts::new(
            "squeezescan_last_cycle_timestamp",
            "Unix time of the latest finished cycle",
        ))?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            cycles_total,
            instruments_evaluated_total,
            instruments_skipped_total,
            signals_current,
            universe_size,
            cycle_duration_seconds,
            last_cycle_timestamp,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_evaluated(&self, status: Status) {
        self.instruments_evaluated_total
            .with_label_values(&[status.label()])
            .inc();
    }

    pub fn inc_skipped(&self, reason: &str) {
        self.instruments_skipped_total
            .with_label_values(&[reason])
            .inc();
    }

    /// Record the end of a cycle
    pub fn observe_cycle(&self, report: &ScanReport) {
        let outcome = report.outcome.label();
        self.cycles_total.with_label_values(&[outcome]).inc();
        self.cycle_duration_seconds
            .with_label_values(&[outcome])
            .observe(report.duration_ms as f64 / 1000.0);
        self.universe_size.set(report.universe_size as i64);

        for status in [Status::Squeeze, Status::VolumeSpike, Status::Neutral] {
            self.signals_current
                .with_label_values(&[status.label()])
                .set(report.count(status) as i64);
        }

        self.last_cycle_timestamp
            .set(chrono::Utc::now().timestamp() as f64);
    }
}
