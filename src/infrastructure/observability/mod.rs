//! Push-based observability for squeezescan
//!
//! Outbound data only, no HTTP server:
//!
//! 1. **Prometheus registry**: counters and gauges updated by the scanner
//! 2. **Structured JSON Logs**: one snapshot per finished cycle

pub mod metrics;
pub mod reporter;

pub use metrics::ScanMetrics;
pub use reporter::CycleReporter;
