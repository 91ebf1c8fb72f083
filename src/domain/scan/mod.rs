// Indicator outputs and scan cycle results
pub mod result;
pub mod snapshot;

pub use result::{
    NothingToScanReason, RetainMode, ScanOutcome, ScanPhase, ScanProgress, ScanReport,
    ScanResult, SkipReason, SkippedInstrument, Status,
};
pub use snapshot::{Band, IndicatorParams, IndicatorSnapshot, Trend, VolumeWindow};
