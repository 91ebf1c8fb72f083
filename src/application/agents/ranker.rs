use crate::domain::scan::ScanResult;

/// Orders results Squeeze, then VolumeSpike, then Neutral.
///
/// Within one status the scan order is kept; there is no secondary key.
pub fn rank_results(mut results: Vec<ScanResult>) -> Vec<ScanResult> {
    results.sort_by_key(|r| r.status.priority());
    results
}
