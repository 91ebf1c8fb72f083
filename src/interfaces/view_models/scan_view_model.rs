use crate::domain::scan::{ScanResult, Status};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::warn;

/// One display row of a scan table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub symbol: String,
    pub price: Decimal,
    pub status: Status,
    pub status_label: &'static str,
    /// Percent change rounded to 2 decimals
    pub change_pct: Decimal,
    pub trend_label: String,
    /// Bollinger width rounded to 4 decimals
    pub bb_width: Decimal,
}

impl From<&ScanResult> for ResultRow {
    fn from(result: &ScanResult) -> Self {
        let snapshot = &result.snapshot;
        Self {
            symbol: result.symbol.clone(),
            price: to_decimal(snapshot.price).normalize(),
            status: result.status,
            status_label: result.status.label(),
            change_pct: round(snapshot.change_pct, 2),
            trend_label: snapshot.trend.to_string(),
            bb_width: round(snapshot.bb_width, 4),
        }
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        warn!("ScanViewModel: {} is not representable as a decimal, showing 0", value);
        Decimal::ZERO
    })
}

fn round(value: f64, dp: u32) -> Decimal {
    to_decimal(value).round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub struct ScanViewModel;

impl ScanViewModel {
    /// Rows in the order the ranker produced them
    pub fn rows(results: &[ScanResult]) -> Vec<ResultRow> {
        results.iter().map(ResultRow::from).collect()
    }
}
