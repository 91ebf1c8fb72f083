//! Plain-text rendering of scan reports and universes for the terminal

use crate::application::agents::UniverseMember;
use crate::domain::scan::{NothingToScanReason, ScanOutcome, ScanReport};
use crate::interfaces::view_models::{ResultRow, ScanViewModel};
use std::fmt::Write;

const LEGEND: [&str; 3] = [
    "SQUEEZE   : Bollinger Bands inside Keltner Channels, volatility is coiled",
    "VOL SPIKE : last bar volume above its 20-bar average",
    "Trend     : BULL when price closes above the 20-bar SMA, BEAR otherwise",
];

pub fn render_report(report: &ScanReport) -> String {
    let mut out = String::new();

    match &report.outcome {
        ScanOutcome::NothingToScan(reason) => {
            let _ = writeln!(out, "No data available");
            if let NothingToScanReason::UniverseUnavailable(detail) = reason {
                let _ = writeln!(out, "Universe could not be loaded: {}", detail);
            } else {
                let _ = writeln!(out, "No live perpetual matched the settlement filter");
            }
            return out;
        }
        ScanOutcome::Completed { results } if results.is_empty() => {
            let _ = writeln!(
                out,
                "No instruments in a squeeze or with a volume spike right now ({} scanned)",
                report.universe_size
            );
            render_skipped(&mut out, report);
            return out;
        }
        ScanOutcome::Completed { results } => {
            let _ = writeln!(out, "Found {} instruments ready to move", results.len());
        }
        ScanOutcome::Cancelled { results } => {
            let _ = writeln!(
                out,
                "Scan cancelled, showing {} partial results",
                results.len()
            );
        }
    }

    out.push('\n');
    render_rows(&mut out, &ScanViewModel::rows(report.results()));
    out.push('\n');
    for line in LEGEND {
        let _ = writeln!(out, "{}", line);
    }
    render_skipped(&mut out, report);
    out
}

fn render_rows(out: &mut String, rows: &[ResultRow]) {
    let _ = writeln!(
        out,
        "{:<16} {:>14} {:<10} {:>9} {:<5} {:>12}",
        "Symbol", "Price", "Status", "Change %", "Trend", "BB Width"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<16} {:>14} {:<10} {:>9} {:<5} {:>12}",
            row.symbol,
            row.price.to_string(),
            row.status_label,
            format!("{:+}", row.change_pct),
            row.trend_label,
            row.bb_width.to_string()
        );
    }
}

fn render_skipped(out: &mut String, report: &ScanReport) {
    if report.skipped.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nSkipped {} instruments:", report.skipped.len());
    for skipped in &report.skipped {
        let _ = writeln!(out, "  {:<16} {}", skipped.symbol, skipped.reason);
    }
}

pub fn render_universe(members: &[UniverseMember]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>3} {:<16} {:>18}", "#", "Symbol", "24h Volume");
    for (rank, member) in members.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3} {:<16} {:>18.2}",
            rank + 1,
            member.instrument.symbol,
            member.volume_24h
        );
    }
    out
}
