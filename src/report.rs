use std::fmt::Write as _;

use camino::Utf8Path;

use crate::error::LassaError;
use crate::stats::StageStatistics;
use crate::writer::{self, WrittenCounts};

pub const SUMMARY_FILE: &str = "lassa_download_summary.txt";

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: &'static str,
    pub stats: StageStatistics,
}

/// Render the plain-text download summary: archive totals, the geographic
/// distribution of the fetched set, per-stage filter counts in pipeline
/// order, and what was written where.
pub fn render_summary(
    total_found: usize,
    skipped_windows: &[usize],
    fetch_stats: &StageStatistics,
    stages: &[StageReport],
    written: &WrittenCounts,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Lassa Virus Sequence Download Summary");
    let _ = writeln!(out, "====================================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Lassa virus sequences found: {total_found}");
    let _ = writeln!(out, "Sequences retrieved: {}", fetch_stats.total);
    if !skipped_windows.is_empty() {
        let _ = writeln!(
            out,
            "Windows skipped after exhausted retries: {}",
            skipped_windows
                .iter()
                .map(|start| start.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    let _ = writeln!(out, "Segments found in database:");
    let _ = writeln!(out, "  L segments: {}", fetch_stats.segments.l);
    let _ = writeln!(out, "  S segments: {}", fetch_stats.segments.s);
    let _ = writeln!(out, "  Unknown/unspecified: {}", fetch_stats.segments.unknown);
    let _ = writeln!(out);

    let _ = writeln!(out, "Geographical Distribution of Segments:");
    let _ = writeln!(out, "-------------------------------------");
    let _ = writeln!(
        out,
        "{:<16} {:>10}  {:>10}  {:>7}    {:>8}",
        "Country", "L segments", "S segments", "Unknown", "Total"
    );
    let mut totals = (0usize, 0usize, 0usize);
    for (country, tally) in &fetch_stats.by_country {
        let _ = writeln!(
            out,
            "{:<16} {:>10}  {:>10}  {:>7}    {:>8}",
            country,
            tally.l,
            tally.s,
            tally.unknown,
            tally.total()
        );
        totals.0 += tally.l;
        totals.1 += tally.s;
        totals.2 += tally.unknown;
    }
    let _ = writeln!(out, "{}", "-".repeat(58));
    let _ = writeln!(
        out,
        "{:<16} {:>10}  {:>10}  {:>7}    {:>8}",
        "Total",
        totals.0,
        totals.1,
        totals.2,
        totals.0 + totals.1 + totals.2
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "Filtering summary (stages in order):");
    let _ = writeln!(
        out,
        "{:<14} {:>8}  {:>8}  {:>8}  {:>8}",
        "Stage", "Total", "L", "S", "Unknown"
    );
    for report in stages {
        let _ = writeln!(
            out,
            "{:<14} {:>8}  {:>8}  {:>8}  {:>8}",
            report.stage,
            report.stats.total,
            report.stats.segments.l,
            report.stats.segments.s,
            report.stats.segments.unknown
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Sequences written:");
    let _ = writeln!(out, "  L segments written: {}", written.l);
    let _ = writeln!(out, "  S segments written: {}", written.s);
    let _ = writeln!(out, "  Unknown segments written: {}", written.unknown);
    let _ = writeln!(out, "Output files:");
    let _ = writeln!(out, "  L segments: {}", writer::L_FASTA);
    let _ = writeln!(out, "  S segments: {}", writer::S_FASTA);
    let _ = writeln!(out, "  Unknown segments: {}", writer::UNKNOWN_FASTA);
    out
}

pub fn write_summary(outdir: &Utf8Path, summary: &str) -> Result<(), LassaError> {
    writer::write_atomic(outdir, SUMMARY_FILE, summary.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    #[test]
    fn renders_empty_run() {
        let fetch_stats = stats::aggregate(&[]);
        let summary = render_summary(0, &[], &fetch_stats, &[], &WrittenCounts::default());
        assert!(summary.contains("Total Lassa virus sequences found: 0"));
        assert!(summary.contains("L segments written: 0"));
        assert!(!summary.contains("Windows skipped"));
    }

    #[test]
    fn mentions_skipped_windows() {
        let fetch_stats = stats::aggregate(&[]);
        let summary = render_summary(500, &[200, 400], &fetch_stats, &[], &WrittenCounts::default());
        assert!(summary.contains("Windows skipped after exhausted retries: 200, 400"));
    }
}
