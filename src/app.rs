use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::entrez::{LASSA_SEARCH_TERM, RecordSource};
use crate::error::LassaError;
use crate::fetch::FetchOrchestrator;
use crate::filter;
use crate::report::{self, StageReport};
use crate::stats;
use crate::writer::{SequenceWriter, WrittenCounts};

#[derive(Debug, Clone, Serialize)]
pub struct StageCount {
    pub stage: &'static str,
    pub total: usize,
    pub l: usize,
    pub s: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub total_found: usize,
    pub fetched: usize,
    pub skipped_windows: Vec<usize>,
    pub stages: Vec<StageCount>,
    pub written: WrittenCounts,
    pub outdir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DryRunResult {
    pub total_found: usize,
    pub planned_windows: usize,
}

/// Ties the pieces together: fetch, filter chain, per-stage statistics,
/// FASTA output, and the summary report. Generic over the record source so
/// tests can substitute a mock archive.
pub struct App<S: RecordSource> {
    source: S,
    orchestrator: FetchOrchestrator,
}

impl<S: RecordSource> App<S> {
    pub fn new(source: S, orchestrator: FetchOrchestrator) -> Self {
        Self {
            source,
            orchestrator,
        }
    }

    pub fn dry_run(&self) -> Result<DryRunResult, LassaError> {
        let session = self.orchestrator.probe(&self.source, LASSA_SEARCH_TERM)?;
        Ok(DryRunResult {
            total_found: session.count,
            planned_windows: session.count.div_ceil(crate::fetch::BATCH_SIZE),
        })
    }

    pub fn run(&self, config: &ResolvedConfig) -> Result<RunResult, LassaError> {
        let outcome = self.orchestrator.run(&self.source, LASSA_SEARCH_TERM)?;
        tracing::info!(
            fetched = outcome.records.len(),
            skipped = outcome.skipped_windows.len(),
            "retrieval finished"
        );

        // Stats are captured per stage before any identifier rewriting; the
        // writer is the only consumer that rewrites headers.
        let fetch_stats = stats::aggregate(&outcome.records);
        let pipeline = filter::run_pipeline(&outcome.records, &config.pipeline);
        let stage_reports: Vec<StageReport> = pipeline
            .stages
            .iter()
            .map(|stage| StageReport {
                stage: stage.stage,
                stats: stats::aggregate(&stage.collection),
            })
            .collect();
        for report in &stage_reports {
            tracing::info!(stage = report.stage, total = report.stats.total, "stage complete");
        }

        let writer = SequenceWriter::new(config.outdir.clone());
        let written = writer.write_all(pipeline.final_collection())?;

        let summary = report::render_summary(
            outcome.total_found,
            &outcome.skipped_windows,
            &fetch_stats,
            &stage_reports,
            &written,
        );
        report::write_summary(&config.outdir, &summary)?;

        Ok(RunResult {
            total_found: outcome.total_found,
            fetched: outcome.records.len(),
            skipped_windows: outcome.skipped_windows,
            stages: stage_reports
                .iter()
                .map(|report| StageCount {
                    stage: report.stage,
                    total: report.stats.total,
                    l: report.stats.segments.l,
                    s: report.stats.segments.s,
                    unknown: report.stats.segments.unknown,
                })
                .collect(),
            written,
            outdir: config.outdir.to_string(),
        })
    }
}
