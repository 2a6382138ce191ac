use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use lassaseq::app::{App, RunResult};
use lassaseq::config::CuratorConfig;
use lassaseq::entrez::EntrezHttpClient;
use lassaseq::error::LassaError;
use lassaseq::fetch::FetchOrchestrator;
use lassaseq::filter::{GenomeMode, HostMode, MetadataMode};
use lassaseq::output::JsonOutput;
use lassaseq::report::SUMMARY_FILE;

#[derive(Parser)]
#[command(name = "lassaseq")]
#[command(about = "Download and curate Lassa virus sequences from NCBI")]
#[command(version, author)]
struct Cli {
    /// Output directory for FASTA files and the summary report
    #[arg(short, long)]
    outdir: Utf8PathBuf,

    /// Genome completeness filter
    #[arg(long, value_enum, default_value = "none")]
    genome_filter: GenomeMode,

    /// Minimum completeness percentage (with --genome-filter min-percent)
    #[arg(long)]
    min_completeness: Option<f64>,

    /// Host organism filter
    #[arg(long, value_enum, default_value = "none")]
    host_filter: HostMode,

    /// Metadata completeness filter
    #[arg(long, value_enum, default_value = "none")]
    metadata_filter: MetadataMode,

    /// Restrict output to these countries (any common spelling)
    #[arg(long, num_args = 1..)]
    countries: Option<Vec<String>>,

    /// File of accessions to remove, one per line, # comments allowed
    #[arg(long)]
    remove: Option<PathBuf>,

    /// Print the run result as JSON instead of a plain summary
    #[arg(long)]
    json: bool,

    /// Search only: report the total count and planned batch windows
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(lassa) = report.downcast_ref::<LassaError>() {
            return ExitCode::from(map_exit_code(lassa));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &LassaError) -> u8 {
    match error {
        LassaError::MissingThreshold
        | LassaError::UnexpectedThreshold
        | LassaError::InvalidThreshold(_)
        | LassaError::ExclusionRead(_) => 2,
        LassaError::EntrezHttp(_)
        | LassaError::EntrezStatus { .. }
        | LassaError::SearchFailed(_)
        | LassaError::GenbankParse(_) => 3,
        LassaError::Cancelled => 130,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CuratorConfig {
        outdir: cli.outdir,
        genome_mode: cli.genome_filter,
        completeness_threshold: cli.min_completeness,
        host_mode: cli.host_filter,
        metadata_mode: cli.metadata_filter,
        countries: cli.countries,
        exclusion_list: cli.remove,
    }
    .resolve()
    .into_diagnostic()?;

    let source = EntrezHttpClient::new().into_diagnostic()?;
    let app = App::new(source, FetchOrchestrator::new());

    if cli.dry_run {
        let probe = app.dry_run().into_diagnostic()?;
        if cli.json {
            JsonOutput::print_dry_run(&probe).into_diagnostic()?;
        } else {
            println!(
                "Found {} sequences ({} batch windows); nothing fetched (--dry-run)",
                probe.total_found, probe.planned_windows
            );
        }
        return Ok(());
    }

    let result = app.run(&config).into_diagnostic()?;
    if cli.json {
        JsonOutput::print_run(&result).into_diagnostic()?;
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &RunResult) {
    println!(
        "Fetched {} of {} sequences",
        result.fetched, result.total_found
    );
    if !result.skipped_windows.is_empty() {
        println!(
            "Skipped {} batch window(s) after exhausted retries",
            result.skipped_windows.len()
        );
    }
    for stage in &result.stages {
        println!(
            "  after {:<12} {} records (L={}, S={}, Unknown={})",
            stage.stage, stage.total, stage.l, stage.s, stage.unknown
        );
    }
    println!(
        "Wrote {} L, {} S, and {} unknown segments to {}",
        result.written.l, result.written.s, result.written.unknown, result.outdir
    );
    println!("Summary report: {}/{}", result.outdir, SUMMARY_FILE);
}
