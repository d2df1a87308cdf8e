//! Count Federal Register documents per CFR agency.

mod loader;
mod progress;
mod report;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use regtally_client::{ClientConfig, CountFetcher};
use regtally_core::{CountMap, validate_matching};
use regtally_count::{NoProgress, ReconcileObserver, Reconciler};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::loader::AgencyStats;
use crate::progress::ConsoleProgress;
use crate::report::ReportWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
    Summary,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Csv => write!(f, "csv"),
            Format::Json => write!(f, "json"),
            Format::Summary => write!(f, "summary"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "regtally",
    version,
    about = "Count Federal Register documents per CFR agency"
)]
struct Cli {
    /// Path to the agencies CSV file.
    agencies_file: PathBuf,

    /// Output directory for reports.
    #[arg(short, long, default_value = "./results", env = "REGTALLY_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Report formats to generate.
    #[arg(short, long, value_enum, num_args = 1.., default_values_t = [Format::Csv, Format::Json])]
    format: Vec<Format>,

    /// Base filename for reports; a timestamped name is used otherwise.
    #[arg(long)]
    filename: Option<String>,

    /// Federal Register API base URL.
    #[arg(
        long,
        default_value = "https://www.federalregister.gov/api/v1",
        env = "REGTALLY_API_URL"
    )]
    api_url: String,

    /// API rate limit in requests per second; zero disables pacing.
    #[arg(long, default_value_t = 1.0, env = "REGTALLY_RATE_LIMIT")]
    rate_limit: f64,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30, env = "REGTALLY_TIMEOUT")]
    timeout: u64,

    /// Maximum retries for failed requests.
    #[arg(long, default_value_t = 3, env = "REGTALLY_MAX_RETRIES")]
    max_retries: u32,

    /// Backoff multiplier between retries.
    #[arg(long, default_value_t = 2.0, env = "REGTALLY_BACKOFF_FACTOR")]
    backoff_factor: f64,

    /// Process only active agencies.
    #[arg(long)]
    active_only: bool,

    /// Include agencies without a CFR citation.
    #[arg(long)]
    all_agencies: bool,

    /// Limit processing to the first N agencies.
    #[arg(long)]
    limit: Option<usize>,

    /// Validate configuration and the agency list without calling the API.
    #[arg(long)]
    dry_run: bool,

    /// Progress update interval, in percent of agencies processed.
    #[arg(long, default_value_t = 10.0)]
    progress_interval: f64,

    /// Verbose logging.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress progress output and informational logging.
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(args: &Cli) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(&args);
    info!(version = env!("CARGO_PKG_VERSION"), "regtally starting");

    let mut agencies = loader::load_agencies(&args.agencies_file)?;
    if !args.all_agencies {
        agencies = loader::with_cfr_citation(agencies);
    }
    if args.active_only {
        agencies = loader::active_only(agencies);
    }
    if let Some(limit) = args.limit {
        agencies.truncate(limit);
        info!(agencies = agencies.len(), "limited agency list");
    }
    anyhow::ensure!(!agencies.is_empty(), "no agencies to process after filtering");

    let stats = AgencyStats::collect(&agencies);
    info!(
        total = stats.total,
        active = stats.active,
        with_cfr = stats.with_cfr,
        "agency statistics"
    );

    let config = ClientConfig {
        base_url: args.api_url.clone(),
        rate_limit: args.rate_limit,
        timeout: Duration::from_secs(args.timeout),
        max_retries: args.max_retries,
        backoff_factor: args.backoff_factor,
        ..ClientConfig::default()
    };
    config.validate().context("invalid client configuration")?;

    if args.dry_run {
        // An empty count map still surfaces duplicate and empty slugs.
        for issue in validate_matching(&agencies, &CountMap::new()) {
            println!("issue: {issue}");
        }
        println!("Dry run: would process {} agencies", agencies.len());
        return Ok(());
    }

    let fetcher = CountFetcher::from_config(&config)?;
    let observer: Box<dyn ReconcileObserver> = if args.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(ConsoleProgress::new(args.progress_interval))
    };
    let mut reconciler = Reconciler::new(fetcher, observer);

    let summary = tokio::select! {
        summary = reconciler.reconcile(&agencies) => summary,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            std::process::exit(130);
        }
    };

    let writer = ReportWriter::new(&args.output_dir)?;
    let base = args
        .filename
        .clone()
        .unwrap_or_else(report::default_base_name);
    let mut written = Vec::new();
    for format in &args.format {
        if written.contains(format) {
            continue;
        }
        written.push(*format);
        let path = match format {
            Format::Csv => writer.write_csv(&summary, Some(&format!("{base}.csv")))?,
            Format::Json => writer.write_json(&summary, Some(&format!("{base}.json")))?,
            Format::Summary => {
                writer.write_summary(&summary, Some(&format!("{base}_summary.txt")))?
            }
        };
        println!("{format} report saved to: {}", path.display());
    }

    if !args.quiet {
        println!("{}", summary.overview());
    }
    anyhow::ensure!(
        summary.succeeded > 0 || summary.total == 0,
        "every agency lookup failed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_documented_config() {
        let cli = Cli::parse_from(["regtally", "agencies.csv"]);
        assert_eq!(cli.rate_limit, 1.0);
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.max_retries, 3);
        assert_eq!(cli.backoff_factor, 2.0);
        assert_eq!(cli.format, [Format::Csv, Format::Json]);
        assert!(!cli.dry_run);
    }

    #[test]
    fn formats_parse_and_dedupe_later() {
        let cli = Cli::parse_from(["regtally", "agencies.csv", "--format", "summary", "csv"]);
        assert_eq!(cli.format, [Format::Summary, Format::Csv]);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["regtally", "agencies.csv", "-v", "-q"]);
        assert!(result.is_err());
    }
}
