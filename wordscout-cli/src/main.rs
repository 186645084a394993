use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wordscout::{
    analyze,
    config::{DEFAULT_COUNTER_COUNT, DEFAULT_WORKER_COUNT},
    AnalysisConfig, AnalysisReport, EncodingMode,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliAnalyzeConfig {
    /// Root directory to analyze
    #[arg(short = 'd', long, default_value = ".")]
    root: PathBuf,

    /// File extensions to include (e.g. txt,md)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of file workers (capped at 10)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Number of chunk counters per file
    #[arg(short = 'k', long)]
    counters: Option<usize>,

    /// Stopword list, one word per line (default: stopwords.txt)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// How to handle invalid UTF-8 sequences
    #[arg(long, value_enum, ignore_case = true)]
    encoding: Option<CliEncoding>,

    /// Configuration file to load on top of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write results as JSON to this file
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Show only statistics, not word lists
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliEncoding {
    /// Report files with invalid UTF-8 as failed
    #[value(name = "failfast")]
    FailFast,
    /// Replace invalid sequences and keep going
    Lossy,
}

impl From<CliEncoding> for EncodingMode {
    fn from(encoding: CliEncoding) -> Self {
        match encoding {
            CliEncoding::FailFast => EncodingMode::FailFast,
            CliEncoding::Lossy => EncodingMode::Lossy,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Count word frequencies in every matching file under a directory
    Analyze(Box<CliAnalyzeConfig>),
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            let file_config = AnalysisConfig::load_from(args.config.as_deref())?;
            let config = file_config.merge_with_cli(cli_config(&args));
            init_logging(&config.log_level);
            debug!("Effective configuration: {:?}", config);

            let report = analyze(&config)?;

            if let Some(output) = &config.output_path {
                report.write_json(output)?;
                debug!("Wrote JSON report to {}", output.display());
            }
            print_report(&report, config.stats_only);
            Ok(())
        }
    }
}

/// Builds a config from the flags alone; unset flags keep their defaults so
/// `merge_with_cli` leaves the file values in place
fn cli_config(args: &CliAnalyzeConfig) -> AnalysisConfig {
    let defaults = AnalysisConfig::default();

    let file_extensions = match &args.extensions {
        Some(e) => Some(
            e.split(',')
                .map(|s| s.trim().trim_start_matches('.').to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>(),
        ),
        None => defaults.file_extensions.clone(),
    };

    let encoding_mode = args
        .encoding
        .map(EncodingMode::from)
        .unwrap_or(defaults.encoding_mode);

    AnalysisConfig {
        root_path: args.root.clone(),
        file_extensions,
        ignore_patterns: args.ignore.clone(),
        worker_count: args.workers.unwrap_or(DEFAULT_WORKER_COUNT),
        counter_count: args.counters.unwrap_or(DEFAULT_COUNTER_COUNT),
        stopwords_path: args
            .stopwords
            .clone()
            .or_else(|| defaults.stopwords_path.clone()),
        encoding_mode,
        log_level: args.log_level.clone().unwrap_or(defaults.log_level),
        output_path: args.output.clone(),
        stats_only: args.stats,
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_report(report: &AnalysisReport, stats_only: bool) {
    for failure in &report.failures {
        eprintln!("{} {}", "error:".red(), failure);
    }

    if !stats_only {
        for file_result in &report.file_results {
            println!("{}:", file_result.file_name.blue());
            for w in file_result.sorted_words() {
                println!("\t{}: {}", w.word, w.count);
            }
        }
    }

    println!(
        "Analyzed {} files ({} failed), {} words",
        report.files_analyzed, report.files_failed, report.total_words
    );
}
