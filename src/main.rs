use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use track_link::models::{load_records, CatalogRecord, VideoRecord};
use track_link::progress::{create_spinner, format_duration, set_log_only};
use track_link::safety::validate_output_path;
use track_link::{AssignmentStrategy, Matcher, MatcherConfig, DEFAULT_THRESHOLD};

#[derive(Parser)]
#[command(name = "track-link")]
#[command(about = "Link catalog tracks to their best-matching video entries")]
struct Args {
    /// JSON array of catalog records
    catalog: PathBuf,

    /// JSON array of video records
    videos: PathBuf,

    /// Write matches here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Minimum confidence (0-100) to accept a match
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    #[arg(long, value_enum, default_value_t = AssignmentStrategy::Greedy)]
    strategy: AssignmentStrategy,

    /// Scoring threads (0 = one per core)
    #[arg(long, default_value = "0")]
    workers: usize,

    /// Write matching stats JSON to this path
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Emit the full report (matches, unmatched records, stats)
    #[arg(long)]
    report: bool,

    /// Hide the spinner for tail-friendly logs
    #[arg(long)]
    log_only: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    set_log_only(args.log_only);

    if !(0.0..=100.0).contains(&args.threshold) {
        anyhow::bail!("--threshold must be within 0-100, got {}", args.threshold);
    }

    if let Some(output) = &args.output {
        validate_output_path(output, &[&args.catalog, &args.videos])?;
    }

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    let start = Instant::now();

    let catalog: Vec<CatalogRecord> = load_records(&args.catalog)?;
    let videos: Vec<VideoRecord> = load_records(&args.videos)?;
    info!(
        catalog = catalog.len(),
        videos = videos.len(),
        "loaded records"
    );

    let matcher = Matcher::with_config(MatcherConfig {
        threshold: args.threshold,
        strategy: args.strategy,
    });

    let spinner = create_spinner("Matching");
    let report = matcher.run(&catalog, &videos);
    spinner.finish_and_clear();

    report.stats.log_phase("final");
    if let Some(path) = &args.stats {
        report.stats.write_to_file(path)?;
    }

    let json = if args.report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(&report.matches)?
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        }
    }

    info!(
        matches = report.matches.len(),
        unmatched = report.unmatched.len(),
        match_rate = %format!("{:.1}%", report.stats.match_rate()),
        elapsed = %format_duration(start.elapsed()),
        "done"
    );

    Ok(())
}
