use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use voltimeline::config::{Config, OutputFormat};
use voltimeline::report::{self, FramePoint};
use voltimeline::{analyze, BenchmarkRun, RunAnalysis};

/// Rebuild phase timelines and summaries from volumetric rendering benchmark runs.
#[derive(Parser)]
#[command(name = "voltimeline", about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logging verbosity level (trace, debug, info, warn, error).
    /// Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one or more benchmark run files.
    Summarize {
        /// Output format. Overrides the config file.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Benchmark run JSON files.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print version information and exit.
    Version,
}

/// Build-time version info.
mod version {
    /// Release version string (set at build time).
    pub const RELEASE: &str = env!("CARGO_PKG_VERSION");

    /// Git commit hash (set at build time via env, or "unknown").
    pub fn git_commit() -> &'static str {
        option_env!("GIT_COMMIT").unwrap_or("unknown")
    }

    /// Full version string with platform info.
    pub fn full() -> String {
        format!(
            "{} (commit: {}, {}/{})",
            RELEASE,
            git_commit(),
            std::env::consts::OS,
            std::env::consts::ARCH,
        )
    }
}

/// JSON document emitted per run.
#[derive(Serialize)]
struct RunOutput<'a> {
    path: String,
    #[serde(flatten)]
    analysis: &'a RunAnalysis,
    frames: Vec<FramePoint>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle version subcommand before anything else.
    if let Command::Version = &cli.command {
        println!("voltimeline {}", version::full());
        return Ok(());
    }

    let cfg = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    // Initialize tracing.
    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let filter = EnvFilter::try_new(log_level)
        .with_context(|| format!("invalid log level: {log_level}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Summarize { format, files } => {
            let format = format.unwrap_or(cfg.output.format);
            summarize_files(&cfg, format, &files)
        }
        Command::Version => Ok(()),
    }
}

/// Analyze every file, isolating per-run failures unless `fail_fast` is set.
fn summarize_files(cfg: &Config, format: OutputFormat, files: &[PathBuf]) -> Result<()> {
    info!(
        version = version::RELEASE,
        runs = files.len(),
        "starting voltimeline",
    );

    let mut failed = 0usize;

    for path in files {
        match summarize_file(cfg, format, path) {
            Ok(output) => println!("{output}"),
            Err(e) => {
                if cfg.fail_fast {
                    return Err(e);
                }
                error!(path = %path.display(), error = %format!("{e:#}"), "skipping run");
                failed += 1;
            }
        }
    }

    info!(runs = files.len(), failed, "voltimeline done");

    if failed > 0 {
        bail!("{failed} of {} runs failed", files.len());
    }

    Ok(())
}

fn summarize_file(cfg: &Config, format: OutputFormat, path: &Path) -> Result<String> {
    let run = BenchmarkRun::load(path, cfg.max_run_file_size)
        .with_context(|| format!("loading run {}", path.display()))?;

    let analysis = analyze(&run).with_context(|| format!("analyzing run {}", path.display()))?;

    info!(
        path = %path.display(),
        mode = %analysis.summary.mode(),
        phases = analysis.timeline.phases().len(),
        "run analyzed",
    );

    match format {
        OutputFormat::Text => Ok(report::render_text(
            &analysis,
            &run,
            cfg.ignore_first_n_frametimes,
        )),
        OutputFormat::Json => {
            let output = RunOutput {
                path: path.display().to_string(),
                analysis: &analysis,
                frames: report::frame_series(&run, cfg.ignore_first_n_frametimes),
            };
            let json = if cfg.output.pretty_json {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            };
            json.context("serializing run analysis")
        }
    }
}
