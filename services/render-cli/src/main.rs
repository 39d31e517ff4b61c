//! Field animation renderer.
//!
//! Reads a render job, samples its layers onto the canvas and writes the
//! frames as PNG or GIF.

use anyhow::{Context, Result};
use clap::Parser;
use render_cli::{run_job, RenderJob, RenderTargets};
use renderer::config::StyleDocument;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "render-cli")]
#[command(about = "Render gridded fields to indexed PNG stills and GIF animations")]
struct Args {
    /// Render job file (YAML or JSON)
    job: PathBuf,

    /// Style document used by jobs that name a style
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Output image; the extension picks the format
    #[arg(short, long, default_value = "out.gif")]
    output: PathBuf,

    /// Also write a legend PNG here
    #[arg(long)]
    legend: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let job = RenderJob::from_file(&args.job)?;
    let base = args.job.parent().unwrap_or_else(|| Path::new("."));
    info!(job = %args.job.display(), frames = job.frames.len(), "Loaded render job");

    let styles = match &args.style {
        Some(path) => Some(
            StyleDocument::from_file(path).with_context(|| format!("Failed to load styles {}", path.display()))?,
        ),
        None => None,
    };

    let targets = RenderTargets {
        output: args.output,
        legend: args.legend,
    };
    let summary = run_job(&job, base, styles.as_ref(), &targets)?;
    info!(frames = summary.frames, bytes = summary.bytes, "Done");
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
