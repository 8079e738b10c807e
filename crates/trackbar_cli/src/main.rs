use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackbar_core::{init_native_scrollbar_width, ScrollDirection, TrackGeometry, ViewportMetrics};
use trackbar_cli::config::resolve_container_config;
use trackbar_cli::{run_loaded_scenario, Scenario};

#[derive(Parser)]
#[command(name = "trackbar")]
#[command(author, version, about = "Custom scrollbar geometry and interaction runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON interaction scenario against the headless host
    Run {
        /// Scenario file
        scenario: PathBuf,
        /// Container settings (TOML), overriding the scenario's own
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Also write the JSON report to this relative path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute track and thumb geometry for one axis
    Geometry {
        /// Visible extent (client height or width)
        #[arg(long)]
        visible: f32,
        /// Content extent (scroll height or width)
        #[arg(long)]
        total: f32,
        /// Scroll offset
        #[arg(long, default_value_t = 0.0)]
        scroll: f32,
        /// vertical, horizontal or both
        #[arg(short, long, default_value = "vertical")]
        direction: ScrollDirection,
        /// Native scrollbar width; the platform value (0 headless) if omitted
        #[arg(long)]
        scrollbar_width: Option<f32>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct GeometryReport {
    direction: ScrollDirection,
    visible: f32,
    total: f32,
    scroll: f32,
    scrollbar_width: f32,
    track_size: f32,
    thumb_size: f32,
    thumb_offset: f32,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            format,
            output,
        } => run(scenario, config, format, output),
        Commands::Geometry {
            visible,
            total,
            scroll,
            direction,
            scrollbar_width,
            format,
        } => {
            let width = scrollbar_width.unwrap_or_else(|| init_native_scrollbar_width(|| None));
            geometry(visible, total, scroll, direction, width, format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run(
    scenario_path: PathBuf,
    config_path: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let scenario = Scenario::from_path(&scenario_path)?;
    let config = resolve_container_config(config_path.as_deref(), &scenario)?;
    let outcome = run_loaded_scenario(&scenario, config)
        .with_context(|| format!("Scenario {} aborted", scenario_path.display()))?;
    let report = outcome.report();

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => stdout.write_all(report.render_text().as_bytes())?,
        OutputFormat::Json => report.write_json(&mut stdout)?,
    }
    if let Some(path) = output {
        report.write_to_path(&path)?;
        tracing::info!("report written to {}", path.display());
    }

    Ok(if outcome.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn geometry(
    visible: f32,
    total: f32,
    scroll: f32,
    direction: ScrollDirection,
    scrollbar_width: f32,
    format: OutputFormat,
) -> Result<()> {
    let geometry = TrackGeometry::new(scrollbar_width);
    let thumb = geometry
        .thumb(ViewportMetrics::new(visible, total), scroll, direction)
        .context("Cannot compute thumb geometry")?;
    let report = GeometryReport {
        direction,
        visible,
        total,
        scroll,
        scrollbar_width: geometry.scrollbar_width(),
        track_size: geometry.track_size(visible, direction),
        thumb_size: thumb.size,
        thumb_offset: thumb.offset,
    };

    match format {
        OutputFormat::Text => {
            println!("track   {}", report.track_size);
            println!("thumb   size={} offset={}", report.thumb_size, report.thumb_offset);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
