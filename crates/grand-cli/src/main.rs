mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use grand_lib::{
    io::{JsonStore, RecordingStore},
    plot_group_average, OptionValue, ViewType,
};
use render::FileBackend;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "grand",
    version,
    about = "Grand-average plots of processed EEG recordings"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Average every recording next to BASE and render the plot.
    ///
    /// Options follow as KEY VALUE pairs: xlim, ylim, electrode, ci, type, name.
    /// xlim and ylim take comma-separated numbers, e.g. `xlim -100,500`; every other value is
    /// taken verbatim.
    Plot {
        base: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        options: Vec<String>,
    },
    /// Describe one recording: channels, time range, ROI and GMFA instances
    Inspect { base: PathBuf },
}

#[derive(Serialize)]
struct PlotSummary {
    title: Option<String>,
    view: ViewType,
    selection: String,
    participants: usize,
    out: PathBuf,
}

#[derive(Serialize)]
struct RecordingInfo {
    channels: Vec<String>,
    samples: usize,
    trials: usize,
    time_range: Option<(f64, f64)>,
    roi: Vec<String>,
    gmfa: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Plot {
            base,
            out,
            config,
            width,
            height,
            options,
        } => cmd_plot(&base, &out, config.as_deref(), width, height, &options)?,
        Commands::Inspect { base } => cmd_inspect(&base)?,
    }
    Ok(())
}

fn cmd_plot(
    base: &Path,
    out: &Path,
    config: Option<&Path>,
    width: Option<u32>,
    height: Option<u32>,
    options: &[String],
) -> Result<()> {
    let cfg = match config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let mut overrides = cfg.default_pairs();
    overrides.extend(OptionValue::parse_pairs(options));
    let size = (
        width.unwrap_or(cfg.render.width),
        height.unwrap_or(cfg.render.height),
    );
    let mut backend = FileBackend::new(out, size);
    let plot = plot_group_average(base, &overrides, &JsonStore, None, &mut backend)
        .with_context(|| format!("failed to plot group of {}", base.display()))?;
    let summary = PlotSummary {
        title: plot.figure.title.clone(),
        view: plot.config.view,
        selection: plot.config.selection().to_string(),
        participants: plot.participants,
        out: out.to_path_buf(),
    };
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_inspect(base: &Path) -> Result<()> {
    let recording = JsonStore.open(base)?;
    let info = RecordingInfo {
        channels: recording.labels.clone(),
        samples: recording.sample_count(),
        trials: recording.trial_count(),
        time_range: recording.time_range(),
        roi: recording.roi.keys().cloned().collect(),
        gmfa: recording.gmfa.keys().cloned().collect(),
    };
    println!("{}", serde_json::to_string(&info)?);
    Ok(())
}
