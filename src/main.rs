// CLI entry for marching_contours
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};
use marching_contours::{default_config, parse_thread_count, process, Config, Params};

#[derive(Parser, Debug)]
#[command(name = "marching_contours", version, about = "Parallel marching-squares contour overlay")]
struct Cli {
    /// Input image path
    #[arg(value_hint = ValueHint::FilePath)]
    input: String,
    /// Output image path
    #[arg(value_hint = ValueHint::FilePath)]
    output: String,
    /// Number of worker threads
    #[arg(value_parser = parse_thread_count)]
    threads: usize,

    /// Directory holding the contour tiles 0.ppm..15.ppm
    #[arg(long = "contours", value_hint = ValueHint::DirPath)]
    contours: Option<PathBuf>,

    /// Sampling step for both axes
    #[arg(long = "step")]
    step: Option<usize>,
    /// Sampling step (x axis)
    #[arg(long = "step-x")]
    step_x: Option<usize>,
    /// Sampling step (y axis)
    #[arg(long = "step-y")]
    step_y: Option<usize>,

    /// Brightness threshold
    #[arg(long = "sigma")]
    sigma: Option<u8>,

    /// Canonical resolution for both axes
    #[arg(long = "canonical")]
    canonical: Option<usize>,
    #[arg(long = "canonical-width")]
    canonical_width: Option<usize>,
    #[arg(long = "canonical-height")]
    canonical_height: Option<usize>,

    /// Log per-phase timings (ms) for every worker
    #[arg(long = "phase-timings", action = ArgAction::SetTrue)]
    phase_timings: bool,
}

fn build_config(cli: &Cli) -> Config {
    let mut cfg = default_config();
    cfg.num_threads = cli.threads;
    if let Some(v) = &cli.contours { cfg.contours_dir = v.clone(); }
    if let Some(v) = cli.step { cfg.step_x = v; cfg.step_y = v; }
    if let Some(v) = cli.step_x { cfg.step_x = v; }
    if let Some(v) = cli.step_y { cfg.step_y = v; }
    if let Some(v) = cli.sigma { cfg.sigma = v; }
    if let Some(v) = cli.canonical { cfg.canonical_width = v; cfg.canonical_height = v; }
    if let Some(v) = cli.canonical_width { cfg.canonical_width = v; }
    if let Some(v) = cli.canonical_height { cfg.canonical_height = v; }
    if cli.phase_timings { cfg.phase_timings = true; }
    cfg
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = build_config(&cli);
    let params = Params {
        in_image_name: cli.input,
        out_image_name: cli.output,
        config: cfg,
    };
    process(params)
}
