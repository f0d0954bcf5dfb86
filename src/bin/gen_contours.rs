// Writes the standard 16-tile contour set used by marching_contours.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueHint};
use log::info;
use marching_contours::{generate_default_tiles, STEP};

#[derive(Parser, Debug)]
#[command(name = "gen_contours", version, about = "Generate marching-squares contour tiles")]
struct Cli {
    /// Output directory for 0.ppm..15.ppm
    #[arg(value_hint = ValueHint::DirPath)]
    dir: PathBuf,
    /// Tile size in pixels (both axes)
    #[arg(long = "step", default_value_t = STEP)]
    step: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let tiles = generate_default_tiles(cli.step, cli.step)?;
    tiles.save(&cli.dir)?;
    info!("Wrote 16 contour tiles ({}x{}) to {}", cli.step, cli.step, cli.dir.display());
    Ok(())
}
