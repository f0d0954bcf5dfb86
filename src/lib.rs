use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use image::{ImageReader, RgbImage};
use log::info;

pub mod bicubic;
pub mod codec;
pub mod error;
pub mod grid;
pub mod partition;
pub mod pipeline;
pub mod raster;
pub mod tiles;

pub use error::ContourError;
pub use grid::SampleGrid;
pub use pipeline::{run, should_rescale, PipelineOutput};
pub use tiles::{generate_default_tiles, TileLibrary};

pub const STEP: usize = 8;
pub const SIGMA: u8 = 200;
pub const RESCALE_X: usize = 2048;
pub const RESCALE_Y: usize = 2048;
pub const MAX_THREADS: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    /// Horizontal sampling step, also the tile width.
    pub step_x: usize,
    /// Vertical sampling step, also the tile height.
    pub step_y: usize,
    pub sigma: u8,
    pub canonical_width: usize,
    pub canonical_height: usize,
    pub num_threads: usize,
    pub contours_dir: PathBuf,
    pub phase_timings: bool,
}

pub fn default_config() -> Config {
    Config {
        step_x: STEP,
        step_y: STEP,
        sigma: SIGMA,
        canonical_width: RESCALE_X,
        canonical_height: RESCALE_Y,
        num_threads: num_cpus::get().clamp(1, MAX_THREADS),
        contours_dir: PathBuf::from("./contours"),
        phase_timings: false,
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ContourError> {
        if self.step_x == 0 || self.step_y == 0 {
            return Err(ContourError::InvalidConfig(format!("sampling step must be positive, got {}x{}", self.step_x, self.step_y)));
        }
        if self.canonical_width < 2 || self.canonical_height < 2 {
            return Err(ContourError::InvalidConfig(format!(
                "canonical resolution must be at least 2x2, got {}x{}",
                self.canonical_width, self.canonical_height
            )));
        }
        if self.num_threads == 0 || self.num_threads > MAX_THREADS {
            return Err(ContourError::InvalidConfig(format!("thread count must be in 1..={}, got {}", MAX_THREADS, self.num_threads)));
        }
        Ok(())
    }
}

/// Parse a worker count, accepting `1..=MAX_THREADS`.
pub fn parse_thread_count(s: &str) -> Result<usize, String> {
    let n: usize = s.trim().parse().map_err(|_| format!("`{}` is not a thread count", s))?;
    if n == 0 || n > MAX_THREADS {
        return Err(format!("thread count must be in 1..={}, got {}", MAX_THREADS, n));
    }
    Ok(n)
}

#[derive(Debug, Clone)]
pub struct Params {
    pub in_image_name: String,
    pub out_image_name: String,
    pub config: Config,
}

/// Contour an in-memory image with an already loaded tile set.
pub fn process_image(img: &RgbImage, tiles: &TileLibrary, config: &Config) -> Result<RgbImage> {
    let out = run(img, tiles, config)?;
    Ok(out.image)
}

/// File-to-file run: decode, contour, encode.
pub fn process(params: Params) -> Result<()> {
    let Params { in_image_name, out_image_name, config } = params;
    info!("Starting marching contours");
    info!("Input image: {}", in_image_name);
    info!("Output image: {}", out_image_name);
    info!("Threads: {}, step: {}x{}, sigma: {}", config.num_threads, config.step_x, config.step_y, config.sigma);
    config.validate()?;

    let start = Instant::now();
    let tiles = TileLibrary::load(&config.contours_dir)
        .with_context(|| format!("loading contour tiles from {}", config.contours_dir.display()))?;
    let image = ImageReader::open(&in_image_name)
        .with_context(|| format!("opening {}", in_image_name))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("decoding {}", in_image_name))?
        .to_rgb8();

    let out = run(&image, &tiles, &config)?;
    codec::write_image(&out.image, Path::new(&out_image_name))?;
    info!("Final output saved ({} ms)", start.elapsed().as_millis());

    drop(tiles);
    drop(out);
    drop(image);
    Ok(())
}
