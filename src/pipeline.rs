//! Barrier-gated worker pool: rescale, build the sample grid, stitch tiles.
//!
//! Every worker runs the same three phases over statically partitioned, pairwise
//! disjoint index ranges. Two full barriers separate the phases, so nothing written in
//! one phase is read by another worker before every worker has finished that phase.

use std::sync::{Barrier, OnceLock};
use std::thread;
use std::time::Instant;

use image::RgbImage;
use log::{debug, info};
use parking_lot::{Condvar, Mutex};

use crate::bicubic;
use crate::error::ContourError;
use crate::grid::{is_inside, SampleGrid};
use crate::partition::WorkerRange;
use crate::raster::{RgbSource, SharedRaster};
use crate::tiles::TileLibrary;
use crate::Config;

/// Result of one pipeline run.
pub struct PipelineOutput {
    /// The stitched working image (canonical resolution when `rescaled`).
    pub image: RgbImage,
    /// Sample grid snapshot, `grid[i][j]` in {0, 1}.
    pub grid: Vec<Vec<u8>>,
    pub rescaled: bool,
}

/// Rescale only when both dimensions strictly exceed the canonical resolution.
pub fn should_rescale(width: usize, height: usize, config: &Config) -> bool {
    width > config.canonical_width && height > config.canonical_height
}

// Released once every worker has been spawned. Workers never reach the barrier unless
// the full pool exists, otherwise a failed spawn would leave its peers parked forever.
struct StartGate {
    state: Mutex<Option<bool>>,
    cv: Condvar,
}

impl StartGate {
    fn new() -> Self { Self { state: Mutex::new(None), cv: Condvar::new() } }

    fn open(&self, go: bool) {
        *self.state.lock() = Some(go);
        self.cv.notify_all();
    }

    fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while state.is_none() {
            self.cv.wait(&mut state);
        }
        (*state).unwrap_or(false)
    }
}

struct Shared<'a> {
    num_threads: usize,
    config: &'a Config,
    rescale: bool,
    source: &'a SharedRaster,
    canonical: &'a SharedRaster,
    working: OnceLock<&'a SharedRaster>,
    grid: &'a SampleGrid,
    tiles: &'a TileLibrary,
    barrier: Barrier,
    gate: StartGate,
}

/// Run the full pipeline over `source` with `config.num_threads` workers.
pub fn run(source: &RgbImage, tiles: &TileLibrary, config: &Config) -> Result<PipelineOutput, ContourError> {
    config.validate()?;
    if tiles.tile_width() != config.step_x || tiles.tile_height() != config.step_y {
        return Err(ContourError::InvalidConfig(format!(
            "contour tiles are {}x{} but the sampling step is {}x{}",
            tiles.tile_width(),
            tiles.tile_height(),
            config.step_x,
            config.step_y
        )));
    }

    let (src_w, src_h) = (source.width() as usize, source.height() as usize);
    if src_w == 0 || src_h == 0 {
        return Err(ContourError::InvalidConfig(format!("input image is empty ({}x{})", src_w, src_h)));
    }

    // Single authoritative decision; workers and cleanup both follow it.
    let rescale = should_rescale(src_w, src_h, config);
    let (work_w, work_h) = if rescale { (config.canonical_width, config.canonical_height) } else { (src_w, src_h) };
    info!(
        "Input {}x{}, working image {}x{}{}",
        src_w,
        src_h,
        work_w,
        work_h,
        if rescale { " (bicubic rescale)" } else { "" }
    );

    let source_raster = SharedRaster::from_image(source)?;
    let canonical = SharedRaster::try_new(config.canonical_width, config.canonical_height)?;
    let grid = SampleGrid::for_image(work_w, work_h, config.step_x, config.step_y)?;
    info!("Sample grid {}x{} (rows x cols), {} workers", grid.rows(), grid.cols(), config.num_threads);

    let shared = Shared {
        num_threads: config.num_threads,
        config,
        rescale,
        source: &source_raster,
        canonical: &canonical,
        working: OnceLock::new(),
        grid: &grid,
        tiles,
        barrier: Barrier::new(config.num_threads),
        gate: StartGate::new(),
    };

    thread::scope(|s| -> Result<(), ContourError> {
        let mut handles = Vec::with_capacity(shared.num_threads);
        for id in 0..shared.num_threads {
            let shared = &shared;
            let spawned = thread::Builder::new()
                .name(format!("contour-worker-{}", id))
                .spawn_scoped(s, move || {
                    if shared.gate.wait() {
                        worker(id, shared);
                    }
                });
            match spawned {
                Ok(h) => handles.push(h),
                Err(e) => {
                    shared.gate.open(false);
                    return Err(ContourError::ThreadManagement(format!("failed to spawn worker {}: {}", id, e)));
                }
            }
        }
        shared.gate.open(true);
        // A panic before a barrier parks the other workers; this only sees late or solo panics.
        for (id, h) in handles.into_iter().enumerate() {
            h.join().map_err(|_| ContourError::ThreadManagement(format!("worker {} panicked", id)))?;
        }
        Ok(())
    })?;

    let grid_snapshot = grid.to_matrix();
    drop(shared);
    drop(grid);
    let (working, superseded) = if rescale { (canonical, source_raster) } else { (source_raster, canonical) };
    drop(superseded);
    Ok(PipelineOutput { image: working.into_image(), grid: grid_snapshot, rescaled: rescale })
}

fn worker(id: usize, shared: &Shared<'_>) {
    let timings = shared.config.phase_timings;

    let t0 = Instant::now();
    if shared.rescale {
        rescale_phase(id, shared);
    }
    // Every worker publishes the same, fully written buffer; the first store wins and
    // the rest are no-ops. Nobody reads the slot until after the barrier.
    let target = if shared.rescale { shared.canonical } else { shared.source };
    shared.working.get_or_init(|| target);
    shared.barrier.wait();
    if timings && shared.rescale {
        info!("worker {}: rescale phase {} ms", id, t0.elapsed().as_millis());
    }

    let working = match shared.working.get() {
        Some(w) => *w,
        None => target,
    };

    let t1 = Instant::now();
    build_grid_phase(id, shared, working);
    shared.barrier.wait();
    if timings {
        info!("worker {}: grid phase {} ms", id, t1.elapsed().as_millis());
    }

    let t2 = Instant::now();
    stitch_phase(id, shared, working);
    if timings {
        info!("worker {}: stitch phase {} ms", id, t2.elapsed().as_millis());
    }
}

fn rescale_phase(id: usize, shared: &Shared<'_>) {
    let (cw, ch) = (shared.canonical.width(), shared.canonical.height());
    let range = WorkerRange::for_worker(id, shared.num_threads, ch);
    debug!("worker {}: rescale rows {:?}", id, range.indices());
    let u_den = (cw - 1) as f32;
    let v_den = (ch - 1) as f32;
    for y in range.indices() {
        let v = y as f32 / v_den;
        shared.canonical.write_row(y, |row| {
            for x in 0..cw {
                let u = x as f32 / u_den;
                let px = bicubic::sample(shared.source, u, v);
                row[x * 3..x * 3 + 3].copy_from_slice(&px);
            }
        });
    }
}

fn build_grid_phase(id: usize, shared: &Shared<'_>, working: &SharedRaster) {
    let grid = shared.grid;
    let (p, q) = (grid.p(), grid.q());
    let (step_x, step_y) = (shared.config.step_x, shared.config.step_y);
    let sigma = shared.config.sigma;
    let (w, h) = (working.width(), working.height());

    let rows = WorkerRange::for_worker(id, shared.num_threads, p);
    for i in rows.indices() {
        for j in 0..q {
            grid.set(i, j, is_inside(working.rgb(j * step_x, i * step_y), sigma));
        }
    }
    grid.set(p, q, false);

    // The last sample row/column has no next step inside the image; sample the image's
    // own last column/row instead.
    for i in rows.indices() {
        grid.set(i, q, is_inside(working.rgb(w - 1, i * step_y), sigma));
    }

    let cols = WorkerRange::for_worker(id, shared.num_threads, q);
    for j in cols.indices() {
        grid.set(p, j, is_inside(working.rgb(j * step_x, h - 1), sigma));
    }
    debug!("worker {}: grid rows {:?}, bottom cols {:?}", id, rows.indices(), cols.indices());
}

fn stitch_phase(id: usize, shared: &Shared<'_>, working: &SharedRaster) {
    let grid = shared.grid;
    let tiles = shared.tiles;
    let q = grid.q();
    let (step_x, step_y) = (shared.config.step_x, shared.config.step_y);
    let tile_stride = step_x * 3;

    let rows = WorkerRange::for_worker(id, shared.num_threads, grid.p());
    let mut codes = vec![0u8; q];
    for i in rows.indices() {
        for (j, code) in codes.iter_mut().enumerate() {
            *code = grid.config_code(i, j);
        }
        for ty in 0..step_y {
            working.write_row(i * step_y + ty, |row| {
                for (j, &code) in codes.iter().enumerate() {
                    let x0 = j * step_x * 3;
                    row[x0..x0 + tile_stride].copy_from_slice(tiles.tile_row(code, ty));
                }
            });
        }
    }
}
