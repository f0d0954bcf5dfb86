use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageBuffer, ImageReader, Rgb, RgbImage};
use log::debug;

use crate::codec::write_ppm;
use crate::error::ContourError;

pub const CONTOUR_CONFIG_COUNT: usize = 16;

/// The sixteen marching-squares tiles, indexed by configuration code.
///
/// Immutable once built; workers share it by reference.
pub struct TileLibrary {
    tiles: Vec<RgbImage>,
    width: usize,
    height: usize,
}

/// `<dir>/<index>.ppm`
pub fn tile_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.ppm", index))
}

impl TileLibrary {
    /// Load `0.ppm` .. `15.ppm` from `dir`. Every tile must decode and share one size.
    pub fn load(dir: &Path) -> Result<Self, ContourError> {
        let mut tiles = Vec::with_capacity(CONTOUR_CONFIG_COUNT);
        for k in 0..CONTOUR_CONFIG_COUNT {
            let path = tile_path(dir, k);
            let decoded = ImageReader::open(&path)
                .map_err(image::ImageError::IoError)
                .and_then(|r| r.with_guessed_format().map_err(image::ImageError::IoError))
                .and_then(|r| r.decode());
            let img = decoded.map_err(|source| ContourError::TileLoad { path: path.clone(), source })?;
            debug!("Loaded contour tile {} ({}x{})", path.display(), img.width(), img.height());
            tiles.push(img.to_rgb8());
        }
        Self::from_tiles(tiles)
    }

    pub fn from_tiles(tiles: Vec<RgbImage>) -> Result<Self, ContourError> {
        if tiles.len() != CONTOUR_CONFIG_COUNT {
            return Err(ContourError::TileCount(tiles.len()));
        }
        let (w, h) = tiles[0].dimensions();
        for (index, t) in tiles.iter().enumerate() {
            let (tw, th) = t.dimensions();
            if (tw, th) != (w, h) || tw == 0 || th == 0 {
                return Err(ContourError::TileSizeMismatch { index, found_w: tw, found_h: th, expected_w: w, expected_h: h });
            }
        }
        Ok(Self { tiles, width: w as usize, height: h as usize })
    }

    /// Tile width in pixels, i.e. the horizontal sampling step.
    pub fn tile_width(&self) -> usize { self.width }
    /// Tile height in pixels, i.e. the vertical sampling step.
    pub fn tile_height(&self) -> usize { self.height }

    pub fn tile(&self, code: u8) -> &RgbImage { &self.tiles[code as usize] }

    /// Raw RGB bytes of pixel row `ty` of tile `code`.
    #[inline]
    pub fn tile_row(&self, code: u8, ty: usize) -> &[u8] {
        let stride = self.width * 3;
        &self.tiles[code as usize].as_raw()[ty * stride..(ty + 1) * stride]
    }

    /// Write every tile as `<dir>/<index>.ppm`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (k, t) in self.tiles.iter().enumerate() {
            let path = tile_path(dir, k);
            write_ppm(t, &path)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge { Top, Right, Bottom, Left }

// Segments joining edge midpoints for each configuration. Saddles (5, 10) cut off the
// two "inside" corners separately.
fn segments(code: u8) -> &'static [(Edge, Edge)] {
    use Edge::*;
    match code {
        1 | 14 => &[(Left, Bottom)],
        2 | 13 => &[(Bottom, Right)],
        3 | 12 => &[(Left, Right)],
        4 | 11 => &[(Top, Right)],
        5 => &[(Top, Right), (Left, Bottom)],
        6 | 9 => &[(Top, Bottom)],
        7 | 8 => &[(Left, Top)],
        10 => &[(Left, Top), (Bottom, Right)],
        _ => &[],
    }
}

fn midpoint(edge: Edge, w: usize, h: usize) -> (f32, f32) {
    let (xm, ym) = ((w - 1) as f32 / 2.0, (h - 1) as f32 / 2.0);
    match edge {
        Edge::Top => (xm, 0.0),
        Edge::Right => ((w - 1) as f32, ym),
        Edge::Bottom => (xm, (h - 1) as f32),
        Edge::Left => (0.0, ym),
    }
}

fn draw_line(img: &mut RgbImage, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as usize;
    for s in 0..=steps {
        let t = s as f32 / steps as f32;
        let x = (from.0 + (to.0 - from.0) * t).round() as u32;
        let y = (from.1 + (to.1 - from.1) * t).round() as u32;
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

/// Standard tile set: white background with black segments between edge midpoints.
pub fn generate_default_tiles(step_x: usize, step_y: usize) -> Result<TileLibrary, ContourError> {
    if step_x == 0 || step_y == 0 {
        return Err(ContourError::InvalidConfig(format!("tile size must be positive, got {}x{}", step_x, step_y)));
    }
    let white = Rgb([255, 255, 255]);
    let black = Rgb([0, 0, 0]);
    let tiles = (0..CONTOUR_CONFIG_COUNT as u8)
        .map(|code| {
            let mut img: RgbImage = ImageBuffer::from_pixel(step_x as u32, step_y as u32, white);
            for &(a, b) in segments(code) {
                draw_line(&mut img, midpoint(a, step_x, step_y), midpoint(b, step_x, step_y), black);
            }
            img
        })
        .collect();
    TileLibrary::from_tiles(tiles)
}
