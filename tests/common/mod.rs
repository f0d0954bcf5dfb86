#![allow(dead_code)]

use image::{ImageBuffer, Rgb, RgbImage};
use marching_contours::{default_config, Config, TileLibrary};

/// Distinct solid color per configuration code so stitched output can be decoded.
pub fn code_color(code: u8) -> [u8; 3] {
    [code * 16, 255 - code * 16, 100 + code]
}

pub fn solid_tiles(step: usize) -> TileLibrary {
    let tiles = (0..16u8)
        .map(|k| ImageBuffer::from_pixel(step as u32, step as u32, Rgb(code_color(k))))
        .collect();
    TileLibrary::from_tiles(tiles).expect("solid tiles are well formed")
}

pub fn config(step: usize, sigma: u8, threads: usize) -> Config {
    let mut cfg = default_config();
    cfg.step_x = step;
    cfg.step_y = step;
    cfg.sigma = sigma;
    cfg.num_threads = threads;
    cfg
}

pub fn uniform(w: u32, h: u32, v: u8) -> RgbImage {
    ImageBuffer::from_pixel(w, h, Rgb([v, v, v]))
}

/// Dark squares (0) where `(x / cell + y / cell)` is even, bright (255) elsewhere.
pub fn checkerboard(w: u32, h: u32, cell: u32) -> RgbImage {
    ImageBuffer::from_fn(w, h, |x, y| if (x / cell + y / cell) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) })
}

/// Deterministic pseudo-random noise.
pub fn noise(w: u32, h: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    ImageBuffer::from_fn(w, h, |_x, _y| {
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}
