use image::{ImageBuffer, Rgb, RgbImage};
use parking_lot::RwLock;

use crate::error::ContourError;

/// Read access to an 8-bit RGB raster, shared by the sampler and the grid builder.
pub trait RgbSource {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn rgb(&self, x: usize, y: usize) -> [u8; 3];
}

impl RgbSource for RgbImage {
    fn width(&self) -> usize { self.dimensions().0 as usize }
    fn height(&self) -> usize { self.dimensions().1 as usize }
    fn rgb(&self, x: usize, y: usize) -> [u8; 3] { self.get_pixel(x as u32, y as u32).0 }
}

/// Row-major RGB raster whose rows can be written from several workers at once.
///
/// Each pixel row sits behind its own lock. Workers only ever write rows inside their own
/// range, so the locks are uncontended within a phase; the phase barrier orders writes
/// from one phase before reads in the next.
pub struct SharedRaster {
    width: usize,
    height: usize,
    rows: Vec<RwLock<Vec<u8>>>,
}

fn alloc_row(len: usize) -> Result<Vec<u8>, ContourError> {
    let mut row = Vec::new();
    row.try_reserve_exact(len).map_err(|_| ContourError::Allocation { what: "raster row", bytes: len })?;
    row.resize(len, 0);
    Ok(row)
}

impl SharedRaster {
    /// Black raster of the given size. Allocation failures are reported, not aborted on.
    pub fn try_new(width: usize, height: usize) -> Result<Self, ContourError> {
        let mut rows = Vec::new();
        rows.try_reserve_exact(height).map_err(|_| ContourError::Allocation {
            what: "raster row table",
            bytes: height * std::mem::size_of::<RwLock<Vec<u8>>>(),
        })?;
        for _ in 0..height {
            rows.push(RwLock::new(alloc_row(width * 3)?));
        }
        Ok(Self { width, height, rows })
    }

    pub fn from_image(img: &RgbImage) -> Result<Self, ContourError> {
        let (w, h) = img.dimensions();
        let (w, h) = (w as usize, h as usize);
        let raw = img.as_raw();
        let mut rows = Vec::new();
        rows.try_reserve_exact(h).map_err(|_| ContourError::Allocation {
            what: "raster row table",
            bytes: h * std::mem::size_of::<RwLock<Vec<u8>>>(),
        })?;
        for y in 0..h {
            let mut row = alloc_row(w * 3)?;
            row.copy_from_slice(&raw[y * w * 3..(y + 1) * w * 3]);
            rows.push(RwLock::new(row));
        }
        Ok(Self { width: w, height: h, rows })
    }

    /// Run `f` with exclusive access to pixel row `y` (3 bytes per pixel).
    pub fn write_row<R>(&self, y: usize, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut row = self.rows[y].write();
        f(&mut row)
    }

    pub fn into_image(self) -> RgbImage {
        let (w, h) = (self.width, self.height);
        let mut raw = Vec::with_capacity(w * h * 3);
        for row in self.rows {
            raw.extend_from_slice(&row.into_inner());
        }
        ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w as u32, h as u32, raw)
            .expect("raster rows are fixed at width * 3 bytes, so the buffer is width * height * 3")
    }
}

impl RgbSource for SharedRaster {
    fn width(&self) -> usize { self.width }
    fn height(&self) -> usize { self.height }
    fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let row = self.rows[y].read();
        [row[x * 3], row[x * 3 + 1], row[x * 3 + 2]]
    }
}

/// Channel average with integer division, as used by the sigma test.
#[inline]
pub fn brightness(p: [u8; 3]) -> u8 {
    ((p[0] as u16 + p[1] as u16 + p[2] as u16) / 3) as u8
}
