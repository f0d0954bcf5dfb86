use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ContourError;
use crate::raster::brightness;

/// Binary sample grid of `(p + 1) x (q + 1)` cells.
///
/// Row `i` samples pixel row `i * step_y`, column `j` samples pixel column `j * step_x`.
/// Cells are atomics so disjoint workers can fill them through a shared reference; the
/// pipeline barrier provides the ordering, so all accesses are relaxed.
pub struct SampleGrid {
    rows: usize,
    cols: usize,
    cells: Vec<AtomicBool>,
}

/// `(rows, cols)` of the grid covering a `width x height` image.
pub fn grid_dims(width: usize, height: usize, step_x: usize, step_y: usize) -> (usize, usize) {
    (height / step_y + 1, width / step_x + 1)
}

/// A sample is "inside" when its channel average is at or below `sigma`.
#[inline]
pub fn is_inside(p: [u8; 3], sigma: u8) -> bool {
    brightness(p) <= sigma
}

impl SampleGrid {
    pub fn try_new(rows: usize, cols: usize) -> Result<Self, ContourError> {
        let n = rows * cols;
        let mut cells = Vec::new();
        cells.try_reserve_exact(n).map_err(|_| ContourError::Allocation { what: "sample grid", bytes: n })?;
        cells.extend((0..n).map(|_| AtomicBool::new(false)));
        Ok(Self { rows, cols, cells })
    }

    pub fn for_image(width: usize, height: usize, step_x: usize, step_y: usize) -> Result<Self, ContourError> {
        let (rows, cols) = grid_dims(width, height, step_x, step_y);
        Self::try_new(rows, cols)
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }

    /// Index of the last grid row.
    pub fn p(&self) -> usize { self.rows - 1 }
    /// Index of the last grid column.
    pub fn q(&self) -> usize { self.cols - 1 }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.cols + j].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, i: usize, j: usize, v: bool) {
        self.cells[i * self.cols + j].store(v, Ordering::Relaxed);
    }

    /// Marching-squares configuration of the cell whose top-left corner is `(i, j)`.
    ///
    /// Weights: top-left 8, top-right 4, bottom-right 2, bottom-left 1.
    pub fn config_code(&self, i: usize, j: usize) -> u8 {
        config_code(self.get(i, j), self.get(i, j + 1), self.get(i + 1, j + 1), self.get(i + 1, j))
    }

    /// Snapshot as rows of 0/1.
    pub fn to_matrix(&self) -> Vec<Vec<u8>> {
        (0..self.rows).map(|i| (0..self.cols).map(|j| self.get(i, j) as u8).collect()).collect()
    }
}

#[inline]
pub fn config_code(top_left: bool, top_right: bool, bottom_right: bool, bottom_left: bool) -> u8 {
    8 * top_left as u8 + 4 * top_right as u8 + 2 * bottom_right as u8 + bottom_left as u8
}
