//! Solid cells of the simulated surface.

use glam::DVec2;

/// Boolean occupancy per integer cell, row-major. Anything off the surface reads as wall.
#[derive(Clone, Debug, PartialEq)]
pub struct WallMap {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl WallMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(x as usize + y as usize * self.width)
    }

    pub fn is_wall_cell(&self, x: i64, y: i64) -> bool {
        match self.index(x, y) {
            Some(i) => self.cells[i],
            None => true,
        }
    }

    /// Coordinates truncate towards zero, so `-0.5` lands in column 0.
    pub fn is_wall(&self, posit: DVec2) -> bool {
        self.is_wall_cell(posit.x as i64, posit.y as i64)
    }

    /// Out-of-bounds edits are ignored. Returns whether a cell was written.
    pub fn set(&mut self, x: i64, y: i64, on: bool) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = on;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Number of occupied cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    /// A map of the new size, keeping whatever rows and columns overlap with this one.
    pub fn resized(&self, width: usize, height: usize) -> Self {
        let mut result = Self::new(width, height);

        let w = self.width.min(width);
        for y in 0..self.height.min(height) {
            let src = y * self.width;
            let dest = y * width;
            result.cells[dest..dest + w].copy_from_slice(&self.cells[src..src + w]);
        }

        result
    }
}
