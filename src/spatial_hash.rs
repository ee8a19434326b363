//! Uniform-grid bucketing of particles, for neighbor search.
//!
//! Each cell holds the index of its first particle; `next` chains the rest. Both are plain index
//! arrays, and the whole structure is rebuilt from scratch every substep, so no index can outlive
//! the particle array it was built from.

use glam::DVec2;

use crate::{config::CELL_SHIFT, particle::Particle};

/// Marks the end of a cell's chain.
pub const NO_PARTICLE: usize = usize::MAX;

#[derive(Clone, Debug)]
pub struct SpatialHash {
    cols: usize,
    rows: usize,
    cell_heads: Vec<usize>,
    next: Vec<usize>,
}

/// Grid coordinate of a surface coordinate. Unclamped.
fn cell_coord(v: f64) -> i64 {
    (v as i64) >> CELL_SHIFT
}

impl SpatialHash {
    /// `capacity` pre-sizes the chain array; it grows if more particles show up.
    pub fn new(width: usize, height: usize, capacity: usize) -> Self {
        let mut result = Self {
            cols: 0,
            rows: 0,
            cell_heads: Vec::new(),
            next: vec![NO_PARTICLE; capacity],
        };
        result.resize(width, height);
        result
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.cols = (width >> CELL_SHIFT) + 1;
        self.rows = (height >> CELL_SHIFT) + 1;
        self.cell_heads = vec![NO_PARTICLE; self.cols * self.rows];
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The cell a position buckets into, clamped onto the grid.
    pub fn cell_index(&self, posit: DVec2) -> usize {
        let gx = cell_coord(posit.x).clamp(0, self.cols as i64 - 1) as usize;
        let gy = cell_coord(posit.y).clamp(0, self.rows as i64 - 1) as usize;
        gx + gy * self.cols
    }

    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.cell_heads.fill(NO_PARTICLE);

        if self.next.len() < particles.len() {
            self.next.resize(particles.len(), NO_PARTICLE);
        }

        for (i, particle) in particles.iter().enumerate() {
            let cell = self.cell_index(particle.posit);
            self.next[i] = self.cell_heads[cell];
            self.cell_heads[cell] = i;
        }
    }

    /// Particle indices bucketed in one cell. Order is unspecified.
    pub fn cell(&self, cell: usize) -> CellIter<'_> {
        CellIter {
            next: &self.next,
            current: self.cell_heads.get(cell).copied().unwrap_or(NO_PARTICLE),
        }
    }

    /// Visits every particle in the 3×3 block of cells around `posit`, including the particle at
    /// `posit` itself if it's in the grid. Columns are the outer loop.
    pub fn for_each_near(&self, posit: DVec2, mut f: impl FnMut(usize)) {
        let gx = cell_coord(posit.x);
        let gy = cell_coord(posit.y);

        let x_start = (gx - 1).max(0);
        let x_end = (gx + 1).min(self.cols as i64 - 1);
        let y_start = (gy - 1).max(0);
        let y_end = (gy + 1).min(self.rows as i64 - 1);

        for x in x_start..=x_end {
            for y in y_start..=y_end {
                for j in self.cell(x as usize + y as usize * self.cols) {
                    f(j);
                }
            }
        }
    }
}

pub struct CellIter<'a> {
    next: &'a [usize],
    current: usize,
}

impl Iterator for CellIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.current == NO_PARTICLE {
            return None;
        }
        let result = self.current;
        self.current = self.next[result];
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particles_at(posits: &[(f64, f64)]) -> Vec<Particle> {
        posits
            .iter()
            .map(|&(x, y)| Particle::new(DVec2::new(x, y)))
            .collect()
    }

    #[test]
    fn grid_dims_follow_surface() {
        let grid = SpatialHash::new(100, 50, 16);
        assert_eq!(grid.cols(), 26);
        assert_eq!(grid.rows(), 13);
    }

    #[test]
    fn rebuild_buckets_by_cell() {
        let mut grid = SpatialHash::new(16, 16, 4);
        let particles = particles_at(&[(1., 1.), (3.9, 2.), (4.1, 1.), (15., 15.)]);
        grid.rebuild(&particles);

        let mut first: Vec<usize> = grid.cell(0).collect();
        first.sort();
        assert_eq!(first, vec![0, 1]);
        assert_eq!(grid.cell(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(grid.cell(grid.cell_index(DVec2::new(15., 15.))).count(), 1);
    }

    #[test]
    fn out_of_range_positions_clamp() {
        let mut grid = SpatialHash::new(16, 16, 2);
        let particles = particles_at(&[(-20., -3.), (500., 500.)]);
        grid.rebuild(&particles);

        assert_eq!(grid.cell(0).collect::<Vec<_>>(), vec![0]);
        let last = grid.cols() * grid.rows() - 1;
        assert_eq!(grid.cell(last).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn rebuild_is_from_scratch() {
        let mut grid = SpatialHash::new(16, 16, 1);
        grid.rebuild(&particles_at(&[(1., 1.), (9., 9.)]));
        grid.rebuild(&particles_at(&[(9., 9.)]));

        assert_eq!(grid.cell(0).count(), 0);
        assert_eq!(grid.cell(grid.cell_index(DVec2::new(9., 9.))).count(), 1);
    }

    #[test]
    fn near_scan_covers_block_only() {
        let mut grid = SpatialHash::new(32, 32, 4);
        // Cells (2, 2), (3, 3), (1, 1), and (5, 2).
        let particles = particles_at(&[(9., 9.), (13., 13.), (5., 5.), (21., 9.)]);
        grid.rebuild(&particles);

        let mut found = Vec::new();
        grid.for_each_near(DVec2::new(9., 9.), |j| found.push(j));
        found.sort();
        assert_eq!(found, vec![0, 1, 2]);
    }
}
