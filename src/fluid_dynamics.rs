//! Double-density relaxation: pushes particles apart (or together) towards a rest density, with a
//! near-density term that keeps them from collapsing onto each other.
//!
//! Each particle moves only itself, by the sum of its pairwise pushes. Its neighbors get their own
//! turn in the same pass, reading the same frozen positions, so the pass can be split across
//! workers without any particle writing another's position.

use glam::DVec2;

use crate::{
    config::{PhysicsConfig, MAX_NEIGHBORS},
    particle::Particle,
    spatial_hash::SpatialHash,
    walls::WallMap,
};

/// Largest displacement one particle can get from a single relaxation.
const MAX_DISPLACEMENT: f64 = 1.;

#[derive(Clone, Copy, Default)]
struct Neighbor {
    index: usize,
    /// `1 - r / radius`
    q: f64,
}

/// Density and near-density at a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalDensity {
    pub density: f64,
    pub near_density: f64,
}

impl LocalDensity {
    pub fn pressure(&self, cfg: &PhysicsConfig) -> f64 {
        cfg.stiffness * (self.density - cfg.rest_density)
    }

    pub fn near_pressure(&self, cfg: &PhysicsConfig) -> f64 {
        cfg.stiffness_near * self.near_density
    }
}

/// Fixed-size neighbor list; past `MAX_NEIGHBORS`, extra neighbors are dropped.
struct NeighborList {
    items: [Neighbor; MAX_NEIGHBORS],
    len: usize,
}

impl NeighborList {
    fn new() -> Self {
        Self {
            items: [Neighbor::default(); MAX_NEIGHBORS],
            len: 0,
        }
    }

    fn push(&mut self, neighbor: Neighbor) {
        if self.len < MAX_NEIGHBORS {
            self.items[self.len] = neighbor;
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[Neighbor] {
        &self.items[..self.len]
    }
}

fn gather(
    i: usize,
    posit: DVec2,
    prev: &[Particle],
    grid: &SpatialHash,
    cfg: &PhysicsConfig,
) -> (LocalDensity, NeighborList) {
    let rad_sq = cfg.interaction_radius_sq();
    let inv_rad = cfg.inv_interaction_radius();

    let mut density = LocalDensity::default();
    let mut neighbors = NeighborList::new();

    grid.for_each_near(posit, |j| {
        if j == i {
            return;
        }

        let r_sq = (prev[j].posit - posit).length_squared();
        if r_sq < rad_sq && r_sq > 1e-6 {
            let q = 1. - r_sq.sqrt() * inv_rad;
            let q2 = q * q;

            density.density += q2;
            density.near_density += q2 * q;

            neighbors.push(Neighbor { index: j, q });
        }
    });

    (density, neighbors)
}

/// Density around particle `i`, counting every neighbor in range.
pub fn local_density(
    i: usize,
    prev: &[Particle],
    grid: &SpatialHash,
    cfg: &PhysicsConfig,
) -> LocalDensity {
    gather(i, prev[i].posit, prev, grid, cfg).0
}

/// Relax particle `i` against the frozen positions in `prev`. The move is discarded outright if it
/// would land in a wall.
pub fn relax_density(
    i: usize,
    particle: &mut Particle,
    prev: &[Particle],
    grid: &SpatialHash,
    walls: &WallMap,
    cfg: &PhysicsConfig,
) {
    let posit = particle.posit;
    let (density, neighbors) = gather(i, posit, prev, grid, cfg);

    let pressure = density.pressure(cfg);
    let near_pressure = density.near_pressure(cfg);

    let mut displacement = DVec2::ZERO;
    for n in neighbors.as_slice() {
        let dm = pressure * n.q + near_pressure * n.q * n.q;

        let diff = prev[n.index].posit - posit;
        let dist = diff.length();
        if dist > 1e-4 {
            // Away from the neighbor.
            displacement -= diff / dist * dm * 0.5;
        }
    }

    let len_sq = displacement.length_squared();
    if len_sq > MAX_DISPLACEMENT * MAX_DISPLACEMENT {
        displacement *= MAX_DISPLACEMENT / len_sq.sqrt();
    }

    let target = posit + displacement;
    if !walls.is_wall(target) {
        particle.posit = target;
    }
}
