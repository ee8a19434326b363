//! Physics configuration, and constants shared by the simulation passes.

use std::time::Duration;

use bincode::{Decode, Encode};

/// Hard cap on live particles. Spawns past this are truncated.
pub const MAX_PARTICLES: usize = 45_000;
/// Grid cells are `1 << CELL_SHIFT` surface units on a side.
pub const CELL_SHIFT: u32 = 2;
pub const SUB_STEPS: usize = 4;
/// Units per substep.
pub const MAX_VELOCITY: f64 = 3.;
/// Upper bound on raycast samples per integration step.
pub const MAX_RAY_STEPS: usize = 5;
/// Particles are kept this far from the surface edges.
pub const EDGE_MARGIN: f64 = 1.1;
/// Neighbors recorded per particle in the fluid solve. Extra neighbors still count towards
/// density, but don't push.
pub const MAX_NEIGHBORS: usize = 64;
/// Below this many particles, passes run inline on the calling thread.
pub const SERIAL_THRESHOLD: usize = 1_000;

pub const TICK_PERIOD: Duration = Duration::from_millis(16);
pub const COMMAND_QUEUE_CAPACITY: usize = 100;
pub const SNAPSHOT_QUEUE_CAPACITY: usize = 2;
/// Resize requests smaller than this, on either axis, are raised to it.
pub const MIN_SURFACE_DIM: usize = 4;

/// Tunable fluid parameters. Swapped wholesale by `Command::SetConfig`; a pass never sees a
/// partially-edited value.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct PhysicsConfig {
    /// Added to vertical velocity, per unit dt. Positive is down.
    pub gravity: f64,
    /// Scales pressure from the density error.
    pub stiffness: f64,
    /// Scales the near-pressure term; keeps particles from clumping.
    pub stiffness_near: f64,
    pub rest_density: f64,
    pub viscosity: f64,
    /// Multiplies the implied velocity each substep.
    pub damping: f64,
    interaction_radius: f64,
    interaction_radius_sq: f64,
    inv_interaction_radius: f64,
    /// Particles added per spawn request.
    pub spawn_count: usize,
    pub paused: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::water()
    }
}

impl PhysicsConfig {
    pub fn water() -> Self {
        let mut result = Self {
            gravity: 0.05,
            stiffness: 0.07,
            stiffness_near: 0.08,
            rest_density: 3.,
            viscosity: 0.02,
            damping: 0.91,
            interaction_radius: 3.,
            interaction_radius_sq: 0.,
            inv_interaction_radius: 0.,
            spawn_count: 20,
            paused: false,
        };

        result.refresh_derived();
        result
    }

    /// Heavier and slower than water; packs denser.
    pub fn magma() -> Self {
        Self {
            gravity: 0.03,
            stiffness: 0.06,
            rest_density: 6.,
            viscosity: 0.005,
            damping: 0.96,
            ..Self::water()
        }
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn interaction_radius_sq(&self) -> f64 {
        self.interaction_radius_sq
    }

    /// Zero when the radius is zero, which collapses all pairwise forces.
    pub fn inv_interaction_radius(&self) -> f64 {
        self.inv_interaction_radius
    }

    pub fn set_interaction_radius(&mut self, radius: f64) {
        self.interaction_radius = radius;
        self.refresh_derived();
    }

    pub fn with_interaction_radius(mut self, radius: f64) -> Self {
        self.set_interaction_radius(radius);
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn with_spawn_count(mut self, spawn_count: usize) -> Self {
        self.spawn_count = spawn_count;
        self
    }

    /// Run this whenever the interaction radius changes, including after decoding.
    pub fn refresh_derived(&mut self) {
        self.interaction_radius_sq = self.interaction_radius * self.interaction_radius;
        self.inv_interaction_radius = if self.interaction_radius != 0. {
            1. / self.interaction_radius
        } else {
            0.
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_radius_follows_setter() {
        let mut cfg = PhysicsConfig::default();
        assert_eq!(cfg.interaction_radius_sq(), 9.);
        assert!((cfg.inv_interaction_radius() - 1. / 3.).abs() < 1e-12);

        cfg.set_interaction_radius(2.);
        assert_eq!(cfg.interaction_radius(), 2.);
        assert_eq!(cfg.interaction_radius_sq(), 4.);
        assert_eq!(cfg.inv_interaction_radius(), 0.5);
    }

    #[test]
    fn zero_radius_has_zero_inverse() {
        let cfg = PhysicsConfig::water().with_interaction_radius(0.);
        assert_eq!(cfg.interaction_radius_sq(), 0.);
        assert_eq!(cfg.inv_interaction_radius(), 0.);
    }

    #[test]
    fn magma_keeps_shared_fields() {
        let magma = PhysicsConfig::magma();
        assert_eq!(magma.stiffness_near, 0.08);
        assert_eq!(magma.interaction_radius_sq(), 9.);
        assert_eq!(magma.rest_density, 6.);
        assert!(!magma.paused);
    }
}
