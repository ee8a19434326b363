//! Recovers particles that ended a substep inside a wall.

use glam::DVec2;

use crate::{particle::Particle, walls::WallMap};

/// Probed in order when the previous position isn't free: up, down, left, right.
const PROBES: [DVec2; 4] = [
    DVec2::new(0., -1.),
    DVec2::new(0., 1.),
    DVec2::new(-1., 0.),
    DVec2::new(1., 0.),
];

/// If the particle is inside a wall, move it back to its previous position when that's free,
/// else to the first free cardinal neighbor cell, else to its previous position anyway. Any
/// correction zeroes the velocity so the next step doesn't push it straight back in.
///
/// Returns whether the particle was moved.
pub fn enforce_boundary(particle: &mut Particle, walls: &WallMap) -> bool {
    if !walls.is_wall(particle.posit) {
        return false;
    }

    particle.posit = if !walls.is_wall(particle.posit_prev) {
        particle.posit_prev
    } else {
        PROBES
            .iter()
            .map(|offset| particle.posit + *offset)
            .find(|probe| !walls.is_wall(*probe))
            .unwrap_or(particle.posit_prev)
    };

    particle.settle();
    true
}
