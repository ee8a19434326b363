use crate::{config::PhysicsConfig, particle::Particle, spatial_hash::SpatialHash};

/// Viscous exchange between particle `i` and each approaching neighbor: an impulse along the pair
/// normal, scaled by the closing speed and `1 - r / radius`, subtracted from particle `i`'s
/// previous position only. Separating pairs are skipped.
///
/// `prev` is the particle array as it was at the start of the pass; neighbor velocities are read
/// from it, while `i`'s own velocity is re-read after each impulse.
pub fn apply_viscosity(
    i: usize,
    particle: &mut Particle,
    prev: &[Particle],
    grid: &SpatialHash,
    cfg: &PhysicsConfig,
) {
    let rad_sq = cfg.interaction_radius_sq();
    let inv_rad = cfg.inv_interaction_radius();
    let posit = particle.posit;

    grid.for_each_near(posit, |j| {
        if j == i {
            return;
        }
        let other = &prev[j];

        let diff = other.posit - posit;
        let r_sq = diff.length_squared();
        if r_sq >= rad_sq || r_sq <= 1e-6 {
            return;
        }

        let r = r_sq.sqrt();
        let normal = diff / r;

        let vel_along_normal = (particle.vel() - other.vel()).dot(normal);
        // Separating pairs are left alone.
        if vel_along_normal > 0. {
            let impulse = vel_along_normal * (1. - r * inv_rad) * cfg.viscosity;
            particle.posit_prev -= normal * impulse;
        }
    });
}
