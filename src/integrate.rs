use glam::DVec2;

use crate::{
    config::{PhysicsConfig, EDGE_MARGIN, MAX_RAY_STEPS, MAX_VELOCITY},
    particle::Particle,
    walls::WallMap,
};

/// Advance one particle by a Verlet step: damped implied velocity, gravity, a speed cap, then a
/// raycast against walls so fast particles can't skip over thin walls.
///
/// If any sample along the path is a wall, the whole step is cancelled: the particle stays where
/// it was, with its velocity zeroed. There's no sliding response. Otherwise the full displacement
/// is committed, and the position is clamped to `EDGE_MARGIN` inside the surface.
///
/// Clamping against the left, top, and right edges pins the previous position to the clamped
/// value too. Clamping against the bottom edge leaves the previous position alone.
pub fn integrate_verlet(particle: &mut Particle, walls: &WallMap, cfg: &PhysicsConfig, dt: f64) {
    let x_limit = walls.width() as f64 - EDGE_MARGIN;
    let y_limit = walls.height() as f64 - EDGE_MARGIN;

    let mut vel = particle.vel() * cfg.damping;
    vel.y += cfg.gravity * dt;

    // The sample count comes from the uncapped speed.
    let speed_sq = vel.length_squared();
    if speed_sq > MAX_VELOCITY * MAX_VELOCITY {
        vel *= MAX_VELOCITY / speed_sq.sqrt();
    }
    let steps = (speed_sq.sqrt() as usize + 1).min(MAX_RAY_STEPS);

    let start = particle.posit;
    for k in 1..=steps {
        let t = k as f64 / steps as f64;
        if walls.is_wall(start + vel * t) {
            particle.settle();
            return;
        }
    }

    particle.posit = start + vel;
    particle.posit_prev = start;

    let p = &mut particle.posit;
    let prev = &mut particle.posit_prev;

    if p.x < EDGE_MARGIN {
        p.x = EDGE_MARGIN;
        prev.x = EDGE_MARGIN;
    } else if p.x > x_limit {
        p.x = x_limit;
        prev.x = x_limit;
    }

    if p.y < EDGE_MARGIN {
        p.y = EDGE_MARGIN;
        prev.y = EDGE_MARGIN;
    } else if p.y > y_limit {
        p.y = y_limit;
    }
}

/// Pull a position inside the surface margins. Used when the surface shrinks.
pub fn clamp_to_surface(particle: &mut Particle, width: usize, height: usize) {
    let limit = DVec2::new(width as f64 - EDGE_MARGIN, height as f64 - EDGE_MARGIN);

    let p = &mut particle.posit;
    let prev = &mut particle.posit_prev;

    if p.x > limit.x {
        p.x = limit.x;
        prev.x = limit.x;
    } else if p.x < EDGE_MARGIN {
        p.x = EDGE_MARGIN;
        prev.x = EDGE_MARGIN;
    }

    if p.y > limit.y {
        p.y = limit.y;
        prev.y = limit.y;
    } else if p.y < EDGE_MARGIN {
        p.y = EDGE_MARGIN;
        prev.y = EDGE_MARGIN;
    }
}
