use glam::DVec2;

/// A Verlet particle. Velocity isn't stored; it's `posit - posit_prev`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub posit: DVec2,
    pub posit_prev: DVec2,
}

impl Particle {
    /// A particle at rest.
    pub fn new(posit: DVec2) -> Self {
        Self {
            posit,
            posit_prev: posit,
        }
    }

    pub fn with_vel(posit: DVec2, vel: DVec2) -> Self {
        Self {
            posit,
            posit_prev: posit - vel,
        }
    }

    /// Displacement over the last substep.
    pub fn vel(&self) -> DVec2 {
        self.posit - self.posit_prev
    }

    /// Zero the implied velocity.
    pub fn settle(&mut self) {
        self.posit_prev = self.posit;
    }
}
