//! The simulation state, and the substep pipeline that advances it.
//!
//! `Simulation` owns every particle, the grid, the walls, and the active config. Nothing else
//! mutates them: in a running program, only the simulation loop holds it, and outside changes
//! arrive as `Command`s applied between ticks.

use std::{num::NonZeroUsize, thread, time::Duration};

use glam::DVec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    boundary::enforce_boundary,
    command::{Command, SimStats},
    config::{PhysicsConfig, MAX_PARTICLES, MIN_SURFACE_DIM, SUB_STEPS},
    error::SimError,
    fluid_dynamics::relax_density,
    integrate::{clamp_to_surface, integrate_verlet},
    parallel::ParallelExecutor,
    particle::Particle,
    playback::{vec_to_point, FrameSnapshot},
    spatial_hash::SpatialHash,
    viscosity::apply_viscosity,
    walls::WallMap,
};

/// Half-widths of the box new particles are scattered in, around the spawn point.
const SPAWN_JITTER: DVec2 = DVec2::new(3., 2.);
/// New particles start out moving down by this much per substep.
const SPAWN_FALL: f64 = 0.5;

pub struct Simulation {
    particles: Vec<Particle>,
    /// Frozen copy of `particles`, read by passes that look at neighbors.
    scratch: Vec<Particle>,
    grid: SpatialHash,
    walls: WallMap,
    config: PhysicsConfig,
    executor: ParallelExecutor,
    rng: StdRng,
}

impl Simulation {
    /// Uses one worker per available CPU.
    pub fn new(width: usize, height: usize, config: PhysicsConfig) -> Result<Self, SimError> {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_workers(width, height, config, workers)
    }

    pub fn with_workers(
        width: usize,
        height: usize,
        config: PhysicsConfig,
        workers: usize,
    ) -> Result<Self, SimError> {
        Ok(Self::with_executor(
            width,
            height,
            config,
            ParallelExecutor::new(workers)?,
        ))
    }

    pub fn with_executor(
        width: usize,
        height: usize,
        mut config: PhysicsConfig,
        executor: ParallelExecutor,
    ) -> Self {
        let width = width.max(MIN_SURFACE_DIM);
        let height = height.max(MIN_SURFACE_DIM);
        config.refresh_derived();

        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            scratch: Vec::with_capacity(MAX_PARTICLES),
            grid: SpatialHash::new(width, height, MAX_PARTICLES),
            walls: WallMap::new(width, height),
            config,
            executor,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Makes spawn jitter reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    pub fn grid(&self) -> &SpatialHash {
        &self.grid
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.walls.width()
    }

    pub fn height(&self) -> usize {
        self.walls.height()
    }

    pub fn workers(&self) -> usize {
        self.executor.workers()
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            particle_count: self.particles.len(),
            wall_count: self.walls.count(),
            width: self.width(),
            height: self.height(),
            paused: self.config.paused,
        }
    }

    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Spawn { x, y } => {
                self.spawn(x, y);
            }
            Command::SetWall { x, y, on } => self.set_wall(x, y, on),
            Command::Resize { width, height } => self.resize(width, height),
            Command::SetConfig(cfg) => self.set_config(cfg),
            Command::ClearParticles => self.clear_particles(),
            Command::ClearWalls => self.clear_walls(),
            Command::Report(reply) => {
                // The requester may have given up waiting; nothing to do then.
                let _ = reply.send(self.stats());
            }
        }
    }

    /// Add up to `spawn_count` particles scattered around `(x, y)`, clamped inside the surface
    /// margins. Refused if the point is a wall cell or off the surface; truncated at
    /// `MAX_PARTICLES`. Returns how many were added.
    pub fn spawn(&mut self, x: f64, y: f64) -> usize {
        if self.walls.is_wall_cell(x as i64, y as i64) {
            log::trace!("Spawn at ({x:.1}, {y:.1}) refused: wall or off the surface");
            return 0;
        }

        let room = MAX_PARTICLES - self.particles.len();
        let count = self.config.spawn_count.min(room);
        if count < self.config.spawn_count {
            log::trace!(
                "Spawn truncated to {count} of {}: particle cap reached",
                self.config.spawn_count
            );
        }

        let (width, height) = (self.width(), self.height());
        for _ in 0..count {
            let posit = DVec2::new(
                x + self.rng.random_range(-SPAWN_JITTER.x..SPAWN_JITTER.x),
                y + self.rng.random_range(-SPAWN_JITTER.y..SPAWN_JITTER.y),
            );
            // Off the surface, every raycast sample reads as wall and the particle never moves.
            let mut particle = Particle::with_vel(posit, DVec2::new(0., SPAWN_FALL));
            clamp_to_surface(&mut particle, width, height);
            self.particles.push(particle);
        }

        count
    }

    /// Add one particle, unless at capacity.
    pub fn insert_particle(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= MAX_PARTICLES {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Particles under a new wall stay put until the next boundary pass.
    pub fn set_wall(&mut self, x: i64, y: i64, on: bool) {
        self.walls.set(x, y, on);
    }

    /// Reallocate the grid and walls for a new surface size. Walls in the overlapping region are
    /// kept, and particles are clamped inside the new margins.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.max(MIN_SURFACE_DIM);
        let height = height.max(MIN_SURFACE_DIM);

        log::info!(
            "Resizing surface from {}x{} to {width}x{height}",
            self.width(),
            self.height()
        );

        self.walls = self.walls.resized(width, height);
        self.grid.resize(width, height);

        for particle in &mut self.particles {
            clamp_to_surface(particle, width, height);
        }
    }

    pub fn set_config(&mut self, mut cfg: PhysicsConfig) {
        cfg.refresh_derived();
        log::debug!("New physics config: {cfg:?}");
        self.config = cfg;
    }

    pub fn clear_particles(&mut self) {
        log::debug!("Clearing {} particles", self.particles.len());
        self.particles.clear();
    }

    pub fn clear_walls(&mut self) {
        log::debug!("Clearing walls");
        self.walls.clear();
    }

    /// Run every substep of one tick, unless paused. `dt` is fixed; it doesn't track wall-clock
    /// time.
    pub fn tick(&mut self) {
        if self.config.paused {
            return;
        }

        let dt = 1. / SUB_STEPS as f64;
        for _ in 0..SUB_STEPS {
            self.substep(dt);
        }
    }

    pub fn substep(&mut self, dt: f64) {
        self.rebuild_grid();
        self.integrate(dt);
        self.solve_viscosity();
        self.solve_fluid();
        self.enforce_boundaries();
    }

    pub fn rebuild_grid(&mut self) {
        self.grid.rebuild(&self.particles);
    }

    pub fn integrate(&mut self, dt: f64) {
        let walls = &self.walls;
        let cfg = &self.config;

        self.executor.run(&mut self.particles, |_, chunk| {
            for particle in chunk {
                integrate_verlet(particle, walls, cfg, dt);
            }
        });
    }

    /// Reads neighbor positions from the grid built at the start of the substep.
    pub fn solve_viscosity(&mut self) {
        self.freeze();
        let prev = &self.scratch;
        let grid = &self.grid;
        let cfg = &self.config;

        self.executor.run(&mut self.particles, |start, chunk| {
            for (k, particle) in chunk.iter_mut().enumerate() {
                apply_viscosity(start + k, particle, prev, grid, cfg);
            }
        });
    }

    pub fn solve_fluid(&mut self) {
        self.freeze();
        let prev = &self.scratch;
        let grid = &self.grid;
        let walls = &self.walls;
        let cfg = &self.config;

        self.executor.run(&mut self.particles, |start, chunk| {
            for (k, particle) in chunk.iter_mut().enumerate() {
                relax_density(start + k, particle, prev, grid, walls, cfg);
            }
        });
    }

    pub fn enforce_boundaries(&mut self) {
        let walls = &self.walls;

        self.executor.run(&mut self.particles, |_, chunk| {
            for particle in chunk {
                enforce_boundary(particle, walls);
            }
        });
    }

    /// Particle positions as integer cells.
    pub fn snapshot(&self, compute_time: Duration) -> FrameSnapshot {
        FrameSnapshot {
            points: self.particles.iter().map(|p| vec_to_point(p.posit)).collect(),
            compute_time,
        }
    }

    fn freeze(&mut self) {
        self.scratch.clear();
        self.scratch.extend_from_slice(&self.particles);
    }
}
