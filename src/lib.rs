//! A real-time 2D particle fluid, using double-density relaxation.
//!
//! Particles live on a rectangular surface of integer cells, some of which are walls. Each tick,
//! the simulation rebuilds a spatial hash, integrates, damps approach velocities, relaxes density,
//! and pulls particles out of walls; the passes are split across worker threads for large scenes.
//! [`runner::spawn`] runs this on its own thread at a fixed rate, taking [`command::Command`]s in
//! and publishing [`playback::FrameSnapshot`]s out.

pub mod boundary;
pub mod command;
pub mod config;
pub mod error;
pub mod fluid_dynamics;
pub mod integrate;
pub mod parallel;
pub mod particle;
pub mod playback;
pub mod runner;
pub mod sim;
pub mod spatial_hash;
pub mod util;
pub mod viscosity;
pub mod walls;

pub use command::{Command, CommandSender, SimStats};
pub use config::PhysicsConfig;
pub use error::SimError;
pub use particle::Particle;
pub use playback::{FrameSnapshot, Point, Recording};
pub use runner::SimHandle;
pub use sim::Simulation;
