//! Frames published by the simulation loop, and recordings of them for later playback.

use std::{path::Path, time::Duration};

use bincode::{Decode, Encode};
use glam::DVec2;

use crate::{config::PhysicsConfig, error::SimError, util};

/// An integer surface cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Truncates towards zero.
pub fn vec_to_point(v: DVec2) -> Point {
    Point {
        x: v.x as i32,
        y: v.y as i32,
    }
}

/// Particle positions at the end of one tick, and how long the tick's physics took.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub points: Vec<Point>,
    pub compute_time: Duration,
}

#[derive(Clone, Debug, PartialEq, Encode, Decode)]
struct RecordedFrame {
    points: Vec<Point>,
    compute_micros: u64,
}

/// A run of snapshots along with the surface size and config they were produced under.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Recording {
    pub config: PhysicsConfig,
    pub width: usize,
    pub height: usize,
    frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn new(config: PhysicsConfig, width: usize, height: usize) -> Self {
        Self {
            config,
            width,
            height,
            frames: Vec::new(),
        }
    }

    /// Compute time is stored at microsecond resolution.
    pub fn push(&mut self, frame: &FrameSnapshot) {
        self.frames.push(RecordedFrame {
            points: frame.points.clone(),
            compute_micros: frame.compute_time.as_micros() as u64,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, i: usize) -> Option<FrameSnapshot> {
        self.frames.get(i).map(|f| FrameSnapshot {
            points: f.points.clone(),
            compute_time: Duration::from_micros(f.compute_micros),
        })
    }

    /// Mean physics time per recorded frame.
    pub fn mean_compute_time(&self) -> Duration {
        if self.frames.is_empty() {
            return Duration::ZERO;
        }
        let total: u64 = self.frames.iter().map(|f| f.compute_micros).sum();
        Duration::from_micros(total / self.frames.len() as u64)
    }

    pub fn save(&self, path: &Path) -> Result<(), SimError> {
        util::save(path, self).map_err(SimError::Recording)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let mut result: Self = util::load(path).map_err(SimError::Recording)?;
        result.config.refresh_derived();
        Ok(result)
    }
}
