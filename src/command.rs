//! Mutation requests for the simulation loop, and the bounded queue that carries them.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender};

use crate::{config::PhysicsConfig, error::SimError};

/// Everything that can change simulation state from outside. Only the simulation loop applies
/// these, between ticks.
#[derive(Debug)]
pub enum Command {
    /// Add up to `spawn_count` particles jittered around a point.
    Spawn { x: f64, y: f64 },
    SetWall { x: i64, y: i64, on: bool },
    Resize { width: usize, height: usize },
    SetConfig(PhysicsConfig),
    ClearParticles,
    ClearWalls,
    /// Reply with a `SimStats` read at the time the command is applied.
    Report(Sender<SimStats>),
}

/// Diagnostic counts, read inside the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimStats {
    pub particle_count: usize,
    pub wall_count: usize,
    pub width: usize,
    pub height: usize,
    pub paused: bool,
}

/// Producer end of the command queue. Clone it for each producer; commands from one producer
/// are applied in the order sent.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: SyncSender<Command>,
}

impl CommandSender {
    /// Blocks while the queue is full.
    pub fn send(&self, cmd: Command) -> Result<(), SimError> {
        self.tx.send(cmd).map_err(|_| SimError::Disconnected)
    }
}

/// A bounded queue of `capacity` commands. The receiver belongs to the simulation loop.
pub fn command_queue(capacity: usize) -> (CommandSender, Receiver<Command>) {
    let (tx, rx) = mpsc::sync_channel(capacity);
    (CommandSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_arrive_in_order() {
        let (tx, rx) = command_queue(4);
        tx.send(Command::Spawn { x: 1., y: 2. }).unwrap();
        tx.send(Command::ClearWalls).unwrap();

        assert!(matches!(rx.try_recv(), Ok(Command::Spawn { x, y }) if x == 1. && y == 2.));
        assert!(matches!(rx.try_recv(), Ok(Command::ClearWalls)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_after_loop_gone_fails() {
        let (tx, rx) = command_queue(1);
        drop(rx);
        assert!(matches!(
            tx.send(Command::ClearParticles),
            Err(SimError::Disconnected)
        ));
    }
}
