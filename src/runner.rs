//! The simulation loop thread, and the host's handle to it.
//!
//! Two channels cross the thread boundary. Commands flow in through a bounded queue that blocks
//! producers when full. Snapshots flow out through a two-slot mailbox that the loop never waits
//! on: if the host hasn't picked up the last two frames, the new one is dropped.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    command::{command_queue, Command, CommandSender, SimStats},
    config::{COMMAND_QUEUE_CAPACITY, SNAPSHOT_QUEUE_CAPACITY, TICK_PERIOD},
    error::SimError,
    playback::FrameSnapshot,
    sim::Simulation,
};

/// Host-side end of a running simulation.
pub struct SimHandle {
    commands: CommandSender,
    frames: Receiver<FrameSnapshot>,
    thread: JoinHandle<()>,
}

/// Start the simulation loop on its own thread. The loop owns `sim` from here on.
pub fn spawn(sim: Simulation) -> Result<SimHandle, SimError> {
    let (commands, cmd_rx) = command_queue(COMMAND_QUEUE_CAPACITY);
    let (frame_tx, frames) = mpsc::sync_channel(SNAPSHOT_QUEUE_CAPACITY);

    let thread = thread::Builder::new()
        .name("fluid-sim".to_owned())
        .spawn(move || run(sim, cmd_rx, frame_tx, TICK_PERIOD))
        .map_err(SimError::Thread)?;

    Ok(SimHandle {
        commands,
        frames,
        thread,
    })
}

/// Tick `sim` every `period` until every command sender is gone.
///
/// Each tick applies all queued commands, runs the physics, and offers a snapshot. A tick that
/// overruns its period delays the ones after it; ticks are never skipped or made longer to catch
/// up.
pub fn run(
    mut sim: Simulation,
    commands: Receiver<Command>,
    frames: SyncSender<FrameSnapshot>,
    period: Duration,
) {
    log::info!(
        "Simulation loop started: {}x{} surface, {} workers",
        sim.width(),
        sim.height(),
        sim.workers()
    );

    let mut next_tick = Instant::now() + period;

    loop {
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
            next_tick += period;
        } else {
            next_tick = now + period;
        }

        loop {
            match commands.try_recv() {
                Ok(cmd) => sim.apply(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Simulation loop stopped");
                    return;
                }
            }
        }

        let start = Instant::now();
        sim.tick();
        let compute_time = start.elapsed();

        match frames.try_send(sim.snapshot(compute_time)) {
            Ok(()) => (),
            Err(TrySendError::Full(_)) => log::trace!("Host is behind; frame dropped"),
            // The host stopped reading frames, but may still send commands.
            Err(TrySendError::Disconnected(_)) => (),
        }
    }
}

impl SimHandle {
    /// Queue a command. Blocks while the queue is full.
    pub fn send(&self, cmd: Command) -> Result<(), SimError> {
        self.commands.send(cmd)
    }

    /// Another producer for the same queue.
    pub fn commands(&self) -> CommandSender {
        self.commands.clone()
    }

    /// The newest frame waiting, discarding any older ones. `None` if nothing new arrived.
    pub fn latest_frame(&self) -> Option<FrameSnapshot> {
        let mut result = None;
        loop {
            match self.frames.try_recv() {
                Ok(frame) => result = Some(frame),
                Err(_) => return result,
            }
        }
    }

    /// Block until the next frame, up to `timeout`.
    pub fn wait_frame(&self, timeout: Duration) -> Result<Option<FrameSnapshot>, SimError> {
        match self.frames.recv_timeout(timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(SimError::Disconnected),
        }
    }

    /// Counts read by the loop, after every command queued before this one has been applied.
    pub fn stats(&self) -> Result<SimStats, SimError> {
        let (tx, rx) = mpsc::channel();
        self.send(Command::Report(tx))?;
        rx.recv().map_err(|_| SimError::Disconnected)
    }

    /// Stop the loop and wait for it. Other `CommandSender`s still alive keep it running.
    pub fn shutdown(self) {
        let Self {
            commands,
            frames,
            thread,
        } = self;
        drop(commands);
        drop(frames);

        if thread.join().is_err() {
            log::error!("Simulation thread panicked");
        }
    }
}
