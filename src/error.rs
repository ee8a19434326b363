use std::io;

use thiserror::Error;

/// Failures at the edges of the simulation. The physics itself has no error states.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to build the worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to start the simulation thread: {0}")]
    Thread(#[source] io::Error),
    #[error("The simulation loop has stopped")]
    Disconnected,
    #[error("Failed to read or write a recording: {0}")]
    Recording(#[source] io::Error),
}
