//! Headless driver: pours fluid onto a shelf for a few seconds, printing timing as it goes, and
//! optionally saves the frames it received.
//!
//! Usage: `fluid_relax [recording path]`

use std::{env, path::PathBuf, time::Duration};

use fluid_relax::{runner, Command, PhysicsConfig, Recording, SimError, Simulation};

const SURFACE_WIDTH: usize = 120;
const SURFACE_HEIGHT: usize = 40;
const NUM_FRAMES: usize = 300;
/// Spawn a cluster every this many frames.
const SPAWN_RATIO: usize = 4;
const REPORT_RATIO: usize = 60;

fn build_scene(handle: &runner::SimHandle) -> Result<(), SimError> {
    // A sloped shelf across the middle, with a gap on the right.
    for x in 20..90 {
        let y = 22 + (x - 20) / 10;
        handle.send(Command::SetWall { x, y, on: true })?;
    }
    Ok(())
}

fn pour(recording: &mut Recording) -> Result<(), SimError> {
    let sim = Simulation::new(SURFACE_WIDTH, SURFACE_HEIGHT, PhysicsConfig::water())?;
    println!("Starting simulation with {} workers...", sim.workers());

    let handle = runner::spawn(sim)?;
    build_scene(&handle)?;

    let mut received = 0;
    for frame_i in 0..NUM_FRAMES {
        if frame_i % SPAWN_RATIO == 0 {
            handle.send(Command::Spawn { x: 30., y: 6. })?;
        }

        let Some(frame) = handle.wait_frame(Duration::from_millis(250))? else {
            continue;
        };
        received += 1;
        recording.push(&frame);

        if frame_i % REPORT_RATIO == 0 {
            println!(
                "Frame: {frame_i} Particles: {} Compute time: {}μs",
                frame.points.len(),
                frame.compute_time.as_micros()
            );
        }
    }

    let stats = handle.stats()?;
    println!(
        "Done. Frames received: {received} Particles: {} Walls: {} Mean compute time: {}μs",
        stats.particle_count,
        stats.wall_count,
        recording.mean_compute_time().as_micros()
    );

    handle.shutdown();
    Ok(())
}

fn main() {
    env_logger::init();

    let save_path = env::args().nth(1).map(PathBuf::from);
    let mut recording = Recording::new(PhysicsConfig::water(), SURFACE_WIDTH, SURFACE_HEIGHT);

    if let Err(e) = pour(&mut recording) {
        eprintln!("Error running simulation: {e}");
        return;
    }

    if let Some(path) = save_path {
        match recording.save(&path) {
            Ok(()) => println!("Saved {} frames to {}", recording.len(), path.display()),
            Err(e) => eprintln!("Error saving recording: {e}"),
        }
    }
}
