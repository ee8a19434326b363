//! Whole-simulation scenarios: settling, walls, resizing, capacity, and serial/parallel agreement.

use fluid_relax::{
    config::{EDGE_MARGIN, MAX_PARTICLES, MAX_VELOCITY, SERIAL_THRESHOLD},
    parallel::ParallelExecutor,
    Command, Particle, PhysicsConfig, Simulation,
};
use glam::DVec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn sim(width: usize, height: usize) -> Simulation {
    Simulation::with_workers(width, height, PhysicsConfig::default(), 4)
        .unwrap()
        .with_seed(42)
}

fn mean_nearest_neighbor_dist(particles: &[Particle]) -> f64 {
    let total: f64 = particles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            particles
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| (q.posit - p.posit).length())
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    total / particles.len() as f64
}

#[test]
fn cluster_settles_on_floor() {
    let (width, height) = (60, 30);
    let mut s = sim(width, height);
    assert_eq!(s.spawn(10., 10.), 20);

    for _ in 0..100 {
        s.tick();
    }

    for p in s.particles() {
        // No walls are set, so only positions off the surface read as wall.
        assert!(!s.walls().is_wall(p.posit), "{p:?}");
        // Resting in a shallow pool near the bottom margin.
        assert!(p.posit.y > height as f64 - EDGE_MARGIN - 3., "{p:?}");
    }

    let spacing = mean_nearest_neighbor_dist(s.particles());
    assert!(
        spacing >= s.config().interaction_radius() / 6.,
        "particles collapsed: mean spacing {spacing}"
    );
}

#[test]
fn spawns_at_or_past_the_edge_stay_on_surface() {
    let (width, height) = (60, 30);
    let mut s = sim(width, height);
    assert_eq!(s.spawn(-10., 10.), 0);
    assert_eq!(s.spawn(1., 10.), 20);
    assert_eq!(s.spawn(58.5, 28.5), 20);

    for _ in 0..200 {
        s.tick();
    }

    for p in s.particles() {
        assert!(!s.walls().is_wall(p.posit), "{p:?}");
    }
    let frame = s.snapshot(Default::default());
    for pt in &frame.points {
        assert!(pt.x >= 0 && (pt.x as usize) < width, "{pt:?}");
        assert!(pt.y >= 0 && (pt.y as usize) < height, "{pt:?}");
    }
}

#[test]
fn wall_row_holds_fluid() {
    let mut s = sim(60, 30);
    for x in 0..60 {
        s.set_wall(x, 20, true);
    }
    s.spawn(30., 10.);
    s.spawn(30., 10.);

    for _ in 0..150 {
        s.tick();
        for p in s.particles() {
            assert!(p.posit.y < 20., "particle passed the wall row: {p:?}");
        }
    }
}

#[test]
fn resize_keeps_walls_and_clamps_particles() {
    let mut s = sim(100, 50);
    for (x, y) in [(10, 5), (59, 5), (70, 5), (0, 49), (99, 49)] {
        s.set_wall(x, y, true);
    }
    s.insert_particle(Particle::new(DVec2::new(80.5, 20.5)));
    s.insert_particle(Particle::new(DVec2::new(30., 30.)));
    let walls_before = s.walls().clone();

    s.apply(Command::Resize {
        width: 60,
        height: 50,
    });

    assert_eq!((s.width(), s.height()), (60, 50));
    for y in 0..50 {
        for x in 0..60 {
            assert_eq!(
                s.walls().is_wall_cell(x, y),
                walls_before.is_wall_cell(x, y),
                "wall ({x}, {y}) changed"
            );
        }
    }
    assert_eq!(s.walls().count(), 3);

    let moved = s.particles()[0];
    assert_eq!(moved.posit.x, 60. - EDGE_MARGIN);
    assert_eq!(moved.posit_prev.x, 60. - EDGE_MARGIN);
    assert_eq!(moved.posit.y, 20.5);
    assert_eq!(s.particles()[1].posit, DVec2::new(30., 30.));
}

#[test]
fn spawn_never_exceeds_capacity() {
    let mut s = sim(200, 100);
    s.set_config(PhysicsConfig::default().with_spawn_count(7_000));

    for i in 0..10 {
        s.apply(Command::Spawn {
            x: 20. + 15. * i as f64,
            y: 50.,
        });
        assert!(s.particles().len() <= MAX_PARTICLES);
    }
    assert_eq!(s.particles().len(), MAX_PARTICLES);
}

#[test]
fn integration_respects_speed_cap() {
    let mut s = sim(200, 200);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..2_000 {
        let posit = DVec2::new(rng.random_range(5.0..195.), rng.random_range(5.0..195.));
        let vel = DVec2::new(rng.random_range(-20.0..20.), rng.random_range(-20.0..20.));
        s.insert_particle(Particle::with_vel(posit, vel));
    }

    s.rebuild_grid();
    s.integrate(0.25);

    for p in s.particles() {
        assert!(p.vel().length() <= MAX_VELOCITY + 1e-9, "{p:?}");
    }
}

#[test]
fn boundary_pass_frees_all_but_enclosed() {
    let mut s = sim(50, 50);
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..600 {
        s.set_wall(rng.random_range(0..50), rng.random_range(0..50), true);
    }
    for _ in 0..1_500 {
        let posit = DVec2::new(rng.random_range(1.0..49.), rng.random_range(1.0..49.));
        let vel = DVec2::new(rng.random_range(-1.0..1.), rng.random_range(-1.0..1.));
        s.insert_particle(Particle::with_vel(posit, vel));
    }
    let before = s.particles().to_vec();

    s.enforce_boundaries();

    let walls = s.walls();
    for (old, new) in before.iter().zip(s.particles()) {
        if !walls.is_wall(new.posit) {
            continue;
        }
        let probes = [
            DVec2::new(0., -1.),
            DVec2::new(0., 1.),
            DVec2::new(-1., 0.),
            DVec2::new(1., 0.),
        ];
        assert!(walls.is_wall(old.posit_prev));
        for offset in probes {
            assert!(walls.is_wall(old.posit + offset));
        }
    }
}

fn scene(executor: ParallelExecutor) -> Simulation {
    let mut s = Simulation::with_executor(120, 60, PhysicsConfig::default(), executor).with_seed(9);
    s.set_config(PhysicsConfig::default().with_spawn_count(100));
    for x in 10..110 {
        s.set_wall(x, 45, true);
    }
    for i in 0..15 {
        s.spawn(10. + 7. * i as f64, 10. + (i % 3) as f64 * 8.);
    }
    s
}

#[test]
fn serial_and_parallel_agree() {
    let mut serial = scene(ParallelExecutor::with_threshold(1, usize::MAX).unwrap());
    let mut four = scene(ParallelExecutor::new(4).unwrap());
    let mut three = scene(ParallelExecutor::new(3).unwrap());
    assert!(serial.particles().len() >= SERIAL_THRESHOLD);
    assert_eq!(serial.particles(), four.particles());

    for _ in 0..20 {
        serial.tick();
        four.tick();
        three.tick();
    }

    assert_eq!(serial.particles(), four.particles());
    assert_eq!(serial.particles(), three.particles());
}

#[test]
fn wall_under_particle_waits_for_boundary_pass() {
    let mut s = sim(40, 40);
    s.insert_particle(Particle::new(DVec2::new(20.5, 20.5)));

    s.apply(Command::SetWall {
        x: 20,
        y: 20,
        on: true,
    });
    assert_eq!(s.particles()[0].posit, DVec2::new(20.5, 20.5));

    s.tick();
    assert!(!s.walls().is_wall(s.particles()[0].posit));
}
