use glam::Vec2;
use quadlife::{
    FrameDriver, InteractionMatrix, Particle, SimulationConfig, SimulationState, WallMode,
};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;
const DT: f32 = 1.0 / 60.0;

fn small_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        species_count: 4,
        particles_per_species: 50,
        ..SimulationConfig::seeded(seed)
    }
}

// One species, no interaction, no damping: only what the test sets moves it.
fn inert_config() -> SimulationConfig {
    SimulationConfig {
        species_count: 1,
        velocity_decay: 1.0,
        ..SimulationConfig::seeded(9)
    }
}

fn moving(position: Vec2, velocity: Vec2) -> Particle {
    Particle {
        velocity,
        ..Particle::new(position, 0)
    }
}

fn pair(config: SimulationConfig, coefficient: f32, distance: f32) -> SimulationState {
    let particles = vec![
        Particle::new(Vec2::new(300.0, 300.0), 0),
        Particle::new(Vec2::new(300.0 + distance, 300.0), 0),
    ];
    let matrix = InteractionMatrix::from_rows(&[vec![coefficient]]).expect("square");
    SimulationState::from_parts(WIDTH, HEIGHT, config, matrix, particles).expect("valid pair")
}

fn separation(sim: &SimulationState) -> f32 {
    let p = sim.particles();
    p[0].position.distance(p[1].position)
}

fn assert_finite_and_inside(sim: &SimulationState) {
    let domain = sim.domain();
    for (i, p) in sim.particles().iter().enumerate() {
        assert!(
            p.position.is_finite() && p.velocity.is_finite(),
            "particle {} went non-finite: {:?}",
            i,
            p
        );
        assert!(
            (0.0..=domain.w).contains(&p.position.x) && (0.0..=domain.h).contains(&p.position.y),
            "particle {} left the domain: {:?}",
            i,
            p.position
        );
    }
}

#[test]
fn long_run_stays_finite_and_inside_with_wrap() {
    let mut sim = SimulationState::new(WIDTH, HEIGHT, small_config(11)).expect("sim");
    for _ in 0..300 {
        let stats = sim.update(DT);
        assert_eq!(stats.unindexed, 0);
    }
    assert_finite_and_inside(&sim);
    assert_eq!(sim.tick(), 300);
}

#[test]
fn long_run_stays_finite_and_inside_with_bounce() {
    let config = SimulationConfig {
        wall_mode: WallMode::Bounce,
        gravity_enabled: true,
        ..small_config(12)
    };
    let mut sim = SimulationState::new(WIDTH, HEIGHT, config).expect("sim");
    for _ in 0..300 {
        let stats = sim.update(DT);
        assert_eq!(stats.unindexed, 0);
    }
    assert_finite_and_inside(&sim);
}

#[test]
fn damping_alone_decays_speed_monotonically() {
    let config = SimulationConfig {
        velocity_decay: 0.99,
        ..inert_config()
    };
    let particles = vec![moving(Vec2::new(400.0, 300.0), Vec2::new(10.0, 0.0))];
    let matrix = InteractionMatrix::from_rows(&[vec![0.0]]).unwrap();
    let mut sim = SimulationState::from_parts(WIDTH, HEIGHT, config, matrix, particles).unwrap();

    let mut previous = sim.particles()[0].velocity.length();
    for _ in 0..50 {
        sim.update(0.01);
        let speed = sim.particles()[0].velocity.length();
        assert!(speed < previous);
        previous = speed;
    }
    let expected = 10.0 * 0.99f32.powi(50);
    assert!((previous - expected).abs() < 1e-3, "{} vs {}", previous, expected);
}

#[test]
fn positive_coefficient_repels_in_the_inverse_square_band() {
    let mut sim = pair(inert_config(), 1.0, 100.0);
    let start = separation(&sim);
    for _ in 0..10 {
        sim.update(0.1);
    }
    assert!(separation(&sim) > start);
    // Equal and opposite along x.
    let v = [sim.particles()[0].velocity, sim.particles()[1].velocity];
    assert!(v[0].x < 0.0 && v[1].x > 0.0);
    assert!((v[0].x + v[1].x).abs() < 1e-5);
}

#[test]
fn negative_coefficient_attracts_in_the_inverse_square_band() {
    let mut sim = pair(inert_config(), -1.0, 100.0);
    let start = separation(&sim);
    for _ in 0..10 {
        sim.update(0.1);
    }
    assert!(separation(&sim) < start);
}

#[test]
fn close_pairs_repel_regardless_of_coefficient() {
    let mut sim = pair(inert_config(), -5.0, 30.0);
    let start = separation(&sim);
    sim.update(0.1);
    sim.update(0.1);
    assert!(separation(&sim) > start);
}

#[test]
fn pairs_beyond_max_radius_do_not_interact() {
    let mut sim = pair(inert_config(), 5.0, 200.0);
    for _ in 0..5 {
        sim.update(0.1);
    }
    for p in sim.particles() {
        assert_eq!(p.velocity, Vec2::ZERO);
    }
    assert_eq!(separation(&sim), 200.0);
}

#[test]
fn gravity_pulls_toward_the_attractor() {
    let config = SimulationConfig {
        gravity_enabled: true,
        gravity_magnitude: 100.0,
        gravity_x: 50.0,
        gravity_y: 50.0,
        velocity_decay: 0.99,
        ..inert_config()
    };
    let start = Vec2::new(400.0, 300.0);
    let matrix = InteractionMatrix::from_rows(&[vec![0.0]]).unwrap();
    let mut sim =
        SimulationState::from_parts(WIDTH, HEIGHT, config, matrix, vec![Particle::new(start, 0)])
            .unwrap();
    let dt = 0.01;
    sim.update(dt);

    let v = sim.particles()[0].velocity;
    let toward = (Vec2::new(50.0, 50.0) - start).normalize();
    assert!((v.normalize() - toward).length() < 1e-5, "{:?} vs {:?}", v, toward);
    assert!((v.length() - 100.0 * dt * 0.99).abs() < 1e-5, "{}", v.length());
    let attractor = Vec2::new(50.0, 50.0);
    assert!(sim.particles()[0].position.distance(attractor) < start.distance(attractor));
}

#[test]
fn accepted_large_configs_stay_finite() {
    let scalars = [1.0, 1.0e3, 1.25e5, 1.0e8, 1.0e36, f32::MAX];
    let masses = [0.0, 10.0, 1.0e4];
    let mut accepted = 0;
    for &matrix_scalar in &scalars {
        for &mass in &masses {
            let config = SimulationConfig {
                species_count: 2,
                particles_per_species: 100,
                matrix_scalar,
                mass,
                gravity_enabled: true,
                orbit_enabled: true,
                ..SimulationConfig::seeded(21)
            };
            let Ok(mut sim) = SimulationState::new(WIDTH, HEIGHT, config.clone()) else {
                assert!(config.validate().is_err());
                continue;
            };
            accepted += 1;
            for _ in 0..5 {
                sim.update(DT);
            }
            assert_finite_and_inside(&sim);
        }
    }
    // Zero mass makes every scalar acceptable; the extremes with mass are rejected.
    assert!(accepted >= scalars.len() + 3);
    assert!(accepted < scalars.len() * masses.len());
}

#[test]
fn seeded_runs_are_bit_identical() {
    let mut a = SimulationState::new(WIDTH, HEIGHT, small_config(42)).unwrap();
    let mut b = SimulationState::new(WIDTH, HEIGHT, small_config(42)).unwrap();
    assert_eq!(a.matrix(), b.matrix());
    let dts = [DT, 0.02, 0.0, 0.033, DT];
    for _ in 0..20 {
        for dt in dts {
            a.update(dt);
            b.update(dt);
        }
    }
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn parallel_and_sequential_steps_agree() {
    let sequential = small_config(7);
    let parallel = SimulationConfig {
        parallel: true,
        ..sequential.clone()
    };
    let mut a = SimulationState::new(WIDTH, HEIGHT, sequential).unwrap();
    let mut b = SimulationState::new(WIDTH, HEIGHT, parallel).unwrap();
    for _ in 0..60 {
        a.update(DT);
        b.update(DT);
    }
    assert_eq!(a.particles(), b.particles());
}

#[test]
fn wrap_moves_particle_past_the_far_edge_to_zero() {
    let particles = vec![moving(Vec2::new(WIDTH - 0.1, 100.0), Vec2::new(100.0, 0.0))];
    let matrix = InteractionMatrix::from_rows(&[vec![0.0]]).unwrap();
    let mut sim =
        SimulationState::from_parts(WIDTH, HEIGHT, inert_config(), matrix, particles).unwrap();
    sim.update(0.01);
    let p = sim.particles()[0];
    assert_eq!(p.position.x, 0.0);
    assert_eq!(p.velocity, Vec2::new(100.0, 0.0));
    assert_eq!(sim.update(0.01).unindexed, 0);
}

#[test]
fn bounce_reflects_off_the_near_edge() {
    let config = SimulationConfig {
        wall_mode: WallMode::Bounce,
        ..inert_config()
    };
    let particles = vec![moving(Vec2::new(0.5, 100.0), Vec2::new(-100.0, 0.0))];
    let matrix = InteractionMatrix::from_rows(&[vec![0.0]]).unwrap();
    let mut sim = SimulationState::from_parts(WIDTH, HEIGHT, config, matrix, particles).unwrap();
    sim.update(0.01);
    let p = sim.particles()[0];
    assert_eq!(p.position.x, 0.0);
    assert_eq!(p.velocity.x, 100.0);
}

#[test]
fn index_holds_every_particle_exactly_once() {
    let mut sim = SimulationState::new(WIDTH, HEIGHT, small_config(3)).unwrap();
    sim.update(DT);
    sim.update(DT);
    let tree = sim.quadtree();
    let mut ids: Vec<usize> = tree.query(&tree.boundary()).iter().map(|p| p.id).collect();
    ids.sort_unstable();
    let expected: Vec<usize> = (0..sim.particles().len()).collect();
    assert_eq!(ids, expected);
    assert_eq!(tree.len(), sim.particles().len());
}

#[test]
fn reset_with_seed_reproduces_the_population() {
    let mut sim = SimulationState::new(WIDTH, HEIGHT, small_config(5)).unwrap();
    let initial = sim.particles().to_vec();
    let matrix = sim.matrix().clone();
    for _ in 0..10 {
        sim.update(DT);
    }
    assert_ne!(sim.particles(), &initial[..]);

    sim.reset();
    assert_eq!(sim.tick(), 0);
    assert_eq!(sim.particles(), &initial[..]);
    assert_eq!(sim.matrix(), &matrix);
}

#[test]
fn reseed_matches_a_fresh_simulation() {
    let mut sim = SimulationState::new(WIDTH, HEIGHT, small_config(5)).unwrap();
    sim.reseed(Some(6));
    let fresh = SimulationState::new(WIDTH, HEIGHT, small_config(6)).unwrap();
    assert_eq!(sim.particles(), fresh.particles());
    assert_eq!(sim.matrix(), fresh.matrix());
}

#[test]
fn driver_steps_only_while_running() {
    let mut driver = FrameDriver::new(WIDTH, HEIGHT, small_config(8)).unwrap();
    assert!(driver.tick(1.0).is_none());
    assert_eq!(driver.tick(1.0 + 1.0 / 60.0).map(|s| s.tick), Some(1));

    driver.toggle_pause();
    let frozen = driver.snapshot();
    for i in 0..5 {
        assert!(driver.tick(2.0 + i as f64).is_none());
    }
    assert_eq!(driver.snapshot(), frozen);

    driver.toggle_pause();
    let stats = driver.tick(6.5).expect("running again");
    assert_eq!(stats.tick, 2);
    assert!((stats.dt - 0.5).abs() < 1e-6);
}
