use crate::config::{SimulationConfig, SpawnMode};
use crate::geometry::Rect;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub species: usize,
}

impl Particle {
    pub fn new(position: Vec2, species: usize) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            species,
        }
    }

    /// Adds `force` along the direction `theta` (radians), scaled by `dt`.
    #[inline]
    pub fn apply_force(&mut self, force: f32, theta: f32, dt: f32) {
        self.velocity += force_delta(force, theta, dt);
    }
}

/// Velocity change produced by a force of magnitude `force` along `theta`.
#[inline]
pub fn force_delta(force: f32, theta: f32, dt: f32) -> Vec2 {
    Vec2::new(theta.cos() * force * dt, theta.sin() * force * dt)
}

/// Generates a whole population for `domain`, species-major.
pub fn spawn_population<R: Rng + ?Sized>(
    rng: &mut R,
    domain: Rect,
    config: &SimulationConfig,
) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(config.total_particles());
    for species in 0..config.species_count {
        for _ in 0..config.particles_per_species {
            let position = match config.spawn_mode {
                SpawnMode::Uniform => uniform_position(rng, domain),
                SpawnMode::Disk => disk_position(rng, domain, config.spawn_radius),
            };
            particles.push(Particle::new(position, species));
        }
    }
    particles
}

fn uniform_position<R: Rng + ?Sized>(rng: &mut R, domain: Rect) -> Vec2 {
    Vec2::new(
        domain.x + domain.w * rng.gen_range(0.0f32..1.0),
        domain.y + domain.h * rng.gen_range(0.0f32..1.0),
    )
}

// Clamped so that a disk larger than the window still spawns inside it.
fn disk_position<R: Rng + ?Sized>(rng: &mut R, domain: Rect, spawn_radius: f32) -> Vec2 {
    let theta = TAU * rng.gen_range(0.0f32..1.0);
    let r = spawn_radius * rng.gen_range(0.0f32..1.0);
    let center = domain.center();
    Vec2::new(
        (center.x + r * theta.cos()).clamp(domain.x, domain.right()),
        (center.y + r * theta.sin()).clamp(domain.y, domain.bottom()),
    )
}
