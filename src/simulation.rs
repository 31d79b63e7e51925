// --- File: simulation.rs ---
// Every particle's velocity change is accumulated from the tick-start
// snapshot before any particle moves. This deliberately replaces the
// in-place update, where each particle was fully moved in index order and
// later particles saw earlier ones' new state.
use crate::config::{ConfigChange, SimulationConfig, WallMode};
use crate::error::{ConfigError, SimError};
use crate::geometry::Rect;
use crate::matrix::InteractionMatrix;
use crate::particle::{Particle, force_delta, spawn_population};
use crate::quadtree::{QuadPoint, Quadtree};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::f32::consts::FRAC_PI_2;

pub type SimRng = StdRng;

// Copied out of the config once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_force: f32,
    pub force_scalar: f32,
    pub mass: f32,
}

impl ForceParams {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            min_force: config.min_force,
            force_scalar: config.force_scalar,
            mass: config.mass,
        }
    }
}

/// Magnitude of the force a particle feels from a neighbor at squared
/// distance `d2`, along the direction pointing away from that neighbor.
/// Positive values repel, negative values attract.
#[inline]
pub fn pair_force(d2: f32, coefficient: f32, params: &ForceParams) -> f32 {
    if d2 >= params.max_radius * params.max_radius {
        0.0
    } else if d2 <= params.min_radius * params.min_radius {
        // Also covers d2 == 0, so the division below never sees zero.
        params.min_force
    } else {
        params.force_scalar * coefficient * params.mass / d2
    }
}

/// Boundary policy for one particle inside `[0, extent.x] × [0, extent.y]`.
pub fn apply_boundary(particle: &mut Particle, extent: Vec2, mode: WallMode) {
    match mode {
        WallMode::Wrap => {
            particle.position.x = wrap_axis(particle.position.x, extent.x);
            particle.position.y = wrap_axis(particle.position.y, extent.y);
        }
        WallMode::Bounce => {
            bounce_axis(&mut particle.position.x, &mut particle.velocity.x, extent.x);
            bounce_axis(&mut particle.position.y, &mut particle.velocity.y, extent.y);
        }
    }
}

// Jumps to the opposite edge; the overshoot distance is discarded.
#[inline]
fn wrap_axis(value: f32, extent: f32) -> f32 {
    if value < 0.0 {
        extent
    } else if value > extent {
        0.0
    } else {
        value
    }
}

#[inline]
fn bounce_axis(position: &mut f32, velocity: &mut f32, extent: f32) {
    if *position < 0.0 {
        *position = 0.0;
        *velocity = -*velocity;
    } else if *position > extent {
        *position = extent;
        *velocity = -*velocity;
    }
}

#[derive(Debug, Clone, Copy)]
struct Attractor {
    point: Vec2,
    gravity: Option<f32>,
    orbit: Option<f32>,
}

impl Attractor {
    fn from_config(config: &SimulationConfig) -> Self {
        Self {
            point: Vec2::new(config.gravity_x, config.gravity_y),
            gravity: config.gravity_enabled.then_some(config.gravity_magnitude),
            orbit: config.orbit_enabled.then_some(config.orbit_speed),
        }
    }
}

struct ForceContext<'a> {
    particles: &'a [Particle],
    tree: &'a Quadtree,
    matrix: &'a InteractionMatrix,
    params: ForceParams,
    attractor: Attractor,
    dt: f32,
}

impl ForceContext<'_> {
    fn velocity_delta(&self, index: usize, scratch: &mut Vec<QuadPoint>) -> Vec2 {
        let p = &self.particles[index];
        let max_r2 = self.params.max_radius * self.params.max_radius;
        let row = self.matrix.row(p.species);

        scratch.clear();
        self.tree
            .query_into(&Rect::centered(p.position, self.params.max_radius), scratch);

        let mut delta = Vec2::ZERO;
        for other in scratch.iter() {
            // Identity, not distance: coincident particles still interact.
            if other.id == index {
                continue;
            }
            let d = p.position - other.position;
            let d2 = d.x * d.x + d.y * d.y;
            if d2 >= max_r2 {
                continue;
            }
            let coefficient = row[self.particles[other.id].species];
            let force = pair_force(d2, coefficient, &self.params);
            delta += force_delta(force, d.y.atan2(d.x), self.dt);
        }

        let to_attractor = self.attractor.point - p.position;
        let angle = to_attractor.y.atan2(to_attractor.x);
        if let Some(gravity) = self.attractor.gravity {
            delta += force_delta(gravity, angle, self.dt);
        }
        if let Some(speed) = self.attractor.orbit {
            // Injected directly into velocity, independent of dt.
            let tangent = angle + FRAC_PI_2;
            delta += Vec2::new(speed * tangent.cos(), speed * tangent.sin());
        }
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepStats {
    pub tick: u64,
    pub dt: f32,
    /// Particles the index could not hold this tick (non-finite positions).
    pub unindexed: usize,
}

pub struct SimulationState {
    particles: Vec<Particle>,
    matrix: InteractionMatrix,
    config: SimulationConfig,
    domain: Rect,
    rng: SimRng,
    quadtree: Quadtree,
    tick: u64,
    // Reused between ticks
    velocity_deltas: Vec<Vec2>,
    neighbor_buffer: Vec<QuadPoint>,
}

fn domain_rect(width: f32, height: f32) -> Result<Rect, SimError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(Rect::new(0.0, 0.0, width, height))
    } else {
        Err(SimError::InvalidDomain { width, height })
    }
}

fn make_rng(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => SimRng::seed_from_u64(seed),
        None => SimRng::from_entropy(),
    }
}

impl SimulationState {
    /// Validates `config`, then spawns the population and samples the matrix.
    pub fn new(width: f32, height: f32, config: SimulationConfig) -> Result<Self, SimError> {
        let domain = domain_rect(width, height)?;
        config.validate()?;
        let mut rng = make_rng(config.rng_seed);
        let matrix = InteractionMatrix::generate(&mut rng, &config);
        let particles = spawn_population(&mut rng, domain, &config);
        let mut state = Self::assemble(domain, config, matrix, particles, rng);
        state.rebuild_index();
        log::info!(
            "Simulation created: {} species x {} particles in {}x{}",
            state.config.species_count,
            state.config.particles_per_species,
            width,
            height
        );
        Ok(state)
    }

    /// Starts from an explicit matrix and particle set instead of sampling them.
    /// `config.species_count` must match the matrix size.
    pub fn from_parts(
        width: f32,
        height: f32,
        config: SimulationConfig,
        matrix: InteractionMatrix,
        particles: Vec<Particle>,
    ) -> Result<Self, SimError> {
        let domain = domain_rect(width, height)?;
        config.validate()?;
        if matrix.size() != config.species_count {
            return Err(SimError::MatrixSize {
                matrix: matrix.size(),
                species: config.species_count,
            });
        }
        if let Some(p) = particles.iter().find(|p| p.species >= matrix.size()) {
            return Err(SimError::SpeciesOutOfRange {
                species: p.species,
                species_count: matrix.size(),
            });
        }
        let rng = make_rng(config.rng_seed);
        let mut state = Self::assemble(domain, config, matrix, particles, rng);
        state.rebuild_index();
        Ok(state)
    }

    fn assemble(
        domain: Rect,
        config: SimulationConfig,
        matrix: InteractionMatrix,
        particles: Vec<Particle>,
        rng: SimRng,
    ) -> Self {
        let quadtree = Quadtree::new(domain.closed_far_edges(), config.quadtree_capacity);
        let count = particles.len();
        Self {
            particles,
            matrix,
            config,
            domain,
            rng,
            quadtree,
            tick: 0,
            velocity_deltas: Vec::with_capacity(count),
            neighbor_buffer: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        if self.config.rng_seed.is_some() {
            self.rng = make_rng(self.config.rng_seed);
        }
        self.matrix = InteractionMatrix::generate(&mut self.rng, &self.config);
        self.particles = spawn_population(&mut self.rng, self.domain, &self.config);
        self.velocity_deltas.clear();
        self.tick = 0;
        self.rebuild_index();
        log::info!(
            "Simulation reset: {} particles across {} species",
            self.particles.len(),
            self.config.species_count
        );
        log::debug!("Species counts after reset: {:?}", self.species_counts());
    }

    pub fn reseed(&mut self, seed: Option<u64>) {
        self.config.rng_seed = seed;
        self.rng = make_rng(seed);
        self.reset();
    }

    /// Validates and installs `next`. Population and matrix inputs trigger a
    /// full reset; everything else takes effect on the next step.
    pub fn apply_config(&mut self, next: SimulationConfig) -> Result<ConfigChange, ConfigError> {
        if let Err(e) = next.validate() {
            log::warn!("Rejected configuration: {}", e);
            return Err(e);
        }
        let change = self.config.classify_change(&next);
        self.config = next;
        match change {
            ConfigChange::Reset => self.reset(),
            ConfigChange::Hot => log::info!("Configuration hot-updated"),
            ConfigChange::RenderOnly | ConfigChange::Unchanged => {}
        }
        Ok(change)
    }

    // Particles outside the new extents are clamped back in.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError> {
        self.domain = domain_rect(width, height)?;
        for p in &mut self.particles {
            p.position.x = p.position.x.clamp(0.0, width);
            p.position.y = p.position.y.clamp(0.0, height);
        }
        self.rebuild_index();
        log::info!("Resized simulation area to {}x{}", width, height);
        Ok(())
    }

    fn rebuild_index(&mut self) -> usize {
        let (tree, rejected) = Quadtree::build(
            self.domain.closed_far_edges(),
            self.config.quadtree_capacity,
            self.particles.iter().enumerate().map(|(i, p)| (i, p.position)),
        );
        if rejected > 0 {
            log::warn!(
                "{} of {} particles fell outside the index boundary {:?}",
                rejected,
                self.particles.len(),
                self.domain
            );
        }
        self.quadtree = tree;
        rejected
    }

    /// Advances one tick: rebuild the index, accumulate forces from that
    /// snapshot, then damp, integrate and apply the boundary policy.
    pub fn update(&mut self, delta_time: f32) -> StepStats {
        let dt = if delta_time.is_finite() && delta_time > 0.0 {
            delta_time
        } else {
            0.0
        };

        let unindexed = self.rebuild_index();
        self.accumulate_velocity_deltas(dt);

        let extent = Vec2::new(self.domain.w, self.domain.h);
        let decay = self.config.velocity_decay;
        let wall_mode = self.config.wall_mode;
        for (p, delta) in self.particles.iter_mut().zip(&self.velocity_deltas) {
            p.velocity += *delta;
            p.velocity *= decay;
            p.position += p.velocity * dt;
            apply_boundary(p, extent, wall_mode);
        }

        self.tick += 1;
        StepStats {
            tick: self.tick,
            dt,
            unindexed,
        }
    }

    // Same per-particle summation order on both paths, so they agree bit for bit.
    fn accumulate_velocity_deltas(&mut self, dt: f32) {
        let ctx = ForceContext {
            particles: &self.particles,
            tree: &self.quadtree,
            matrix: &self.matrix,
            params: ForceParams::from_config(&self.config),
            attractor: Attractor::from_config(&self.config),
            dt,
        };
        if self.config.parallel {
            (0..self.particles.len())
                .into_par_iter()
                .map_init(Vec::new, |scratch, i| ctx.velocity_delta(i, scratch))
                .collect_into_vec(&mut self.velocity_deltas);
        } else {
            let scratch = &mut self.neighbor_buffer;
            self.velocity_deltas.clear();
            self.velocity_deltas
                .extend((0..ctx.particles.len()).map(|i| ctx.velocity_delta(i, scratch)));
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn domain(&self) -> Rect {
        self.domain
    }

    pub fn quadtree(&self) -> &Quadtree {
        &self.quadtree
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn species_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.matrix.size()];
        for p in &self.particles {
            counts[p.species] += 1;
        }
        counts
    }
}

// --- End of File: simulation.rs ---
