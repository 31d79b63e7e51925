// --- File: config.rs ---
use crate::constants::*;
use crate::error::ConfigError;

/// Initial placement of a freshly spawned population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    Uniform,
    Disk,
}

/// What happens to a particle that leaves the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallMode {
    Wrap,
    Bounce,
}

/// How a configuration update has to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigChange {
    Unchanged,
    /// Only rendering reads the changed fields.
    RenderOnly,
    /// Physical constants; particles keep their state.
    Hot,
    /// Population or matrix inputs changed; particles and matrix are regenerated.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    // Population (reset)
    pub species_count: usize,
    pub particles_per_species: usize,
    pub spawn_mode: SpawnMode,
    pub spawn_radius: f32,
    pub rng_seed: Option<u64>,

    // Interaction matrix (reset)
    pub matrix_scalar: f32,
    pub self_override_enabled: bool,
    pub self_override_value: f32,

    // Force law (hot)
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_force: f32,
    pub force_scalar: f32,
    pub mass: f32,
    pub velocity_decay: f32,

    // Boundary (hot)
    pub wall_mode: WallMode,

    // Attractor point (hot)
    pub gravity_enabled: bool,
    pub gravity_magnitude: f32,
    pub gravity_x: f32,
    pub gravity_y: f32,
    pub orbit_enabled: bool,
    pub orbit_speed: f32,

    // Engine (hot)
    pub quadtree_capacity: usize,
    pub parallel: bool,

    // Rendering only
    pub color_offset: f32,
    pub grid_overlay_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            species_count: DEFAULT_SPECIES_COUNT,
            particles_per_species: DEFAULT_PARTICLES_PER_SPECIES,
            spawn_mode: SpawnMode::Uniform,
            spawn_radius: DEFAULT_SPAWN_RADIUS,
            rng_seed: None,

            matrix_scalar: DEFAULT_MATRIX_SCALAR,
            self_override_enabled: false,
            self_override_value: DEFAULT_SELF_OVERRIDE_VALUE,

            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            min_force: DEFAULT_MIN_FORCE,
            force_scalar: DEFAULT_FORCE_SCALAR,
            mass: DEFAULT_PARTICLE_MASS,
            velocity_decay: DEFAULT_VELOCITY_DECAY,

            wall_mode: WallMode::Wrap,

            gravity_enabled: false,
            gravity_magnitude: DEFAULT_GRAVITY,
            gravity_x: DEFAULT_GRAVITY_X,
            gravity_y: DEFAULT_GRAVITY_Y,
            orbit_enabled: false,
            orbit_speed: DEFAULT_GRAVITY.sqrt().sqrt() / 10.0,

            quadtree_capacity: DEFAULT_QUADTREE_CAPACITY,
            parallel: false,

            color_offset: 0.0,
            grid_overlay_enabled: false,
        }
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeOrNonFinite { name, value })
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

impl SimulationConfig {
    /// Same defaults, but with a fixed seed so resets are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn total_particles(&self) -> usize {
        self.species_count * self.particles_per_species
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.species_count == 0 {
            return Err(ConfigError::NoSpecies);
        }
        if self.quadtree_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        non_negative("spawn_radius", self.spawn_radius)?;
        non_negative("matrix_scalar", self.matrix_scalar)?;
        non_negative("min_radius", self.min_radius)?;
        non_negative("max_radius", self.max_radius)?;
        if self.min_radius > self.max_radius {
            return Err(ConfigError::RadiusOrder {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(ConfigError::DecayOutOfRange(self.velocity_decay));
        }
        finite("self_override_value", self.self_override_value)?;
        finite("min_force", self.min_force)?;
        finite("force_scalar", self.force_scalar)?;
        finite("mass", self.mass)?;
        finite("gravity_magnitude", self.gravity_magnitude)?;
        finite("gravity_x", self.gravity_x)?;
        finite("gravity_y", self.gravity_y)?;
        finite("orbit_speed", self.orbit_speed)?;
        finite("color_offset", self.color_offset)?;
        self.check_force_bounds()
    }

    // Worst case of every force term, in f64 so the check cannot overflow.
    // With min_radius == 0 the inverse-square band is unbounded near d == 0.
    fn check_force_bounds(&self) -> Result<(), ConfigError> {
        let mut coefficient = self.matrix_scalar as f64;
        if self.self_override_enabled {
            coefficient = coefficient.max((self.self_override_value as f64).abs());
        }
        let numerator = (self.force_scalar as f64 * self.mass as f64).abs() * coefficient;
        let min_r2 = (self.min_radius as f64).powi(2);
        let pair = if numerator == 0.0 || self.max_radius <= self.min_radius {
            0.0
        } else if min_r2 == 0.0 {
            f64::INFINITY
        } else {
            numerator / min_r2
        };

        let limit = MAX_FORCE_MAGNITUDE;
        let terms = [
            ("pair", pair, limit),
            // `pair_force` forms this product in f32 before dividing.
            ("pair numerator", numerator, f32::MAX),
            ("min_force", (self.min_force as f64).abs(), limit),
            ("gravity", (self.gravity_magnitude as f64).abs(), limit),
            ("orbit", (self.orbit_speed as f64).abs(), limit),
        ];
        for (term, magnitude, limit) in terms {
            if magnitude > limit as f64 {
                return Err(ConfigError::ForceTooLarge {
                    term,
                    magnitude,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Classifies the update from `self` to `next`. The strongest class among
    /// the changed fields wins.
    pub fn classify_change(&self, next: &SimulationConfig) -> ConfigChange {
        let reset = self.species_count != next.species_count
            || self.particles_per_species != next.particles_per_species
            || self.spawn_mode != next.spawn_mode
            || self.spawn_radius != next.spawn_radius
            || self.rng_seed != next.rng_seed
            || self.matrix_scalar != next.matrix_scalar
            || self.self_override_enabled != next.self_override_enabled
            || self.self_override_value != next.self_override_value;
        if reset {
            return ConfigChange::Reset;
        }

        let hot = self.min_radius != next.min_radius
            || self.max_radius != next.max_radius
            || self.min_force != next.min_force
            || self.force_scalar != next.force_scalar
            || self.mass != next.mass
            || self.velocity_decay != next.velocity_decay
            || self.wall_mode != next.wall_mode
            || self.gravity_enabled != next.gravity_enabled
            || self.gravity_magnitude != next.gravity_magnitude
            || self.gravity_x != next.gravity_x
            || self.gravity_y != next.gravity_y
            || self.orbit_enabled != next.orbit_enabled
            || self.orbit_speed != next.orbit_speed
            || self.quadtree_capacity != next.quadtree_capacity
            || self.parallel != next.parallel;
        if hot {
            return ConfigChange::Hot;
        }

        if self.color_offset != next.color_offset
            || self.grid_overlay_enabled != next.grid_overlay_enabled
        {
            ConfigChange::RenderOnly
        } else {
            ConfigChange::Unchanged
        }
    }
}

// --- End of File: config.rs ---
