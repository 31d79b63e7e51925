//! Error types for configuration and simulation setup.

use thiserror::Error;

/// Rejected configuration values. The previous configuration stays in force.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("species count must be at least 1")]
    NoSpecies,
    #[error("{name} must be finite and non-negative (got {value})")]
    NegativeOrNonFinite { name: &'static str, value: f32 },
    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f32 },
    #[error("min_radius ({min}) must not exceed max_radius ({max})")]
    RadiusOrder { min: f32, max: f32 },
    #[error("velocity_decay must lie in [0, 1] (got {0})")]
    DecayOutOfRange(f32),
    #[error("quadtree capacity must be at least 1")]
    ZeroCapacity,
    #[error("worst-case {term} force {magnitude} exceeds the limit of {limit}")]
    ForceTooLarge {
        term: &'static str,
        magnitude: f64,
        limit: f32,
    },
}

/// Errors that prevent a simulation from being created or reconfigured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The drawable surface did not provide usable pixel extents.
    #[error("simulation domain must have positive finite extents (got {width}x{height})")]
    InvalidDomain { width: f32, height: f32 },
    #[error("matrix is {matrix}x{matrix} but the configuration names {species} species")]
    MatrixSize { matrix: usize, species: usize },
    #[error("interaction matrix row {row} has {len} entries, expected {size}")]
    MatrixNotSquare { row: usize, len: usize, size: usize },
    #[error("particle species {species} has no matrix row (species count {species_count})")]
    SpeciesOutOfRange { species: usize, species_count: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
