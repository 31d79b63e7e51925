//! Particle-life simulation kernel.
//!
//! - [`quadtree`]: per-tick spatial index for neighbor queries.
//! - [`simulation`]: force law, integration and boundary policy.
//! - [`driver`]: run state, tick timing and render snapshots.
//! - [`config`]: tunable constants and reset/hot-update classification.
//! - [`matrix`]: species interaction coefficients.

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod particle;
pub mod quadtree;
pub mod simulation;
pub mod utils;

pub use config::{ConfigChange, SimulationConfig, SpawnMode, WallMode};
pub use driver::{FrameDriver, RenderParticle, RunState};
pub use error::{ConfigError, SimError};
pub use geometry::Rect;
pub use matrix::InteractionMatrix;
pub use particle::Particle;
pub use quadtree::{QuadPoint, Quadtree};
pub use simulation::{ForceParams, SimulationState, StepStats, apply_boundary, pair_force};
