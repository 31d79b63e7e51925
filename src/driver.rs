//! Frame driver: turns host timestamps into simulation ticks and exposes
//! what a renderer needs afterwards.

use crate::config::{ConfigChange, SimulationConfig};
use crate::error::{ConfigError, SimError};
use crate::geometry::Rect;
use crate::simulation::{SimulationState, StepStats};
use crate::utils::species_color;
use glam::{Vec2, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// Per-particle data handed to the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParticle {
    pub position: Vec2,
    pub species: usize,
    pub color: Vec4,
}

pub struct FrameDriver {
    simulation: SimulationState,
    state: RunState,
    last_timestamp: Option<f64>,
}

impl FrameDriver {
    pub fn new(width: f32, height: f32, config: SimulationConfig) -> Result<Self, SimError> {
        Ok(Self::from_simulation(SimulationState::new(width, height, config)?))
    }

    pub fn from_simulation(simulation: SimulationState) -> Self {
        Self {
            simulation,
            state: RunState::Running,
            last_timestamp: None,
        }
    }

    /// Consumes one host tick at `timestamp` (seconds, monotonic). The first
    /// call only establishes the baseline. Paused drivers track the clock
    /// without stepping, so resuming does not replay the paused interval.
    pub fn tick(&mut self, timestamp: f64) -> Option<StepStats> {
        let previous = self.last_timestamp.replace(timestamp);
        if self.state == RunState::Paused {
            return None;
        }
        let dt = (timestamp - previous?).max(0.0) as f32;
        Some(self.simulation.update(dt))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    pub fn pause(&mut self) {
        if self.state != RunState::Paused {
            self.state = RunState::Paused;
            log::info!("Simulation Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state != RunState::Running {
            self.state = RunState::Running;
            log::info!("Simulation Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
        }
    }

    pub fn apply_config(&mut self, next: SimulationConfig) -> Result<ConfigChange, ConfigError> {
        self.simulation.apply_config(next)
    }

    /// Convenience for hosts: edit a copy of the current config and apply it.
    pub fn update_config<F>(&mut self, edit: F) -> Result<ConfigChange, ConfigError>
    where
        F: FnOnce(&mut SimulationConfig),
    {
        let mut next = self.simulation.config().clone();
        edit(&mut next);
        self.apply_config(next)
    }

    pub fn reset(&mut self) {
        self.simulation.reset();
    }

    pub fn reseed(&mut self, seed: Option<u64>) {
        self.simulation.reseed(seed);
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), SimError> {
        self.simulation.resize(width, height)
    }

    pub fn simulation(&self) -> &SimulationState {
        &self.simulation
    }

    pub fn config(&self) -> &SimulationConfig {
        self.simulation.config()
    }

    /// Particles with their derived colors, in simulation order.
    pub fn snapshot(&self) -> Vec<RenderParticle> {
        let config = self.simulation.config();
        let colors: Vec<Vec4> = (0..config.species_count)
            .map(|s| species_color(s, config.species_count, config.color_offset))
            .collect();
        self.simulation
            .particles()
            .iter()
            .map(|p| RenderParticle {
                position: p.position,
                species: p.species,
                color: colors[p.species],
            })
            .collect()
    }

    /// Node boundaries of the current index, if the debug overlay is on.
    pub fn overlay(&self) -> Option<Vec<Rect>> {
        self.simulation
            .config()
            .grid_overlay_enabled
            .then(|| self.simulation.quadtree().boundaries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> FrameDriver {
        let config = SimulationConfig {
            species_count: 2,
            particles_per_species: 20,
            ..SimulationConfig::seeded(17)
        };
        FrameDriver::new(300.0, 200.0, config).unwrap()
    }

    #[test]
    fn first_tick_sets_baseline() {
        let mut d = driver();
        assert!(d.tick(10.0).is_none());
        let stats = d.tick(10.5).unwrap();
        assert_eq!(stats.tick, 1);
        assert!((stats.dt - 0.5).abs() < 1e-6);
    }

    #[test]
    fn paused_driver_freezes_state() {
        let mut d = driver();
        d.tick(0.0);
        d.tick(0.016);
        d.pause();
        let frozen = d.simulation().particles().to_vec();
        assert!(d.tick(5.0).is_none());
        assert!(d.tick(9.0).is_none());
        assert_eq!(d.simulation().particles(), &frozen[..]);

        d.resume();
        let stats = d.tick(9.016).unwrap();
        assert!((stats.dt - 0.016).abs() < 1e-4);
    }

    #[test]
    fn backwards_timestamp_gives_zero_dt() {
        let mut d = driver();
        d.tick(2.0);
        assert_eq!(d.tick(1.0).unwrap().dt, 0.0);
    }

    #[test]
    fn overlay_follows_toggle() {
        let mut d = driver();
        assert!(d.overlay().is_none());
        let change = d.update_config(|c| c.grid_overlay_enabled = true).unwrap();
        assert_eq!(change, ConfigChange::RenderOnly);
        let rects = d.overlay().unwrap();
        assert_eq!(rects[0], d.simulation().quadtree().boundary());
    }

    #[test]
    fn snapshot_carries_species_colors() {
        let d = driver();
        let snap = d.snapshot();
        assert_eq!(snap.len(), 40);
        assert_eq!(snap[0].color, species_color(0, 2, 0.0));
        assert_eq!(snap[39].species, 1);
        assert_eq!(snap[39].color, species_color(1, 2, 0.0));
    }
}
