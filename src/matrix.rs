//! Species × species interaction coefficients.

use crate::config::SimulationConfig;
use crate::error::SimError;
use rand::Rng;

/// Row-major table; `get(a, b)` is the coefficient species `a` feels from `b`.
/// Not symmetric in general.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    size: usize,
    cells: Vec<f32>,
}

impl InteractionMatrix {
    /// Samples every cell uniformly from `[-scalar, scalar]`, except the
    /// diagonal when the self-interaction override is enabled.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, config: &SimulationConfig) -> Self {
        let size = config.species_count;
        let scalar = config.matrix_scalar;
        let mut cells = Vec::with_capacity(size * size);
        for r in 0..size {
            for c in 0..size {
                let value = if config.self_override_enabled && r == c {
                    config.self_override_value
                } else {
                    // Scaled unit sample; `-scalar..=scalar` overflows its width near f32::MAX.
                    scalar * (2.0 * rng.gen_range(0.0f32..=1.0) - 1.0)
                };
                cells.push(value);
            }
        }
        Self { size, cells }
    }

    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, SimError> {
        let size = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(SimError::MatrixNotSquare {
                row,
                len: r.len(),
                size,
            });
        }
        Ok(Self {
            size,
            cells: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row * self.size + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }
}
