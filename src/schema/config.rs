//! Configuration types for the simulation parameters.

use serde::{Deserialize, Serialize};

/// Simulation parameters, supplied once at construction and immutable
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid height in cells. Must be a power of two.
    pub height: usize,
    /// Grid width in cells. Must be a power of two.
    pub width: usize,
    /// Neighborhood density interval `(low, high)` in which a dead cell
    /// is born. Also known as `(b1, b2)`.
    pub birth_interval: (f32, f32),
    /// Neighborhood density interval `(low, high)` in which a live cell
    /// dies. Also known as `(d1, d2)`.
    pub death_interval: (f32, f32),
    /// Radius of the effective-cell disc kernel.
    pub inner_radius: f32,
    /// Outer radius of the neighborhood annulus kernel.
    pub outer_radius: f32,
    /// Fraction of each transition blended into the field per step.
    pub dt: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            height: 64,
            width: 64,
            birth_interval: (0.254, 0.312),
            death_interval: (0.340, 0.518),
            inner_radius: 4.0,
            outer_radius: 12.0,
            dt: 0.1,
        }
    }
}

impl SimulationConfig {
    /// Total cell count.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    ///
    /// Checked once here so steady-state stepping never revisits these
    /// preconditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height == 0
            || self.width == 0
            || !self.height.is_power_of_two()
            || !self.width.is_power_of_two()
        {
            return Err(ConfigError::InvalidDimensions {
                height: self.height,
                width: self.width,
            });
        }
        if self.dt <= 0.0 || !self.dt.is_finite() {
            return Err(ConfigError::InvalidTimeStep);
        }
        if !(self.inner_radius > 0.0 && self.outer_radius > self.inner_radius) {
            return Err(ConfigError::InvalidRadii {
                inner: self.inner_radius,
                outer: self.outer_radius,
            });
        }
        for &(name, (low, high)) in &[
            ("birth", self.birth_interval),
            ("death", self.death_interval),
        ] {
            if !(low < high && low.is_finite() && high.is_finite()) {
                return Err(ConfigError::InvalidInterval { which: name });
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid dimensions {height}x{width} must be non-zero powers of two")]
    InvalidDimensions { height: usize, width: usize },
    #[error("time step must be positive and finite")]
    InvalidTimeStep,
    #[error("kernel radii must satisfy 0 < inner ({inner}) < outer ({outer})")]
    InvalidRadii { inner: f32, outer: f32 },
    #[error("{which} interval must satisfy low < high")]
    InvalidInterval { which: &'static str },
}
