//! SmoothLife - continuous Game of Life stepped via frequency-domain
//! convolution.
//!
//! Each generation: forward-FFT the field, multiply the spectrum by the
//! precomputed effective-cell and neighborhood kernel spectra, inverse-FFT
//! both products, feed the real densities through the transition function
//! and blend the result into the field with a damped time step.

use serde::{Deserialize, Serialize};

use super::fft::{BatchFft, Fft2d, FftDirection};
use super::kernel::{KernelError, KernelPair};
use super::matrix::RealMatrix;
use crate::schema::{ConfigError, Pattern, Seed, SimulationConfig};

/// Errors raised while constructing a [`SmoothLife`] engine.
#[derive(Debug, thiserror::Error)]
pub enum LifeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

/// The SmoothLife automaton.
///
/// Owns a double-buffered field: the generation counter's parity selects
/// which buffer is current, so a step reads one buffer and writes the
/// other, then flips parity. External callers only ever read the current
/// buffer, after `step()` has fully completed.
pub struct SmoothLife<F: Fft2d = BatchFft> {
    buffers: [RealMatrix; 2],
    generation: u64,
    config: SimulationConfig,
    kernels: KernelPair,
    fft: F,
}

impl SmoothLife<BatchFft> {
    /// Create an engine with the host-side batch FFT and a randomized field.
    pub fn new(config: SimulationConfig) -> Result<Self, LifeError> {
        config.validate()?;
        let fft = BatchFft::new(config.height, config.width)?;
        Self::with_fft(config, fft)
    }

    /// Create an engine with an explicit starting field (e.g. a fixture
    /// state), leaving the random seeding aside.
    pub fn from_field(config: SimulationConfig, field: RealMatrix) -> Result<Self, LifeError> {
        config.validate()?;
        assert_eq!(
            field.shape(),
            (config.height, config.width),
            "initial field shape does not match configuration"
        );
        let fft = BatchFft::new(config.height, config.width)?;
        Self::with_fft_and_field(config, fft, field)
    }
}

impl<F: Fft2d> SmoothLife<F> {
    /// Create an engine on a caller-supplied FFT implementation
    /// (interchangeably the batch or the GPU engine), with a randomized
    /// field.
    pub fn with_fft(config: SimulationConfig, fft: F) -> Result<Self, LifeError> {
        config.validate()?;
        let field = RealMatrix::zeros(config.height, config.width);
        let mut life = Self::with_fft_and_field(config, fft, field)?;
        life.restart(true);
        Ok(life)
    }

    fn with_fft_and_field(
        config: SimulationConfig,
        mut fft: F,
        field: RealMatrix,
    ) -> Result<Self, LifeError> {
        assert_eq!(
            fft.shape(),
            (config.height, config.width),
            "FFT engine shape does not match configuration"
        );
        let kernels = KernelPair::build(&mut fft, config.inner_radius, config.outer_radius)?;
        let empty = RealMatrix::zeros(config.height, config.width);
        Ok(Self {
            buffers: [field, empty],
            generation: 0,
            config,
            kernels,
            fft,
        })
    }

    /// Simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Monotonic generation counter; parity selects the current buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only snapshot of the current field. Always reflects a fully
    /// completed generation.
    pub fn current_field(&self) -> &RealMatrix {
        &self.buffers[(self.generation % 2) as usize]
    }

    /// Reset the generation counter and repopulate the field: randomly
    /// placed filled squares of side `2 * inner_radius` when `randomize`,
    /// all zeros otherwise.
    pub fn restart(&mut self, randomize: bool) {
        let pattern = if randomize {
            Pattern::RandomSquares {
                square_size: (2.0 * self.config.inner_radius).round() as usize,
                seed: rand::random(),
            }
        } else {
            Pattern::Zeros
        };
        self.restart_with(&Seed { pattern });
    }

    /// Reset the generation counter and repopulate from an explicit seed.
    pub fn restart_with(&mut self, seed: &Seed) {
        self.generation = 0;
        self.buffers[0] = seed.generate(self.config.height, self.config.width);
        log::debug!("restarted field, mass {}", self.buffers[0].sum());
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        let (m, n) = self.apply_kernels();
        let s = self.transition(&m, &n);

        let current = self.current_field();
        let dt = self.config.dt;
        let next = (current.clone() + dt * (s - current.clone())).clamp(0.0, 1.0);

        let next_idx = ((self.generation + 1) % 2) as usize;
        self.buffers[next_idx] = next;
        self.generation += 1;
    }

    /// Convolve the current field with both kernels in the frequency
    /// domain, returning the real effective-cell density `M` and
    /// neighborhood density `N`.
    pub fn apply_kernels(&mut self) -> (RealMatrix, RealMatrix) {
        let field = self.current_field().to_complex();
        let spectrum = self.fft.transform(&field, FftDirection::Forward);

        let m = self
            .fft
            .transform(
                &(spectrum.clone() * self.kernels.effective_cell.clone()),
                FftDirection::Inverse,
            )
            .real();
        let n = self
            .fft
            .transform(
                &(spectrum * self.kernels.neighborhood.clone()),
                FftDirection::Inverse,
            )
            .real();

        (m, n)
    }

    /// SmoothLife transition function.
    ///
    /// A dead-ish cell (M below 0.5) with neighborhood density in the
    /// birth interval turns on; a live-ish cell with density in the death
    /// interval turns off. Both intervals are half-open `[low, high)`.
    pub fn transition(&self, m: &RealMatrix, n: &RealMatrix) -> RealMatrix {
        let alive = m.hard_step(0.5);

        let interval_mask = |(low, high): (f32, f32)| {
            n.hard_step(low) * (1.0 - n.hard_step(high))
        };
        let birth = interval_mask(self.config.birth_interval);
        let death = interval_mask(self.config.death_interval);

        birth * (1.0 - alive.clone()) + death * alive
    }

    /// Statistics for the current field.
    pub fn stats(&self) -> FieldStats {
        FieldStats::from_field(self.current_field())
    }
}

/// Field statistics for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldStats {
    pub mass: f32,
    pub min_value: f32,
    pub max_value: f32,
    pub live_fraction: f32,
}

impl FieldStats {
    /// Compute statistics from a field.
    pub fn from_field(field: &RealMatrix) -> Self {
        let mut mass = 0.0f32;
        let mut min_value = f32::INFINITY;
        let mut max_value = f32::NEG_INFINITY;
        let mut live = 0usize;

        for &v in field.as_slice() {
            mass += v;
            min_value = min_value.min(v);
            max_value = max_value.max(v);
            if v > 0.5 {
                live += 1;
            }
        }

        Self {
            mass,
            min_value,
            max_value,
            live_fraction: live as f32 / field.len() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::kernel::shifted_smooth_circle;
    use crate::schema::field_from_squares;

    /// Seven 12x12 squares on a 64x64 field; a start state known to
    /// produce a glider.
    pub(crate) const START_STATE_COORDS: [(usize, usize); 7] = [
        (51, 0),
        (28, 4),
        (46, 24),
        (34, 14),
        (10, 26),
        (23, 19),
        (8, 29),
    ];

    fn fixture_life() -> SmoothLife {
        let field = field_from_squares(&START_STATE_COORDS, 12, 64, 64);
        SmoothLife::from_field(SimulationConfig::default(), field).unwrap()
    }

    /// Naive wrap-around spatial convolution, the O(n*k) reference the
    /// frequency-domain path must reproduce.
    fn direct_convolve(field: &RealMatrix, kernel: &RealMatrix) -> RealMatrix {
        let (h, w) = field.shape();
        let mut out = RealMatrix::zeros(h, w);
        for r in 0..h {
            for c in 0..w {
                let mut acc = 0.0f32;
                for kr in 0..h {
                    for kc in 0..w {
                        let fr = (r + h - kr) % h;
                        let fc = (c + w - kc) % w;
                        acc += field[(fr, fc)] * kernel[(kr, kc)];
                    }
                }
                out[(r, c)] = acc;
            }
        }
        out
    }

    fn normalized_circle(height: usize, width: usize, radius: f32) -> RealMatrix {
        let circle = shifted_smooth_circle(height, width, radius);
        let sum = circle.sum();
        circle / sum
    }

    #[test]
    fn test_fixture_start_state() {
        let field = field_from_squares(&START_STATE_COORDS, 12, 64, 64);
        assert_eq!(field[(51, 0)], 1.0);
        assert_eq!(field[(62, 11)], 1.0);
        assert_eq!(field[(0, 0)], 0.0);
        // Seven squares, some overlapping.
        assert!(field.sum() <= 7.0 * 144.0);
        assert!(field.sum() > 5.0 * 144.0);
    }

    #[test]
    fn test_apply_kernels_matches_direct_convolution() {
        // The acceptance scenario: effective-cell density on the fixture
        // field must match a direct spatial convolution per cell.
        let mut life = fixture_life();
        let (m, n) = life.apply_kernels();

        let inner = normalized_circle(16, 16, 4.0);
        // Sanity-check the comparison machinery on a smaller grid first:
        let small_field = field_from_squares(&[(2, 3), (9, 10)], 4, 16, 16);
        let config = SimulationConfig {
            height: 16,
            width: 16,
            inner_radius: 4.0,
            outer_radius: 6.0,
            ..Default::default()
        };
        let mut small = SmoothLife::from_field(config, small_field.clone()).unwrap();
        let (small_m, _) = small.apply_kernels();
        let reference = direct_convolve(&small_field, &inner);
        for (a, b) in small_m.as_slice().iter().zip(reference.as_slice()) {
            assert!((a - b).abs() < 1e-3, "direct vs FFT: {} vs {}", a, b);
        }

        // On the full fixture, check mass preservation of both densities:
        // unit-mass kernels keep the total field mass unchanged.
        let field_mass = life.current_field().sum();
        assert!((m.sum() - field_mass).abs() / field_mass < 1e-3);
        assert!((n.sum() - field_mass).abs() / field_mass < 1e-3);
    }

    #[test]
    fn test_fixture_full_convolution_reference() {
        let mut life = fixture_life();
        let (m, n) = life.apply_kernels();

        let field = field_from_squares(&START_STATE_COORDS, 12, 64, 64);
        let m_ref = direct_convolve(&field, &normalized_circle(64, 64, 4.0));
        for (a, b) in m.as_slice().iter().zip(m_ref.as_slice()) {
            assert!((a - b).abs() < 1e-3, "M density: {} vs {}", a, b);
        }

        let annulus = shifted_smooth_circle(64, 64, 12.0) - shifted_smooth_circle(64, 64, 4.0);
        let annulus_sum = annulus.sum();
        let n_ref = direct_convolve(&field, &(annulus / annulus_sum));
        for (a, b) in n.as_slice().iter().zip(n_ref.as_slice()) {
            assert!((a - b).abs() < 1e-3, "N density: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_transition_is_masked_correctly() {
        let life = fixture_life();
        let (b0, b1) = life.config().birth_interval;
        let (d0, d1) = life.config().death_interval;

        // Dead cell, neighborhood density inside the birth interval.
        let m = RealMatrix::from_flat(1, 1, vec![0.0]);
        let n = RealMatrix::from_flat(1, 1, vec![(b0 + b1) / 2.0]);
        assert_eq!(life.transition(&m, &n).as_slice(), &[1.0]);

        // Live cell, neighborhood density inside the death interval.
        let m = RealMatrix::from_flat(1, 1, vec![1.0]);
        let n = RealMatrix::from_flat(1, 1, vec![(d0 + d1) / 2.0]);
        assert_eq!(life.transition(&m, &n).as_slice(), &[1.0]);

        // Live cell, density in the birth interval only: stays off in S.
        let m = RealMatrix::from_flat(1, 1, vec![1.0]);
        let n = RealMatrix::from_flat(1, 1, vec![(b0 + b1) / 2.0]);
        assert_eq!(life.transition(&m, &n).as_slice(), &[0.0]);
    }

    #[test]
    fn test_transition_intervals_are_half_open() {
        let life = fixture_life();
        let (b0, b1) = life.config().birth_interval;
        let (d0, d1) = life.config().death_interval;

        let dead = RealMatrix::from_flat(1, 1, vec![0.0]);
        let live = RealMatrix::from_flat(1, 1, vec![1.0]);

        // Birth: included at low, excluded at high.
        let at_low = RealMatrix::from_flat(1, 1, vec![b0]);
        let at_high = RealMatrix::from_flat(1, 1, vec![b1]);
        assert_eq!(life.transition(&dead, &at_low).as_slice(), &[1.0]);
        assert_eq!(life.transition(&dead, &at_high).as_slice(), &[0.0]);

        // Death behaves identically: no asymmetry against birth.
        let at_low = RealMatrix::from_flat(1, 1, vec![d0]);
        let at_high = RealMatrix::from_flat(1, 1, vec![d1]);
        assert_eq!(life.transition(&live, &at_low).as_slice(), &[1.0]);
        assert_eq!(life.transition(&live, &at_high).as_slice(), &[0.0]);
    }

    #[test]
    fn test_step_clamps_field() {
        let mut life = fixture_life();
        for _ in 0..5 {
            life.step();
            for &v in life.current_field().as_slice() {
                assert!((0.0..=1.0).contains(&v), "cell {} out of range", v);
            }
        }
    }

    #[test]
    fn test_step_advances_generation_and_parity() {
        let mut life = fixture_life();
        assert_eq!(life.generation(), 0);

        let before = life.current_field().clone();
        life.step();
        assert_eq!(life.generation(), 1);
        assert_ne!(life.current_field(), &before, "step left field unchanged");

        life.step();
        assert_eq!(life.generation(), 2);
    }

    #[test]
    fn test_restart_resets_generation() {
        let mut life = fixture_life();
        life.step();
        life.step();
        life.restart(false);
        assert_eq!(life.generation(), 0);
        assert_eq!(life.current_field().sum(), 0.0);

        life.restart(true);
        assert_eq!(life.generation(), 0);
        assert!(life.current_field().sum() > 0.0);
    }

    #[test]
    fn test_empty_field_stays_empty() {
        let mut life = fixture_life();
        life.restart(false);
        life.step();
        assert_eq!(life.current_field().sum(), 0.0);
    }

    #[test]
    fn test_field_stats() {
        let field = field_from_squares(&[(0, 0)], 4, 8, 8);
        let stats = FieldStats::from_field(&field);
        assert_eq!(stats.mass, 16.0);
        assert_eq!(stats.min_value, 0.0);
        assert_eq!(stats.max_value, 1.0);
        assert!((stats.live_fraction - 0.25).abs() < 1e-6);
    }
}
