//! Separable 2D FFT over a [`ComplexMatrix`].
//!
//! The forward transform runs one 1D pass along each row, then one along
//! each column; the inverse runs the complementary order and scales by
//! `1/(width*height)` once at the end. Dimensions must be powers of two.

use std::sync::Arc;

use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use super::matrix::{ComplexMatrix, Matrix};
use crate::schema::ConfigError;

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftDirection {
    Forward,
    Inverse,
}

/// Contract shared by the batch and GPU transform engines.
///
/// An engine is built once for a fixed power-of-two shape; `transform`
/// panics when handed a matrix of a different shape. The two
/// implementations must agree within floating-point tolerance on
/// identical input, and `transform(transform(x, Forward), Inverse) ≈ x`.
pub trait Fft2d {
    /// Shape the engine was planned for, as `(height, width)`.
    fn shape(&self) -> (usize, usize);

    /// Transform the full matrix in the given direction.
    fn transform(&mut self, input: &ComplexMatrix, direction: FftDirection) -> ComplexMatrix;
}

/// Host-side batched FFT with cached rustfft plans.
///
/// Row passes are data-parallel and run under rayon; column passes go
/// through a per-column gather buffer.
pub struct BatchFft {
    height: usize,
    width: usize,
    forward_row: Arc<dyn Fft<f32>>,
    forward_col: Arc<dyn Fft<f32>>,
    inverse_row: Arc<dyn Fft<f32>>,
    inverse_col: Arc<dyn Fft<f32>>,
}

impl BatchFft {
    /// Plan transforms for a fixed grid shape.
    pub fn new(height: usize, width: usize) -> Result<Self, ConfigError> {
        if height == 0 || width == 0 || !height.is_power_of_two() || !width.is_power_of_two() {
            return Err(ConfigError::InvalidDimensions { height, width });
        }

        let mut planner = FftPlanner::new();
        Ok(Self {
            height,
            width,
            forward_row: planner.plan_fft_forward(width),
            forward_col: planner.plan_fft_forward(height),
            inverse_row: planner.plan_fft_inverse(width),
            inverse_col: planner.plan_fft_inverse(height),
        })
    }

    fn row_pass(&self, data: &mut [Complex<f32>], plan: &Arc<dyn Fft<f32>>) {
        data.par_chunks_exact_mut(self.width)
            .for_each(|row| plan.process(row));
    }

    fn col_pass(&self, data: &mut [Complex<f32>], plan: &Arc<dyn Fft<f32>>) {
        let mut col_buffer = vec![Complex::new(0.0, 0.0); self.height];
        for x in 0..self.width {
            for y in 0..self.height {
                col_buffer[y] = data[y * self.width + x];
            }
            plan.process(&mut col_buffer);
            for y in 0..self.height {
                data[y * self.width + x] = col_buffer[y];
            }
        }
    }
}

impl Fft2d for BatchFft {
    fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    fn transform(&mut self, input: &ComplexMatrix, direction: FftDirection) -> ComplexMatrix {
        assert_eq!(
            input.shape(),
            self.shape(),
            "matrix shape does not match planned FFT shape"
        );

        let mut data = input.as_slice().to_vec();
        match direction {
            FftDirection::Forward => {
                self.row_pass(&mut data, &self.forward_row);
                self.col_pass(&mut data, &self.forward_col);
            }
            FftDirection::Inverse => {
                self.col_pass(&mut data, &self.inverse_col);
                self.row_pass(&mut data, &self.inverse_row);

                let scale = 1.0 / (self.width * self.height) as f32;
                for v in &mut data {
                    *v *= scale;
                }
            }
        }

        Matrix::from_flat(self.height, self.width, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::matrix::RealMatrix;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn transform_real(
        real: &[f32],
        height: usize,
        width: usize,
        dir: FftDirection,
    ) -> ComplexMatrix {
        let mut fft = BatchFft::new(height, width).unwrap();
        let m = RealMatrix::from_flat(height, width, real.to_vec());
        fft.transform(&m.to_complex(), dir)
    }

    fn assert_close(actual: Complex<f32>, re: f32, im: f32) {
        assert!(
            (actual.re - re).abs() < 1e-3 && (actual.im - im).abs() < 1e-3,
            "expected {}+{}i, got {}",
            re,
            im,
            actual
        );
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(matches!(
            BatchFft::new(6, 8),
            Err(ConfigError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            BatchFft::new(8, 0),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        // [[1,0],[0,0]] -> every bin 1+0i
        let out = transform_real(&[1.0, 0.0, 0.0, 0.0], 2, 2, FftDirection::Forward);
        for &v in out.as_slice() {
            assert_close(v, 1.0, 0.0);
        }
    }

    #[test]
    fn test_row_pair_spectrum() {
        // [[1,1],[0,0]] -> [[2,0],[2,0]]
        let out = transform_real(&[1.0, 1.0, 0.0, 0.0], 2, 2, FftDirection::Forward);
        assert_close(out[(0, 0)], 2.0, 0.0);
        assert_close(out[(0, 1)], 0.0, 0.0);
        assert_close(out[(1, 0)], 2.0, 0.0);
        assert_close(out[(1, 1)], 0.0, 0.0);
    }

    #[test]
    fn test_known_2x4_spectrum() {
        let input = [1.0, -2.0, 3.0, 4.0, 3.0, 4.5, 5.0, 6.0];
        let out = transform_real(&input, 2, 4, FftDirection::Forward);

        assert_close(out[(0, 0)], 24.5, 0.0);
        assert_close(out[(0, 1)], -4.0, 7.5);
        assert_close(out[(0, 2)], -0.5, 0.0);
        assert_close(out[(0, 3)], -4.0, -7.5);
        assert_close(out[(1, 0)], -12.5, 0.0);
        assert_close(out[(1, 1)], 0.0, 4.5);
        assert_close(out[(1, 2)], 4.5, 0.0);
        assert_close(out[(1, 3)], 0.0, -4.5);
    }

    #[test]
    fn test_round_trip_rectangular() {
        let mut fft = BatchFft::new(8, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let data: Vec<f32> = (0..32).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let field = RealMatrix::from_flat(8, 4, data);

        let spectrum = fft.transform(&field.to_complex(), FftDirection::Forward);
        let recovered = fft.transform(&spectrum, FftDirection::Inverse);

        for (orig, rec) in field.as_slice().iter().zip(recovered.real().as_slice()) {
            assert!((orig - rec).abs() < 1e-3, "round trip: {} vs {}", orig, rec);
        }
    }

    #[test]
    #[should_panic(expected = "does not match planned FFT shape")]
    fn test_shape_checked() {
        let mut fft = BatchFft::new(4, 4).unwrap();
        let m = RealMatrix::zeros(4, 8).to_complex();
        let _ = fft.transform(&m, FftDirection::Forward);
    }

    proptest! {
        #[test]
        fn prop_round_trip(exp_h in 0u32..6, exp_w in 0u32..6, seed: u64) {
            let height = 1usize << exp_h;
            let width = 1usize << exp_w;
            let mut rng = StdRng::seed_from_u64(seed);
            let data: Vec<Complex<f32>> = (0..height * width)
                .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
                .collect();
            let input = ComplexMatrix::from_flat(height, width, data);

            let mut fft = BatchFft::new(height, width).unwrap();
            let spectrum = fft.transform(&input, FftDirection::Forward);
            let recovered = fft.transform(&spectrum, FftDirection::Inverse);

            for (orig, rec) in input.as_slice().iter().zip(recovered.as_slice()) {
                prop_assert!((orig - rec).norm() < 1e-3);
            }
        }
    }
}
