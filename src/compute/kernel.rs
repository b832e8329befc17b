//! Convolution kernel construction for SmoothLife.
//!
//! Two radially symmetric kernels: an inner "effective cell" disc and an
//! outer "neighborhood" annulus. Both are built as smooth logistic discs
//! around the field center, rolled into the FFT's zero-frequency-at-corner
//! layout, normalized to unit mass, and transformed to the frequency
//! domain once at setup.

use super::fft::{Fft2d, FftDirection};
use super::matrix::{ComplexMatrix, RealMatrix};

/// Kernel construction errors.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// The kernel summed to zero (or a non-finite value) before
    /// normalization. Radius too small relative to the field shape.
    #[error("kernel with radius {radius} is degenerate for a {height}x{width} field")]
    DegenerateKernel {
        radius: f32,
        height: usize,
        width: usize,
    },
}

/// The two convolution kernel spectra, computed once per
/// `(shape, inner_radius, outer_radius)` tuple and immutable afterward.
///
/// Both underlying real kernels sum to 1.0, so convolution preserves
/// total field mass.
#[derive(Debug, Clone)]
pub struct KernelPair {
    /// Effective-cell (M) kernel spectrum.
    pub effective_cell: ComplexMatrix,
    /// Neighborhood (N) kernel spectrum.
    pub neighborhood: ComplexMatrix,
}

impl KernelPair {
    /// Build both kernels for the engine's shape and transform them to the
    /// frequency domain.
    pub fn build(
        fft: &mut impl Fft2d,
        inner_radius: f32,
        outer_radius: f32,
    ) -> Result<Self, KernelError> {
        let (height, width) = fft.shape();

        let effective_cell = shifted_smooth_circle(height, width, inner_radius);
        let neighborhood = shifted_smooth_circle(height, width, outer_radius) - effective_cell.clone();

        let effective_cell = normalize(effective_cell, inner_radius)?;
        let neighborhood = normalize(neighborhood, outer_radius)?;

        log::debug!(
            "built {}x{} kernel pair, radii {} / {}",
            height,
            width,
            inner_radius,
            outer_radius
        );

        Ok(Self {
            effective_cell: fft.transform(&effective_cell.to_complex(), FftDirection::Forward),
            neighborhood: fft.transform(&neighborhood.to_complex(), FftDirection::Forward),
        })
    }
}

fn normalize(kernel: RealMatrix, radius: f32) -> Result<RealMatrix, KernelError> {
    let sum = kernel.sum();
    if sum == 0.0 || !sum.is_finite() {
        let (height, width) = kernel.shape();
        return Err(KernelError::DegenerateKernel {
            radius,
            height,
            width,
        });
    }
    Ok(kernel / sum)
}

/// A smooth disc of the given radius: each cell holds a logistic falloff of
/// its Euclidean distance from the field center,
/// `1 / (1 + exp(log2(min(h, w)) * (distance - radius)))`,
/// then rolled by `(h/2, w/2)` so the peak lands at index (0, 0), which
/// the FFT treats as the spatial origin.
pub fn shifted_smooth_circle(height: usize, width: usize, radius: f32) -> RealMatrix {
    let (rows, cols) = RealMatrix::mesh_grid(height, width);
    let (h, w) = (height as f32, width as f32);
    let steepness = h.min(w).log2();

    let dy = rows - h / 2.0;
    let dx = cols - w / 2.0;
    let distance = (dy.clone() * dy + dx.clone() * dx).map(|&v| v.sqrt());
    let logistic = distance.map(|&d| 1.0 / (1.0 + (steepness * (d - radius)).exp()));

    logistic
        .roll_rows(height as isize / 2)
        .roll_cols(width as isize / 2)
}
