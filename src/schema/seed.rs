//! Seed types for initializing simulation fields.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::compute::RealMatrix;

/// Complete seed specification for field initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::RandomSquares {
                square_size: 8,
                seed: 0,
            },
        }
    }
}

/// Predefined patterns for initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Filled squares at random positions (SmoothLife initialization).
    /// Count is chosen so roughly a quarter of the field is covered.
    RandomSquares {
        /// Side length of each square, in cells.
        square_size: usize,
        /// PRNG seed for reproducible placement.
        seed: u64,
    },
    /// Filled squares at explicit upper-left coordinates `(row, col)`.
    Squares {
        coords: Vec<(usize, usize)>,
        square_size: usize,
    },
    /// `floor(n^0.8)` individual live cells at random positions
    /// (discrete Game of Life initialization).
    UniformCells {
        /// PRNG seed for reproducible placement.
        seed: u64,
    },
    /// Empty field.
    Zeros,
}

impl Seed {
    /// Generate an initial field for the given shape.
    pub fn generate(&self, height: usize, width: usize) -> RealMatrix {
        match &self.pattern {
            Pattern::RandomSquares { square_size, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                random_squares(height, width, *square_size, &mut rng)
            }
            Pattern::Squares {
                coords,
                square_size,
            } => field_from_squares(coords, *square_size, height, width),
            Pattern::UniformCells { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                uniform_cells(height, width, &mut rng)
            }
            Pattern::Zeros => RealMatrix::zeros(height, width),
        }
    }
}

/// Place filled `square_size`-sided squares at the given upper-left
/// coordinates. Squares may overlap; cells outside the field are skipped.
///
/// Used to replay fixed initializations, e.g. in regression scenarios.
pub fn field_from_squares(
    coords: &[(usize, usize)],
    square_size: usize,
    height: usize,
    width: usize,
) -> RealMatrix {
    let mut field = RealMatrix::zeros(height, width);
    for &(r, c) in coords {
        for i in r..(r + square_size).min(height) {
            for j in c..(c + square_size).min(width) {
                field[(i, j)] = 1.0;
            }
        }
    }
    field
}

/// Random square placement: `n / (square_size^2 * 4)` squares, which covers
/// roughly a quarter of the field. This has shown to be a good SmoothLife
/// starting distribution.
pub fn random_squares(
    height: usize,
    width: usize,
    square_size: usize,
    rng: &mut impl Rng,
) -> RealMatrix {
    let n = height * width;
    let count = n / (square_size * square_size * 4).max(1);
    let coords: Vec<(usize, usize)> = (0..count)
        .map(|_| {
            (
                rng.gen_range(0..height.saturating_sub(square_size).max(1)),
                rng.gen_range(0..width.saturating_sub(square_size).max(1)),
            )
        })
        .collect();
    field_from_squares(&coords, square_size, height, width)
}

/// Random single-cell placement: `floor(n^0.8)` live cells. Collisions are
/// allowed, so the live count is an upper bound.
pub fn uniform_cells(height: usize, width: usize, rng: &mut impl Rng) -> RealMatrix {
    let n = height * width;
    let live = (n as f64).powf(0.8).floor() as usize;
    let mut field = RealMatrix::zeros(height, width);
    for _ in 0..live {
        let idx = rng.gen_range(0..n);
        field.as_mut_slice()[idx] = 1.0;
    }
    field
}
