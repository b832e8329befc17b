//! Discrete Game of Life on a wrap-around grid.
//!
//! Stepped by direct 3x3 neighbor counting; at that kernel size the
//! frequency-domain convolution path buys nothing. Shares the parity
//! double-buffer scheme with the SmoothLife engine; a GPU rendition of
//! the same rule lives in [`crate::compute::gpu`].

use rand::thread_rng;

use super::matrix::RealMatrix;
use crate::schema::uniform_cells;

/// Conway's Game of Life with toroidal wrap-around.
pub struct GameOfLife {
    buffers: [RealMatrix; 2],
    generation: u64,
}

impl GameOfLife {
    /// Create a randomized automaton.
    pub fn new(height: usize, width: usize) -> Self {
        let mut life = Self {
            buffers: [
                RealMatrix::zeros(height, width),
                RealMatrix::zeros(height, width),
            ],
            generation: 0,
        };
        life.restart(true);
        life
    }

    /// Create an automaton from an explicit field of 0/1 cells.
    pub fn from_field(field: RealMatrix) -> Self {
        let (height, width) = field.shape();
        Self {
            buffers: [field, RealMatrix::zeros(height, width)],
            generation: 0,
        }
    }

    /// Monotonic generation counter; parity selects the current buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only snapshot of the current field.
    pub fn current_field(&self) -> &RealMatrix {
        &self.buffers[(self.generation % 2) as usize]
    }

    /// Reset the generation counter and reseed: `floor(n^0.8)` random live
    /// cells when `randomize`, all dead otherwise.
    pub fn restart(&mut self, randomize: bool) {
        self.generation = 0;
        let (height, width) = self.buffers[0].shape();
        self.buffers[0] = if randomize {
            uniform_cells(height, width, &mut thread_rng())
        } else {
            RealMatrix::zeros(height, width)
        };
    }

    /// Advance one generation with the B3/S23 rule.
    pub fn step(&mut self) {
        let cur_idx = (self.generation % 2) as usize;
        let (height, width) = self.buffers[cur_idx].shape();

        let mut next = RealMatrix::zeros(height, width);
        {
            let current = &self.buffers[cur_idx];
            for r in 0..height {
                for c in 0..width {
                    let mut neighbors = 0u8;
                    for dr in [height - 1, 0, 1] {
                        for dc in [width - 1, 0, 1] {
                            if dr == 0 && dc == 0 {
                                continue;
                            }
                            let nr = (r + dr) % height;
                            let nc = (c + dc) % width;
                            if current[(nr, nc)] > 0.5 {
                                neighbors += 1;
                            }
                        }
                    }
                    let alive = current[(r, c)] > 0.5;
                    next[(r, c)] = match (alive, neighbors) {
                        (true, 2) | (true, 3) | (false, 3) => 1.0,
                        _ => 0.0,
                    };
                }
            }
        }

        self.buffers[1 - cur_idx] = next;
        self.generation += 1;
    }
}
