//! Compute module - Numerical simulation of SmoothLife and the discrete
//! Game of Life.

mod fft;
mod game_of_life;
mod kernel;
mod matrix;
mod smooth_life;

pub mod gpu;

pub use fft::*;
pub use game_of_life::*;
pub use kernel::*;
pub use matrix::*;
pub use smooth_life::*;
