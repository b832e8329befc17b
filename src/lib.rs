//! SmoothLife - Continuous cellular automata via frequency-domain
//! convolution.
//!
//! This crate implements SmoothLife, a generalization of Conway's Game of
//! Life to a continuous field, alongside the classic discrete automaton.
//! Neighborhood sums are computed as pointwise products in the frequency
//! domain, so each step costs two FFTs regardless of kernel radius.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types and seeding for simulations
//! - `compute`: Numerical computation (FFT, kernels, steppers, GPU)
//!
//! # Example
//!
//! ```rust,no_run
//! use smoothlife::{
//!     schema::{SimulationConfig, Seed, Pattern},
//!     compute::SmoothLife,
//! };
//!
//! // Create configuration and a reproducible seed
//! let config = SimulationConfig::default();
//! let seed = Seed {
//!     pattern: Pattern::RandomSquares {
//!         square_size: 8,
//!         seed: 42,
//!     },
//! };
//!
//! // Create the automaton and run it
//! let mut life = SmoothLife::new(config).unwrap();
//! life.restart_with(&seed);
//! for _ in 0..100 {
//!     life.step();
//! }
//!
//! println!("Total mass after 100 steps: {}", life.stats().mass);
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{BatchFft, Fft2d, FieldStats, GameOfLife, SmoothLife};
pub use schema::{Pattern, Seed, SimulationConfig};
