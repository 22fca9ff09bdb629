//! Dense vector and matrix kernels.
//!
//! [`Vector`] and [`Matrix`] own [`ALIGNMENT`](crate::config::ALIGNMENT)-aligned
//! f64 buffers. Square-matrix routines (determinant, inverse, solve, trace)
//! live in [`linalg`] as further `Matrix` methods.
mod align;
pub mod linalg;
pub mod matrix;
pub mod vector;

pub use align::{aligned_size, checked_aligned_size};
pub use matrix::Matrix;
pub use vector::{axpy, Vector};
