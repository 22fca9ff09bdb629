//! vecmat-core: aligned dense vector and matrix kernels for f64.
//!
//! Every fallible operation returns [`Result`] with one of the closed set of
//! [`Error`] outcomes. The [`sentinel`] module adapts those results to plain
//! values (NaN, `false`, `None`) for callers that prefer not to match.
//!
//! The optional `simd` feature enables an SSE2 dot-product path on x86_64.
pub mod config;
pub mod error;
pub mod math;
pub mod sentinel;

pub use config::{Limits, SolverConfig};
pub use error::{describe, Error, Result};
pub use math::{axpy, Matrix, Vector};
