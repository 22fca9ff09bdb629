//! Build-time limits and solver configuration.
//!
//! The size limits and alignment are fixed per build. Only the singularity
//! tolerance used by the elimination routines is runtime configurable, through
//! [`SolverConfig`].
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Byte boundary every kernel buffer starts on.
pub const ALIGNMENT: usize = 32;

/// Max number of elements (f64) in a vector. Approximately 76.3 MiB.
pub const VECTOR_MAX_ELEMENTS: usize = 10_000_000;

/// Max number of matrix rows.
pub const MATRIX_MAX_ROWS: usize = 100_000;

/// Max number of matrix columns.
pub const MATRIX_MAX_COLUMNS: usize = 100_000;

/// Max number of elements (f64) in a matrix. Approximately 381 MiB.
pub const MATRIX_MAX_ELEMENTS: usize = 50_000_000;

/// Lengths below this are treated as zero by normalize, angle and project.
pub const EPSILON: f64 = 1e-10;

/// Default pivot magnitude below which a matrix is considered singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Options for determinant, inverse and solve.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    pub singular_tolerance: f64,
}

impl SolverConfig {
    pub fn new(singular_tolerance: f64) -> Self {
        Self { singular_tolerance }
    }

    /// The tolerance must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !self.singular_tolerance.is_finite() || self.singular_tolerance < 0.0 {
            return Err(Error::InvalidArg);
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: SINGULAR_TOLERANCE,
        }
    }
}

/// Snapshot of the compile-time limits, for reporting.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub alignment: usize,
    pub vector_max_elements: usize,
    pub matrix_max_rows: usize,
    pub matrix_max_columns: usize,
    pub matrix_max_elements: usize,
    pub epsilon: f64,
    pub singular_tolerance: f64,
}

impl Limits {
    pub const fn current() -> Self {
        Self {
            alignment: ALIGNMENT,
            vector_max_elements: VECTOR_MAX_ELEMENTS,
            matrix_max_rows: MATRIX_MAX_ROWS,
            matrix_max_columns: MATRIX_MAX_COLUMNS,
            matrix_max_elements: MATRIX_MAX_ELEMENTS,
            epsilon: EPSILON,
            singular_tolerance: SINGULAR_TOLERANCE,
        }
    }
}
