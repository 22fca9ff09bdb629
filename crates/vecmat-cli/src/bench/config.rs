use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use vecmat_core::config::{
    MATRIX_MAX_COLUMNS, MATRIX_MAX_ELEMENTS, MATRIX_MAX_ROWS, VECTOR_MAX_ELEMENTS,
};
use vecmat_core::SolverConfig;

/// Benchmark sizes and repetition counts.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
/// Upper bound on `iterations`. Access stages repeat up to 10_000 times per
/// iteration, so the product must stay within `usize`.
pub const MAX_ITERATIONS: usize = 100_000;

fn fits_matrix(rows: usize, cols: usize) -> bool {
    rows.checked_mul(cols).is_some_and(|n| n <= MATRIX_MAX_ELEMENTS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Length of the vectors in the vector suite.
    pub vector_len: usize,
    /// Shape of the matrices in the matrix suite.
    pub rows: usize,
    pub cols: usize,
    /// Order of the square system used for determinant, inverse and solve.
    pub solve_size: usize,
    pub iterations: usize,
    pub seed: u64,
    pub solver: SolverConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            vector_len: 1_000_000,
            rows: 512,
            cols: 512,
            solve_size: 256,
            iterations: 10,
            seed: 42,
            solver: SolverConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            anyhow::bail!(
                "iterations must be between 1 and {}, got {}",
                MAX_ITERATIONS,
                self.iterations
            );
        }
        if self.vector_len == 0 || self.vector_len > VECTOR_MAX_ELEMENTS {
            anyhow::bail!(
                "vector_len must be between 1 and {}, got {}",
                VECTOR_MAX_ELEMENTS,
                self.vector_len
            );
        }
        if self.rows == 0 || self.rows > MATRIX_MAX_ROWS {
            anyhow::bail!("rows must be between 1 and {}, got {}", MATRIX_MAX_ROWS, self.rows);
        }
        if self.cols == 0 || self.cols > MATRIX_MAX_COLUMNS {
            anyhow::bail!("cols must be between 1 and {}, got {}", MATRIX_MAX_COLUMNS, self.cols);
        }
        if !fits_matrix(self.rows, self.cols) {
            anyhow::bail!(
                "rows x cols must not exceed {} elements, got {}x{}",
                MATRIX_MAX_ELEMENTS,
                self.rows,
                self.cols
            );
        }
        if self.solve_size == 0
            || self.solve_size > MATRIX_MAX_ROWS
            || !fits_matrix(self.solve_size, self.solve_size)
        {
            anyhow::bail!(
                "solve_size must be between 1 and {} with at most {} elements, got {}",
                MATRIX_MAX_ROWS,
                MATRIX_MAX_ELEMENTS,
                self.solve_size
            );
        }
        self.solver
            .validate()
            .context("Invalid solver configuration")?;
        Ok(())
    }
}

pub fn load_bench_config<P: AsRef<Path>>(path: P) -> Result<BenchConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: BenchConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
