//! Benchmark drivers for the vector and matrix kernels.
//!
//! Each suite walks the operation families in a fixed order and records one
//! [`Timing`](report::Timing) per stage.
pub mod config;
pub mod matrix;
pub mod report;
pub mod vector;

use anyhow::Result;
use std::fmt;
use std::str::FromStr;

use config::BenchConfig;
use report::Timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Vector,
    Matrix,
    All,
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector" => Ok(Suite::Vector),
            "matrix" => Ok(Suite::Matrix),
            "all" => Ok(Suite::All),
            _ => Err(format!("Unknown benchmark suite: {}", s)),
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suite::Vector => "vector",
            Suite::Matrix => "matrix",
            Suite::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// Repeat count for stages that scale `iterations` by `factor`.
pub(crate) fn repeat_count(iterations: usize, factor: usize) -> Result<usize> {
    iterations.checked_mul(factor).ok_or_else(|| {
        anyhow::anyhow!("iterations x {} overflows, got {}", factor, iterations)
    })
}

/// Validate `config` and run the selected suites in order.
pub fn run_suites(suite: Suite, config: &BenchConfig) -> Result<Vec<Timing>> {
    config.validate()?;
    let mut timings = Vec::new();
    if matches!(suite, Suite::Vector | Suite::All) {
        timings.extend(vector::run_vector_bench(config)?);
    }
    if matches!(suite, Suite::Matrix | Suite::All) {
        timings.extend(matrix::run_matrix_bench(config)?);
    }
    Ok(timings)
}
