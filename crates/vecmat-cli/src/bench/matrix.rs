use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::time::Instant;

use vecmat_core::config::{MATRIX_MAX_COLUMNS, MATRIX_MAX_ELEMENTS, MATRIX_MAX_ROWS};
use vecmat_core::{Matrix, Vector};

use super::config::BenchConfig;
use super::report::Timing;
use super::repeat_count;

const SUITE: &str = "matrix";

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Result<Matrix> {
    let mut m = Matrix::alloc(rows, cols)
        .with_context(|| format!("Failed to build a {}x{} matrix", rows, cols))?;
    for x in m.as_mut_slice() {
        *x = rng.gen_range(-1.0..1.0);
    }
    Ok(m)
}

/// Random `n x n` matrix whose diagonal dominates each row, so it is never
/// singular.
pub fn diagonally_dominant(rng: &mut StdRng, n: usize) -> Result<Matrix> {
    let mut m = random_matrix(rng, n, n)?;
    for i in 0..n {
        let row_sum: f64 = m.row_slice(i)?.iter().map(|x| x.abs()).sum();
        m.set(i, i, row_sum + 1.0)?;
    }
    Ok(m)
}

/// Time every matrix operation family on `rows x cols` operands, plus the
/// square solvers on a `solve_size` system.
pub fn run_matrix_bench(config: &BenchConfig) -> Result<Vec<Timing>> {
    let (rows, cols) = (config.rows, config.cols);
    let iters = config.iterations;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut timings = Vec::with_capacity(10);
    let mut checksum = 0.0f64;

    log::info!(
        "[vecmat::bench] matrix suite: {}x{}, solve order {}, {} iterations",
        rows,
        cols,
        config.solve_size,
        iters
    );

    // Allocation and fill
    let start = Instant::now();
    let mut m1 = Matrix::alloc(rows, cols)?;
    let mut m2 = Matrix::alloc(rows, cols)?;
    let mut m3 = Matrix::alloc(rows, cols)?;
    for i in 0..iters {
        m1.fill(1.5 + i as f64)?;
        m2.set_zero();
        let temp = Matrix::alloc(10, 10)?;
        checksum += temp.sum();
    }
    let m_arr = random_matrix(&mut rng, rows, cols)?;
    checksum += m_arr.as_slice()[0];
    m1.copy_from(&m_arr)?;
    m2.copy_from(&random_matrix(&mut rng, rows, cols)?)?;
    timings.push(Timing::new(SUITE, "init_alloc_fill", iters, start.elapsed()));

    // Element, row and column access
    let start = Instant::now();
    let mut row_buf = Vector::alloc(cols)?;
    let mut col_buf = Vector::alloc(rows)?;
    for i in 0..repeat_count(iters, 100)? {
        let (ri, ci) = (i % rows, i % cols);
        let saved = m1.get(ri, ci)?;
        m1.set(ri, ci, i as f64)?;
        checksum += m1.get(ri, ci)?;
        m1.set(ri, ci, saved)?;
        checksum += (m1.rows() + m1.cols()) as f64;
    }
    for i in 0..iters {
        m1.get_row(i % rows, &mut row_buf)?;
        m1.set_row(i % rows, &row_buf)?;
        m2.get_column(i % cols, &mut col_buf)?;
        m2.set_column(i % cols, &col_buf)?;
        checksum += row_buf[0] + col_buf[0];
    }
    timings.push(Timing::new(SUITE, "get_set_meta_vec", iters, start.elapsed()));

    // Basic arithmetic
    let start = Instant::now();
    for _ in 0..iters {
        m1.add_inplace(&m2)?;
        m1.subtract_inplace(&m2)?;
        m1.add_into(&m2, &mut m3)?;
        m1.subtract_into(&m2, &mut m3)?;
        checksum += m3.as_slice()[0];
    }
    timings.push(Timing::new(SUITE, "arith_basic", iters, start.elapsed()));

    // Scalar, element-wise and map
    let start = Instant::now();
    for _ in 0..iters {
        m1.scale_inplace(1.0001);
        m2.scale_into(&mut m3, 0.9999)?;
        m1.hadamard_into(&m2, &mut m3)?;
        m1.map_into(&mut m3, |x| x.abs().sqrt())?;
        checksum += m3.as_slice()[0];
    }
    timings.push(Timing::new(SUITE, "scalar_elem_map", iters, start.elapsed()));

    // Matrix x matrix
    let m1_t = m1.transpose()?;
    let mut product = Matrix::alloc(rows, rows)?;
    let start = Instant::now();
    for _ in 0..iters {
        m1.multiply_into(&m1_t, &mut product)?;
        checksum += product.as_slice()[0];
    }
    timings.push(Timing::new(SUITE, "matrix_matrix", iters, start.elapsed()));

    // Matrix x vector
    let vx = Vector::ones(cols)?;
    let mut vy = Vector::alloc(rows)?;
    let start = Instant::now();
    for _ in 0..iters {
        m1.vec_multiply_into(&vx, &mut vy)?;
        checksum += vy[0];
    }
    timings.push(Timing::new(SUITE, "matrix_vector", iters, start.elapsed()));

    // Transpose and reshape
    let mut m_t = Matrix::alloc(cols, rows)?;
    let start = Instant::now();
    for _ in 0..iters {
        m1.transpose_into(&mut m_t)?;
        m1.reshape(cols, rows)?;
        m1.reshape(rows, cols)?;
        checksum += m_t.as_slice()[0];
    }
    timings.push(Timing::new(SUITE, "transform_reshape", iters, start.elapsed()));

    // Predicates and utilities
    let start = Instant::now();
    for _ in 0..iters {
        let is_square = m1.is_square();
        let is_equal = m1.is_equal(&m2, 1e-6);
        checksum += f64::from(u8::from(is_square)) + f64::from(u8::from(is_equal)) + m1.sum();
        m1.swap(&mut m2);
        m3.copy_from(&m1)?;
    }
    timings.push(Timing::new(SUITE, "properties_util", iters, start.elapsed()));

    // Resize round trips
    let mut grown_rows = rows.saturating_add(10).min(MATRIX_MAX_ROWS);
    let mut grown_cols = cols.saturating_add(10).min(MATRIX_MAX_COLUMNS);
    let grown = grown_rows.checked_mul(grown_cols);
    if grown.map_or(true, |n| n > MATRIX_MAX_ELEMENTS) {
        (grown_rows, grown_cols) = (rows, cols);
    }
    let start = Instant::now();
    for _ in 0..iters {
        m3.resize(grown_rows, grown_cols)
            .with_context(|| format!("Failed to grow matrix to {}x{}", grown_rows, grown_cols))?;
        m3.resize(rows, cols)?;
        checksum += m3.as_slice()[0];
    }
    timings.push(Timing::new(SUITE, "resize", iters, start.elapsed()));

    // Square solvers
    let n = config.solve_size;
    let a = diagonally_dominant(&mut rng, n)?;
    let x_true = Vector::ones(n)?;
    let b = a.vec_multiply(&x_true)?;
    let start = Instant::now();
    for _ in 0..iters {
        checksum += a.determinant_with(&config.solver)?;
        checksum += a.trace()?;
        let inv = a.inverse_with(&config.solver)?;
        let x = a.solve_with(&b, &config.solver)?;
        checksum += inv.as_slice()[0] + x[0];
    }
    timings.push(Timing::new(SUITE, "linalg", iters, start.elapsed()));

    log::debug!("[vecmat::bench] matrix checksum: {}", black_box(checksum));
    Ok(timings)
}
