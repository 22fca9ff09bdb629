//! Square-matrix linear algebra built on LU decomposition.
//!
//! Determinant, inverse and linear-system solve all factor `P*A = L*U` with
//! partial pivoting (Doolittle form, unit-diagonal `L` stored below the
//! diagonal of the packed `lu` matrix). A pivot whose magnitude is at or
//! below the configured tolerance marks the matrix as singular.
use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::math::vector::{dot_f64, Vector};

/// Packed LU factors of a square matrix.
struct LuDecomposition {
    lu: Matrix,
    /// `pivots[i]` is the original row now stored at row `i`.
    pivots: Vec<usize>,
    num_swaps: usize,
}

/// Factor `a` with partial pivoting.
///
/// Returns [`Error::DivZero`] as soon as the best available pivot is not
/// larger than `tolerance` in magnitude.
fn lu_decompose(a: &Matrix, tolerance: f64) -> Result<LuDecomposition> {
    if !a.is_square() {
        return Err(Error::Dim);
    }
    let n = a.rows();
    let mut lu = a.try_clone()?;
    let mut pivots: Vec<usize> = (0..n).collect();
    let mut num_swaps = 0usize;

    let data = lu.as_mut_slice();
    for k in 0..n {
        let mut max_row = k;
        let mut max_val = data[k * n + k].abs();
        for i in (k + 1)..n {
            let candidate = data[i * n + k].abs();
            if candidate > max_val {
                max_val = candidate;
                max_row = i;
            }
        }

        if max_val <= tolerance {
            log::trace!("lu: pivot {max_val:e} at column {k} within tolerance {tolerance:e}");
            return Err(Error::DivZero);
        }

        if max_row != k {
            let (upper, lower) = data.split_at_mut(max_row * n);
            upper[k * n..(k + 1) * n].swap_with_slice(&mut lower[..n]);
            pivots.swap(k, max_row);
            num_swaps += 1;
        }

        let (top, bottom) = data.split_at_mut((k + 1) * n);
        let pivot_row = &top[k * n..];
        let pivot = pivot_row[k];
        for row in bottom.chunks_exact_mut(n) {
            let factor = row[k] / pivot;
            row[k] = factor;
            if factor != 0.0 {
                for (x, &p) in row[k + 1..].iter_mut().zip(&pivot_row[k + 1..]) {
                    *x -= factor * p;
                }
            }
        }
    }

    Ok(LuDecomposition {
        lu,
        pivots,
        num_swaps,
    })
}

impl LuDecomposition {
    fn order(&self) -> usize {
        self.pivots.len()
    }

    fn determinant(&self) -> f64 {
        let n = self.order();
        let product: f64 = self.lu.as_slice().iter().step_by(n + 1).product();
        if self.num_swaps % 2 == 1 {
            -product
        } else {
            product
        }
    }

    /// Solve `A x = b` using the stored factors. `x` and `b` have length `n`.
    fn solve_in_place(&self, b: &[f64], x: &mut [f64]) {
        let n = self.order();
        let lu = self.lu.as_slice();

        for (xi, &p) in x.iter_mut().zip(&self.pivots) {
            *xi = b[p];
        }

        // Forward substitution with unit-diagonal L.
        for i in 1..n {
            let s = dot_f64(&lu[i * n..i * n + i], &x[..i]);
            x[i] -= s;
        }

        // Back substitution with U.
        for i in (0..n).rev() {
            let row = &lu[i * n..(i + 1) * n];
            let s = dot_f64(&row[i + 1..], &x[i + 1..]);
            x[i] = (x[i] - s) / row[i];
        }
    }
}

impl Matrix {
    /// Determinant via Gaussian elimination with partial pivoting.
    ///
    /// An exactly-zero pivot yields `0.0`.
    pub fn determinant(&self) -> Result<f64> {
        self.determinant_impl(0.0)
    }

    /// Determinant treating pivots within `config.singular_tolerance` as zero.
    pub fn determinant_with(&self, config: &SolverConfig) -> Result<f64> {
        config.validate()?;
        self.determinant_impl(config.singular_tolerance)
    }

    fn determinant_impl(&self, tolerance: f64) -> Result<f64> {
        match lu_decompose(self, tolerance) {
            Ok(lu) => Ok(lu.determinant()),
            Err(Error::DivZero) => Ok(0.0),
            Err(e) => Err(e),
        }
    }

    pub fn inverse(&self) -> Result<Matrix> {
        self.inverse_with(&SolverConfig::default())
    }

    pub fn inverse_with(&self, config: &SolverConfig) -> Result<Matrix> {
        config.validate()?;
        if !self.is_square() {
            return Err(Error::Dim);
        }
        let mut out = Matrix::alloc(self.rows(), self.cols())?;
        self.inverse_impl(&mut out, config.singular_tolerance)?;
        Ok(out)
    }

    /// Write the inverse into `out`, which must have the same square shape.
    pub fn inverse_into(&self, out: &mut Matrix) -> Result<()> {
        self.inverse_impl(out, SolverConfig::default().singular_tolerance)
    }

    fn inverse_impl(&self, out: &mut Matrix, tolerance: f64) -> Result<()> {
        if !self.is_square() || out.shape() != self.shape() {
            return Err(Error::Dim);
        }
        let lu = lu_decompose(self, tolerance)?;
        let n = self.rows();

        let mut unit = Vector::alloc(n)?;
        let mut column = Vector::alloc(n)?;
        for j in 0..n {
            unit[j] = 1.0;
            lu.solve_in_place(unit.as_slice(), column.as_mut_slice());
            unit[j] = 0.0;
            out.set_column(j, &column)?;
        }
        Ok(())
    }

    /// Solve `self * x = b` for `x`.
    pub fn solve(&self, b: &Vector) -> Result<Vector> {
        self.solve_with(b, &SolverConfig::default())
    }

    pub fn solve_with(&self, b: &Vector, config: &SolverConfig) -> Result<Vector> {
        config.validate()?;
        if !self.is_square() || b.len() != self.rows() {
            return Err(Error::Dim);
        }
        let mut x = Vector::alloc(self.rows())?;
        self.solve_impl(b, &mut x, config.singular_tolerance)?;
        Ok(x)
    }

    /// Solve into `x`, which must have `rows` elements.
    pub fn solve_into(&self, b: &Vector, x: &mut Vector) -> Result<()> {
        self.solve_impl(b, x, SolverConfig::default().singular_tolerance)
    }

    fn solve_impl(&self, b: &Vector, x: &mut Vector, tolerance: f64) -> Result<()> {
        if !self.is_square() || b.len() != self.rows() || x.len() != self.rows() {
            return Err(Error::Dim);
        }
        let lu = lu_decompose(self, tolerance)?;
        lu.solve_in_place(b.as_slice(), x.as_mut_slice());
        Ok(())
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> Result<f64> {
        if !self.is_square() {
            return Err(Error::Dim);
        }
        Ok(self.as_slice().iter().step_by(self.cols() + 1).sum())
    }
}
