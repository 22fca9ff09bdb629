use std::fmt;
use std::ops::{Index, IndexMut};

use crate::config::{MATRIX_MAX_COLUMNS, MATRIX_MAX_ELEMENTS, MATRIX_MAX_ROWS};
use crate::error::{Error, Result};
use crate::math::align::AlignedBuffer;
use crate::math::vector::{dot_f64, Vector};

/// Dense row-major matrix of f64 backed by an aligned buffer.
///
/// Element `(i, j)` lives at offset `i * cols + j`. Both dimensions are
/// always non-zero and within the configured maximums.
#[derive(Clone, Debug)]
pub struct Matrix {
    buf: AlignedBuffer,
    rows: usize,
    cols: usize,
}

/// Validate a shape and return its element count.
///
/// The row/column product is overflow-checked before it is used.
fn checked_elements(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(Error::Range);
    }
    if rows > MATRIX_MAX_ROWS || cols > MATRIX_MAX_COLUMNS {
        return Err(Error::Range);
    }
    let elements = rows.checked_mul(cols).ok_or(Error::Range)?;
    if elements > MATRIX_MAX_ELEMENTS {
        return Err(Error::Range);
    }
    Ok(elements)
}

#[inline]
fn same_shape(a: &Matrix, b: &Matrix) -> Result<()> {
    if a.rows != b.rows || a.cols != b.cols {
        return Err(Error::Dim);
    }
    Ok(())
}

fn zip_with(lhs: &Matrix, rhs: &Matrix, out: &mut Matrix, op: impl Fn(f64, f64) -> f64) {
    let dst = out.as_mut_slice();
    for ((o, &a), &b) in dst.iter_mut().zip(lhs.as_slice()).zip(rhs.as_slice()) {
        *o = op(a, b);
    }
}

impl Matrix {
    /// Allocate a zero-filled `rows x cols` matrix.
    pub fn alloc(rows: usize, cols: usize) -> Result<Self> {
        let elements = checked_elements(rows, cols)?;
        Ok(Self {
            buf: AlignedBuffer::zeroed(elements)?,
            rows,
            cols,
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::alloc(rows, cols)
    }

    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::alloc(n, n)?;
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }

    /// Deep-copy a row-major slice into a new matrix.
    pub fn from_array(data: &[f64], rows: usize, cols: usize) -> Result<Self> {
        let elements = checked_elements(rows, cols)?;
        if data.len() != elements {
            return Err(Error::Dim);
        }
        Ok(Self {
            buf: AlignedBuffer::from_slice(data)?,
            rows,
            cols,
        })
    }

    /// Release the matrix. Equivalent to dropping it.
    pub fn free(self) {
        drop(self)
    }

    /// Release the matrix held in `slot` and leave `None` behind.
    pub fn free_and_clear(slot: &mut Option<Matrix>) {
        drop(slot.take())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always `false` for a live matrix, since zero dimensions are rejected at
    /// allocation. Kept alongside [`Matrix::len`].
    pub fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.buf.as_mut_slice()
    }

    /// Start of the aligned row-major buffer.
    pub fn as_ptr(&self) -> *const f64 {
        self.buf.as_ptr()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            buf: self.buf.try_clone()?,
            rows: self.rows,
            cols: self.cols,
        })
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    // ---------------------------------------------------------------------
    // Element, row and column access
    // ---------------------------------------------------------------------

    pub fn set(&mut self, i: usize, j: usize, val: f64) -> Result<()> {
        if i >= self.rows || j >= self.cols {
            return Err(Error::Range);
        }
        let offset = self.offset(i, j);
        self.as_mut_slice()[offset] = val;
        Ok(())
    }

    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        if i >= self.rows || j >= self.cols {
            return Err(Error::Range);
        }
        Ok(self.as_slice()[self.offset(i, j)])
    }

    /// Borrow one row of the buffer.
    pub fn row_slice(&self, row: usize) -> Result<&[f64]> {
        if row >= self.rows {
            return Err(Error::Range);
        }
        let start = self.offset(row, 0);
        Ok(&self.as_slice()[start..start + self.cols])
    }

    pub fn row(&self, row: usize) -> Result<Vector> {
        Vector::from_array(self.row_slice(row)?)
    }

    pub fn column(&self, col: usize) -> Result<Vector> {
        if col >= self.cols {
            return Err(Error::Range);
        }
        let mut out = Vector::alloc(self.rows)?;
        self.get_column(col, &mut out)?;
        Ok(out)
    }

    /// Copy `v` into row `row`. `v` must have `cols` elements.
    pub fn set_row(&mut self, row: usize, v: &Vector) -> Result<()> {
        if v.len() != self.cols {
            return Err(Error::Dim);
        }
        if row >= self.rows {
            return Err(Error::Range);
        }
        let start = self.offset(row, 0);
        let cols = self.cols;
        self.as_mut_slice()[start..start + cols].copy_from_slice(v.as_slice());
        Ok(())
    }

    /// Copy row `row` into `out`. `out` must have `cols` elements.
    pub fn get_row(&self, row: usize, out: &mut Vector) -> Result<()> {
        if out.len() != self.cols {
            return Err(Error::Dim);
        }
        out.as_mut_slice().copy_from_slice(self.row_slice(row)?);
        Ok(())
    }

    /// Copy `v` into column `col`, striding by `cols`.
    pub fn set_column(&mut self, col: usize, v: &Vector) -> Result<()> {
        if v.len() != self.rows {
            return Err(Error::Dim);
        }
        if col >= self.cols {
            return Err(Error::Range);
        }
        let stride = self.cols;
        for (dst, &src) in self.as_mut_slice()[col..]
            .iter_mut()
            .step_by(stride)
            .zip(v.iter())
        {
            *dst = src;
        }
        Ok(())
    }

    pub fn get_column(&self, col: usize, out: &mut Vector) -> Result<()> {
        if out.len() != self.rows {
            return Err(Error::Dim);
        }
        if col >= self.cols {
            return Err(Error::Range);
        }
        for (dst, &src) in out
            .iter_mut()
            .zip(self.as_slice()[col..].iter().step_by(self.cols))
        {
            *dst = src;
        }
        Ok(())
    }

    pub fn fill(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidArg);
        }
        self.as_mut_slice().fill(value);
        Ok(())
    }

    pub fn set_zero(&mut self) {
        self.as_mut_slice().fill(0.0);
    }

    /// Copy the contents of `src` into `self`; shapes must match.
    pub fn copy_from(&mut self, src: &Matrix) -> Result<()> {
        same_shape(self, src)?;
        self.as_mut_slice().copy_from_slice(src.as_slice());
        Ok(())
    }

    /// Exchange storage and shape with `other` without copying.
    pub fn swap(&mut self, other: &mut Matrix) {
        std::mem::swap(self, other);
    }

    // ---------------------------------------------------------------------
    // Resize and reshape
    // ---------------------------------------------------------------------

    /// Change both dimensions, keeping the overlapping top-left block and
    /// zero-filling every new cell. The buffer is reallocated.
    pub fn resize(&mut self, new_rows: usize, new_cols: usize) -> Result<()> {
        if new_rows == 0 || new_cols == 0 {
            return Err(Error::Range);
        }
        if new_rows == self.rows && new_cols == self.cols {
            return Ok(());
        }
        let resized = self.resized(new_rows, new_cols)?;
        log::trace!(
            "matrix resized from {}x{} to {}x{}",
            self.rows,
            self.cols,
            new_rows,
            new_cols
        );
        *self = resized;
        Ok(())
    }

    /// Allocating form of [`Matrix::resize`].
    pub fn resized(&self, new_rows: usize, new_cols: usize) -> Result<Matrix> {
        let mut out = Matrix::alloc(new_rows, new_cols)?;
        let copy_rows = self.rows.min(new_rows);
        let copy_cols = self.cols.min(new_cols);
        for (dst, src) in out
            .as_mut_slice()
            .chunks_exact_mut(new_cols)
            .zip(self.as_slice().chunks_exact(self.cols))
            .take(copy_rows)
        {
            dst[..copy_cols].copy_from_slice(&src[..copy_cols]);
        }
        Ok(out)
    }

    /// Reinterpret the buffer with a new shape of the same element count.
    pub fn reshape(&mut self, new_rows: usize, new_cols: usize) -> Result<()> {
        match new_rows.checked_mul(new_cols) {
            Some(elements) if elements == self.len() => {}
            _ => return Err(Error::Dim),
        }
        if new_rows > MATRIX_MAX_ROWS || new_cols > MATRIX_MAX_COLUMNS {
            return Err(Error::Range);
        }
        self.rows = new_rows;
        self.cols = new_cols;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Element-wise arithmetic
    // ---------------------------------------------------------------------

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        same_shape(self, other)?;
        let mut out = Matrix::alloc(self.rows, self.cols)?;
        self.add_into(other, &mut out)?;
        Ok(out)
    }

    pub fn add_into(&self, other: &Matrix, out: &mut Matrix) -> Result<()> {
        same_shape(self, other)?;
        same_shape(self, out)?;
        zip_with(self, other, out, |a, b| a + b);
        Ok(())
    }

    pub fn add_inplace(&mut self, other: &Matrix) -> Result<()> {
        same_shape(self, other)?;
        for (d, &s) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *d += s;
        }
        Ok(())
    }

    pub fn subtract(&self, other: &Matrix) -> Result<Matrix> {
        same_shape(self, other)?;
        let mut out = Matrix::alloc(self.rows, self.cols)?;
        self.subtract_into(other, &mut out)?;
        Ok(out)
    }

    pub fn subtract_into(&self, other: &Matrix, out: &mut Matrix) -> Result<()> {
        same_shape(self, other)?;
        same_shape(self, out)?;
        zip_with(self, other, out, |a, b| a - b);
        Ok(())
    }

    pub fn subtract_inplace(&mut self, other: &Matrix) -> Result<()> {
        same_shape(self, other)?;
        for (d, &s) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *d -= s;
        }
        Ok(())
    }

    pub fn scale(&self, scalar: f64) -> Result<Matrix> {
        let mut out = Matrix::alloc(self.rows, self.cols)?;
        self.scale_into(&mut out, scalar)?;
        Ok(out)
    }

    pub fn scale_into(&self, out: &mut Matrix, scalar: f64) -> Result<()> {
        same_shape(self, out)?;
        for (o, &a) in out.as_mut_slice().iter_mut().zip(self.as_slice()) {
            *o = a * scalar;
        }
        Ok(())
    }

    pub fn scale_inplace(&mut self, scalar: f64) {
        for v in self.as_mut_slice() {
            *v *= scalar;
        }
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        same_shape(self, other)?;
        let mut out = Matrix::alloc(self.rows, self.cols)?;
        self.hadamard_into(other, &mut out)?;
        Ok(out)
    }

    pub fn hadamard_into(&self, other: &Matrix, out: &mut Matrix) -> Result<()> {
        same_shape(self, other)?;
        same_shape(self, out)?;
        zip_with(self, other, out, |a, b| a * b);
        Ok(())
    }

    /// Apply `f` to every element into a new matrix.
    ///
    /// Fails with [`Error::Range`] as soon as `f` produces a non-finite value.
    pub fn map<F>(&self, f: F) -> Result<Matrix>
    where
        F: Fn(f64) -> f64,
    {
        let mut out = Matrix::alloc(self.rows, self.cols)?;
        self.map_into(&mut out, f)?;
        Ok(out)
    }

    /// On failure the contents of `dest` are unspecified.
    pub fn map_into<F>(&self, dest: &mut Matrix, f: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        same_shape(self, dest)?;
        for (d, &s) in dest.as_mut_slice().iter_mut().zip(self.as_slice()) {
            let value = f(s);
            if !value.is_finite() {
                return Err(Error::Range);
            }
            *d = value;
        }
        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.as_slice().iter().sum()
    }

    /// Shapes equal and every element within `epsilon`.
    pub fn is_equal(&self, other: &Matrix, epsilon: f64) -> bool {
        self.shape() == other.shape()
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    // ---------------------------------------------------------------------
    // Products and transforms
    // ---------------------------------------------------------------------

    /// Matrix product `self * b`.
    pub fn multiply(&self, b: &Matrix) -> Result<Matrix> {
        if self.cols != b.rows {
            return Err(Error::Dim);
        }
        let mut out = Matrix::alloc(self.rows, b.cols)?;
        self.multiply_into(b, &mut out)?;
        Ok(out)
    }

    /// Matrix product written into `out`, which must be `self.rows x b.cols`.
    ///
    /// `b` is transposed into a temporary first so that every inner product
    /// walks two contiguous rows.
    pub fn multiply_into(&self, b: &Matrix, out: &mut Matrix) -> Result<()> {
        if self.cols != b.rows {
            return Err(Error::Dim);
        }
        if out.rows != self.rows || out.cols != b.cols {
            return Err(Error::Dim);
        }

        let b_t = b.transpose()?;
        log::trace!(
            "multiply {}x{} by {}x{} via transposed temporary",
            self.rows,
            self.cols,
            b.rows,
            b.cols
        );

        let inner = self.cols;
        let out_cols = out.cols;
        for (row_a, out_row) in self
            .as_slice()
            .chunks_exact(inner)
            .zip(out.as_mut_slice().chunks_exact_mut(out_cols))
        {
            for (cell, row_bt) in out_row.iter_mut().zip(b_t.as_slice().chunks_exact(inner)) {
                *cell = dot_f64(row_a, row_bt);
            }
        }
        Ok(())
    }

    /// Matrix-vector product `self * v`.
    pub fn vec_multiply(&self, v: &Vector) -> Result<Vector> {
        if self.cols != v.len() {
            return Err(Error::Dim);
        }
        let mut out = Vector::alloc(self.rows)?;
        self.vec_multiply_into(v, &mut out)?;
        Ok(out)
    }

    pub fn vec_multiply_into(&self, v: &Vector, out: &mut Vector) -> Result<()> {
        if self.cols != v.len() || out.len() != self.rows {
            return Err(Error::Dim);
        }
        for (cell, row) in out.iter_mut().zip(self.as_slice().chunks_exact(self.cols)) {
            *cell = dot_f64(row, v.as_slice());
        }
        Ok(())
    }

    pub fn transpose(&self) -> Result<Matrix> {
        let mut out = Matrix::alloc(self.cols, self.rows)?;
        self.transpose_into(&mut out)?;
        Ok(out)
    }

    /// Write the transpose into `out`, which must be `cols x rows`.
    pub fn transpose_into(&self, out: &mut Matrix) -> Result<()> {
        if out.rows != self.cols || out.cols != self.rows {
            return Err(Error::Dim);
        }
        let rows = self.rows;
        let dst = out.as_mut_slice();
        for (i, row) in self.as_slice().chunks_exact(self.cols).enumerate() {
            for (j, &value) in row.iter().enumerate() {
                dst[j * rows + i] = value;
            }
        }
        Ok(())
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.as_slice() == other.as_slice()
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        assert!(index.0 < self.rows && index.1 < self.cols, "matrix index out of bounds");
        let offset = self.offset(index.0, index.1);
        &self.as_slice()[offset]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        assert!(index.0 < self.rows && index.1 < self.cols, "matrix index out of bounds");
        let offset = self.offset(index.0, index.1);
        &mut self.as_mut_slice()[offset]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.as_slice().chunks_exact(self.cols).enumerate() {
            write!(f, "[")?;
            for (idx, value) in row.iter().enumerate() {
                write!(f, "{}", value)?;
                if idx + 1 != row.len() {
                    write!(f, ", ")?;
                }
            }
            write!(f, "]")?;
            if r + 1 != self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_elements_rejects_invalid_shapes() {
        assert_eq!(checked_elements(0, 3), Err(Error::Range));
        assert_eq!(checked_elements(3, 0), Err(Error::Range));
        assert_eq!(checked_elements(MATRIX_MAX_ROWS + 1, 1), Err(Error::Range));
        assert_eq!(checked_elements(1, MATRIX_MAX_COLUMNS + 1), Err(Error::Range));
        assert_eq!(checked_elements(MATRIX_MAX_ROWS, MATRIX_MAX_COLUMNS), Err(Error::Range));
        assert_eq!(checked_elements(2, 3), Ok(6));
    }

    #[test]
    fn display_prints_one_row_per_line() {
        let m = Matrix::from_array(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(m.to_string(), "[1, 2]\n[3, 4]");
    }
}
