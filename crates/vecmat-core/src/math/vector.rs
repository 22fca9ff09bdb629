use std::fmt;
use std::ops::{Index, IndexMut};
use std::slice::{Iter, IterMut};

use crate::config::{EPSILON, VECTOR_MAX_ELEMENTS};
use crate::error::{Error, Result};
use crate::math::align::AlignedBuffer;

/// Dense vector of f64 backed by an aligned buffer.
///
/// A vector is never empty: every constructor rejects a zero length with
/// [`Error::Range`], as well as lengths above [`VECTOR_MAX_ELEMENTS`].
#[derive(Clone, Debug)]
pub struct Vector {
    buf: AlignedBuffer,
}

#[inline]
fn check_len_bounds(n: usize) -> Result<()> {
    if n == 0 || n > VECTOR_MAX_ELEMENTS {
        return Err(Error::Range);
    }
    Ok(())
}

#[inline]
fn same_len(a: &Vector, b: &Vector) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::Dim);
    }
    Ok(())
}

#[inline]
fn zip_with(lhs: &[f64], rhs: &[f64], out: &mut [f64], op: impl Fn(f64, f64) -> f64) {
    for ((o, &a), &b) in out.iter_mut().zip(lhs).zip(rhs) {
        *o = op(a, b);
    }
}

impl Vector {
    /// Allocate a zero-filled vector of length `n`.
    pub fn alloc(n: usize) -> Result<Self> {
        check_len_bounds(n)?;
        Ok(Self {
            buf: AlignedBuffer::zeroed(n)?,
        })
    }

    pub fn zeros(n: usize) -> Result<Self> {
        Self::alloc(n)
    }

    pub fn ones(n: usize) -> Result<Self> {
        Self::from_elem(n, 1.0)
    }

    pub fn from_elem(n: usize, value: f64) -> Result<Self> {
        let mut v = Self::alloc(n)?;
        v.fill(value)?;
        Ok(v)
    }

    /// Deep-copy `data` into a new vector.
    pub fn from_array(data: &[f64]) -> Result<Self> {
        check_len_bounds(data.len())?;
        Ok(Self {
            buf: AlignedBuffer::from_slice(data)?,
        })
    }

    /// Release the vector. Equivalent to dropping it.
    pub fn free(self) {
        drop(self)
    }

    /// Release the vector held in `slot` and leave `None` behind.
    /// Does nothing when the slot is already empty.
    pub fn free_and_clear(slot: &mut Option<Vector>) {
        drop(slot.take())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always `false` for a live vector, since zero lengths are rejected at
    /// allocation. Kept alongside [`Vector::len`].
    pub fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    pub fn iter(&self) -> Iter<'_, f64> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, f64> {
        self.as_mut_slice().iter_mut()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.buf.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        self.buf.as_mut_slice()
    }

    /// Start of the aligned buffer.
    pub fn as_ptr(&self) -> *const f64 {
        self.buf.as_ptr()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.as_slice().to_vec()
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            buf: self.buf.try_clone()?,
        })
    }

    pub fn set(&mut self, i: usize, val: f64) -> Result<()> {
        let slot = self.as_mut_slice().get_mut(i).ok_or(Error::Range)?;
        *slot = val;
        Ok(())
    }

    pub fn get(&self, i: usize) -> Result<f64> {
        self.as_slice().get(i).copied().ok_or(Error::Range)
    }

    /// Copy the contents of `src` into `self`; lengths must match.
    pub fn copy_from(&mut self, src: &Vector) -> Result<()> {
        same_len(self, src)?;
        self.as_mut_slice().copy_from_slice(src.as_slice());
        Ok(())
    }

    pub fn fill(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidArg);
        }
        self.as_mut_slice().fill(value);
        Ok(())
    }

    /// Exchange buffers and lengths with `other` without copying.
    pub fn swap(&mut self, other: &mut Vector) {
        std::mem::swap(&mut self.buf, &mut other.buf);
    }

    // ---------------------------------------------------------------------
    // Element-wise arithmetic
    // ---------------------------------------------------------------------

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        same_len(self, other)?;
        let mut out = Vector::alloc(self.len())?;
        self.add_into(other, &mut out)?;
        Ok(out)
    }

    pub fn add_into(&self, other: &Vector, out: &mut Vector) -> Result<()> {
        same_len(self, other)?;
        same_len(self, out)?;
        zip_with(self.as_slice(), other.as_slice(), out.as_mut_slice(), |a, b| a + b);
        Ok(())
    }

    pub fn add_inplace(&mut self, other: &Vector) -> Result<()> {
        same_len(self, other)?;
        for (d, s) in self.iter_mut().zip(other.iter()) {
            *d += s;
        }
        Ok(())
    }

    pub fn subtract(&self, other: &Vector) -> Result<Vector> {
        same_len(self, other)?;
        let mut out = Vector::alloc(self.len())?;
        self.subtract_into(other, &mut out)?;
        Ok(out)
    }

    pub fn subtract_into(&self, other: &Vector, out: &mut Vector) -> Result<()> {
        same_len(self, other)?;
        same_len(self, out)?;
        zip_with(self.as_slice(), other.as_slice(), out.as_mut_slice(), |a, b| a - b);
        Ok(())
    }

    pub fn subtract_inplace(&mut self, other: &Vector) -> Result<()> {
        same_len(self, other)?;
        for (d, s) in self.iter_mut().zip(other.iter()) {
            *d -= s;
        }
        Ok(())
    }

    pub fn scale(&self, scalar: f64) -> Result<Vector> {
        let mut out = Vector::alloc(self.len())?;
        self.scale_into(&mut out, scalar)?;
        Ok(out)
    }

    pub fn scale_into(&self, out: &mut Vector, scalar: f64) -> Result<()> {
        same_len(self, out)?;
        for (o, &a) in out.iter_mut().zip(self.iter()) {
            *o = a * scalar;
        }
        Ok(())
    }

    pub fn scale_inplace(&mut self, scalar: f64) {
        for v in self.iter_mut() {
            *v *= scalar;
        }
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Vector) -> Result<Vector> {
        same_len(self, other)?;
        let mut out = Vector::alloc(self.len())?;
        self.hadamard_into(other, &mut out)?;
        Ok(out)
    }

    pub fn hadamard_into(&self, other: &Vector, out: &mut Vector) -> Result<()> {
        same_len(self, other)?;
        same_len(self, out)?;
        zip_with(self.as_slice(), other.as_slice(), out.as_mut_slice(), |a, b| a * b);
        Ok(())
    }

    pub fn negated(&self) -> Result<Vector> {
        let mut out = self.try_clone()?;
        for v in out.iter_mut() {
            *v = -*v;
        }
        Ok(out)
    }

    /// Apply `f` to every element into a new vector.
    ///
    /// Fails with [`Error::Range`] as soon as `f` produces a non-finite value.
    pub fn map<F>(&self, f: F) -> Result<Vector>
    where
        F: Fn(f64) -> f64,
    {
        let mut out = Vector::alloc(self.len())?;
        self.map_into(&mut out, f)?;
        Ok(out)
    }

    /// Apply `f` to every element of `self`, writing into `dest`.
    ///
    /// On failure the contents of `dest` are unspecified.
    pub fn map_into<F>(&self, dest: &mut Vector, f: F) -> Result<()>
    where
        F: Fn(f64) -> f64,
    {
        same_len(self, dest)?;
        for (d, &s) in dest.iter_mut().zip(self.iter()) {
            let value = f(s);
            if !value.is_finite() {
                return Err(Error::Range);
            }
            *d = value;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        same_len(self, other)?;
        Ok(dot_f64(self.as_slice(), other.as_slice()))
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        let s = self.as_slice();
        dot_f64(s, s).sqrt()
    }

    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        if self.len() != 3 || other.len() != 3 {
            return Err(Error::Dim);
        }
        Vector::from_array(&cross3(self.as_slice(), other.as_slice()))
    }

    pub fn cross_into(&self, other: &Vector, out: &mut Vector) -> Result<()> {
        if self.len() != 3 || other.len() != 3 || out.len() != 3 {
            return Err(Error::Dim);
        }
        let c = cross3(self.as_slice(), other.as_slice());
        out.as_mut_slice().copy_from_slice(&c);
        Ok(())
    }

    pub fn cross_inplace(&mut self, other: &Vector) -> Result<()> {
        if self.len() != 3 || other.len() != 3 {
            return Err(Error::Dim);
        }
        let c = cross3(self.as_slice(), other.as_slice());
        self.as_mut_slice().copy_from_slice(&c);
        Ok(())
    }

    /// Scale to unit length in place. A vector shorter than [`EPSILON`] is
    /// left untouched and [`Error::DivZero`] is returned.
    pub fn normalize(&mut self) -> Result<()> {
        let len = self.norm();
        if len < EPSILON {
            return Err(Error::DivZero);
        }
        self.scale_inplace(1.0 / len);
        Ok(())
    }

    pub fn normalized(&self) -> Result<Vector> {
        let len = self.norm();
        if len < EPSILON {
            return Err(Error::DivZero);
        }
        self.scale(1.0 / len)
    }

    pub fn distance(&self, other: &Vector) -> Result<f64> {
        Ok(self.distance_squared(other)?.sqrt())
    }

    pub fn distance_squared(&self, other: &Vector) -> Result<f64> {
        same_len(self, other)?;
        Ok(self
            .iter()
            .zip(other.iter())
            .map(|(a, b)| {
                let diff = b - a;
                diff * diff
            })
            .sum())
    }

    /// Angle between `self` and `other` in radians.
    pub fn angle(&self, other: &Vector) -> Result<f64> {
        same_len(self, other)?;
        let len_a = self.norm();
        let len_b = other.norm();
        if len_a < EPSILON || len_b < EPSILON {
            return Err(Error::DivZero);
        }
        let cos = dot_f64(self.as_slice(), other.as_slice()) / (len_a * len_b);
        Ok(cos.clamp(-1.0, 1.0).acos())
    }

    /// Projection of `self` onto `onto`.
    pub fn project(&self, onto: &Vector) -> Result<Vector> {
        same_len(self, onto)?;
        let denom = dot_f64(onto.as_slice(), onto.as_slice());
        if denom < EPSILON {
            return Err(Error::DivZero);
        }
        let factor = dot_f64(self.as_slice(), onto.as_slice()) / denom;
        onto.scale(factor)
    }

    // ---------------------------------------------------------------------
    // Reductions
    // ---------------------------------------------------------------------

    pub fn min(&self) -> Result<f64> {
        let (&first, rest) = self.as_slice().split_first().ok_or(Error::Dim)?;
        Ok(rest.iter().fold(first, |m, &v| if v < m { v } else { m }))
    }

    pub fn max(&self) -> Result<f64> {
        let (&first, rest) = self.as_slice().split_first().ok_or(Error::Dim)?;
        Ok(rest.iter().fold(first, |m, &v| if v > m { v } else { m }))
    }

    pub fn sum(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::Dim);
        }
        Ok(self.iter().sum())
    }

    /// Element-wise comparison within `epsilon`. Vectors of different
    /// lengths are never equal.
    pub fn is_equal(&self, other: &Vector, epsilon: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    // ---------------------------------------------------------------------
    // Resize
    // ---------------------------------------------------------------------

    /// Change the length, keeping the common prefix and zero-filling any
    /// new tail. The buffer is reallocated.
    pub fn resize(&mut self, new_n: usize) -> Result<()> {
        if new_n == self.len() {
            return Ok(());
        }
        let resized = self.resized(new_n)?;
        log::trace!("vector resized from {} to {} elements", self.len(), new_n);
        self.buf = resized.buf;
        Ok(())
    }

    /// Allocating form of [`Vector::resize`].
    pub fn resized(&self, new_n: usize) -> Result<Vector> {
        check_len_bounds(new_n)?;
        let mut out = Vector::alloc(new_n)?;
        let keep = new_n.min(self.len());
        out.as_mut_slice()[..keep].copy_from_slice(&self.as_slice()[..keep]);
        Ok(out)
    }
}

/// Compute `y <- a * x + y` in place.
pub fn axpy(a: f64, x: &Vector, y: &mut Vector) -> Result<()> {
    same_len(x, y)?;
    let mut x_chunks = x.as_slice().chunks_exact(4);
    let mut y_chunks = y.as_mut_slice().chunks_exact_mut(4);
    for (xc, yc) in x_chunks.by_ref().zip(y_chunks.by_ref()) {
        yc[0] += a * xc[0];
        yc[1] += a * xc[1];
        yc[2] += a * xc[2];
        yc[3] += a * xc[3];
    }
    for (xv, yv) in x_chunks.remainder().iter().zip(y_chunks.into_remainder()) {
        *yv += a * xv;
    }
    Ok(())
}

fn cross3(a: &[f64], b: &[f64]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Dot product over equal-length slices with four partial sums.
#[inline]
pub(crate) fn dot_f64(lhs: &[f64], rhs: &[f64]) -> f64 {
    debug_assert_eq!(lhs.len(), rhs.len());
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        unsafe { dot_simd_f64(lhs, rhs) }
    }
    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    {
        dot_scalar_f64(lhs, rhs)
    }
}

#[cfg_attr(all(feature = "simd", target_arch = "x86_64"), allow(dead_code))]
fn dot_scalar_f64(lhs: &[f64], rhs: &[f64]) -> f64 {
    let lhs_chunks = lhs.chunks_exact(4);
    let rhs_chunks = rhs.chunks_exact(4);
    let lhs_tail = lhs_chunks.remainder();
    let rhs_tail = rhs_chunks.remainder();

    let mut acc = [0f64; 4];
    for (a, b) in lhs_chunks.zip(rhs_chunks) {
        acc[0] += a[0] * b[0];
        acc[1] += a[1] * b[1];
        acc[2] += a[2] * b[2];
        acc[3] += a[3] * b[3];
    }

    let mut sum = (acc[0] + acc[1]) + (acc[2] + acc[3]);
    for (a, b) in lhs_tail.iter().zip(rhs_tail) {
        sum += a * b;
    }
    sum
}

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
unsafe fn dot_simd_f64(lhs: &[f64], rhs: &[f64]) -> f64 {
    use std::arch::x86_64::*;

    let n = lhs.len().min(rhs.len());
    let mut i = 0usize;
    let mut acc_lo = _mm_setzero_pd();
    let mut acc_hi = _mm_setzero_pd();

    while i + 4 <= n {
        let a0 = _mm_loadu_pd(lhs.as_ptr().add(i));
        let b0 = _mm_loadu_pd(rhs.as_ptr().add(i));
        let a1 = _mm_loadu_pd(lhs.as_ptr().add(i + 2));
        let b1 = _mm_loadu_pd(rhs.as_ptr().add(i + 2));
        acc_lo = _mm_add_pd(acc_lo, _mm_mul_pd(a0, b0));
        acc_hi = _mm_add_pd(acc_hi, _mm_mul_pd(a1, b1));
        i += 4;
    }

    let mut buffer = [0f64; 4];
    _mm_storeu_pd(buffer.as_mut_ptr(), acc_lo);
    _mm_storeu_pd(buffer.as_mut_ptr().add(2), acc_hi);
    let mut sum = (buffer[0] + buffer[1]) + (buffer[2] + buffer[3]);

    while i < n {
        sum += lhs[i] * rhs[i];
        i += 1;
    }

    sum
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl TryFrom<&[f64]> for Vector {
    type Error = Error;

    fn try_from(value: &[f64]) -> Result<Self> {
        Vector::from_array(value)
    }
}

impl From<Vector> for Vec<f64> {
    fn from(value: Vector) -> Self {
        value.to_vec()
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.as_mut_slice()[index]
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, value) in self.iter().enumerate() {
            write!(f, "{}", value)?;
            if idx + 1 != self.len() {
                write!(f, ", ")?;
            }
        }
        write!(f, ")")
    }
}
