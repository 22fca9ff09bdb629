//! Sentinel adapters over the kernel.
//!
//! The kernel reports every failure as an [`Error`]. Callers that would rather
//! receive plain values can go through this module instead: reals become NaN,
//! flags become `false` and handles become `None`. Each failure is logged once
//! with `log::error!` naming the operation.
//!
//! Absent handles are modelled as `Option` and reported as [`Error::Null`].
use crate::error::{Error, Result};
use crate::math::{Matrix, Vector};

#[inline]
fn report(op: &str, err: Error) {
    log::error!("{op} failed: {err}");
}

/// Borrow a handle that must be present.
pub fn require<T: ?Sized>(handle: Option<&T>) -> Result<&T> {
    handle.ok_or(Error::Null)
}

pub fn require_mut<T: ?Sized>(handle: Option<&mut T>) -> Result<&mut T> {
    handle.ok_or(Error::Null)
}

/// Collapse a real-valued result to NaN on failure.
pub trait OrNan {
    fn or_nan(self, op: &str) -> f64;
}

impl OrNan for Result<f64> {
    fn or_nan(self, op: &str) -> f64 {
        self.unwrap_or_else(|err| {
            report(op, err);
            f64::NAN
        })
    }
}

/// Collapse a unit result to a success flag.
pub trait OrFalse {
    fn or_false(self, op: &str) -> bool;
}

impl OrFalse for Result<()> {
    fn or_false(self, op: &str) -> bool {
        match self {
            Ok(()) => true,
            Err(err) => {
                report(op, err);
                false
            }
        }
    }
}

/// Collapse any result to an `Option`.
pub trait OrNone<T> {
    fn or_none(self, op: &str) -> Option<T>;
}

impl<T> OrNone<T> for Result<T> {
    fn or_none(self, op: &str) -> Option<T> {
        self.map_err(|err| report(op, err)).ok()
    }
}

// -------------------------------------------------------------------------
// Vector
// -------------------------------------------------------------------------

pub fn vec_create(n: usize) -> Option<Vector> {
    Vector::alloc(n).or_none("vec_create")
}

pub fn vec_from_array(data: Option<&[f64]>) -> Option<Vector> {
    require(data)
        .and_then(Vector::from_array)
        .or_none("vec_from_array")
}

pub fn vec_get(v: Option<&Vector>, i: usize) -> f64 {
    require(v).and_then(|v| v.get(i)).or_nan("vec_get")
}

pub fn vec_set(v: Option<&mut Vector>, i: usize, value: f64) -> bool {
    require_mut(v).and_then(|v| v.set(i, value)).or_false("vec_set")
}

pub fn vec_add(a: Option<&Vector>, b: Option<&Vector>) -> Option<Vector> {
    require(a)
        .and_then(|a| a.add(require(b)?))
        .or_none("vec_add")
}

pub fn vec_subtract(a: Option<&Vector>, b: Option<&Vector>) -> Option<Vector> {
    require(a)
        .and_then(|a| a.subtract(require(b)?))
        .or_none("vec_subtract")
}

pub fn vec_scale(v: Option<&Vector>, scalar: f64) -> Option<Vector> {
    require(v).and_then(|v| v.scale(scalar)).or_none("vec_scale")
}

pub fn vec_dot(a: Option<&Vector>, b: Option<&Vector>) -> f64 {
    require(a)
        .and_then(|a| a.dot(require(b)?))
        .or_nan("vec_dot")
}

pub fn vec_cross(a: Option<&Vector>, b: Option<&Vector>) -> Option<Vector> {
    require(a)
        .and_then(|a| a.cross(require(b)?))
        .or_none("vec_cross")
}

pub fn vec_norm(v: Option<&Vector>) -> f64 {
    require(v).map(Vector::norm).or_nan("vec_norm")
}

pub fn vec_normalize(v: Option<&mut Vector>) -> bool {
    require_mut(v)
        .and_then(Vector::normalize)
        .or_false("vec_normalize")
}

pub fn vec_distance(a: Option<&Vector>, b: Option<&Vector>) -> f64 {
    require(a)
        .and_then(|a| a.distance(require(b)?))
        .or_nan("vec_distance")
}

pub fn vec_angle(a: Option<&Vector>, b: Option<&Vector>) -> f64 {
    require(a)
        .and_then(|a| a.angle(require(b)?))
        .or_nan("vec_angle")
}

/// Tolerance comparison. Absent handles compare unequal.
pub fn vec_is_equal(a: Option<&Vector>, b: Option<&Vector>, epsilon: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_equal(b, epsilon),
        _ => {
            report("vec_is_equal", Error::Null);
            false
        }
    }
}

pub fn vec_print(v: Option<&Vector>) -> Option<String> {
    require(v).map(|v| v.to_string()).or_none("vec_print")
}

// -------------------------------------------------------------------------
// Matrix
// -------------------------------------------------------------------------

pub fn mat_create(rows: usize, cols: usize) -> Option<Matrix> {
    Matrix::alloc(rows, cols).or_none("mat_create")
}

pub fn mat_identity(n: usize) -> Option<Matrix> {
    Matrix::identity(n).or_none("mat_identity")
}

pub fn mat_get(m: Option<&Matrix>, i: usize, j: usize) -> f64 {
    require(m).and_then(|m| m.get(i, j)).or_nan("mat_get")
}

pub fn mat_set(m: Option<&mut Matrix>, i: usize, j: usize, value: f64) -> bool {
    require_mut(m)
        .and_then(|m| m.set(i, j, value))
        .or_false("mat_set")
}

pub fn mat_add(a: Option<&Matrix>, b: Option<&Matrix>) -> Option<Matrix> {
    require(a)
        .and_then(|a| a.add(require(b)?))
        .or_none("mat_add")
}

pub fn mat_multiply(a: Option<&Matrix>, b: Option<&Matrix>) -> Option<Matrix> {
    require(a)
        .and_then(|a| a.multiply(require(b)?))
        .or_none("mat_multiply")
}

pub fn mat_vec_multiply(m: Option<&Matrix>, v: Option<&Vector>) -> Option<Vector> {
    require(m)
        .and_then(|m| m.vec_multiply(require(v)?))
        .or_none("mat_vec_multiply")
}

pub fn mat_transpose(m: Option<&Matrix>) -> Option<Matrix> {
    require(m).and_then(Matrix::transpose).or_none("mat_transpose")
}

pub fn mat_determinant(m: Option<&Matrix>) -> f64 {
    require(m).and_then(Matrix::determinant).or_nan("mat_determinant")
}

pub fn mat_inverse(m: Option<&Matrix>) -> Option<Matrix> {
    require(m).and_then(Matrix::inverse).or_none("mat_inverse")
}

pub fn mat_solve(a: Option<&Matrix>, b: Option<&Vector>) -> Option<Vector> {
    require(a)
        .and_then(|a| a.solve(require(b)?))
        .or_none("mat_solve")
}

pub fn mat_trace(m: Option<&Matrix>) -> f64 {
    require(m).and_then(Matrix::trace).or_nan("mat_trace")
}

pub fn mat_is_equal(a: Option<&Matrix>, b: Option<&Matrix>, epsilon: f64) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is_equal(b, epsilon),
        _ => {
            report("mat_is_equal", Error::Null);
            false
        }
    }
}

pub fn mat_print(m: Option<&Matrix>) -> Option<String> {
    require(m).map(|m| m.to_string()).or_none("mat_print")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_null() {
        let absent: Option<&Vector> = None;
        assert_eq!(require(absent).unwrap_err(), Error::Null);
    }

    #[test]
    fn adapters_map_errors_to_sentinels() {
        assert!(Err::<f64, _>(Error::Dim).or_nan("op").is_nan());
        assert!(!Err::<(), _>(Error::Range).or_false("op"));
        assert_eq!(Err::<u8, _>(Error::Alloc).or_none("op"), None);
        assert_eq!(Ok::<f64, Error>(2.0).or_nan("op"), 2.0);
        assert!(Ok::<(), Error>(()).or_false("op"));
    }
}
