//! Integration tests for determinant, inverse, solve and trace.

use vecmat_core::{Error, Matrix, SolverConfig, Vector};

fn mat_of(values: &[f64], rows: usize, cols: usize) -> Matrix {
    Matrix::from_array(values, rows, cols).unwrap()
}

// ---------------------------------------------------------------------------
// Determinant
// ---------------------------------------------------------------------------

#[test]
fn determinant_of_known_matrices() {
    assert_eq!(Matrix::identity(4).unwrap().determinant().unwrap(), 1.0);
    let a = mat_of(&[4.0, 3.0, 6.0, 3.0], 2, 2);
    assert!((a.determinant().unwrap() - (-6.0)).abs() < 1e-12);

    let b = mat_of(&[2.0, 0.0, 1.0, 1.0, 3.0, 2.0, 1.0, 1.0, 2.0], 3, 3);
    assert!((b.determinant().unwrap() - 6.0).abs() < 1e-12);
}

#[test]
fn determinant_sign_follows_row_swaps() {
    let swapped = mat_of(&[0.0, 1.0, 1.0, 0.0], 2, 2);
    assert_eq!(swapped.determinant().unwrap(), -1.0);
}

#[test]
fn determinant_of_singular_is_zero() {
    let a = mat_of(&[1.0, 2.0, 2.0, 4.0], 2, 2);
    assert_eq!(a.determinant().unwrap(), 0.0);
    let nearly = mat_of(&[1.0, 1.0, 1.0, 1.0 + 1e-14], 2, 2);
    assert_eq!(nearly.determinant_with(&SolverConfig::default()).unwrap(), 0.0);
}

#[test]
fn determinant_requires_square() {
    let a = Matrix::alloc(2, 3).unwrap();
    assert_eq!(a.determinant().unwrap_err(), Error::Dim);
}

// ---------------------------------------------------------------------------
// Inverse
// ---------------------------------------------------------------------------

#[test]
fn inverse_times_original_is_identity() {
    let a = mat_of(&[4.0, 7.0, 2.0, 3.0, 6.0, 1.0, 2.0, 5.0, 3.0], 3, 3);
    let inv = a.inverse().unwrap();
    let product = a.multiply(&inv).unwrap();
    assert!(product.is_equal(&Matrix::identity(3).unwrap(), 1e-10));
}

#[test]
fn inverse_into_matches_allocating() {
    let a = mat_of(&[2.0, 1.0, 1.0, 3.0], 2, 2);
    let mut out = Matrix::alloc(2, 2).unwrap();
    a.inverse_into(&mut out).unwrap();
    assert!(out.is_equal(&a.inverse().unwrap(), 0.0));
    assert!(out.is_equal(&mat_of(&[0.6, -0.2, -0.2, 0.4], 2, 2), 1e-12));

    let mut wrong = Matrix::alloc(3, 3).unwrap();
    assert_eq!(a.inverse_into(&mut wrong).unwrap_err(), Error::Dim);
}

#[test]
fn inverse_of_singular_fails() {
    let a = mat_of(&[1.0, 2.0, 2.0, 4.0], 2, 2);
    assert_eq!(a.inverse().unwrap_err(), Error::DivZero);
    assert_eq!(Matrix::alloc(2, 3).unwrap().inverse().unwrap_err(), Error::Dim);
}

// ---------------------------------------------------------------------------
// Solve
// ---------------------------------------------------------------------------

#[test]
fn solve_with_identity_returns_rhs() {
    for n in [1usize, 2, 5, 9] {
        let i = Matrix::identity(n).unwrap();
        let b = Vector::from_array(&(0..n).map(|k| k as f64 - 2.5).collect::<Vec<_>>()).unwrap();
        let x = i.solve(&b).unwrap();
        assert!(x.is_equal(&b, 1e-12));
    }
}

#[test]
fn solve_known_system() {
    // 2x + y = 5, x + 3y = 10 -> x = 1, y = 3
    let a = mat_of(&[2.0, 1.0, 1.0, 3.0], 2, 2);
    let b = Vector::from_array(&[5.0, 10.0]).unwrap();
    let x = a.solve(&b).unwrap();
    assert!(x.is_equal(&Vector::from_array(&[1.0, 3.0]).unwrap(), 1e-12));

    let mut out = Vector::alloc(2).unwrap();
    a.solve_into(&b, &mut out).unwrap();
    assert_eq!(out, x);
}

#[test]
fn solve_needs_pivoting() {
    let a = mat_of(&[0.0, 1.0, 1.0, 1.0], 2, 2);
    let b = Vector::from_array(&[2.0, 5.0]).unwrap();
    let x = a.solve(&b).unwrap();
    assert!(x.is_equal(&Vector::from_array(&[3.0, 2.0]).unwrap(), 1e-12));
}

#[test]
fn solve_singular_and_shape_errors() {
    let singular = mat_of(&[1.0, 2.0, 2.0, 4.0], 2, 2);
    let b = Vector::from_array(&[1.0, 1.0]).unwrap();
    assert_eq!(singular.solve(&b).unwrap_err(), Error::DivZero);

    let rect = Matrix::alloc(2, 3).unwrap();
    assert_eq!(rect.solve(&b).unwrap_err(), Error::Dim);

    let square = Matrix::identity(3).unwrap();
    assert_eq!(square.solve(&b).unwrap_err(), Error::Dim);
    let mut out = Vector::alloc(2).unwrap();
    let b3 = Vector::alloc(3).unwrap();
    assert_eq!(square.solve_into(&b3, &mut out).unwrap_err(), Error::Dim);
}

#[test]
fn solver_tolerance_is_configurable() {
    let a = mat_of(&[1e-6, 0.0, 0.0, 1e-6], 2, 2);
    let b = Vector::from_array(&[1.0, 1.0]).unwrap();
    assert!(a.solve(&b).is_ok());

    let strict = SolverConfig::new(1e-3);
    assert_eq!(a.solve_with(&b, &strict).unwrap_err(), Error::DivZero);
    assert_eq!(a.inverse_with(&strict).unwrap_err(), Error::DivZero);
    assert_eq!(a.determinant_with(&strict).unwrap(), 0.0);

    let invalid = SolverConfig::new(-1.0);
    assert_eq!(a.solve_with(&b, &invalid).unwrap_err(), Error::InvalidArg);
    assert_eq!(a.determinant_with(&invalid).unwrap_err(), Error::InvalidArg);
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

#[test]
fn trace_sums_diagonal() {
    let a = mat_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0], 3, 3);
    assert_eq!(a.trace().unwrap(), 15.0);
    assert_eq!(Matrix::alloc(2, 3).unwrap().trace().unwrap_err(), Error::Dim);
}
