//! Integration tests for the Matrix kernel: storage, access and products.

use vecmat_core::config::{ALIGNMENT, MATRIX_MAX_COLUMNS, MATRIX_MAX_ELEMENTS, MATRIX_MAX_ROWS};
use vecmat_core::{Error, Matrix, Vector};

fn mat_of(values: &[f64], rows: usize, cols: usize) -> Matrix {
    Matrix::from_array(values, rows, cols).unwrap()
}

/// 2x3 matrix holding 0..5 row-major.
fn sample_2x3() -> Matrix {
    mat_of(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 2, 3)
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[test]
fn alloc_shape_and_zeroed() {
    let m = Matrix::alloc(3, 4).unwrap();
    assert_eq!(m.shape(), (3, 4));
    assert_eq!(m.rows(), 3);
    assert_eq!(m.cols(), 4);
    assert_eq!(m.len(), 12);
    assert!(!m.is_empty());
    assert!(m.as_slice().iter().all(|&x| x == 0.0));
    assert_eq!(m.as_ptr() as usize % ALIGNMENT, 0);
}

#[test]
fn alloc_rejects_invalid_shapes() {
    assert_eq!(Matrix::alloc(0, 1).unwrap_err(), Error::Range);
    assert_eq!(Matrix::alloc(1, 0).unwrap_err(), Error::Range);
    assert_eq!(Matrix::alloc(MATRIX_MAX_ROWS + 1, 1).unwrap_err(), Error::Range);
    assert_eq!(Matrix::alloc(1, MATRIX_MAX_COLUMNS + 1).unwrap_err(), Error::Range);
    assert_eq!(Matrix::alloc(usize::MAX, usize::MAX).unwrap_err(), Error::Range);
    let rows = MATRIX_MAX_ELEMENTS / MATRIX_MAX_COLUMNS + 1;
    assert_eq!(Matrix::alloc(rows, MATRIX_MAX_COLUMNS).unwrap_err(), Error::Range);
}

#[test]
fn from_array_checks_length() {
    assert_eq!(Matrix::from_array(&[1.0, 2.0, 3.0], 2, 2).unwrap_err(), Error::Dim);
    assert_eq!(Matrix::from_array(&[1.0], 0, 1).unwrap_err(), Error::Range);
    let m = sample_2x3();
    assert_eq!(m.to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn identity_and_fill() {
    let mut m = Matrix::identity(3).unwrap();
    assert_eq!(m.trace().unwrap(), 3.0);
    assert_eq!(m.get(0, 1).unwrap(), 0.0);
    m.fill(2.0).unwrap();
    assert_eq!(m.sum(), 18.0);
    assert_eq!(m.fill(f64::NAN).unwrap_err(), Error::InvalidArg);
    m.set_zero();
    assert_eq!(m.sum(), 0.0);
}

#[test]
fn free_and_clear_empties_slot() {
    let mut slot = Some(Matrix::alloc(2, 2).unwrap());
    Matrix::free_and_clear(&mut slot);
    assert!(slot.is_none());
    Matrix::free_and_clear(&mut slot);
    Matrix::alloc(1, 1).unwrap().free();
}

// ---------------------------------------------------------------------------
// Element, row and column access
// ---------------------------------------------------------------------------

#[test]
fn get_and_set_are_bounds_checked() {
    let mut m = Matrix::alloc(2, 3).unwrap();
    m.set(1, 2, 5.0).unwrap();
    assert_eq!(m.get(1, 2).unwrap(), 5.0);
    assert_eq!(m[(1, 2)], 5.0);
    assert_eq!(m.as_slice()[5], 5.0);
    assert_eq!(m.set(2, 0, 1.0).unwrap_err(), Error::Range);
    assert_eq!(m.get(0, 3).unwrap_err(), Error::Range);
}

#[test]
fn row_access_is_contiguous_copy() {
    let mut m = sample_2x3();
    let mut row = Vector::alloc(3).unwrap();
    m.get_row(1, &mut row).unwrap();
    assert_eq!(row.to_vec(), vec![3.0, 4.0, 5.0]);
    assert_eq!(m.row_slice(0).unwrap(), &[0.0, 1.0, 2.0]);
    assert_eq!(m.row(0).unwrap().to_vec(), vec![0.0, 1.0, 2.0]);

    row[0] = 100.0;
    assert_eq!(m.get(1, 0).unwrap(), 3.0);

    m.set_row(0, &row).unwrap();
    assert_eq!(m.row_slice(0).unwrap(), &[100.0, 4.0, 5.0]);
}

#[test]
fn column_access_is_strided_copy() {
    let mut m = sample_2x3();
    let mut col = Vector::alloc(2).unwrap();
    m.get_column(2, &mut col).unwrap();
    assert_eq!(col.to_vec(), vec![2.0, 5.0]);
    assert_eq!(m.column(1).unwrap().to_vec(), vec![1.0, 4.0]);

    m.set_column(0, &Vector::from_array(&[-1.0, -2.0]).unwrap()).unwrap();
    assert_eq!(m.to_vec(), vec![-1.0, 1.0, 2.0, -2.0, 4.0, 5.0]);
}

#[test]
fn row_column_dimension_checked_before_range() {
    let mut m = sample_2x3();
    let wrong = Vector::alloc(5).unwrap();
    let mut wrong_out = Vector::alloc(5).unwrap();
    assert_eq!(m.set_row(9, &wrong).unwrap_err(), Error::Dim);
    assert_eq!(m.get_row(9, &mut wrong_out).unwrap_err(), Error::Dim);
    assert_eq!(m.set_column(9, &wrong).unwrap_err(), Error::Dim);
    assert_eq!(m.get_column(9, &mut wrong_out).unwrap_err(), Error::Dim);

    let row = Vector::alloc(3).unwrap();
    let col = Vector::alloc(2).unwrap();
    assert_eq!(m.set_row(2, &row).unwrap_err(), Error::Range);
    assert_eq!(m.set_column(3, &col).unwrap_err(), Error::Range);
    assert_eq!(m.row_slice(2).unwrap_err(), Error::Range);
    assert_eq!(m.column(3).unwrap_err(), Error::Range);
}

// ---------------------------------------------------------------------------
// Resize and reshape
// ---------------------------------------------------------------------------

#[test]
fn resize_round_trip_preserves_overlap() {
    let original = mat_of(&[1.0, 2.0, 3.0, 4.0], 2, 2);
    let mut m = original.clone();
    m.resize(3, 3).unwrap();
    assert_eq!(
        m.to_vec(),
        vec![1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]
    );
    m.resize(2, 2).unwrap();
    assert_eq!(m, original);
}

#[test]
fn resize_changes_axes_independently() {
    let mut m = sample_2x3();
    m.resize(3, 2).unwrap();
    assert_eq!(m.shape(), (3, 2));
    assert_eq!(m.to_vec(), vec![0.0, 1.0, 3.0, 4.0, 0.0, 0.0]);
    assert_eq!(m.resize(0, 2).unwrap_err(), Error::Range);
    assert_eq!(m.resize(MATRIX_MAX_ROWS + 1, 2).unwrap_err(), Error::Range);
    assert_eq!(m.shape(), (3, 2));
}

#[test]
fn reshape_keeps_buffer() {
    let mut m = sample_2x3();
    let before = m.as_ptr();
    m.reshape(3, 2).unwrap();
    assert_eq!(m.shape(), (3, 2));
    assert_eq!(m.as_ptr(), before);
    assert_eq!(m.get(2, 1).unwrap(), 5.0);
    m.reshape(6, 1).unwrap();
    assert_eq!(m.reshape(4, 2).unwrap_err(), Error::Dim);
    assert_eq!(m.reshape(usize::MAX, 2).unwrap_err(), Error::Dim);
    assert_eq!(m.shape(), (6, 1));
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

#[test]
fn elementwise_arithmetic() {
    let a = mat_of(&[1.0, 2.0, 3.0, 4.0], 2, 2);
    let b = mat_of(&[4.0, 3.0, 2.0, 1.0], 2, 2);
    assert_eq!(a.add(&b).unwrap().to_vec(), vec![5.0; 4]);
    assert_eq!(a.subtract(&b).unwrap().to_vec(), vec![-3.0, -1.0, 1.0, 3.0]);
    assert_eq!(a.scale(2.0).unwrap().to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
    assert_eq!(a.hadamard(&b).unwrap().to_vec(), vec![4.0, 6.0, 6.0, 4.0]);

    let mut out = Matrix::alloc(2, 2).unwrap();
    a.add_into(&b, &mut out).unwrap();
    assert_eq!(out.sum(), 20.0);
    a.subtract_into(&b, &mut out).unwrap();
    assert_eq!(out.sum(), 0.0);
    a.scale_into(&mut out, -1.0).unwrap();
    assert_eq!(out.sum(), -10.0);
    a.hadamard_into(&b, &mut out).unwrap();
    assert_eq!(out.sum(), 20.0);

    let mut c = a.clone();
    c.add_inplace(&b).unwrap();
    c.subtract_inplace(&b).unwrap();
    assert_eq!(c, a);
    c.scale_inplace(3.0);
    assert_eq!(c.to_vec(), vec![3.0, 6.0, 9.0, 12.0]);
}

#[test]
fn arithmetic_requires_identical_shapes() {
    let a = sample_2x3();
    let b = Matrix::alloc(3, 2).unwrap();
    let mut out = Matrix::alloc(3, 2).unwrap();
    assert_eq!(a.add(&b).unwrap_err(), Error::Dim);
    assert_eq!(a.subtract(&b).unwrap_err(), Error::Dim);
    assert_eq!(a.hadamard(&b).unwrap_err(), Error::Dim);
    assert_eq!(a.add_into(&a, &mut out).unwrap_err(), Error::Dim);
    assert_eq!(a.scale_into(&mut out, 1.0).unwrap_err(), Error::Dim);
    assert_eq!(out.add_inplace(&a).unwrap_err(), Error::Dim);
    assert_eq!(out.copy_from(&a).unwrap_err(), Error::Dim);
}

#[test]
fn map_policy_matches_vector() {
    let m = mat_of(&[1.0, 4.0, 9.0, 16.0], 2, 2);
    assert_eq!(m.map(f64::sqrt).unwrap().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(m.map(|x| x / 0.0).unwrap_err(), Error::Range);
    let mut wrong = Matrix::alloc(1, 4).unwrap();
    assert_eq!(m.map_into(&mut wrong, |x| x).unwrap_err(), Error::Dim);
}

#[test]
fn swap_and_copy() {
    let mut a = sample_2x3();
    let mut b = Matrix::identity(2).unwrap();
    a.swap(&mut b);
    assert_eq!(a.shape(), (2, 2));
    assert_eq!(b.shape(), (2, 3));

    let mut c = Matrix::alloc(2, 3).unwrap();
    c.copy_from(&b).unwrap();
    assert_eq!(c, b);
    assert_eq!(c.try_clone().unwrap(), b);
}

#[test]
fn is_equal_and_is_square() {
    let a = mat_of(&[1.0, 2.0, 3.0, 4.0], 2, 2);
    let b = mat_of(&[1.0, 2.0, 3.0, 4.0 + 1e-9], 2, 2);
    assert!(a.is_equal(&b, 1e-6));
    assert!(!a.is_equal(&b, 1e-12));
    assert!(!a.is_equal(&mat_of(&[1.0, 2.0, 3.0, 4.0], 1, 4), 1.0));
    assert!(a.is_square());
    assert!(!sample_2x3().is_square());
}

// ---------------------------------------------------------------------------
// Products and transforms
// ---------------------------------------------------------------------------

#[test]
fn transpose_scenario() {
    let a = sample_2x3();
    let t = a.transpose().unwrap();
    assert_eq!(t.shape(), (3, 2));
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(t.get(j, i).unwrap(), a.get(i, j).unwrap());
        }
    }
    assert_eq!(t.transpose().unwrap(), a);

    let mut wrong = Matrix::alloc(2, 3).unwrap();
    assert_eq!(a.transpose_into(&mut wrong).unwrap_err(), Error::Dim);
}

#[test]
fn multiply_known_product() {
    let a = sample_2x3();
    let b = mat_of(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 3, 2);
    let c = a.multiply(&b).unwrap();
    assert_eq!(c.shape(), (2, 2));
    assert_eq!(c.to_vec(), vec![2.0, 3.0, 8.0, 9.0]);

    let mut out = Matrix::alloc(2, 2).unwrap();
    a.multiply_into(&b, &mut out).unwrap();
    assert_eq!(out, c);
}

#[test]
fn multiply_checks_dimensions() {
    let a = sample_2x3();
    assert_eq!(a.multiply(&a).unwrap_err(), Error::Dim);
    let b = Matrix::alloc(3, 4).unwrap();
    let mut wrong = Matrix::alloc(2, 3).unwrap();
    assert_eq!(a.multiply_into(&b, &mut wrong).unwrap_err(), Error::Dim);
}

#[test]
fn multiply_by_identity() {
    let a = mat_of(&[2.0, -1.0, 0.5, 3.0, 7.0, 1.0, 0.0, 4.0, -2.0], 3, 3);
    let i = Matrix::identity(3).unwrap();
    assert_eq!(a.multiply(&i).unwrap(), a);
    assert_eq!(i.multiply(&a).unwrap(), a);
}

#[test]
fn vec_multiply_rows() {
    let a = sample_2x3();
    let v = Vector::from_array(&[1.0, 1.0, 1.0]).unwrap();
    assert_eq!(a.vec_multiply(&v).unwrap().to_vec(), vec![3.0, 12.0]);

    let mut out = Vector::alloc(3).unwrap();
    assert_eq!(a.vec_multiply_into(&v, &mut out).unwrap_err(), Error::Dim);
    let short = Vector::alloc(2).unwrap();
    assert_eq!(a.vec_multiply(&short).unwrap_err(), Error::Dim);
}

#[test]
fn display_one_row_per_line() {
    let m = sample_2x3();
    assert_eq!(m.to_string(), "[0, 1, 2]\n[3, 4, 5]");
}
