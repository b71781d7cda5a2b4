//! linalg::bridge — copies between `ndarray` and `nalgebra` containers.
//!
//! The public API of the crate speaks `ndarray`; the Schur decomposition
//! and matrix inverse live in `nalgebra`. These helpers move data across
//! that boundary with column-major writes (matching `DMatrix` storage) and
//! validate the input shape on the way in.
use crate::linalg::errors::{EigenError, EigenResult};
use nalgebra::{Complex, DMatrix};
use ndarray::{Array2, ArrayView2};

/// Validate that `matrix` is square, non-empty and finite.
///
/// # Errors
/// - [`EigenError::Empty`] when the matrix has no rows.
/// - [`EigenError::NonSquare`] when `rows != cols`.
/// - [`EigenError::NonFiniteEntry`] on the first NaN/±inf found
///   (row-major scan).
pub fn validate_square_finite(matrix: ArrayView2<'_, f64>) -> EigenResult<usize> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return Err(EigenError::Empty);
    }
    if rows != cols {
        return Err(EigenError::NonSquare { rows, cols });
    }
    for ((row, col), &value) in matrix.indexed_iter() {
        if !value.is_finite() {
            return Err(EigenError::NonFiniteEntry { row, col, value });
        }
    }
    Ok(rows)
}

/// Copy a real `ndarray` matrix into a complex `DMatrix` (imaginary parts
/// zero). Shapes must agree; mismatches are programmer errors.
pub fn fill_complex_dmatrix(src: ArrayView2<'_, f64>, dst: &mut DMatrix<Complex<f64>>) {
    let n = src.ncols();
    for j in 0..n {
        for i in 0..src.nrows() {
            dst[(i, j)] = Complex::new(src[[i, j]], 0.0);
        }
    }
}

/// Copy a real `DMatrix` into a freshly allocated row-major `Array2`.
pub fn dmatrix_to_array2(src: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((src.nrows(), src.ncols()), |(i, j)| src[(i, j)])
}
