//! Unified error handling for the eigen system.
//!
//! This module defines `EigenError`, the error type returned by
//! [`EigenSystem`](crate::linalg::eigen::EigenSystem) implementations. It
//! groups shape validation failures together with numerical breakdowns of
//! the Schur iteration and eigenvector inversion. An alias
//! `EigenResult<T>` standardizes the return type across linear-algebra code.

/// Unified error type for eigen decompositions.
///
/// Covers malformed inputs (non-square, empty, non-finite) and numerical
/// failures (no Schur convergence, defective eigenvector basis).
#[derive(Debug, Clone, PartialEq)]
pub enum EigenError {
    // ---- Input validation ----
    /// Matrix handed to the eigen system is not square.
    NonSquare { rows: usize, cols: usize },

    /// Matrix handed to the eigen system has no entries.
    Empty,

    /// Matrix contains NaN or ±inf.
    NonFiniteEntry { row: usize, col: usize, value: f64 },

    // ---- Numerical breakdown ----
    /// Schur iteration did not converge.
    NoConvergence { max_iter: usize },

    /// Eigenvector matrix could not be inverted (defective matrix).
    SingularEigenvectors,
}

pub type EigenResult<T> = Result<T, EigenError>;

impl std::error::Error for EigenError {}

impl std::fmt::Display for EigenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input validation ----
            EigenError::NonSquare { rows, cols } => {
                write!(f, "Eigen Error: matrix must be square, got {rows}x{cols}")
            }
            EigenError::Empty => write!(f, "Eigen Error: matrix is empty"),
            EigenError::NonFiniteEntry { row, col, value } => {
                write!(f, "Eigen Error: entry ({row}, {col}) is non-finite: {value}")
            }

            // ---- Numerical breakdown ----
            EigenError::NoConvergence { max_iter } => {
                write!(f, "Eigen Error: Schur iteration did not converge within {max_iter} iterations")
            }
            EigenError::SingularEigenvectors => {
                write!(f, "Eigen Error: eigenvector matrix is singular (defective matrix)")
            }
        }
    }
}
