//! Numerical tolerances for the CTMC pipeline.
//!
//! # Provided items
//! - [`CLAMP_TOL`]: largest floating-point excursion outside `[0, 1]` that a
//!   reconstructed transition probability may show before it is reported.
//! - [`ROW_SUM_TOL`]: largest allowed deviation of a transition-matrix row
//!   sum from 1.
//! - [`STATIONARY_EIGEN_TOL`]: magnitude above which the "zero" eigenvalue
//!   of a generator is considered suspicious.
//! - [`IMAG_TOL`]: relative magnitude below which an imaginary eigenvalue
//!   part is treated as round-off.
//! - [`SCHUR_EPS`] / [`MAX_SCHUR_ITER`]: convergence controls for the
//!   Schur iteration.
//! - [`MAX_EIGENVECTOR_CONDITION`]: conditioning cut-off separating a
//!   usable eigenvector basis from a defective one.
//! - [`clamp_probability`]: pull a value back into `[0, 1]` when it lies
//!   within tolerance.

/// Default clamp tolerance for reconstructed probabilities.
pub const CLAMP_TOL: f64 = 1e-8;

/// Default tolerance on |row sum − 1| for transition matrices.
pub const ROW_SUM_TOL: f64 = 1e-6;

/// Default warning threshold for the eigenvalue closest to zero.
pub const STATIONARY_EIGEN_TOL: f64 = 1e-8;

/// Relative threshold below which imaginary eigenvalue parts are dropped.
pub const IMAG_TOL: f64 = 1e-10;

/// Convergence threshold handed to the Schur decomposition.
pub const SCHUR_EPS: f64 = f64::EPSILON;

/// Iteration cap for the Schur decomposition (0 means unbounded in
/// `nalgebra`, so a finite cap is always passed).
pub const MAX_SCHUR_ITER: usize = 10_000;

/// Largest accepted condition estimate `‖V‖∞·‖V⁻¹‖∞` of an eigenvector
/// matrix; beyond it the basis is treated as defective.
pub const MAX_EIGENVECTOR_CONDITION: f64 = 1.0 / (100.0 * f64::EPSILON);

/// Smallest rate normalization `Σ π_i·rowSum2_i` treated as non-degenerate.
pub const GENERAL_TOL: f64 = 1e-12;

/// Clamp a probability that drifted slightly outside `[0, 1]`.
///
/// # Parameters
/// - `value`: candidate probability.
/// - `tol`: non-negative tolerance.
///
/// # Returns
/// - `Some(value)` when `value ∈ [0, 1]`.
/// - `Some(0.0)` when `value ∈ [-tol, 0)`, `Some(1.0)` when
///   `value ∈ (1, 1 + tol]`.
/// - `None` for non-finite values or values further outside the interval.
pub fn clamp_probability(value: f64, tol: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value < 0.0 {
        if value >= -tol { Some(0.0) } else { None }
    } else if value > 1.0 {
        if value <= 1.0 + tol { Some(1.0) } else { None }
    } else {
        Some(value)
    }
}
