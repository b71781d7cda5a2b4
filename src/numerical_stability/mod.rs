//! numerical_stability — shared tolerances and guarded scalar helpers.
//!
//! Purpose
//! -------
//! Collect the small numerical tolerances and clamping helpers used by the
//! rate-matrix, eigen, and transition layers so that every stage of the
//! CTMC pipeline agrees on what "numerically zero" and "numerically one"
//! mean.
//!
//! Key behaviors
//! -------------
//! - Centralize default tolerances (`CLAMP_TOL`, `ROW_SUM_TOL`,
//!   `STATIONARY_EIGEN_TOL`, `IMAG_TOL`, `SCHUR_EPS`, `GENERAL_TOL`).
//! - Provide [`clamp_probability`], the tolerance-based replacement for the
//!   entrywise absolute value historically applied to reconstructed
//!   transition probabilities.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every tolerance is finite and strictly positive.
//! - Helpers here never panic and never log; callers decide how to report a
//!   value that falls outside tolerance.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`tolerances`] cover the three clamping regimes (inside
//!   `[0, 1]`, within tolerance, beyond tolerance) and non-finite input.

pub mod tolerances;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::tolerances::{
    CLAMP_TOL, GENERAL_TOL, IMAG_TOL, MAX_EIGENVECTOR_CONDITION, MAX_SCHUR_ITER, ROW_SUM_TOL, SCHUR_EPS,
    STATIONARY_EIGEN_TOL, clamp_probability,
};
