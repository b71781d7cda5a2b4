//! Model options — numerical configuration for the CTMC pipeline.
//!
//! Purpose
//! -------
//! Collect the numerical knobs of a microsatellite model in one place: how
//! reconstructed transition probabilities are sanitized, the tolerances used
//! to accept them, the warning threshold on the stationary eigenvalue, and
//! the convergence controls of the default eigen system.
//!
//! Key behaviors
//! -------------
//! - [`ReconstructionPolicy`] selects between tolerance-based clamping (the
//!   default) and the legacy entrywise absolute value.
//! - [`ModelOptions::new`] validates every tolerance; [`ModelOptions::default`]
//!   uses the constants from [`crate::numerical_stability`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `clamp_tol`, `row_sum_tol`, `stationary_eigen_tol` and the eigen
//!   options' `schur_eps` / `imag_tol` are finite and strictly positive.
//! - `eigen.max_iter > 0`.
//!
//! Downstream usage
//! ----------------
//! - Pass a [`ModelOptions`] to `MicrosatModel::with_options`; the transition
//!   engine reads `reconstruction`, `clamp_tol` and `row_sum_tol` on every
//!   call, the cache reads `stationary_eigen_tol` on every rebuild.
//!
//! Testing notes
//! -------------
//! - Unit tests check that the defaults validate and that each tolerance is
//!   rejected when non-finite or non-positive.
use crate::{
    linalg::eigen::EigenOptions,
    mutation::errors::{ModelError, ModelResult},
    numerical_stability::tolerances::{CLAMP_TOL, ROW_SUM_TOL, STATIONARY_EIGEN_TOL},
};

/// How reconstructed transition probabilities are turned into output values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconstructionPolicy {
    /// Snap entries within `clamp_tol` of `[0, 1]` onto the interval and
    /// reject anything further out, or any row whose sum drifts from 1 by
    /// more than `row_sum_tol`.
    #[default]
    ToleranceClamp,
    /// Take `|P_ij|` entrywise without further checks.
    Absolute,
}

/// ModelOptions — numerical configuration of a microsatellite model.
///
/// Fields
/// ------
/// - `reconstruction`: [`ReconstructionPolicy`]
///   Post-processing applied to reconstructed probabilities.
/// - `clamp_tol`: `f64`
///   Largest excursion outside `[0, 1]` snapped back onto the interval.
/// - `row_sum_tol`: `f64`
///   Largest accepted `|Σ_j P_ij − 1|`.
/// - `stationary_eigen_tol`: `f64`
///   `|λ_min|` above which a rebuild logs a warning.
/// - `eigen`: [`EigenOptions`]
///   Convergence controls of the default eigen system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub reconstruction: ReconstructionPolicy,
    pub clamp_tol: f64,
    pub row_sum_tol: f64,
    pub stationary_eigen_tol: f64,
    pub eigen: EigenOptions,
}

impl ModelOptions {
    /// Construct validated options.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InvalidOption`
    ///   Returned for the first tolerance that is non-finite or `≤ 0`, or
    ///   when `eigen.max_iter == 0`.
    pub fn new(
        reconstruction: ReconstructionPolicy, clamp_tol: f64, row_sum_tol: f64,
        stationary_eigen_tol: f64, eigen: EigenOptions,
    ) -> ModelResult<Self> {
        let opts = ModelOptions { reconstruction, clamp_tol, row_sum_tol, stationary_eigen_tol, eigen };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check every tolerance; used when options are built field by field.
    pub fn validate(&self) -> ModelResult<()> {
        validate_tolerance("clamp_tol", self.clamp_tol)?;
        validate_tolerance("row_sum_tol", self.row_sum_tol)?;
        validate_tolerance("stationary_eigen_tol", self.stationary_eigen_tol)?;
        validate_tolerance("eigen.schur_eps", self.eigen.schur_eps)?;
        validate_tolerance("eigen.imag_tol", self.eigen.imag_tol)?;
        if self.eigen.max_iter == 0 {
            return Err(ModelError::InvalidOption {
                name: "eigen.max_iter",
                value: 0.0,
                reason: "Iteration cap must be at least 1.",
            });
        }
        Ok(())
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        ModelOptions {
            reconstruction: ReconstructionPolicy::default(),
            clamp_tol: CLAMP_TOL,
            row_sum_tol: ROW_SUM_TOL,
            stationary_eigen_tol: STATIONARY_EIGEN_TOL,
            eigen: EigenOptions::default(),
        }
    }
}

fn validate_tolerance(name: &'static str, value: f64) -> ModelResult<()> {
    if !value.is_finite() {
        return Err(ModelError::InvalidOption { name, value, reason: "Tolerance must be finite." });
    }
    if value <= 0.0 {
        return Err(ModelError::InvalidOption {
            name,
            value,
            reason: "Tolerance must be strictly positive.",
        });
    }
    Ok(())
}
