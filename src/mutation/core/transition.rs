//! Transition probability engine — `P(t) = exp(t·Q)` from spectral factors.
//!
//! Purpose
//! -------
//! Turn a cached decomposition `Q = V·Λ·V⁻¹` into the finite-time transition
//! matrix of a branch, with time measured in expected mutational events.
//!
//! Key behaviors
//! -------------
//! - `distance = (start_time − end_time)·rate` ([`branch_distance`]).
//! - `normalization = Σ_i π_i·rowSum2_i` ([`rate_normalization`]), the
//!   stationary mean step size per unit time; one unit of scaled distance is
//!   one expected repeat-unit change.
//! - `P = V·exp(Λ·distance/normalization)·V⁻¹`. Real eigenvalues scale one
//!   row of `V⁻¹` by `exp(λt)`; a conjugate-pair block `[[a, b], [−b, a]]`
//!   rotates two rows by `e^{at}·[[cos bt, sin bt], [−sin bt, cos bt]]`.
//! - Post-processing follows the [`ReconstructionPolicy`]:
//!   - `ToleranceClamp`: entries within `clamp_tol` of `[0, 1]` are snapped
//!     onto it, anything further out or any row whose raw sum is off by more
//!     than `row_sum_tol` is a [`ModelError::ReconstructionDrift`].
//!   - `Absolute`: entrywise `|P_ij|`, no checks.
//!
//! Invariants & assumptions
//! ------------------------
//! - `distance = 0` reproduces `V·V⁻¹ ≈ I`.
//! - The decomposition is never mutated; scaling works on a copy of `V⁻¹`,
//!   so concurrent callers can share one decomposition.
//!
//! Conventions
//! -----------
//! - Flattened outputs are row-major: `out[i·N + j] = P_ij`.
//!
//! Testing notes
//! -------------
//! - Unit tests check the identity at zero distance, stochasticity over a
//!   range of distances, agreement with a Taylor-series exponential on a
//!   generator with complex eigenvalues, and every error path.
use crate::{
    linalg::eigen::EigenDecomposition,
    mutation::{
        core::options::{ModelOptions, ReconstructionPolicy},
        errors::{ModelError, ModelResult},
    },
    numerical_stability::tolerances::{GENERAL_TOL, clamp_probability},
};
use ndarray::{Array2, ArrayView1, Axis};

/// A branch request: node times and the branch rate multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub start_time: f64,
    pub end_time: f64,
    pub rate: f64,
}

impl Branch {
    pub fn new(start_time: f64, end_time: f64, rate: f64) -> Self {
        Branch { start_time, end_time, rate }
    }

    /// See [`branch_distance`].
    pub fn distance(&self) -> ModelResult<f64> {
        branch_distance(self.start_time, self.end_time, self.rate)
    }
}

/// Evolutionary distance along a branch.
///
/// # Errors
/// - [`ModelError::NonFiniteDistance`] if `(start_time − end_time)·rate` is
///   NaN or infinite.
pub fn branch_distance(start_time: f64, end_time: f64, rate: f64) -> ModelResult<f64> {
    let distance = (start_time - end_time) * rate;
    if !distance.is_finite() {
        return Err(ModelError::NonFiniteDistance { value: distance });
    }
    Ok(distance)
}

/// Stationary-weighted mean step rate `Σ_i π_i·rowSum2_i`.
///
/// # Errors
/// - [`ModelError::DegenerateNormalization`] if the sum is non-finite or
///   `≤ GENERAL_TOL` (for example when every rate is zero).
pub fn rate_normalization(
    stationary: ArrayView1<'_, f64>, row_sum2: ArrayView1<'_, f64>,
) -> ModelResult<f64> {
    check_normalization(stationary.dot(&row_sum2))
}

/// Transition matrix for a branch of length `distance`.
///
/// Parameters
/// ----------
/// - `eigen`: `&EigenDecomposition`
///   Spectral factors of the generator.
/// - `normalization`: `f64`
///   Output of [`rate_normalization`] for the same generator.
/// - `distance`: `f64`
///   Unscaled branch distance, see [`branch_distance`].
/// - `options`: `&ModelOptions`
///   Reconstruction policy and tolerances.
///
/// Returns
/// -------
/// ModelResult<Array2<f64>>
///   `N×N` matrix `P(distance / normalization)`.
///
/// Errors
/// ------
/// - `ModelError::NonFiniteDistance` if `distance` is not finite.
/// - `ModelError::DegenerateNormalization` if `normalization` is not finite
///   or `≤ GENERAL_TOL`.
/// - `ModelError::ReconstructionDrift` under `ToleranceClamp` when an entry
///   or a row sum is outside tolerance.
pub fn transition_matrix(
    eigen: &EigenDecomposition, normalization: f64, distance: f64, options: &ModelOptions,
) -> ModelResult<Array2<f64>> {
    if !distance.is_finite() {
        return Err(ModelError::NonFiniteDistance { value: distance });
    }
    let t = distance / check_normalization(normalization)?;

    let mut scaled = eigen.inverse_eigenvectors.clone();
    exponentiate_rows(eigen, t, &mut scaled);
    let raw = eigen.eigenvectors.dot(&scaled);

    match options.reconstruction {
        ReconstructionPolicy::Absolute => Ok(raw.mapv(f64::abs)),
        ReconstructionPolicy::ToleranceClamp => {
            clamp_rows(raw, options.clamp_tol, options.row_sum_tol)
        }
    }
}

/// Fill a flattened row-major buffer with the transition matrix.
///
/// # Errors
/// - [`ModelError::OutputBufferMismatch`] if `out.len() != N·N`; nothing is
///   written in that case.
/// - Any error of [`transition_matrix`].
pub fn transition_probabilities(
    eigen: &EigenDecomposition, normalization: f64, distance: f64, options: &ModelOptions,
    out: &mut [f64],
) -> ModelResult<()> {
    let n = eigen.dim();
    if out.len() != n * n {
        return Err(ModelError::OutputBufferMismatch { expected: n * n, actual: out.len() });
    }
    let p = transition_matrix(eigen, normalization, distance, options)?;
    for (dst, &src) in out.iter_mut().zip(p.iter()) {
        *dst = src;
    }
    Ok(())
}

// ---- Helper methods ----

/// Shared degeneracy threshold of the time normalization.
fn check_normalization(value: f64) -> ModelResult<f64> {
    if !value.is_finite() || value <= GENERAL_TOL {
        return Err(ModelError::DegenerateNormalization { value });
    }
    Ok(value)
}

/// Replace `V⁻¹` by `exp(Λt)·V⁻¹`, block by block.
fn exponentiate_rows(eigen: &EigenDecomposition, t: f64, vinv: &mut Array2<f64>) {
    let n = eigen.dim();
    let mut k = 0;
    while k < n {
        let a = eigen.eigenvalues[k];
        let b = eigen.eigenvalues_imag[k];
        let growth = (a * t).exp();
        if b != 0.0 && k + 1 < n {
            let (c, s) = ((b * t).cos(), (b * t).sin());
            let (mut upper, mut lower) = vinv.multi_slice_mut((
                ndarray::s![k, ..],
                ndarray::s![k + 1, ..],
            ));
            for (x, y) in upper.iter_mut().zip(lower.iter_mut()) {
                let (xk, yk) = (*x, *y);
                *x = growth * (c * xk + s * yk);
                *y = growth * (-s * xk + c * yk);
            }
            k += 2;
        } else {
            vinv.row_mut(k).mapv_inplace(|x| x * growth);
            k += 1;
        }
    }
}

/// Tolerance-based clean-up of a reconstructed transition matrix.
fn clamp_rows(mut p: Array2<f64>, clamp_tol: f64, row_sum_tol: f64) -> ModelResult<Array2<f64>> {
    for (row, mut values) in p.axis_iter_mut(Axis(0)).enumerate() {
        let row_sum = values.sum();
        if !row_sum.is_finite() || (row_sum - 1.0).abs() > row_sum_tol {
            return Err(ModelError::ReconstructionDrift { row, col: row, value: row_sum, row_sum });
        }
        for (col, v) in values.iter_mut().enumerate() {
            *v = clamp_probability(*v, clamp_tol).ok_or(ModelError::ReconstructionDrift {
                row,
                col,
                value: *v,
                row_sum,
            })?;
        }
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        linalg::eigen::{DefaultEigenSystem, EigenSystem},
        mutation::core::{
            params::MutationParams,
            rate_matrix::{RateMatrix, build_rate_matrix},
            state_space::StateSpace,
            stationary::find_stationary_distribution,
        },
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - P(0) = I and stochasticity of P(t) for t > 0.
    // - Agreement with exp(tQ) computed by Taylor series, including a
    //   generator whose spectrum has a complex conjugate pair.
    // - Both reconstruction policies and the request-validation errors.
    // -------------------------------------------------------------------------

    struct Fixture {
        rate: RateMatrix,
        eigen: EigenDecomposition,
        normalization: f64,
    }

    fn reference_fixture() -> Fixture {
        let params = MutationParams::new(0.5, 10.0, 0.7, 1.0, 10).unwrap();
        let space = StateSpace::new(5, 8).unwrap();
        let rate = build_rate_matrix(&params, &space);
        let eigen = DefaultEigenSystem::default().decompose(rate.q.view()).unwrap();
        let pi = find_stationary_distribution(&eigen, 1e-8);
        let normalization = rate_normalization(pi.view(), rate.row_sum2.view()).unwrap();
        Fixture { rate, eigen, normalization }
    }

    fn taylor_expm(q: &Array2<f64>, t: f64) -> Array2<f64> {
        let n = q.nrows();
        let mut term = Array2::<f64>::eye(n);
        let mut acc = Array2::<f64>::eye(n);
        for k in 1..60 {
            term = term.dot(q) * (t / k as f64);
            acc += &term;
        }
        acc
    }

    #[test]
    // Purpose
    // -------
    // Zero distance yields the identity matrix.
    fn zero_distance_gives_identity() {
        // Arrange
        let fx = reference_fixture();

        // Act
        let p = transition_matrix(&fx.eigen, fx.normalization, 0.0, &ModelOptions::default())
            .unwrap();

        // Assert
        let eye = Array2::<f64>::eye(5);
        for (x, y) in p.iter().zip(eye.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // For positive distances every row is a probability vector.
    //
    // Given
    // -----
    // - The reference model and distances from 1e-3 to 50.
    //
    // Expect
    // ------
    // - Row sums within 1e-8 of 1 and entries in [0, 1].
    fn positive_distance_rows_are_probability_vectors() {
        let fx = reference_fixture();
        for &d in &[1e-3, 0.1, 0.5, 2.0, 10.0, 50.0] {
            let p =
                transition_matrix(&fx.eigen, fx.normalization, d, &ModelOptions::default()).unwrap();
            for row in p.rows() {
                assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-8);
                assert!(row.iter().all(|&x| (0.0..=1.0).contains(&x)));
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The spectral exponential matches a Taylor-series exponential of the
    // normalized generator.
    fn spectral_exponential_matches_taylor_series() {
        // Arrange
        let fx = reference_fixture();
        let d = 0.8;
        let expected = taylor_expm(&fx.rate.q, d / fx.normalization);

        // Act
        let p =
            transition_matrix(&fx.eigen, fx.normalization, d, &ModelOptions::default()).unwrap();

        // Assert
        for (x, y) in p.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Complex conjugate pairs are exponentiated as rotations.
    //
    // Given
    // -----
    // - The cyclic generator 0 → 1 → 2 → 0 (eigenvalues 0, −3/2 ± i√3/2)
    //   and normalization 1.
    //
    // Expect
    // ------
    // - P(t) equals the Taylor-series exp(tQ) for several t.
    fn complex_pair_block_matches_taylor_series() {
        // Arrange
        let q = array![[-1.0, 1.0, 0.0], [0.0, -1.0, 1.0], [1.0, 0.0, -1.0]];
        let eigen = DefaultEigenSystem::default().decompose(q.view()).unwrap();
        assert!(eigen.has_complex_pairs());

        for &t in &[0.1, 0.7, 2.5] {
            // Act
            let p = transition_matrix(&eigen, 1.0, t, &ModelOptions::default()).unwrap();

            // Assert
            let expected = taylor_expm(&q, t);
            for (x, y) in p.iter().zip(expected.iter()) {
                assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Values outside tolerance are reported under `ToleranceClamp` and passed
    // through as |x| under `Absolute`.
    //
    // Given
    // -----
    // - A synthetic decomposition V = V⁻¹ = I with eigenvalues (0.5, 0),
    //   which is not a generator: P(1) = diag(e^0.5, 1).
    //
    // Expect
    // ------
    // - `ToleranceClamp` fails with `ReconstructionDrift` on row 0.
    // - `Absolute` returns e^0.5 at (0, 0).
    fn out_of_tolerance_values_follow_policy() {
        // Arrange
        let eigen = EigenDecomposition {
            eigenvalues: array![0.5, 0.0],
            eigenvalues_imag: Array1::zeros(2),
            eigenvectors: Array2::eye(2),
            inverse_eigenvectors: Array2::eye(2),
        };
        let absolute =
            ModelOptions { reconstruction: ReconstructionPolicy::Absolute, ..ModelOptions::default() };

        // Act
        let clamped = transition_matrix(&eigen, 1.0, 1.0, &ModelOptions::default());
        let raw = transition_matrix(&eigen, 1.0, 1.0, &absolute).unwrap();

        // Assert
        assert!(matches!(clamped, Err(ModelError::ReconstructionDrift { row: 0, .. })));
        assert_abs_diff_eq!(raw[[0, 0]], 0.5_f64.exp(), epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Request validation: buffer length, non-finite distance and degenerate
    // normalization.
    fn request_validation_errors() {
        let fx = reference_fixture();
        let opts = ModelOptions::default();

        let mut short = vec![0.0; 24];
        assert_eq!(
            transition_probabilities(&fx.eigen, fx.normalization, 0.1, &opts, &mut short),
            Err(ModelError::OutputBufferMismatch { expected: 25, actual: 24 })
        );
        assert!(short.iter().all(|&x| x == 0.0));

        assert!(matches!(branch_distance(f64::INFINITY, 0.0, 1.0), Err(ModelError::NonFiniteDistance { .. })));
        assert!(matches!(
            transition_matrix(&fx.eigen, 0.0, 0.1, &opts),
            Err(ModelError::DegenerateNormalization { .. })
        ));
        assert!(matches!(
            rate_normalization(array![0.5, 0.5].view(), array![0.0, 0.0].view()),
            Err(ModelError::DegenerateNormalization { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A positive but vanishing normalization is rejected by both entry points
    // instead of blowing up the scaled distance.
    fn tiny_normalization_is_degenerate_everywhere() {
        let fx = reference_fixture();
        let opts = ModelOptions::default();

        assert_eq!(
            transition_matrix(&fx.eigen, 1e-15, 0.1, &opts),
            Err(ModelError::DegenerateNormalization { value: 1e-15 })
        );
        assert_eq!(
            rate_normalization(array![1.0, 0.0].view(), array![1e-15, 3.0].view()),
            Err(ModelError::DegenerateNormalization { value: 1e-15 })
        );
        assert!(transition_matrix(&fx.eigen, fx.normalization, 0.1, &opts).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The flattened buffer is the row-major image of the matrix.
    fn flattened_output_is_row_major() {
        let fx = reference_fixture();
        let opts = ModelOptions::default();
        let p = transition_matrix(&fx.eigen, fx.normalization, 0.3, &opts).unwrap();
        let mut out = vec![0.0; 25];
        transition_probabilities(&fx.eigen, fx.normalization, 0.3, &opts, &mut out).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(out[i * 5 + j], p[[i, j]]);
            }
        }
        assert_eq!(branch_distance(2.0, 0.5, 0.2), Ok((2.0 - 0.5) * 0.2));
    }
}
