//! linalg::eigen — spectral decomposition of real (asymmetric) matrices.
//!
//! Purpose
//! -------
//! Provide the eigen system consumed by the CTMC layer: given a square real
//! matrix `Q`, return eigenvalues, right eigenvectors `V` and the inverse
//! eigenvector matrix `V⁻¹` with `Q = V·Λ·V⁻¹`.
//!
//! Key behaviors
//! -------------
//! - Define the [`EigenSystem`] trait so callers can plug in any general
//!   real-matrix eigensolver.
//! - Ship [`DefaultEigenSystem`], built on the complex Schur decomposition
//!   of `nalgebra` followed by back-substitution on the triangular factor.
//! - Return a *real* [`EigenDecomposition`]. Real eigenvalues occupy one
//!   slot each; a complex conjugate pair `a ± ib` occupies two consecutive
//!   slots holding `a`, with `eigenvalues_imag = (b, −b)` and eigenvector
//!   columns `(Re v, Im v)`. In that basis `Λ` is block diagonal with
//!   blocks `[[a, b], [−b, a]]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - No ordering of eigenvalues is guaranteed; consumers locate the
//!   eigenvalue they need themselves.
//! - `eigenvectors · inverse_eigenvectors ≈ I` after a successful call.
//! - Defective matrices (non-invertible `V`) are reported as
//!   [`EigenError::SingularEigenvectors`] rather than returning garbage.
//!
//! Conventions
//! -----------
//! - Input and output matrices are row-major `ndarray` containers; the
//!   `nalgebra` types stay internal to this module and [`bridge`].
//! - Eigenvector columns are scaled so their largest-modulus component is 1.
//!
//! Testing notes
//! -------------
//! - Unit tests reconstruct `Q` from its factors for diagonal, symmetric,
//!   asymmetric real-spectrum and rotational (complex-spectrum) inputs, and
//!   check the validation error paths.
//!
//! [`bridge`]: crate::linalg::bridge
use crate::{
    linalg::{
        bridge::{dmatrix_to_array2, fill_complex_dmatrix, validate_square_finite},
        errors::{EigenError, EigenResult},
    },
    numerical_stability::tolerances::{
        IMAG_TOL, MAX_EIGENVECTOR_CONDITION, MAX_SCHUR_ITER, SCHUR_EPS,
    },
};
use nalgebra::{Complex, DMatrix, linalg::Schur};
use ndarray::{Array1, Array2, ArrayView2};

/// Spectral factors of a square real matrix in real block form.
///
/// Fields
/// ------
/// - `eigenvalues`: real parts `Re λ_k`, length `n`.
/// - `eigenvalues_imag`: imaginary parts; zero for real eigenvalues, `(b, −b)`
///   on the two slots of a conjugate pair.
/// - `eigenvectors`: `n×n` matrix `V`, eigenvectors as columns.
/// - `inverse_eigenvectors`: `n×n` matrix `V⁻¹`; row `k` is the left
///   eigenvector paired with column `k` of `V`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition {
    pub eigenvalues: Array1<f64>,
    pub eigenvalues_imag: Array1<f64>,
    pub eigenvectors: Array2<f64>,
    pub inverse_eigenvectors: Array2<f64>,
}

impl EigenDecomposition {
    /// Dimension `n` of the decomposed matrix.
    pub fn dim(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Whether any conjugate pair is present.
    pub fn has_complex_pairs(&self) -> bool {
        self.eigenvalues_imag.iter().any(|&b| b != 0.0)
    }

    /// Modulus `|λ_k|` of eigenvalue slot `k`.
    pub fn modulus(&self, k: usize) -> f64 {
        self.eigenvalues[k].hypot(self.eigenvalues_imag[k])
    }

    /// Rebuild the block-diagonal eigenvalue matrix `Λ`.
    pub fn eigenvalue_matrix(&self) -> Array2<f64> {
        let n = self.dim();
        let mut lambda = Array2::<f64>::zeros((n, n));
        let mut k = 0;
        while k < n {
            let a = self.eigenvalues[k];
            let b = self.eigenvalues_imag[k];
            if b != 0.0 && k + 1 < n {
                lambda[[k, k]] = a;
                lambda[[k, k + 1]] = b;
                lambda[[k + 1, k]] = -b;
                lambda[[k + 1, k + 1]] = a;
                k += 2;
            } else {
                lambda[[k, k]] = a;
                k += 1;
            }
        }
        lambda
    }

    /// Recompose `V·Λ·V⁻¹`.
    pub fn reconstruct(&self) -> Array2<f64> {
        self.eigenvectors.dot(&self.eigenvalue_matrix()).dot(&self.inverse_eigenvectors)
    }
}

/// EigenSystem — black-box eigensolver seam.
///
/// Implementations must return factors satisfying `Q = V·Λ·V⁻¹` in the block
/// form documented on [`EigenDecomposition`]. They are shared across worker
/// threads, hence the `Send + Sync` bound.
pub trait EigenSystem: Send + Sync + std::fmt::Debug {
    /// Decompose a square real matrix.
    fn decompose(&self, matrix: ArrayView2<'_, f64>) -> EigenResult<EigenDecomposition>;
}

/// Convergence controls for [`DefaultEigenSystem`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenOptions {
    /// Off-diagonal threshold for Schur deflation.
    pub schur_eps: f64,
    /// Maximum number of Schur iterations.
    pub max_iter: usize,
    /// Relative size below which imaginary parts are treated as round-off.
    pub imag_tol: f64,
}

impl Default for EigenOptions {
    fn default() -> Self {
        EigenOptions { schur_eps: SCHUR_EPS, max_iter: MAX_SCHUR_ITER, imag_tol: IMAG_TOL }
    }
}

/// DefaultEigenSystem — complex Schur + triangular back-substitution.
///
/// Algorithm
/// ---------
/// 1. Copy `Q` into a complex `DMatrix` and compute `Q = U·T·Uᴴ` with `T`
///    upper triangular.
/// 2. Solve `(T − λ_k I) y_k = 0` by back-substitution for each diagonal
///    entry `λ_k = T_kk`, perturbing near-zero pivots to `max(ε‖T‖, √MIN_POSITIVE)`.
/// 3. Map to eigenvectors of `Q` via `v_k = U·y_k` and scale each so its
///    largest-modulus component equals 1.
/// 4. Fold every conjugate pair into a real 2-column block and invert the
///    resulting real `V`; an inverse whose condition estimate
///    `‖V‖∞·‖V⁻¹‖∞` exceeds [`MAX_EIGENVECTOR_CONDITION`] marks a defective
///    matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DefaultEigenSystem {
    pub options: EigenOptions,
}

impl DefaultEigenSystem {
    pub fn new(options: EigenOptions) -> Self {
        DefaultEigenSystem { options }
    }
}

impl EigenSystem for DefaultEigenSystem {
    fn decompose(&self, matrix: ArrayView2<'_, f64>) -> EigenResult<EigenDecomposition> {
        let n = validate_square_finite(matrix)?;
        let mut complex = DMatrix::<Complex<f64>>::zeros(n, n);
        fill_complex_dmatrix(matrix, &mut complex);

        let schur = Schur::try_new(complex, self.options.schur_eps, self.options.max_iter)
            .ok_or(EigenError::NoConvergence { max_iter: self.options.max_iter })?;
        let (u, t) = schur.unpack();

        let lambdas: Vec<Complex<f64>> = (0..n).map(|k| t[(k, k)]).collect();
        let mut vectors = &u * &triangular_eigenvectors(&t);
        normalize_columns(&mut vectors);

        let (eigenvalues, eigenvalues_imag, real_vectors) =
            fold_conjugate_pairs(&lambdas, &vectors, self.options.imag_tol);

        let inverse = real_vectors.clone().try_inverse().ok_or(EigenError::SingularEigenvectors)?;
        if inverse.iter().any(|x| !x.is_finite())
            || norm_inf(&real_vectors) * norm_inf(&inverse) > MAX_EIGENVECTOR_CONDITION
        {
            return Err(EigenError::SingularEigenvectors);
        }

        Ok(EigenDecomposition {
            eigenvalues: Array1::from(eigenvalues),
            eigenvalues_imag: Array1::from(eigenvalues_imag),
            eigenvectors: dmatrix_to_array2(&real_vectors),
            inverse_eigenvectors: dmatrix_to_array2(&inverse),
        })
    }
}

// ---- Helper methods ----

/// Maximum absolute row sum.
fn norm_inf(m: &DMatrix<f64>) -> f64 {
    m.row_iter().map(|row| row.iter().map(|x| x.abs()).sum::<f64>()).fold(0.0, f64::max)
}

/// Right eigenvectors of an upper-triangular complex matrix, as columns.
fn triangular_eigenvectors(t: &DMatrix<Complex<f64>>) -> DMatrix<Complex<f64>> {
    let n = t.nrows();
    let zero = Complex::new(0.0, 0.0);
    let mut y = DMatrix::from_element(n, n, zero);
    let scale = t.iter().map(|z| z.norm()).fold(0.0_f64, f64::max);
    // Complex division squares the pivot; keep |pivot|² representable.
    let smin = (scale * f64::EPSILON).max(f64::MIN_POSITIVE.sqrt());

    for k in 0..n {
        let lambda = t[(k, k)];
        y[(k, k)] = Complex::new(1.0, 0.0);
        for i in (0..k).rev() {
            let mut acc = zero;
            for m in (i + 1)..=k {
                acc += t[(i, m)] * y[(m, k)];
            }
            let mut pivot = t[(i, i)] - lambda;
            if pivot.norm() < smin {
                pivot = Complex::new(smin, 0.0);
            }
            y[(i, k)] = -acc / pivot;
        }
    }
    y
}

/// Scale each column so its largest-modulus entry becomes exactly 1.
fn normalize_columns(vectors: &mut DMatrix<Complex<f64>>) {
    for mut column in vectors.column_iter_mut() {
        let pivot = column
            .iter()
            .copied()
            .max_by(|a, b| a.norm().total_cmp(&b.norm()))
            .unwrap_or(Complex::new(1.0, 0.0));
        if pivot.norm() > 0.0 {
            for z in column.iter_mut() {
                *z /= pivot;
            }
        }
    }
}

/// Convert complex eigenpairs into the real block representation.
fn fold_conjugate_pairs(
    lambdas: &[Complex<f64>], vectors: &DMatrix<Complex<f64>>, imag_tol: f64,
) -> (Vec<f64>, Vec<f64>, DMatrix<f64>) {
    let n = lambdas.len();
    let mut used = vec![false; n];
    let mut re = Vec::with_capacity(n);
    let mut im = Vec::with_capacity(n);
    let mut real_vectors = DMatrix::<f64>::zeros(n, n);
    let mut slot = 0;

    for k in 0..n {
        if used[k] {
            continue;
        }
        used[k] = true;
        let lambda = lambdas[k];
        let is_real = lambda.im.abs() <= imag_tol * lambda.norm().max(1.0);

        let partner = if is_real {
            None
        } else {
            let target = lambda.conj();
            (0..n)
                .filter(|&l| !used[l])
                .min_by(|&a, &b| (lambdas[a] - target).norm().total_cmp(&(lambdas[b] - target).norm()))
        };

        match partner {
            Some(l) => {
                used[l] = true;
                // v is an eigenvector for λ; conj(v) for conj(λ). Keep the
                // member with positive imaginary part.
                let flip = lambda.im < 0.0;
                let a = lambda.re;
                let b = lambda.im.abs();
                for i in 0..n {
                    let z = if flip { vectors[(i, k)].conj() } else { vectors[(i, k)] };
                    real_vectors[(i, slot)] = z.re;
                    real_vectors[(i, slot + 1)] = z.im;
                }
                re.extend_from_slice(&[a, a]);
                im.extend_from_slice(&[b, -b]);
                slot += 2;
            }
            None => {
                for i in 0..n {
                    real_vectors[(i, slot)] = vectors[(i, k)].re;
                }
                re.push(lambda.re);
                im.push(0.0);
                slot += 1;
            }
        }
    }
    (re, im, real_vectors)
}
