//! Stationary distribution extractor.
//!
//! The stationary distribution `π` of a generator is the left eigenvector of
//! the eigenvalue `0`. In a decomposition `Q = V·Λ·V⁻¹` the left eigenvectors
//! are the rows of `V⁻¹`, so `π` is the row paired with the eigenvalue of
//! smallest modulus, rescaled to sum to one.
//!
//! The extractor is permissive: when `|λ_min|` exceeds the tolerance it logs
//! a warning and still returns the normalized row.
use crate::linalg::eigen::EigenDecomposition;
use ndarray::Array1;
use tracing::warn;

/// Index of the eigenvalue of smallest modulus.
///
/// Ties go to the first (lowest) index. Returns 0 for an empty decomposition.
pub fn stationary_index(eigen: &EigenDecomposition) -> usize {
    let mut index = 0;
    let mut smallest = f64::INFINITY;
    for k in 0..eigen.dim() {
        let m = eigen.modulus(k);
        if m < smallest {
            smallest = m;
            index = k;
        }
    }
    index
}

/// Extract the stationary distribution from a decomposition.
///
/// # Parameters
/// - `eigen`: decomposition of a generator matrix.
/// - `eigen_tol`: `|λ_min|` above which a warning is logged.
///
/// # Returns
/// Row `k = stationary_index(eigen)` of `V⁻¹` divided by its sum. The result
/// sums to one up to round-off whenever the row sum is non-zero; a zero row
/// sum yields non-finite entries, which downstream normalization rejects.
pub fn find_stationary_distribution(eigen: &EigenDecomposition, eigen_tol: f64) -> Array1<f64> {
    let k = stationary_index(eigen);
    let modulus = eigen.modulus(k);
    if modulus > eigen_tol {
        warn!(
            index = k,
            eigenvalue = eigen.eigenvalues[k],
            modulus,
            tolerance = eigen_tol,
            "Smallest eigenvalue of the generator deviates from zero; stationary distribution may be unreliable"
        );
    }

    let row = eigen.inverse_eigenvectors.row(k);
    let sum = row.sum();
    row.mapv(|x| x / sum)
}
