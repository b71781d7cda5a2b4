//! Frequencies — the externally supplied state-frequency placeholder.
//!
//! Purpose
//! -------
//! Hold the frequency vector a host framework attaches to the substitution
//! model and reconcile its dimension with the discovered state space.
//!
//! Key behaviors
//! -------------
//! - A vector whose length differs from `nr_of_states` is replaced by the
//!   uniform distribution of the right length, with a `tracing` warning.
//! - If the corrected vector still disagrees with the state count the
//!   configuration is rejected with
//!   [`ModelError::FrequencyDimensionMismatch`].
//! - Entries must be finite and non-negative.
//!
//! Conventions
//! -----------
//! - The CTMC computes its own stationary distribution; these frequencies
//!   are carried for the host and are never used to normalize time.
use crate::mutation::errors::{ModelError, ModelResult};
use ndarray::{Array1, ArrayView1};
use tracing::warn;

/// Frequencies — validated state frequencies of length `nr_of_states`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frequencies {
    values: Array1<f64>,
}

impl Frequencies {
    /// Uniform frequencies `1 / n` of length `n`.
    pub fn uniform(n: usize) -> Self {
        Frequencies { values: Array1::from_elem(n, 1.0 / n as f64) }
    }

    /// Reconcile a supplied frequency vector with the state count.
    ///
    /// Parameters
    /// ----------
    /// - `supplied`: `ArrayView1<f64>`
    ///   Frequencies as handed over by the host.
    /// - `nr_of_states`: `usize`
    ///   State count of the model.
    ///
    /// Returns
    /// -------
    /// ModelResult<Frequencies>
    ///   - `Ok` with the supplied values when the length matches.
    ///   - `Ok` with uniform values when the length did not match.
    ///
    /// Errors
    /// ------
    /// - `ModelError::InvalidFrequency` if an entry of a correctly sized
    ///   vector is negative or non-finite.
    /// - `ModelError::FrequencyDimensionMismatch` if the corrected vector is
    ///   still of the wrong size.
    pub fn reconcile(supplied: ArrayView1<'_, f64>, nr_of_states: usize) -> ModelResult<Self> {
        let candidate = if supplied.len() == nr_of_states {
            for (index, &value) in supplied.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(ModelError::InvalidFrequency { index, value });
                }
            }
            Frequencies { values: supplied.to_owned() }
        } else {
            warn!(
                expected = nr_of_states,
                actual = supplied.len(),
                "Frequencies has wrong size; replacing with a uniform distribution of the correct dimension"
            );
            Frequencies::uniform(nr_of_states)
        };

        if candidate.len() != nr_of_states {
            return Err(ModelError::FrequencyDimensionMismatch {
                expected: nr_of_states,
                actual: candidate.len(),
            });
        }
        Ok(candidate)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.values
    }
}
