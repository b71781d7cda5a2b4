//! Rate matrix builder — generator `Q` of the microsatellite mutation chain.
//!
//! Purpose
//! -------
//! Build the instantaneous rate (generator) matrix of the Sainudiin/Wu
//! repeat-length mutation model from validated parameters and a state space,
//! together with the per-row auxiliary sums needed for time normalization.
//!
//! Key behaviors
//! -------------
//! - Shift `ieq` and `start_lin_regime` by `min_repeat` into the zero-based
//!   index space.
//! - Drift bias: `b0 = rb·|ieq'| / √(ieq'² + 1)`, `b1 = −rb / √(ieq'² + 1)`,
//!   and `oneOnBeta(i) = 1 + exp(−(b0 + b1·i))`. The share of the total rate
//!   going up from state `i` is `1 / oneOnBeta(i)`.
//! - Length dependence: `alpha(i) = oneOnA1` for `i ≤ start'`, otherwise
//!   `oneOnA1 + (i − start')`.
//! - Step sizes follow a geometric law truncated to the states available in
//!   the step direction, see [`geometric_step_weight`].
//! - `Q[i][i] = −Σ_{j≠i} Q[i][j]`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters arrive already validated (`rb ≥ 0`, `g ∈ [0, 1]`,
//!   `oneOnA1 ≥ 0`) and `nr_of_states ≥ 2`; the builder itself cannot fail.
//! - Off-diagonal entries are non-negative and every row sums to zero up to
//!   round-off.
//! - The truncation length `L` is always `≥ 1`: an upward step from `i`
//!   exists only if `i < N − 1` (so `L = N − 1 − i ≥ 1`), a downward step
//!   only if `i ≥ 1` (so `L = i ≥ 1`).
//!
//! Conventions
//! -----------
//! - `row_sum[i] = Σ_{j≠i} Q[i][j]` and `row_sum2[i] = Σ_{j≠i} Q[i][j]·|i − j|`.
//! - At `g = 1` the geometric weight is the indeterminate form `0·(1/0)`; it
//!   is resolved to its limit `1 / L` (uniform step sizes).
//!
//! Testing notes
//! -------------
//! - Unit tests check the generator invariants on several parameter sets,
//!   the `g = 1` and `g = 0` limits, the direction of the drift bias around
//!   `ieq'`, and the linear regime beyond `start'`.
use crate::mutation::core::{params::MutationParams, state_space::StateSpace};
use ndarray::{Array1, Array2};

/// RateMatrix — generator `Q` plus its row auxiliaries.
///
/// Fields
/// ------
/// - `q`: `Array2<f64>`, shape `(N, N)`.
/// - `row_sum`: `Array1<f64>`, total exit rate of each state.
/// - `row_sum2`: `Array1<f64>`, exit rate weighted by step size.
#[derive(Debug, Clone, PartialEq)]
pub struct RateMatrix {
    pub q: Array2<f64>,
    pub row_sum: Array1<f64>,
    pub row_sum2: Array1<f64>,
}

impl RateMatrix {
    /// Number of states `N`.
    pub fn dim(&self) -> usize {
        self.row_sum.len()
    }

    /// Largest `|Σ_j Q[i][j]|` over all rows.
    pub fn max_abs_row_sum(&self) -> f64 {
        self.q.rows().into_iter().map(|row| row.sum().abs()).fold(0.0, f64::max)
    }

    /// Smallest off-diagonal entry, `+∞` if `N < 2`.
    pub fn min_off_diagonal(&self) -> f64 {
        self.q
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, &v)| v)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Truncated geometric weight of a step of size `d` when `l` states are
/// available in the step direction.
///
/// `gamma = (1 − g)·g^(d−1) / (1 − g^l)`; the weights over `d = 1..=l` sum to
/// 1. When the expression is NaN (the `g = 1` limit) the uniform weight
/// `1 / l` is returned.
///
/// Parameters
/// ----------
/// - `g`: `f64` in `[0, 1]`.
/// - `d`: `usize`, step size `≥ 1`.
/// - `l`: `usize`, truncation length `≥ 1`.
pub fn geometric_step_weight(g: f64, d: usize, l: usize) -> f64 {
    let gamma = (1.0 - g) * (int_pow(g, d - 1) / (1.0 - int_pow(g, l)));
    if gamma.is_nan() { 1.0 / l as f64 } else { gamma }
}

/// Build the generator matrix for `params` on `space`.
///
/// Returns
/// -------
/// RateMatrix
///   `Q` with rows summing to zero, `row_sum` and `row_sum2`.
///
/// Notes
/// -----
/// - Cost is `O(N²)`; every entry is written exactly once.
pub fn build_rate_matrix(params: &MutationParams, space: &StateSpace) -> RateMatrix {
    let n = space.nr_of_states();
    let min_repeat = space.min_repeat();

    let rb = params.rb();
    let g = params.g();
    let one_on_a1 = params.one_on_a1();
    let ieq = params.ieq() - min_repeat as f64;
    let start = params.start_lin_regime().saturating_sub(min_repeat);

    let norm = (ieq * ieq + 1.0).sqrt();
    let b0 = rb * ieq.abs() / norm;
    let b1 = -rb / norm;

    let mut q = Array2::<f64>::zeros((n, n));
    let mut row_sum = Array1::<f64>::zeros(n);
    let mut row_sum2 = Array1::<f64>::zeros(n);

    for i in 0..n {
        let alpha = length_scale(one_on_a1, i, start);
        let one_on_beta = 1.0 + (-(b0 + b1 * i as f64)).exp();
        let up_rate = alpha / one_on_beta;
        let down_rate = alpha - up_rate;

        let mut total = 0.0;
        let mut weighted = 0.0;
        for j in 0..n {
            if j == i {
                continue;
            }
            let (d, rate) = if j > i {
                (j - i, up_rate * geometric_step_weight(g, j - i, n - 1 - i))
            } else {
                (i - j, down_rate * geometric_step_weight(g, i - j, i))
            };
            q[[i, j]] = rate;
            total += rate;
            weighted += rate * d as f64;
        }
        q[[i, i]] = -total;
        row_sum[i] = total;
        row_sum2[i] = weighted;
    }

    RateMatrix { q, row_sum, row_sum2 }
}

// ---- Helper methods ----

/// `alpha(i)`: flat up to `start`, then growing by one per repeat unit.
///
/// `i < N`, and an `N×N` matrix could not be allocated if `N` overflowed `i64`.
fn length_scale(one_on_a1: f64, i: usize, start: i64) -> f64 {
    let idx = i as i64;
    if idx > start { one_on_a1 + idx.saturating_sub(start) as f64 } else { one_on_a1 }
}

/// `base^exp`; exponents are step sizes `< N`, well within `i32`.
fn int_pow(base: f64, exp: usize) -> f64 {
    base.powi(exp as i32)
}
