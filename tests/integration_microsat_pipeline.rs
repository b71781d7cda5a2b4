//! Integration tests for the microsatellite mutation pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path a likelihood host takes: discover the
//!   state space from observed repeat lengths, build a model, query
//!   transition probabilities, and drive the propose / evaluate /
//!   accept-or-reject loop with `store` and `restore`.
//! - Exercise realistic parameter regimes rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `mutation::core`:
//!   - `ObservedRepeats` as a late-binding state-space provider.
//!   - Frequency reconciliation through the model constructor.
//! - `mutation::models::MicrosatModel`:
//!   - Generator, stationary distribution, and transition matrices.
//!   - Flattened-buffer and batched branch evaluation.
//!   - Checkpoint / rollback across a rejected proposal.
//!
//! Exclusions
//! ----------
//! - Eigen solver internals and clamping helpers; those are covered by unit
//!   tests next to the code.
//! - Python bindings, which are exercised from the Python package.
use approx::assert_abs_diff_eq;
use microsat_ctmc::mutation::{
    Branch, MicrosatModel, ModelError, ModelOptions, MutationParams, ObservedRepeats, ParamId,
    ReconstructionPolicy, StateSpace,
};
use ndarray::{Array1, Array2};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; later calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Purpose
/// -------
/// Build the five-state reference model (`minRepeat = 8`, `rb = 0.5`,
/// `ieq = 10`, `g = 0.7`, `oneOnA1 = 1`, `startLinRegime = 10`) from a set
/// of observed repeat lengths spanning `8..=12`.
///
/// Invariants
/// ----------
/// - Panics on construction failure; that is a test configuration error.
fn reference_model() -> MicrosatModel {
    let provider = ObservedRepeats::new(vec![9, 12, 8, 10, 10, 11]);
    let params = MutationParams::new(0.5, 10.0, 0.7, 1.0, 10)
        .expect("reference parameters are inside their domains");
    let freqs = Array1::from_elem(5, 0.2);
    MicrosatModel::new(params, &provider, freqs.view(), ModelOptions::default())
        .expect("reference model should build")
}

fn assert_stochastic(p: &Array2<f64>, tol: f64) {
    for row in p.rows() {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = tol);
        for &value in row.iter() {
            assert!((0.0..=1.0).contains(&value), "entry {value} outside [0, 1]");
        }
    }
}

#[test]
// Purpose
// -------
// Verify that the provider-discovered state space and the reference
// generator have the expected shape, sign pattern, and directional bias
// around the shifted equilibrium index 2.
fn reference_generator_is_biased_towards_equilibrium() {
    init_tracing();
    let model = reference_model();

    assert_eq!(model.state_space(), StateSpace::new(5, 8).unwrap());
    let q = model.rate_matrix().unwrap();
    assert_eq!(q.dim(), (5, 5));

    for i in 0..5 {
        assert_abs_diff_eq!(q.row(i).sum(), 0.0, epsilon = 1e-10);
        for j in 0..5 {
            if i != j {
                assert!(q[[i, j]] >= 0.0);
            }
        }
    }

    // Below equilibrium the chain prefers to expand, above it to contract.
    let up = |i: usize| ((i + 1)..5).map(|j| q[[i, j]]).sum::<f64>();
    let down = |i: usize| (0..i).map(|j| q[[i, j]]).sum::<f64>();
    assert!(up(1) > down(1), "state 1 should be biased upward");
    assert_abs_diff_eq!(up(2), down(2), epsilon = 1e-12);
    assert!(down(3) > up(3), "state 3 should be biased downward");
    assert!(q[[0, 1]] > 0.0);
}

#[test]
// Purpose
// -------
// Check the stationary distribution and the transition matrix properties a
// likelihood engine relies on: `π·Q ≈ 0`, `P(0) = I`, and stochastic rows
// for a range of branch lengths.
fn stationary_and_transition_properties() {
    init_tracing();
    let model = reference_model();
    let pi = model.stationary_distribution().unwrap();
    let q = model.rate_matrix().unwrap();

    assert_abs_diff_eq!(pi.sum(), 1.0, epsilon = 1e-9);
    for &residual in pi.dot(&q).iter() {
        assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-9);
    }

    let identity = model.transition_matrix(3.0, 3.0, 1.0).unwrap();
    for i in 0..5 {
        for j in 0..5 {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(identity[[i, j]], expected, epsilon = 1e-9);
        }
    }

    for &distance in &[0.01, 0.3, 1.0, 7.5, 60.0] {
        let p = model.transition_matrix(distance, 0.0, 1.0).unwrap();
        assert_stochastic(&p, 1e-8);
    }

    // A long branch converges to the stationary distribution in every row.
    let far = model.transition_matrix(500.0, 0.0, 1.0).unwrap();
    for row in far.rows() {
        for (a, b) in row.iter().zip(pi.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }
}

#[test]
// Purpose
// -------
// Confirm that the flattened buffer output, the owned-matrix output, and the
// batched branch evaluation agree and that branches are scaled by their rate.
fn buffer_matrix_and_batch_outputs_agree() {
    init_tracing();
    let model = reference_model();

    let mut buffer = vec![0.0; 25];
    model.transition_probabilities(2.0, 0.5, 0.8, &mut buffer).unwrap();
    let matrix = model.transition_matrix(2.0, 0.5, 0.8).unwrap();
    for (flat, owned) in buffer.iter().zip(matrix.iter()) {
        assert_eq!(flat.to_bits(), owned.to_bits());
    }

    // (2.0 − 0.5)·0.8 = 1.2 = (1.2 − 0.0)·1.0
    let branches = vec![
        Branch::new(2.0, 0.5, 0.8),
        Branch::new(1.2, 0.0, 1.0),
        Branch::new(4.0, 1.0, 0.25),
    ];
    let batch = model.branch_transition_matrices(&branches).unwrap();
    assert_eq!(batch.len(), 3);
    for (a, b) in batch[0].iter().zip(batch[1].iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
    for (a, b) in batch[0].iter().zip(matrix.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_stochastic(&batch[2], 1e-8);

    let mut short = vec![0.0; 24];
    assert!(matches!(
        model.transition_probabilities(1.0, 0.0, 1.0, &mut short),
        Err(ModelError::OutputBufferMismatch { .. })
    ));
    assert!(matches!(
        model.transition_matrix(f64::INFINITY, 0.0, 1.0),
        Err(ModelError::NonFiniteDistance { .. })
    ));
}

#[test]
// Purpose
// -------
// Drive an MCMC-style loop: store, propose, evaluate, then either reject
// (restore) or accept. A rejected proposal must bring back bit-identical
// probabilities without touching the eigen solver's result again.
fn propose_reject_accept_cycle() {
    init_tracing();
    let mut model = reference_model();
    let before = model.transition_matrix(1.0, 0.0, 1.0).unwrap();
    let eigen_before = model.eigen_decomposition().unwrap();

    // Rejected proposal.
    model.store();
    model.set_param(ParamId::G, 0.35).unwrap();
    assert!(model.is_dirty());
    let proposed = model.transition_matrix(1.0, 0.0, 1.0).unwrap();
    assert!(proposed.iter().zip(before.iter()).any(|(a, b)| (a - b).abs() > 1e-6));
    model.restore();

    assert!(!model.is_dirty());
    assert_eq!(model.params().g(), 0.7);
    let eigen_after = model.eigen_decomposition().unwrap();
    assert!(std::sync::Arc::ptr_eq(&eigen_before, &eigen_after));
    let reverted = model.transition_matrix(1.0, 0.0, 1.0).unwrap();
    for (a, b) in reverted.iter().zip(before.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }

    // A host-triggered rebuild after the reject reproduces the same matrix.
    assert!(model.requires_recalculation());
    let rebuilt = model.transition_matrix(1.0, 0.0, 1.0).unwrap();
    for (a, b) in rebuilt.iter().zip(before.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }

    // Accepted proposal: no restore, new values stay in effect.
    model.store();
    model.set_params(&[(ParamId::Rb, 1.5), (ParamId::StartLinRegime, 9.0)]).unwrap();
    let accepted = model.transition_matrix(1.0, 0.0, 1.0).unwrap();
    assert_stochastic(&accepted, 1e-8);
    assert_eq!(model.params().rb(), 1.5);
    assert_eq!(model.params().start_lin_regime(), 9);
    assert!(!model.is_dirty());
}

#[test]
// Purpose
// -------
// Check that an invalid proposal leaves the model untouched and that the
// absolute-value reconstruction policy still yields stochastic matrices.
fn invalid_proposal_and_absolute_policy() {
    init_tracing();
    let mut model = reference_model();
    let before = model.transition_matrix(0.7, 0.0, 1.0).unwrap();

    assert!(model.set_params(&[(ParamId::Rb, 2.0), (ParamId::G, 1.5)]).is_err());
    assert_eq!(model.params().rb(), 0.5);
    let after = model.transition_matrix(0.7, 0.0, 1.0).unwrap();
    for (a, b) in after.iter().zip(before.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }

    let options = ModelOptions {
        reconstruction: ReconstructionPolicy::Absolute,
        ..ModelOptions::default()
    };
    let params = MutationParams::new(0.5, 10.0, 0.7, 1.0, 10).unwrap();
    let space = StateSpace::new(5, 8).unwrap();
    let freqs = Array1::from_elem(5, 0.2);
    let absolute = MicrosatModel::new(params, &space, freqs.view(), options).unwrap();
    let p = absolute.transition_matrix(0.7, 0.0, 1.0).unwrap();
    assert_stochastic(&p, 1e-8);
    for (a, b) in p.iter().zip(before.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
// Purpose
// -------
// A frequency vector of the wrong length is replaced by a uniform one and
// the model still builds; a wider state space also handles `g = 1`.
fn mismatched_frequencies_and_uniform_step_limit() {
    init_tracing();
    let provider = ObservedRepeats::new(vec![5, 14]);
    let params = MutationParams::new(0.8, 9.0, 1.0, 0.5, 7).unwrap();
    let freqs = Array1::from_elem(3, 1.0 / 3.0);
    let model = MicrosatModel::new(params, &provider, freqs.view(), ModelOptions::default())
        .expect("mismatched frequencies are corrected to uniform");

    assert_eq!(model.nr_of_states(), 10);
    assert_eq!(model.frequencies().len(), 10);
    for &f in model.frequencies().as_array().iter() {
        assert_abs_diff_eq!(f, 0.1, epsilon = 1e-15);
    }

    let q = model.rate_matrix().unwrap();
    assert!(q.iter().all(|v| v.is_finite()));
    let p = model.transition_matrix(2.5, 0.0, 1.0).unwrap();
    assert_stochastic(&p, 1e-8);
}
