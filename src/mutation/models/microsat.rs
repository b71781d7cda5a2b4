//! Microsatellite substitution model: lazy spectral cache and sampler protocol.
//!
//! This module wires the Sainudiin/Wu repeat-length mutation model into the
//! interface a phylogenetic likelihood evaluator expects. [`MicrosatModel`]
//! owns validated parameters, explicit dimensions and a
//! [`DecompositionCache`]; every output is derived lazily from the cached
//! [`Spectrum`].
//!
//! Key ideas:
//! - Any parameter change marks the cache dirty unconditionally; the next
//!   request rebuilds `Q`, its decomposition and `π` in one step.
//! - Requests take `&self` and may run concurrently (one per branch); the
//!   cache guarantees a single rebuild per invalidation.
//! - `store` / `restore` bracket a proposal. A rejected proposal is undone by
//!   swapping the stored parameters and spectrum back, without any
//!   recomputation.
//! - The stored snapshot covers the parameter values and the whole spectrum
//!   (including `rowSum2` and `π`), so after a restore the parameters, the
//!   decomposition and the normalization always belong together.
use crate::{
    linalg::eigen::{DefaultEigenSystem, EigenDecomposition, EigenSystem},
    mutation::{
        core::{
            cache::{DecompositionCache, Spectrum},
            frequencies::Frequencies,
            options::ModelOptions,
            params::{MutationParams, ParamId},
            state_space::{StateSpace, StateSpaceProvider},
            transition::{Branch, branch_distance, transition_matrix, transition_probabilities},
        },
        errors::ModelResult,
    },
};
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::sync::Arc;

/// Microsatellite CTMC model with a lazily rebuilt spectral decomposition.
///
/// Encapsulates the mutation parameters (`params`), the repeat-length state
/// space (`space`), the host-supplied frequencies (`frequencies`), numerical
/// options (`options`), the eigen system used on rebuild, and the cache.
///
/// # Notes
/// - Dimensions are fixed at construction. A different state space needs a
///   new model.
/// - The type is `Send + Sync`; share it by reference across evaluation
///   threads and mutate it only between evaluation rounds.
#[derive(Debug)]
pub struct MicrosatModel {
    params: MutationParams,
    space: StateSpace,
    frequencies: Frequencies,
    options: ModelOptions,
    eigen_system: Arc<dyn EigenSystem>,
    cache: DecompositionCache,
    stored_params: Option<MutationParams>,
}

impl MicrosatModel {
    /// Construct a model using [`DefaultEigenSystem`] configured from
    /// `options.eigen`.
    ///
    /// # Arguments
    /// - `params`: validated mutation parameters.
    /// - `provider`: source of `nr_of_states` and `min_repeat`.
    /// - `frequencies`: host frequency vector; resized to uniform (with a
    ///   warning) if its length is wrong.
    /// - `options`: numerical options, validated here.
    ///
    /// # Errors
    /// - Any error of the provider (e.g. `ModelError::InvalidStateCount`).
    /// - `ModelError::InvalidOption` for invalid tolerances.
    /// - `ModelError::InvalidFrequency` / `ModelError::FrequencyDimensionMismatch`
    ///   from frequency reconciliation.
    pub fn new(
        params: MutationParams, provider: &dyn StateSpaceProvider, frequencies: ArrayView1<'_, f64>,
        options: ModelOptions,
    ) -> ModelResult<Self> {
        let eigen_system = Arc::new(DefaultEigenSystem::new(options.eigen));
        Self::with_eigen_system(params, provider, frequencies, options, eigen_system)
    }

    /// Construct a model with a caller-supplied eigen system.
    ///
    /// # Errors
    /// Same as [`MicrosatModel::new`].
    pub fn with_eigen_system(
        params: MutationParams, provider: &dyn StateSpaceProvider, frequencies: ArrayView1<'_, f64>,
        options: ModelOptions, eigen_system: Arc<dyn EigenSystem>,
    ) -> ModelResult<Self> {
        options.validate()?;
        let space = provider.state_space()?;
        let frequencies = Frequencies::reconcile(frequencies, space.nr_of_states())?;
        Ok(MicrosatModel {
            params,
            space,
            frequencies,
            options,
            eigen_system,
            cache: DecompositionCache::new(),
            stored_params: None,
        })
    }

    pub fn params(&self) -> &MutationParams {
        &self.params
    }

    pub fn state_space(&self) -> StateSpace {
        self.space
    }

    pub fn nr_of_states(&self) -> usize {
        self.space.nr_of_states()
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn frequencies(&self) -> &Frequencies {
        &self.frequencies
    }

    /// Matrix index of an observed repeat length, `None` outside
    /// `min_repeat..=max_repeat`.
    pub fn state_index(&self, repeat: i64) -> Option<usize> {
        self.space.index_of(repeat)
    }

    // ---- Parameters and invalidation ----

    /// Set one parameter and mark the cache dirty.
    ///
    /// # Errors
    /// - `ModelError::Param` if the value is rejected; the model is then left
    ///   untouched (no invalidation).
    pub fn set_param(&mut self, id: ParamId, value: f64) -> ModelResult<()> {
        self.params.set(id, value)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Set several parameters at once.
    ///
    /// All updates are validated before any is applied: either every value is
    /// accepted or the model is left unchanged.
    pub fn set_params(&mut self, updates: &[(ParamId, f64)]) -> ModelResult<()> {
        let mut next = self.params.clone();
        for &(id, value) in updates {
            next.set(id, value)?;
        }
        self.params = next;
        self.cache.invalidate();
        Ok(())
    }

    /// Notify the model that its inputs changed outside of its setters.
    ///
    /// Always invalidates and returns `true`.
    pub fn requires_recalculation(&mut self) -> bool {
        self.cache.invalidate();
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.cache.is_dirty()
    }

    // ---- Derived state ----

    /// Current spectrum, rebuilt first if dirty.
    ///
    /// # Errors
    /// - `ModelError::Eigen` if the decomposition fails.
    pub fn spectrum(&self) -> ModelResult<Arc<Spectrum>> {
        self.cache.get_or_rebuild(|| {
            Spectrum::build(&self.params, &self.space, self.eigen_system.as_ref(), &self.options)
        })
    }

    /// Cached eigen decomposition of the generator.
    pub fn eigen_decomposition(&self) -> ModelResult<Arc<EigenDecomposition>> {
        Ok(Arc::clone(&self.spectrum()?.eigen))
    }

    /// Copy of the generator matrix `Q`.
    pub fn rate_matrix(&self) -> ModelResult<Array2<f64>> {
        Ok(self.spectrum()?.rate.q.clone())
    }

    /// Stationary distribution `π` of the generator.
    pub fn stationary_distribution(&self) -> ModelResult<Array1<f64>> {
        Ok(self.spectrum()?.stationary.clone())
    }

    // ---- Transition probabilities ----

    /// Fill `out` (row-major, length `N²`) with the transition matrix of a
    /// branch from `start_time` to `end_time` at branch rate `rate`.
    ///
    /// # Errors
    /// - `ModelError::NonFiniteDistance`, `ModelError::OutputBufferMismatch`,
    ///   `ModelError::DegenerateNormalization`, `ModelError::ReconstructionDrift`,
    ///   `ModelError::Eigen`.
    pub fn transition_probabilities(
        &self, start_time: f64, end_time: f64, rate: f64, out: &mut [f64],
    ) -> ModelResult<()> {
        let distance = branch_distance(start_time, end_time, rate)?;
        let spectrum = self.spectrum()?;
        transition_probabilities(
            &spectrum.eigen,
            spectrum.normalization,
            distance,
            &self.options,
            out,
        )
    }

    /// Transition matrix of a branch as an owned `N×N` array.
    pub fn transition_matrix(
        &self, start_time: f64, end_time: f64, rate: f64,
    ) -> ModelResult<Array2<f64>> {
        let distance = branch_distance(start_time, end_time, rate)?;
        let spectrum = self.spectrum()?;
        transition_matrix(&spectrum.eigen, spectrum.normalization, distance, &self.options)
    }

    /// Transition matrices for many branches, evaluated in parallel.
    ///
    /// The spectrum is resolved once up front; every branch then shares it.
    /// Results are returned in input order; the first error encountered is
    /// returned instead.
    pub fn branch_transition_matrices(&self, branches: &[Branch]) -> ModelResult<Vec<Array2<f64>>> {
        let spectrum = self.spectrum()?;
        branches
            .par_iter()
            .map(|branch| {
                transition_matrix(
                    &spectrum.eigen,
                    spectrum.normalization,
                    branch.distance()?,
                    &self.options,
                )
            })
            .collect()
    }

    // ---- Sampler protocol ----

    /// Checkpoint the parameters, the current spectrum and the dirty flag
    /// before a proposal.
    pub fn store(&mut self) {
        self.stored_params = Some(self.params.clone());
        self.cache.checkpoint();
    }

    /// Revert to the last checkpoint after a rejected proposal.
    ///
    /// Parameters and spectrum are swapped back together, so the live
    /// spectrum always belongs to `params()`. Without a prior `store` this
    /// only restores the initial (dirty) cache state.
    pub fn restore(&mut self) {
        if let Some(stored) = self.stored_params.as_mut() {
            std::mem::swap(&mut self.params, stored);
        }
        self.cache.rollback();
    }
}
