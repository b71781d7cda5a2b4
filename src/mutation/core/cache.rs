//! Decomposition cache — lazy rebuild gate and checkpoint slots.
//!
//! Purpose
//! -------
//! Own the derived numerical state of a model (generator, decomposition,
//! stationary distribution, normalization) and decide when it has to be
//! rebuilt. The cache also implements the store/restore protocol a
//! proposal-based sampler uses to revert a rejected parameter change without
//! recomputation.
//!
//! Key behaviors
//! -------------
//! - A [`Spectrum`] is built as a whole and published behind an `Arc`; it is
//!   never mutated afterwards, so readers can never observe a partial state.
//! - [`DecompositionCache::get_or_rebuild`] checks the dirty flag under a read
//!   lock and, if a rebuild is needed, takes the `parking_lot` upgradable read
//!   lock. Only one thread can hold it, so exactly one builder runs per
//!   invalidation cycle; the others re-check the flag after it is released
//!   and reuse the published spectrum.
//! - [`DecompositionCache::checkpoint`] copies the live slot into a shadow
//!   slot together with the dirty flag; [`DecompositionCache::rollback`]
//!   restores the flag and swaps the slots back. Both are `O(1)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dirty == false` implies a published spectrum is present.
//! - The shadow dirty flag starts as `true`, so restoring before any store
//!   forces a rebuild.
//! - `checkpoint`, `rollback` and `invalidate` take `&mut self`: the sampler
//!   serializes propose, evaluate and accept/reject, and the borrow checker
//!   rules out a race with concurrent evaluation.
//!
//! Conventions
//! -----------
//! - A failed rebuild leaves the cache dirty and the previous spectrum in
//!   place; the error is returned to the caller that triggered the rebuild.
//!
//! Testing notes
//! -------------
//! - Unit tests drive the cache with a counting builder to check lazy
//!   rebuilds, invalidation, the store/restore round trip, restoring after
//!   a rejected proposal, and single-builder behavior under `rayon`.
use crate::{
    linalg::eigen::{EigenDecomposition, EigenSystem},
    mutation::{
        core::{
            options::ModelOptions,
            params::MutationParams,
            rate_matrix::{RateMatrix, build_rate_matrix},
            state_space::StateSpace,
            stationary::find_stationary_distribution,
            transition::rate_normalization,
        },
        errors::ModelResult,
    },
};
use ndarray::Array1;
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::sync::Arc;
use tracing::{debug, trace};

/// Spectrum — everything derived from one parameter set.
///
/// Fields
/// ------
/// - `rate`: generator `Q` with `row_sum` and `row_sum2`.
/// - `eigen`: spectral factors of `Q`, shared with callers of
///   `eigen_decomposition`.
/// - `stationary`: stationary distribution `π`.
/// - `normalization`: validated `Σ π_i·rowSum2_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub rate: RateMatrix,
    pub eigen: Arc<EigenDecomposition>,
    pub stationary: Array1<f64>,
    pub normalization: f64,
}

impl Spectrum {
    /// Build the generator, decompose it and extract `π`.
    ///
    /// Errors
    /// ------
    /// - `ModelError::Eigen` if the eigen system fails.
    /// - `ModelError::DegenerateNormalization` if `Σ π_i·rowSum2_i` is not
    ///   finite or `≤ GENERAL_TOL` (e.g. every rate is zero).
    pub fn build(
        params: &MutationParams, space: &StateSpace, eigen_system: &dyn EigenSystem,
        options: &ModelOptions,
    ) -> ModelResult<Self> {
        let rate = build_rate_matrix(params, space);
        let eigen = eigen_system.decompose(rate.q.view())?;
        let stationary = find_stationary_distribution(&eigen, options.stationary_eigen_tol);
        let normalization = rate_normalization(stationary.view(), rate.row_sum2.view())?;
        debug!(
            nr_of_states = rate.dim(),
            max_repeat = space.max_repeat(),
            params = ?params.values(),
            max_abs_row_sum = rate.max_abs_row_sum(),
            min_off_diagonal = rate.min_off_diagonal(),
            complex_pairs = eigen.has_complex_pairs(),
            normalization,
            "Rebuilt rate matrix and eigen decomposition"
        );
        Ok(Spectrum { rate, eigen: Arc::new(eigen), stationary, normalization })
    }
}

#[derive(Debug)]
struct LiveSlot {
    dirty: bool,
    current: Option<Arc<Spectrum>>,
}

#[derive(Debug)]
struct ShadowSlot {
    dirty: bool,
    stored: Option<Arc<Spectrum>>,
}

/// DecompositionCache — dirty flag, live spectrum and checkpoint slot.
#[derive(Debug)]
pub struct DecompositionCache {
    live: RwLock<LiveSlot>,
    shadow: ShadowSlot,
}

impl DecompositionCache {
    /// Empty, dirty cache.
    pub fn new() -> Self {
        DecompositionCache {
            live: RwLock::new(LiveSlot { dirty: true, current: None }),
            shadow: ShadowSlot { dirty: true, stored: None },
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.live.read().dirty
    }

    /// Published spectrum, if any, without triggering a rebuild.
    pub fn current(&self) -> Option<Arc<Spectrum>> {
        self.live.read().current.clone()
    }

    /// Mark the cached state stale.
    pub fn invalidate(&mut self) {
        self.live.get_mut().dirty = true;
    }

    /// Return the live spectrum, rebuilding it with `build` if dirty.
    ///
    /// Parameters
    /// ----------
    /// - `build`: `FnOnce() -> ModelResult<Spectrum>`
    ///   Called at most once, and only by the thread that wins the rebuild.
    ///
    /// Errors
    /// ------
    /// - Propagates the error of `build`; the cache stays dirty.
    pub fn get_or_rebuild<F>(&self, build: F) -> ModelResult<Arc<Spectrum>>
    where
        F: FnOnce() -> ModelResult<Spectrum>,
    {
        {
            let live = self.live.read();
            if let (false, Some(spectrum)) = (live.dirty, &live.current) {
                return Ok(Arc::clone(spectrum));
            }
        }

        let live = self.live.upgradable_read();
        if let (false, Some(spectrum)) = (live.dirty, &live.current) {
            return Ok(Arc::clone(spectrum));
        }
        let spectrum = Arc::new(build()?);
        let mut live = RwLockUpgradableReadGuard::upgrade(live);
        live.current = Some(Arc::clone(&spectrum));
        live.dirty = false;
        Ok(spectrum)
    }

    /// Save the live spectrum and dirty flag into the shadow slot.
    ///
    /// The spectrum is only copied when one exists; the flag always is.
    pub fn checkpoint(&mut self) {
        let live = self.live.get_mut();
        self.shadow.dirty = live.dirty;
        if let Some(current) = &live.current {
            self.shadow.stored = Some(Arc::clone(current));
        }
        trace!(dirty = live.dirty, stored = self.shadow.stored.is_some(), "Stored decomposition");
    }

    /// Restore the saved dirty flag and swap the saved spectrum back in.
    pub fn rollback(&mut self) {
        let live = self.live.get_mut();
        live.dirty = self.shadow.dirty;
        if self.shadow.stored.is_some() {
            std::mem::swap(&mut live.current, &mut self.shadow.stored);
        }
        trace!(dirty = live.dirty, "Restored decomposition");
    }
}

impl Default for DecompositionCache {
    fn default() -> Self {
        DecompositionCache::new()
    }
}
