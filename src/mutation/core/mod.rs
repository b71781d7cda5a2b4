//! core — building blocks of the microsatellite mutation CTMC.
//!
//! Purpose
//! -------
//! Collect the pieces a microsatellite substitution model is assembled from:
//! validated parameters and bounds, the repeat-length state space, the
//! rate-matrix builder, stationary-distribution extraction, the transition
//! probability engine, the decomposition cache, and numerical options.
//!
//! Key behaviors
//! -------------
//! - [`MutationParams`] / [`ParamBounds`] / [`ParamId`]: parameter values
//!   clamped to their feasible domains.
//! - [`StateSpace`] / [`StateSpaceProvider`] / [`ObservedRepeats`]: explicit
//!   dimensions with a hook for late-binding discovery.
//! - [`build_rate_matrix`]: generator `Q` with `rowSum` and `rowSum2`.
//! - [`find_stationary_distribution`]: `π` from the decomposition.
//! - [`transition_matrix`] / [`transition_probabilities`]: `exp(tQ)` with
//!   tolerance-based clean-up.
//! - [`DecompositionCache`]: dirty flag, single-builder rebuild gate and
//!   store/restore slots.
//!
//! Invariants & assumptions
//! ------------------------
//! - Matrix indices are zero-based; index 0 is repeat length `min_repeat`.
//! - Every matrix exposed by this module is `N×N` with `N = nr_of_states ≥ 2`.
//!
//! Conventions
//! -----------
//! - Public containers are `ndarray` types; errors are `ModelError` /
//!   `ParamError` values and nothing here panics on invalid input.
//! - Logging goes through `tracing`: warnings for corrected frequencies and
//!   suspicious stationary eigenvalues, debug events on rebuilds, trace
//!   events on store/restore.
//!
//! Downstream usage
//! ----------------
//! - `mutation::models::MicrosatModel` wires these pieces together; use the
//!   submodules directly only when a custom pipeline is needed (e.g. a
//!   different cache policy around the same builder and engine).

pub mod bounds;
pub mod cache;
pub mod frequencies;
pub mod options;
pub mod params;
pub mod rate_matrix;
pub mod state_space;
pub mod stationary;
pub mod transition;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bounds::ParamBounds;
pub use self::cache::{DecompositionCache, Spectrum};
pub use self::frequencies::Frequencies;
pub use self::options::{ModelOptions, ReconstructionPolicy};
pub use self::params::{MutationBounds, MutationParams, ParamId};
pub use self::rate_matrix::{RateMatrix, build_rate_matrix, geometric_step_weight};
pub use self::state_space::{ObservedRepeats, StateSpace, StateSpaceProvider};
pub use self::stationary::{find_stationary_distribution, stationary_index};
pub use self::transition::{
    Branch, branch_distance, rate_normalization, transition_matrix, transition_probabilities,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use microsat_ctmc::mutation::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::bounds::ParamBounds;
    pub use super::cache::{DecompositionCache, Spectrum};
    pub use super::frequencies::Frequencies;
    pub use super::options::{ModelOptions, ReconstructionPolicy};
    pub use super::params::{MutationBounds, MutationParams, ParamId};
    pub use super::rate_matrix::{RateMatrix, build_rate_matrix};
    pub use super::state_space::{ObservedRepeats, StateSpace, StateSpaceProvider};
    pub use super::transition::Branch;
}
