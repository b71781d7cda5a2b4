//! mutation — microsatellite repeat-length mutation CTMC.
//!
//! Purpose
//! -------
//! Provide the continuous-time Markov chain behind microsatellite (VNTR)
//! substitution models: a closed-form generator over repeat lengths, its
//! spectral decomposition, the stationary distribution, and branch
//! transition probabilities, cached and checkpointed for use inside a
//! proposal-based sampler.
//!
//! Key behaviors
//! -------------
//! - [`core`]: parameters and bounds, state space, rate-matrix builder,
//!   stationary extractor, transition engine, decomposition cache, options.
//! - [`models`]: [`MicrosatModel`], the type most callers need.
//! - [`errors`]: [`ModelError`] / [`ParamError`] and their result aliases.
//!
//! Invariants & assumptions
//! ------------------------
//! - Generators are valid by construction: non-negative off-diagonals and
//!   rows summing to zero.
//! - Derived state is rebuilt as a whole and published immutably; a restore
//!   never mixes two parameter sets.
//!
//! Conventions
//! -----------
//! - Repeat lengths are absolute at the API (`ieq`, `start_lin_regime`,
//!   `min_repeat`) and zero-based inside matrices.
//! - The stack logs through `tracing` and installs no subscriber; hosts
//!   decide where events go.
//!
//! Downstream usage
//! ----------------
//! - Typical flow:
//!   1. Build [`MutationParams`] (optionally with [`MutationBounds`]).
//!   2. Resolve dimensions with a [`StateSpace`] or any
//!      [`StateSpaceProvider`] (e.g. [`ObservedRepeats`]).
//!   3. Construct a [`MicrosatModel`] with the host's frequency vector and
//!      [`ModelOptions`].
//!   4. Per sampler step: `store()`, `set_param(..)`, evaluate transition
//!      probabilities for all branches, then keep or `restore()`.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    Branch, Frequencies, ModelOptions, MutationBounds, MutationParams, ObservedRepeats,
    ParamBounds, ParamId, ReconstructionPolicy, StateSpace, StateSpaceProvider,
};

pub use self::errors::{ModelError, ModelResult, ParamError, ParamResult};

pub use self::models::MicrosatModel;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use microsat_ctmc::mutation::prelude::*;
//
// to import the main mutation-model surface in a single line.

pub mod prelude {
    pub use super::{
        Branch, MicrosatModel, ModelError, ModelOptions, ModelResult, MutationBounds,
        MutationParams, ObservedRepeats, ParamBounds, ParamError, ParamId, ParamResult,
        ReconstructionPolicy, StateSpace, StateSpaceProvider,
    };
}
