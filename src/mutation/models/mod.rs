//! models — user-facing microsatellite substitution models.
//!
//! Purpose
//! -------
//! Expose the model a phylogenetic likelihood evaluator talks to. The layer
//! sits on top of `mutation::core` and wires parameters, state space, the
//! eigen system and the decomposition cache into one type.
//!
//! Key behaviors
//! -------------
//! - [`MicrosatModel`] provides transition probabilities (flattened or as
//!   `Array2`), the cached eigen decomposition, the generator and `π`.
//! - Parameter setters invalidate the cache; `store` / `restore` implement
//!   the checkpoint protocol of proposal-based samplers.
//! - [`MicrosatModel::branch_transition_matrices`] evaluates many branches in
//!   parallel against one shared spectrum.
//!
//! Invariants & assumptions
//! ------------------------
//! - Dimensions are fixed per model instance.
//! - Evaluation methods take `&self`; mutation methods take `&mut self`, so
//!   store/restore and setters never race with evaluation.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`microsat`] cover laziness, idempotence, the store/restore
//!   round trip, rejected proposals and single rebuilds under concurrency.
//! - `tests/integration_microsat_pipeline.rs` runs the full sampler protocol
//!   through the public API.

pub mod microsat;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::microsat::MicrosatModel;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use microsat_ctmc::mutation::models::prelude::*;
//
// to import the model surface in a single line.

pub mod prelude {
    pub use super::microsat::MicrosatModel;
}
