//! linalg — eigen system and `ndarray` ↔ `nalgebra` bridge.
//!
//! Purpose
//! -------
//! Isolate the dense linear algebra the CTMC layer treats as a black box:
//! spectral decomposition of a square real matrix into eigenvalues, right
//! eigenvectors and their inverse.
//!
//! Key behaviors
//! -------------
//! - [`eigen`]: the [`EigenSystem`] trait, the [`EigenDecomposition`]
//!   container and the [`DefaultEigenSystem`] implementation.
//! - [`bridge`]: shape validation and copies between `ndarray` and
//!   `nalgebra` storage.
//! - [`errors`]: [`EigenError`] and the [`EigenResult`] alias.
//!
//! Conventions
//! -----------
//! - All public signatures use `ndarray`; `nalgebra` types never leak out of
//!   this module.
//! - The module performs no logging; failures are returned as
//!   [`EigenError`] values.

pub mod bridge;
pub mod eigen;
pub mod errors;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::eigen::{DefaultEigenSystem, EigenDecomposition, EigenOptions, EigenSystem};
pub use self::errors::{EigenError, EigenResult};
