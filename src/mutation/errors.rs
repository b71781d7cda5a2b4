//! Errors for microsatellite mutation models (parameter validation,
//! configuration checks, and numerical reconstruction failures).
//!
//! This module defines a model error type, [`ModelError`], and a parameter
//! error type, [`ParamError`], used across the Rust core and the optional
//! Python-facing API. Both implement `Display`/`Error` and convert to `PyErr`
//! when the `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** and refer to the shifted state space, where
//!   index 0 is the repeat length `min_repeat`.
//! - Configuration errors (state count, frequency dimension, options) are
//!   fatal: a model is never handed out half-built.
//! - Numerical indeterminate forms inside the rate-matrix builder are
//!   resolved locally and never surface here.
//! - Eigen-system failures are wrapped as [`ModelError::Eigen`].
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::linalg::errors::EigenError;

/// Crate-wide result alias for model operations that may produce [`ModelError`].
pub type ModelResult<T> = Result<T, ModelError>;

/// Result alias for parameter-construction/validation paths that may produce
/// [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Unified error type for the CTMC model.
///
/// Covers model configuration (state space, frequencies, options), request
/// validation (output buffers, branch distances), and numerical failures
/// raised while turning a decomposition into transition probabilities.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    // ---- Configuration ----
    /// The state space must hold at least two repeat lengths.
    InvalidStateCount { nr_of_states: usize },

    /// Frequencies still have the wrong dimension after automatic correction.
    FrequencyDimensionMismatch { expected: usize, actual: usize },

    /// A frequency entry is negative or non-finite.
    InvalidFrequency { index: usize, value: f64 },

    /// A tolerance or option is non-finite or out of range.
    InvalidOption { name: &'static str, value: f64, reason: &'static str },

    // ---- Request validation ----
    /// Flattened output buffer has the wrong length.
    OutputBufferMismatch { expected: usize, actual: usize },

    /// `(start_time − end_time) · rate` is NaN/±inf.
    NonFiniteDistance { value: f64 },

    // ---- Numerical ----
    /// The stationary-weighted step rate `Σ π_i · rowSum2_i` cannot rescale time.
    DegenerateNormalization { value: f64 },

    /// A reconstructed probability or row sum fell outside tolerance.
    ReconstructionDrift { row: usize, col: usize, value: f64, row_sum: f64 },

    // ---- Wrapped ----
    /// Parameter validation failed.
    Param(ParamError),

    /// Eigen decomposition failed.
    Eigen(EigenError),
}

impl std::error::Error for ModelError {}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            ModelError::InvalidStateCount { nr_of_states } => {
                write!(f, "Number of states must be at least 2; got: {nr_of_states}")
            }
            ModelError::FrequencyDimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Frequencies has wrong size. Expected {expected}, but got {actual}. Attempted correction failed."
                )
            }
            ModelError::InvalidFrequency { index, value } => {
                write!(f, "Frequency at index {index} must be finite and >= 0; got: {value}")
            }
            ModelError::InvalidOption { name, value, reason } => {
                write!(f, "Option {name} is invalid ({value}): {reason}")
            }
            // ---- Request validation ----
            ModelError::OutputBufferMismatch { expected, actual } => {
                write!(f, "Output buffer length mismatch: expected {expected}, got {actual}")
            }
            ModelError::NonFiniteDistance { value } => {
                write!(f, "Branch distance must be finite; got: {value}")
            }
            // ---- Numerical ----
            ModelError::DegenerateNormalization { value } => {
                write!(
                    f,
                    "Stationary-weighted step rate must be finite and > 0 to rescale time; got: {value}"
                )
            }
            ModelError::ReconstructionDrift { row, col, value, row_sum } => {
                write!(
                    f,
                    "Transition probability ({row}, {col}) = {value} is outside tolerance (row sum {row_sum})"
                )
            }
            // ---- Wrapped ----
            ModelError::Param(err) => write!(f, "{err}"),
            ModelError::Eigen(err) => write!(f, "{err}"),
        }
    }
}

impl From<ParamError> for ModelError {
    fn from(err: ParamError) -> ModelError {
        ModelError::Param(err)
    }
}

impl From<EigenError> for ModelError {
    fn from(err: EigenError) -> ModelError {
        ModelError::Eigen(err)
    }
}

/// Convert a [`ModelError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<ModelError> for PyErr {
    fn from(err: ModelError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Errors specific to parameter construction and validation.
///
/// Typical causes include values outside their (clamped) bounds, inverted
/// bounds, non-finite inputs, and a fractional value supplied for the
/// integer linear-regime threshold.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Parameter value must be finite.
    NonFiniteValue { name: &'static str, value: f64 },

    /// Parameter value lies outside its bounds.
    OutOfBounds { name: &'static str, value: f64, lower: f64, upper: f64 },

    /// Bounds are unusable (NaN, or lower > upper after clamping).
    InvalidBounds { name: &'static str, lower: f64, upper: f64, reason: &'static str },

    /// Integer parameter received a fractional value.
    NonIntegerValue { name: &'static str, value: f64 },

    /// Parameter name is not recognised.
    UnknownParameter { name: String },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::NonFiniteValue { name, value } => {
                write!(f, "Parameter {name} must be finite, got {value}")
            }
            ParamError::OutOfBounds { name, value, lower, upper } => {
                write!(f, "Parameter {name} = {value} lies outside its bounds [{lower}, {upper}]")
            }
            ParamError::InvalidBounds { name, lower, upper, reason } => {
                write!(f, "Bounds [{lower}, {upper}] for parameter {name} are invalid: {reason}")
            }
            ParamError::NonIntegerValue { name, value } => {
                write!(f, "Parameter {name} must be an integer, got {value}")
            }
            ParamError::UnknownParameter { name } => {
                write!(f, "Unknown parameter {name:?}")
            }
        }
    }
}

/// Convert a [`ParamError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<ParamError> for PyErr {
    fn from(err: ParamError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
