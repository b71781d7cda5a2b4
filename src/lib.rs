//! microsat_ctmc — continuous-time Markov model of microsatellite repeat-length
//! evolution with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers embedding the mutation model in a
//! phylogenetic likelihood engine, and as the PyO3 bridge that exposes the same
//! model to Python via the `_microsat_ctmc` extension module when the
//! `python-bindings` feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`mutation`, `linalg`,
//!   `numerical_stability`) as the public crate surface.
//! - Define a `#[pyclass]` wrapper around [`MicrosatModel`] and the
//!   `#[pymodule]` initializer for the `_microsat_ctmc` Python extension.
//! - Register the `mutation_models` submodule in `sys.modules` so dotted
//!   imports work from Python.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion, and error mapping.
//! - State index 0 always corresponds to repeat length `min_repeat`.
//!
//! Conventions
//! -------------
//! - Errors from core code are rich Rust enums internally and become
//!   `ValueError` at the PyO3 boundary.
//! - Matrices cross the boundary as row-major `list[list[float]]`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`mutation::MicrosatModel`] and the
//!   building blocks in [`mutation::core`]; the PyO3 items are internal.

pub mod linalg;
pub mod mutation;
pub mod numerical_stability;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    mutation::{
        core::{ModelOptions, MutationParams, ParamId, StateSpace},
        models::MicrosatModel,
    },
    utils::{extract_f64_array, extract_reconstruction_policy, matrix_to_rows},
};

/// MicrosatModel — Python wrapper around the Rust [`MicrosatModel`].
///
/// Purpose
/// -------
/// Let Python callers build the microsatellite CTMC, propose parameter
/// changes, query transition probabilities, and use store/restore exactly as
/// an MCMC host written in Rust would.
///
/// Parameters
/// ----------
/// - `nr_of_states`: `int`
///   Number of repeat-length states (`≥ 2`).
/// - `min_repeat`: `int`
///   Repeat length of state index 0.
/// - `rb`, `ieq`, `g`, `one_on_a1`: `float`
///   Continuous mutation parameters.
/// - `start_lin_regime`: `int`
///   Repeat length where the linear rate regime begins.
/// - `frequencies`: optional 1-D float array; uniform when omitted.
/// - `reconstruction`: optional `"clamp"` (default) or `"absolute"`.
///
/// Notes
/// -----
/// - Parameter names accepted by `set_param` are `rb`, `ieq`, `g`,
///   `oneOnA1`, `startLinRegime` (or their `snake_case` spellings).
#[cfg(feature = "python-bindings")]
#[pyclass(module = "microsat_ctmc.mutation_models", name = "MicrosatModel")]
pub struct PyMicrosatModel {
    /// Underlying Rust model.
    pub inner: MicrosatModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyMicrosatModel {
    #[new]
    #[pyo3(
        signature = (
            nr_of_states,
            min_repeat,
            rb,
            ieq,
            g,
            one_on_a1,
            start_lin_regime,
            frequencies = None,
            reconstruction = None,
        ),
        text_signature = "(nr_of_states, min_repeat, rb, ieq, g, one_on_a1, start_lin_regime, \
                          /, frequencies=None, reconstruction=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, nr_of_states: usize, min_repeat: i64, rb: f64, ieq: f64, g: f64,
        one_on_a1: f64, start_lin_regime: i64, frequencies: Option<&Bound<'py, PyAny>>,
        reconstruction: Option<&str>,
    ) -> PyResult<Self> {
        let space = StateSpace::new(nr_of_states, min_repeat)?;
        let params = MutationParams::new(rb, ieq, g, one_on_a1, start_lin_regime)?;
        let options = ModelOptions {
            reconstruction: extract_reconstruction_policy(reconstruction)?,
            ..ModelOptions::default()
        };

        let inner = match frequencies {
            Some(raw) => {
                let freqs = extract_f64_array(py, raw)?;
                MicrosatModel::new(params, &space, freqs.as_array(), options)?
            }
            None => {
                let uniform = Array1::from_elem(nr_of_states, 1.0 / nr_of_states as f64);
                MicrosatModel::new(params, &space, uniform.view(), options)?
            }
        };
        Ok(PyMicrosatModel { inner })
    }

    /// Set one parameter by name; marks the cached decomposition dirty.
    pub fn set_param(&mut self, name: &str, value: f64) -> PyResult<()> {
        let id: ParamId = name.parse()?;
        self.inner.set_param(id, value)?;
        Ok(())
    }

    /// Current value of a parameter by name.
    pub fn get_param(&self, name: &str) -> PyResult<f64> {
        let id: ParamId = name.parse()?;
        Ok(self.inner.params().get(id))
    }

    /// Transition matrix `P(distance)` for a branch, `distance = (start - end) * rate`.
    pub fn transition_probabilities(
        &self, start_time: f64, end_time: f64, rate: f64,
    ) -> PyResult<Vec<Vec<f64>>> {
        let p = self.inner.transition_matrix(start_time, end_time, rate)?;
        Ok(matrix_to_rows(&p))
    }

    /// Generator matrix `Q` of the current parameters.
    pub fn rate_matrix(&self) -> PyResult<Vec<Vec<f64>>> {
        let q = self.inner.rate_matrix()?;
        Ok(matrix_to_rows(&q))
    }

    /// Stationary distribution `π` of the current parameters.
    pub fn stationary_distribution(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.stationary_distribution()?.to_vec())
    }

    /// Snapshot the parameters and cached decomposition before a proposal.
    pub fn store(&mut self) {
        self.inner.store();
    }

    /// Revert parameters and decomposition to the last `store`.
    pub fn restore(&mut self) {
        self.inner.restore();
    }

    #[getter]
    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    #[getter]
    pub fn nr_of_states(&self) -> usize {
        self.inner.nr_of_states()
    }

    #[getter]
    pub fn min_repeat(&self) -> i64 {
        self.inner.state_space().min_repeat()
    }

    #[getter]
    pub fn max_repeat(&self) -> i64 {
        self.inner.state_space().max_repeat()
    }

    /// Parameter values in the order `rb, ieq, g, oneOnA1, startLinRegime`.
    #[getter]
    pub fn param_values(&self) -> Vec<f64> {
        self.inner.params().values().to_vec()
    }

    /// Matrix index of a repeat length, or `None` if it is out of range.
    pub fn state_index(&self, repeat: i64) -> Option<usize> {
        self.inner.state_index(repeat)
    }

    #[getter]
    pub fn frequencies(&self) -> Vec<f64> {
        self.inner.frequencies().as_array().to_vec()
    }
}

/// _microsat_ctmc — PyO3 module initializer for the Python extension.
///
/// Creates the `mutation_models` submodule, attaches it to the parent module
/// and registers it in `sys.modules` so `microsat_ctmc.mutation_models` is
/// importable with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _microsat_ctmc<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let mutation_models_mod = PyModule::new(_py, "mutation_models")?;
    mutation_models(_py, m, &mutation_models_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("microsat_ctmc.mutation_models", mutation_models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn mutation_models<'py>(
    _py: Python, microsat_ctmc: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyMicrosatModel>()?;
    microsat_ctmc.add_submodule(m)?;
    Ok(())
}
