//! Python binding helpers: argument extraction and output conversion.
//!
//! Everything here is compiled only with the `python-bindings` feature and is
//! used by the `#[pyclass]` wrappers in the crate root.

#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::mutation::core::options::ReconstructionPolicy;

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a contiguous 1-D `float64` numpy array, anything with a
/// `to_numpy()` method (pandas), or a plain sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Parse the `reconstruction` keyword (`"clamp"` / `"absolute"`).
#[cfg(feature = "python-bindings")]
pub fn extract_reconstruction_policy(policy: Option<&str>) -> PyResult<ReconstructionPolicy> {
    let policy_str = policy.unwrap_or("clamp").to_lowercase();
    match policy_str.as_str() {
        "clamp" | "tolerance_clamp" => Ok(ReconstructionPolicy::ToleranceClamp),
        "absolute" | "abs" => Ok(ReconstructionPolicy::Absolute),
        other => Err(PyValueError::new_err(format!(
            "invalid reconstruction policy {:?} (expected 'clamp' or 'absolute')",
            other
        ))),
    }
}

/// Convert `Array2<f64>` → `Vec<Vec<f64>>` (row-major).
#[cfg(feature = "python-bindings")]
pub fn matrix_to_rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}
