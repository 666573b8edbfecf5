//! Python FFI bindings via PyO3.
//!
//! Thin marshalling layer over the batch driver: parameters and inputs are
//! validated here, then every column is projected with compensated summation.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import prox_topk
//!
//! # two columns of dimension 3, column-major
//! scores = [2.0, 1.0, 0.0, 0.5, 0.5, 0.5]
//! print(prox_topk.project(scores, dim=3, k=1, rho=1.0))
//! # [1.0, 0.0, 0.0, 0.333.., 0.333.., 0.333..]
//! print(prox_topk.project_vector([0.5, 0.5, 0.5], k=3, rho=1.0))
//! print(prox_topk.project_knapsack([0.9, 0.8], lo=0.0, hi=0.6, rhs=1.0))
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::{check_finite, ProjectionError};
use crate::projector::{Projector, Strategy};

fn to_py(err: ProjectionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Project each column of a flat column-major `dim × n` matrix onto the top-k simplex.
///
/// Args:
///     x:   flat list of length `dim · n`, dimension varying fastest
///     dim: column dimension
///     k:   sparsity parameter in [1, dim] (default 1)
///     rho: sum bound, finite and non-negative (default 1.0)
///
/// Returns:
///     The projected matrix in the same layout.
#[pyfunction]
#[pyo3(signature = (x, dim, k=1, rho=1.0))]
pub fn project(x: Vec<f64>, dim: usize, k: usize, rho: f64) -> PyResult<Vec<f64>> {
    let projector = Projector::new(Strategy::TopKSimplex { k, rhs: rho });
    projector.strategy.validate(dim).map_err(to_py)?;
    check_finite(&x).map_err(to_py)?;

    let mut out = x;
    let mut scratch = vec![0.0; dim];
    projector
        .project_columns(dim, &mut out, &mut scratch)
        .map_err(to_py)?;
    Ok(out)
}

/// Project a single vector onto the top-k simplex.
#[pyfunction]
#[pyo3(signature = (x, k=1, rho=1.0))]
pub fn project_vector(x: Vec<f64>, k: usize, rho: f64) -> PyResult<Vec<f64>> {
    let dim = x.len();
    project(x, dim.max(1), k, rho)
}

/// Project a vector onto `{lo ≤ x_i ≤ hi, Σ x_i = rhs}`.
#[pyfunction]
#[pyo3(signature = (x, lo, hi, rhs))]
pub fn project_knapsack(x: Vec<f64>, lo: f64, hi: f64, rhs: f64) -> PyResult<Vec<f64>> {
    let projector = Projector::new(Strategy::KnapsackEq { lo, hi, rhs });
    projector.strategy.validate(x.len()).map_err(to_py)?;
    check_finite(&x).map_err(to_py)?;

    let mut out = x;
    projector.project(&mut out);
    Ok(out)
}

// ── Module entry point ────────────────────────────────────────────────────────

/// Euclidean projections onto the simplex, knapsack and top-k sets.
#[pymodule]
pub fn prox_topk(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(project, m)?)?;
    m.add_function(wrap_pyfunction!(project_vector, m)?)?;
    m.add_function(wrap_pyfunction!(project_knapsack, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
