//! Errors raised by parameter validation and the projection driver's shape checks.
//!
//! The threshold algorithms themselves never fail: degenerate inputs are
//! legitimate regions of the feasible set and are resolved by case analysis.

use thiserror::Error;

use crate::num::Real;

/// Precondition violations detected before entering the projection core.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProjectionError {
    /// `k` must lie in `[1, dim]`.
    #[error("k = {k} is outside [1, {dim}]")]
    InvalidK {
        /// Requested sparsity parameter.
        k: usize,
        /// Dimension of the projected vectors.
        dim: usize,
    },
    /// Batch projection needs a positive column dimension.
    #[error("column dimension must be positive")]
    ZeroDimension,
    /// The batch buffer is not a whole number of columns.
    #[error("buffer of length {len} is not a whole number of columns of dimension {dim}")]
    RaggedBatch {
        /// Buffer length.
        len: usize,
        /// Column dimension.
        dim: usize,
    },
    /// The scratch buffer is shorter than one column.
    #[error("scratch buffer holds {len} elements but {needed} are required")]
    ScratchTooSmall {
        /// Scratch length supplied.
        len: usize,
        /// Length required.
        needed: usize,
    },
    /// The sum bound must be finite and non-negative.
    #[error("right-hand side {rhs} must be finite and non-negative")]
    InvalidRhs {
        /// Offending value.
        rhs: f64,
    },
    /// The lower bound of a box must be finite.
    #[error("lower bound {lo} must be finite")]
    InvalidBound {
        /// Offending value.
        lo: f64,
    },
    /// An input value is NaN or infinite.
    #[error("input value at index {index} is not finite")]
    NonFinite {
        /// Position of the first offending value.
        index: usize,
    },
}

/// Reject NaN or infinite inputs.
pub fn check_finite<T: Real>(values: &[T]) -> Result<(), ProjectionError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ProjectionError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Lossy conversion for error payloads.
pub(crate) fn as_f64<R: Real>(value: R) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
