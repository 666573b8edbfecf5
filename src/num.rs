/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Numeric capabilities shared by every projector.
//!
//! Two precisions are in play during a projection:
//!
//! - the **storage** type of the buffer being projected ([`Element`]), and
//! - the **result** type used for thresholds and running sums ([`Real`]).
//!
//! They may differ, e.g. `f32` scores accumulated in `f64`.

use core::cmp::Ordering;
use core::fmt::Debug;

use num_traits::{AsPrimitive, Float};

/// Floating-point type used for thresholds, bounds and sums.
pub trait Real: Float + Debug + Send + Sync + 'static {
    /// Conversion of an element count; exact only up to the mantissa width (2^24 for `f32`).
    fn from_count(n: usize) -> Self;
}

impl Real for f32 {
    #[inline]
    fn from_count(n: usize) -> Self {
        n as f32
    }
}

impl Real for f64 {
    #[inline]
    fn from_count(n: usize) -> Self {
        n as f64
    }
}

/// Storage type of a projected buffer, convertible to and from the result precision `R`.
pub trait Element<R: Real>: Real {
    /// Convert a stored value to the result precision.
    fn widen(self) -> R;
    /// Convert a result-precision value back to storage.
    fn narrow(value: R) -> Self;
}

impl<T, R> Element<R> for T
where
    T: Real + AsPrimitive<R>,
    R: Real + AsPrimitive<T>,
{
    #[inline]
    fn widen(self) -> R {
        self.as_()
    }

    #[inline]
    fn narrow(value: R) -> Self {
        value.as_()
    }
}

/// Descending comparison; incomparable values (NaN) compare equal.
#[inline]
pub(crate) fn descending<T: Real>(a: &T, b: &T) -> Ordering {
    b.partial_cmp(a).unwrap_or(Ordering::Equal)
}

/// Sort a buffer in descending order.
#[inline]
pub(crate) fn sort_descending<T: Real>(values: &mut [T]) {
    values.sort_unstable_by(descending);
}

/// `n · bound`, treating an empty count as exactly zero even for infinite bounds.
#[inline]
pub(crate) fn scaled<R: Real>(n: usize, bound: R) -> R {
    if n == 0 {
        R::zero()
    } else {
        R::from_count(n) * bound
    }
}
