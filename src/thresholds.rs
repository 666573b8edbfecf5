//! Threshold results returned by every projector.
//!
//! A projection onto any of the supported sets has the form
//!
//! ```text
//! x_i = clamp(a_i − t, lo, hi)
//! ```
//!
//! so a projector only has to find `(t, lo, hi)`. The projector also leaves
//! its working buffer partitioned into three blocks, recorded by `first` and
//! `last`:
//!
//! ```text
//! [0, first)      a_i − t ≥ hi   (capped)
//! [first, last)   lo < a_i − t < hi   (free)
//! [last, n)       a_i − t ≤ lo   (at the lower bound)
//! ```

use crate::num::{Element, Real};

/// Threshold and bounds characterising a projection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds<R> {
    /// Value subtracted from every element before clamping.
    pub t: R,
    /// Lower clamp bound.
    pub lo: R,
    /// Upper clamp bound.
    pub hi: R,
    /// End of the capped block in the rearranged buffer.
    pub first: usize,
    /// End of the free block in the rearranged buffer.
    pub last: usize,
}

impl<R: Real> Thresholds<R> {
    /// Construct from raw parts.
    pub fn new(t: R, lo: R, hi: R, first: usize, last: usize) -> Self {
        Self { t, lo, hi, first, last }
    }

    /// The projection onto `{0}`: every coordinate clamps to zero.
    pub fn zero() -> Self {
        Self::new(R::zero(), R::zero(), R::zero(), 0, 0)
    }

    /// `clamp(value − t, lo, hi)`.
    ///
    /// When `hi ≤ lo` the result is `lo`.
    #[inline]
    pub fn clamp(&self, value: R) -> R {
        self.lo.max(self.hi.min(value - self.t))
    }

    /// Number of coordinates driven to `hi`.
    pub fn num_upper(&self) -> usize {
        self.first
    }

    /// Number of coordinates strictly between the bounds.
    pub fn num_free(&self) -> usize {
        self.last - self.first
    }

    /// Number of coordinates driven to `lo`, for a buffer of length `len`.
    pub fn num_lower(&self, len: usize) -> usize {
        len.saturating_sub(self.last)
    }

    /// Overwrite every element with its projection.
    pub fn apply<T: Element<R>>(&self, values: &mut [T]) {
        for v in values.iter_mut() {
            *v = T::narrow(self.clamp(v.widen()));
        }
    }
}
