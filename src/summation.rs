/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Summation strategies: plain left-to-right and Kahan-compensated.
//!
//! Every threshold search accumulates prefix sums over sorted scores. Long
//! prefixes of mixed-sign values drift under naïve accumulation, so the
//! projectors take the strategy as an injected, zero-sized capability.
//!
//! Compensated step, for each value `v`:
//!
//! ```text
//! y = v − c
//! t = sum + y
//! c = (t − sum) − y
//! sum = t
//! ```

use crate::num::{Element, Real};

/// A running-sum policy.
pub trait Summation<R: Real>: Copy + Default + core::fmt::Debug + Send + Sync {
    /// Add `value` to `sum`, updating the `compensation` carry.
    fn add(&self, value: R, sum: &mut R, compensation: &mut R);

    /// Sum `values` onto `init`.
    fn sum<T: Element<R>>(&self, values: &[T], init: R) -> R {
        let mut sum = init;
        let mut compensation = R::zero();
        for &v in values {
            self.add(v.widen(), &mut sum, &mut compensation);
        }
        sum
    }
}

/// Naïve left-to-right accumulation. Fastest; error grows with length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlainSum;

impl<R: Real> Summation<R> for PlainSum {
    #[inline]
    fn add(&self, value: R, sum: &mut R, _compensation: &mut R) {
        *sum = *sum + value;
    }
}

/// Kahan compensated accumulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KahanSum;

impl<R: Real> Summation<R> for KahanSum {
    #[inline]
    fn add(&self, value: R, sum: &mut R, compensation: &mut R) {
        let y = value - *compensation;
        let t = *sum + y;
        *compensation = (t - *sum) - y;
        *sum = t;
    }
}

/// Incremental accumulator bound to one summation strategy.
///
/// Used by the sweeps, which grow and shrink a sum one element at a time.
#[derive(Clone, Copy, Debug)]
pub struct RunningSum<R, S> {
    sum: R,
    compensation: R,
    strategy: S,
}

impl<R: Real, S: Summation<R>> RunningSum<R, S> {
    /// Start at zero.
    pub fn new(strategy: S) -> Self {
        Self { sum: R::zero(), compensation: R::zero(), strategy }
    }

    /// Add one value.
    #[inline]
    pub fn add(&mut self, value: R) {
        self.strategy.add(value, &mut self.sum, &mut self.compensation);
    }

    /// Current total.
    #[inline]
    pub fn value(&self) -> R {
        self.sum
    }
}
