/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Projection driver: strategies, configuration and the in-place entry points.
//!
//! A [`Projector`] pairs a [`Strategy`] with a [`Summation`] policy and a
//! [`Verbosity`], and applies the strategy to
//!
//! - one vector in place ([`Projector::project`], needs `alloc`),
//! - one vector through a caller-owned scratch buffer
//!   ([`Projector::project_with_scratch`]),
//! - every column of a column-major `dim × n` matrix, reusing one scratch
//!   column ([`Projector::project_columns`]), or in parallel with one scratch
//!   column per worker ([`Projector::par_project_columns`], needs `parallel`).
//!
//! The threshold search runs on the scratch copy, which it rearranges; the
//! caller's buffer keeps its order and receives `clamp(a_i − t, lo, hi)`.

use crate::error::{as_f64, ProjectionError};
use crate::knapsack;
use crate::num::{Element, Real};
use crate::summation::{KahanSum, Summation};
use crate::thresholds::Thresholds;
use crate::{topk_cone, topk_simplex};

// ─── Strategy ───────────────────────────────────────────────────────────────

/// The closed set of supported projections.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy<R> {
    /// `lo ≤ x_i ≤ hi`, `Σ x_i = rhs`.
    KnapsackEq {
        /// Lower bound (finite).
        lo: R,
        /// Upper bound (may be `+∞`).
        hi: R,
        /// Target sum.
        rhs: R,
    },
    /// `lo ≤ x_i ≤ hi`, `Σ x_i ≤ rhs`.
    KnapsackLe {
        /// Lower bound (finite).
        lo: R,
        /// Upper bound (may be `+∞`).
        hi: R,
        /// Sum bound.
        rhs: R,
    },
    /// `x ≥ 0`, `Σ x_i ≤ rhs`.
    Simplex {
        /// Sum bound.
        rhs: R,
    },
    /// `x ≥ 0`, `x_i ≤ Σ x / k`.
    TopKCone {
        /// Sparsity parameter.
        k: usize,
    },
    /// `x ≥ 0`, `x_i ≤ Σ x / k`, `Σ x_i ≤ rhs`.
    TopKSimplex {
        /// Sparsity parameter.
        k: usize,
        /// Sum bound.
        rhs: R,
    },
}

impl<R: Real> Default for Strategy<R> {
    /// `TopKSimplex { k: 1, rhs: 1 }`, the probability simplex.
    fn default() -> Self {
        Self::TopKSimplex { k: 1, rhs: R::one() }
    }
}

impl<R: Real> Strategy<R> {
    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KnapsackEq { .. } => "knapsack-eq",
            Self::KnapsackLe { .. } => "knapsack-le",
            Self::Simplex { .. } => "simplex",
            Self::TopKCone { .. } => "topk-cone",
            Self::TopKSimplex { .. } => "topk-simplex",
        }
    }

    /// Check the parameters against a vector dimension.
    ///
    /// The projection core does not validate; binding layers call this first.
    pub fn validate(&self, dim: usize) -> Result<(), ProjectionError> {
        let check_k = |k: usize| {
            if k == 0 || k > dim {
                Err(ProjectionError::InvalidK { k, dim })
            } else {
                Ok(())
            }
        };
        let check_rhs = |rhs: R| {
            if rhs.is_finite() && rhs >= R::zero() {
                Ok(())
            } else {
                Err(ProjectionError::InvalidRhs { rhs: as_f64(rhs) })
            }
        };
        match *self {
            Self::KnapsackEq { lo, rhs, .. } | Self::KnapsackLe { lo, rhs, .. } => {
                if !lo.is_finite() {
                    return Err(ProjectionError::InvalidBound { lo: as_f64(lo) });
                }
                if rhs.is_nan() {
                    return Err(ProjectionError::InvalidRhs { rhs: as_f64(rhs) });
                }
                Ok(())
            }
            Self::Simplex { rhs } => check_rhs(rhs),
            Self::TopKCone { k } => check_k(k),
            Self::TopKSimplex { k, rhs } => {
                check_k(k)?;
                check_rhs(rhs)
            }
        }
    }

    /// Compute thresholds for `values`, rearranging them.
    pub fn thresholds<T, S>(&self, values: &mut [T], summation: &S) -> Thresholds<R>
    where
        T: Element<R>,
        S: Summation<R>,
    {
        match *self {
            Self::KnapsackEq { lo, hi, rhs } => knapsack::thresholds_eq(values, lo, hi, rhs, summation),
            Self::KnapsackLe { lo, hi, rhs } => knapsack::thresholds_le(values, lo, hi, rhs, summation),
            Self::Simplex { rhs } => knapsack::thresholds_simplex(values, rhs, summation),
            Self::TopKCone { k } => topk_cone::thresholds(values, k, summation),
            Self::TopKSimplex { k, rhs } => topk_simplex::thresholds(values, k, rhs, summation),
        }
    }
}

// ─── Verbosity ──────────────────────────────────────────────────────────────

/// How much the driver reports through the `log` facade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Quiet,
    /// One `debug` record per batch.
    Summary,
    /// Additionally one `trace` record per projected vector.
    Trace,
}

// ─── Projector ──────────────────────────────────────────────────────────────

/// A configured projection.
///
/// ```
/// use prox_topk::{Projector, Strategy};
///
/// let projector = Projector::new(Strategy::TopKSimplex { k: 1, rhs: 1.0_f64 });
/// let mut scores = [2.0_f64, 1.0, 0.0];
/// let mut scratch = [0.0_f64; 3];
/// projector.project_with_scratch(&mut scores, &mut scratch).unwrap();
/// assert_eq!(scores, [1.0, 0.0, 0.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projector<R, S = KahanSum> {
    /// Which set to project onto.
    pub strategy: Strategy<R>,
    /// Summation policy for every prefix sum.
    pub summation: S,
    /// Diagnostic output level.
    pub verbosity: Verbosity,
}

impl<R: Real> Default for Projector<R, KahanSum> {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl<R: Real> Projector<R, KahanSum> {
    /// Compensated summation, quiet.
    pub fn new(strategy: Strategy<R>) -> Self {
        Self { strategy, summation: KahanSum, verbosity: Verbosity::Quiet }
    }
}

impl<R: Real, S: Summation<R>> Projector<R, S> {
    /// Swap the summation policy.
    pub fn with_summation<S2: Summation<R>>(self, summation: S2) -> Projector<R, S2> {
        Projector { strategy: self.strategy, summation, verbosity: self.verbosity }
    }

    /// Set the diagnostic level.
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Thresholds for `values`, rearranging them.
    pub fn thresholds<T: Element<R>>(&self, values: &mut [T]) -> Thresholds<R> {
        self.strategy.thresholds(values, &self.summation)
    }

    /// Project `x` in place, allocating a transient scratch copy.
    #[cfg(feature = "alloc")]
    pub fn project<T: Element<R>>(&self, x: &mut [T]) -> Thresholds<R> {
        let mut scratch = alloc::vec::Vec::from(&*x);
        self.project_column(x, &mut scratch)
    }

    /// Project `x` in place using `scratch` (at least `x.len()` long) for the search.
    pub fn project_with_scratch<T: Element<R>>(
        &self,
        x: &mut [T],
        scratch: &mut [T],
    ) -> Result<Thresholds<R>, ProjectionError> {
        let scratch = scratch_column(scratch, x.len())?;
        Ok(self.project_column(x, scratch))
    }

    /// Project every column of a column-major `dim × n` buffer in place.
    ///
    /// Returns the number of columns projected.
    pub fn project_columns<T: Element<R>>(
        &self,
        dim: usize,
        data: &mut [T],
        scratch: &mut [T],
    ) -> Result<usize, ProjectionError> {
        check_batch(dim, data.len())?;
        let scratch = scratch_column(scratch, dim)?;
        let mut columns = 0;
        for column in data.chunks_exact_mut(dim) {
            self.project_column(column, scratch);
            columns += 1;
        }
        self.log_batch(dim, columns);
        Ok(columns)
    }

    /// Parallel [`Projector::project_columns`]; each worker owns a scratch column.
    #[cfg(feature = "parallel")]
    pub fn par_project_columns<T: Element<R>>(&self, dim: usize, data: &mut [T]) -> Result<usize, ProjectionError>
    where
        S: Sync,
    {
        use rayon::prelude::*;

        check_batch(dim, data.len())?;
        let columns = data.len() / dim;
        data.par_chunks_mut(dim).for_each_init(
            || std::vec![T::zero(); dim],
            |scratch, column| {
                self.project_column(column, scratch);
            },
        );
        self.log_batch(dim, columns);
        Ok(columns)
    }

    /// Search on `scratch`, write the projection into `x`.
    fn project_column<T: Element<R>>(&self, x: &mut [T], scratch: &mut [T]) -> Thresholds<R> {
        scratch.copy_from_slice(x);
        let th = self.thresholds(scratch);
        th.apply(x);
        if self.verbosity >= Verbosity::Trace {
            log::trace!(
                "{}: t = {:?}, bounds = [{:?}, {:?}], capped = {}, free = {}",
                self.strategy.name(),
                th.t,
                th.lo,
                th.hi,
                th.num_upper(),
                th.num_free()
            );
        }
        th
    }

    fn log_batch(&self, dim: usize, columns: usize) {
        if self.verbosity >= Verbosity::Summary {
            log::debug!(
                "{}: projected {} columns of dimension {}",
                self.strategy.name(),
                columns,
                dim
            );
        }
    }
}

fn check_batch(dim: usize, len: usize) -> Result<(), ProjectionError> {
    if dim == 0 {
        return Err(ProjectionError::ZeroDimension);
    }
    if len % dim != 0 {
        return Err(ProjectionError::RaggedBatch { len, dim });
    }
    Ok(())
}

fn scratch_column<T>(scratch: &mut [T], needed: usize) -> Result<&mut [T], ProjectionError> {
    let len = scratch.len();
    scratch
        .get_mut(..needed)
        .ok_or(ProjectionError::ScratchTooSmall { len, needed })
}
