/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Projection onto the top-k simplex.
//!
//! ```text
//! min ½‖x − a‖²   s.t.   Σ x_i ≤ rhs,   0 ≤ x_i ≤ (1/k) Σ_j x_j
//! ```
//!
//! The set is the top-k cone cut by a sum bound. The projection is either the
//! cone projection (when its mass is at most `rhs`) or, when the bound is
//! active, the knapsack projection with box `[0, rhs/k]` and target `rhs`.
//!
//! Dispatch, cheapest first:
//!
//! 1. cone special cases; a zero solution is returned directly;
//! 2. a constant solution is kept if `k·hi ≤ rhs`, else the knapsack is solved;
//! 3. otherwise the knapsack is solved first and its sum multiplier checked.
//!    A negative multiplier means the bound is slack, and the cone search
//!    gives the answer.
//!
//! With `U` the capped block of the knapsack solution (`|U| = u`), the
//! multiplier of the sum bound is `λ = t + (A_U − u·t − u·rhs/k) / k`, so the
//! knapsack solution is rejected when
//!
//! ```text
//! k·(A_U + (k − u)·t) < rhs·u − eps      (u > 0)
//! t < −eps                               (u = 0)
//! ```
//!
//! with `eps = ε·max(1, |rhs|)`.

use crate::knapsack;
use crate::num::{Element, Real};
use crate::summation::Summation;
use crate::thresholds::Thresholds;
use crate::topk_cone::{self, effective_k, ConeCase};

/// Thresholds for the top-k simplex projection.
///
/// Rearranges `values`.
pub fn thresholds<T, R, S>(values: &mut [T], k: usize, rhs: R, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let n = values.len();
    if n == 0 {
        return Thresholds::zero();
    }
    let k = effective_k(k, n);
    let kr = R::from_count(k);
    let eps = R::epsilon() * rhs.abs().max(R::one());

    match topk_cone::special_cases(values, k, summation) {
        ConeCase::Zero(th) => th,
        ConeCase::Constant(th) if kr * th.hi <= rhs + eps => th,
        ConeCase::Constant(_) => knapsack::thresholds_eq(values, R::zero(), rhs / kr, rhs, summation),
        ConeCase::General => {
            let th = knapsack::thresholds_eq(values, R::zero(), rhs / kr, rhs, summation);
            if sum_bound_is_active(values, &th, k, rhs, eps, summation) {
                th
            } else {
                topk_cone::search(values, k, summation)
            }
        }
    }
}

/// Whether the knapsack solution carries a non-negative sum multiplier.
///
/// `values` must be in the block order left by [`knapsack::thresholds_eq`].
fn sum_bound_is_active<T, R, S>(
    values: &[T],
    th: &Thresholds<R>,
    k: usize,
    rhs: R,
    eps: R,
    summation: &S,
) -> bool
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let u = th.num_upper();
    if u == 0 {
        return th.t >= -eps;
    }
    let ur = R::from_count(u);
    let kr = R::from_count(k);
    let capped = summation.sum(&values[..u], R::zero());
    kr * (capped + (kr - ur) * th.t) >= rhs * ur - eps
}
