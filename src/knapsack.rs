/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Projection onto the knapsack polytope.
//!
//! ```text
//! min ½‖x − a‖²   s.t.   lo ≤ x_i ≤ hi,   Σ x_i = rhs   (or ≤ rhs)
//! ```
//!
//! The solution is `x_i = clamp(a_i − t, lo, hi)` for the unique `t` at which
//! the clamped sum `f(t) = Σ clamp(a_i − t, lo, hi)` reaches `rhs`. `f` is
//! continuous, non-increasing and piecewise affine, with breakpoints at
//! `a_i − lo` (element `i` leaves the lower bound) and `a_i − hi` (element `i`
//! reaches the cap). With `a` sorted descending both breakpoint families are
//! already ordered, so a two-pointer sweep walks the breakpoints from `+∞`
//! downwards and stops at the segment where `f` crosses `rhs`.
//!
//! Cost: O(n log n) sort plus an O(n) sweep. The input buffer is left sorted
//! descending, which is the block layout described in [`crate::thresholds`].
//!
//! # Degenerate inputs
//!
//! - `hi ≤ lo`: the box is a single point; every coordinate goes to `lo`.
//! - `rhs ≥ n·hi`: unreachable from below; every coordinate saturates at `hi`.
//! - `rhs ≤ n·lo`: unreachable from above; every coordinate saturates at `lo`.
//! - `hi = +∞` is allowed (simplex). `lo` must be finite.
//!
//! # Precision
//!
//! Storage and result precision are independent, so callers outside
//! [`crate::Strategy`] name the result type:
//!
//! ```
//! use prox_topk::knapsack::thresholds_eq;
//! use prox_topk::{KahanSum, Thresholds};
//!
//! let mut scores = [2.0_f32, 1.0, 0.0];
//! let th: Thresholds<f64> = thresholds_eq(&mut scores, 0.0, 1.0, 1.0, &KahanSum);
//! assert_eq!(th.t, 1.0);
//! assert_eq!((th.first, th.last), (0, 1));
//! ```

use crate::num::{scaled, sort_descending, Element, Real};
use crate::summation::{RunningSum, Summation};
use crate::thresholds::Thresholds;

/// Thresholds for the equality-constrained knapsack `Σ x_i = rhs`.
///
/// Rearranges `values` into descending order.
pub fn thresholds_eq<T, R, S>(values: &mut [T], lo: R, hi: R, rhs: R, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let n = values.len();
    if n == 0 {
        return Thresholds::new(R::zero(), lo, hi, 0, 0);
    }
    if hi <= lo {
        return Thresholds::new(R::zero(), lo, lo, 0, 0);
    }

    sort_descending(values);

    if rhs >= scaled(n, hi) {
        let t = values[n - 1].widen() - hi;
        return Thresholds::new(t, lo, hi, n, n);
    }
    if rhs <= scaled(n, lo) {
        let t = values[0].widen() - lo;
        return Thresholds::new(t, lo, hi, 0, 0);
    }

    sweep(values, lo, hi, rhs, summation)
}

/// Thresholds for the inequality-constrained knapsack `Σ x_i ≤ rhs`.
///
/// If clamping `a` to the box already satisfies the bound, the sum
/// constraint is inactive and `t = 0`; otherwise this is [`thresholds_eq`].
/// Rearranges `values` into descending order.
pub fn thresholds_le<T, R, S>(values: &mut [T], lo: R, hi: R, rhs: R, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let n = values.len();
    if n == 0 {
        return Thresholds::new(R::zero(), lo, hi, 0, 0);
    }
    if hi <= lo {
        return Thresholds::new(R::zero(), lo, lo, 0, 0);
    }

    let box_only = Thresholds::new(R::zero(), lo, hi, 0, 0);
    let mut total = R::zero();
    let mut compensation = R::zero();
    for &v in values.iter() {
        summation.add(box_only.clamp(v.widen()), &mut total, &mut compensation);
    }
    if total > rhs {
        return thresholds_eq(values, lo, hi, rhs, summation);
    }

    sort_descending(values);
    let first = values.partition_point(|v| v.widen() >= hi);
    let last = values.partition_point(|v| v.widen() > lo);
    Thresholds::new(R::zero(), lo, hi, first, last)
}

/// Thresholds for the simplex `{x ≥ 0, Σ x_i ≤ rhs}`.
pub fn thresholds_simplex<T, R, S>(values: &mut [T], rhs: R, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    thresholds_le(values, R::zero(), R::infinity(), rhs, summation)
}

/// Breakpoint sweep over a descending buffer with `n·lo < rhs < n·hi`.
///
/// `q` counts capped elements and `p` counts elements that left the lower
/// bound, so `values[q..p]` is the free block and `free` holds its sum.
fn sweep<T, R, S>(values: &[T], lo: R, hi: R, rhs: R, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let n = values.len();
    let mut p = 0;
    let mut q = 0;
    let mut free = RunningSum::new(*summation);

    while q < n {
        let enter_free = if p < n { values[p].widen() - lo } else { R::neg_infinity() };
        let enter_cap = if q < p { values[q].widen() - hi } else { R::neg_infinity() };
        let t_break = enter_free.max(enter_cap);

        // f(t_break) with the current block assignment.
        let fixed = scaled(q, hi) + scaled(n - p, lo);
        let level = fixed + free.value() - scaled(p - q, t_break);
        if level >= rhs {
            let m = p - q;
            let t = if m == 0 {
                t_break
            } else {
                (fixed + free.value() - rhs) / R::from_count(m)
            };
            return Thresholds::new(t, lo, hi, q, p);
        }

        if p < n && enter_free >= enter_cap {
            free.add(values[p].widen());
            p += 1;
        } else {
            free.add(-values[q].widen());
            q += 1;
        }
    }

    // Only reachable when rounding kept `level` just below `n·hi`.
    let t = values[n - 1].widen() - hi;
    Thresholds::new(t, lo, hi, n, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summation::{KahanSum, PlainSum};

    fn project(values: &[f64], th: &Thresholds<f64>) -> [f64; 8] {
        let mut out = [0.0; 8];
        for (o, &v) in out.iter_mut().zip(values) {
            *o = th.clamp(v);
        }
        out
    }

    #[test]
    fn test_simplex_projection_of_ramp() {
        let a = [2.0_f64, 1.0, 0.0];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, 1.0, &KahanSum);
        assert!((th.t - 1.0).abs() < 1e-12, "t = {}", th.t);
        let x = project(&a, &th);
        assert_eq!(&x[..3], &[1.0, 0.0, 0.0]);
        assert_eq!((th.first, th.last), (0, 1));
    }

    #[test]
    fn test_equality_hits_target_with_caps() {
        let a = [5.0_f64, 4.0, 0.3, 0.2, -1.0];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, 2.5, &KahanSum);
        let x = project(&a, &th);
        let sum: f64 = x[..5].iter().sum();
        assert!((sum - 2.5).abs() < 1e-12, "sum = {}", sum);
        assert_eq!(x[0], 1.0);
        assert_eq!(x[1], 1.0);
        assert_eq!(th.num_upper(), 2);
        assert!(x[4] == 0.0);
    }

    #[test]
    fn test_collapsed_box_sends_everything_to_lo() {
        let a = [3.0_f64, -2.0, 0.7];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.4, 0.1, 5.0, &KahanSum);
        let x = project(&a, &th);
        assert_eq!(&x[..3], &[0.4, 0.4, 0.4]);
    }

    #[test]
    fn test_unreachable_target_saturates_high() {
        let a = [0.1_f64, -3.0, 0.2];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, 10.0, &KahanSum);
        let x = project(&a, &th);
        assert_eq!(&x[..3], &[1.0, 1.0, 1.0]);
        assert_eq!(th.num_upper(), 3);
    }

    #[test]
    fn test_unreachable_target_saturates_low() {
        let a = [0.1_f64, 3.0, 0.2];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, -1.0, &KahanSum);
        let x = project(&a, &th);
        assert_eq!(&x[..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unbounded_cap_is_plain_simplex() {
        let a = [0.5_f64, 0.5, 0.5];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, f64::INFINITY, 1.0, &KahanSum);
        let x = project(&a, &th);
        for &xi in &x[..3] {
            assert!((xi - 1.0 / 3.0).abs() < 1e-12, "x_i = {}", xi);
        }
    }

    #[test]
    fn test_equality_can_raise_mass() {
        // Σ a < rhs with an infinite cap: every coordinate is shifted up.
        let a = [0.1_f64, -0.1];
        let mut buf = a;
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, f64::INFINITY, 2.0, &PlainSum);
        let x = project(&a, &th);
        assert!((x[0] - 1.1).abs() < 1e-12);
        assert!((x[1] - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_inequality_inactive_keeps_clamped_input() {
        let a = [0.2_f64, -0.5, 0.3, 1.7];
        let mut buf = a;
        let th = thresholds_le::<f64, f64, _>(&mut buf, 0.0, 1.0, 3.0, &KahanSum);
        assert_eq!(th.t, 0.0);
        assert_eq!((th.first, th.last), (1, 3));
        let x = project(&a, &th);
        assert_eq!(&x[..4], &[0.2, 0.0, 0.3, 1.0]);
    }

    #[test]
    fn test_inequality_active_matches_equality() {
        let a = [0.9_f64, 0.8, 0.7];
        let mut b1 = a;
        let mut b2 = a;
        let le = thresholds_le::<f64, f64, _>(&mut b1, 0.0, 1.0, 1.0, &KahanSum);
        let eq = thresholds_eq::<f64, f64, _>(&mut b2, 0.0, 1.0, 1.0, &KahanSum);
        assert_eq!(le, eq);
    }

    #[test]
    fn test_simplex_already_inside() {
        let a = [0.2_f64, 0.3, 0.1];
        let mut buf = a;
        let th = thresholds_simplex::<f64, f64, _>(&mut buf, 1.0, &KahanSum);
        let x = project(&a, &th);
        assert_eq!(&x[..3], &a);
    }

    #[test]
    fn test_buffer_left_in_block_order() {
        let mut buf = [0.1_f64, 4.0, -2.0, 0.6, 3.0];
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, 2.3, &KahanSum);
        assert_eq!((th.first, th.last), (2, 3));
        for i in 0..th.first {
            assert!(buf[i] - th.t >= th.hi);
        }
        for i in th.first..th.last {
            let y = buf[i] - th.t;
            assert!(y > th.lo && y < th.hi, "free element {} maps to {}", buf[i], y);
        }
        for i in th.last..buf.len() {
            assert!(buf[i] - th.t <= th.lo);
        }
    }

    #[test]
    fn test_empty_input() {
        let mut buf: [f64; 0] = [];
        let th = thresholds_eq::<f64, f64, _>(&mut buf, 0.0, 1.0, 1.0, &KahanSum);
        assert_eq!((th.first, th.last), (0, 0));
    }
}
