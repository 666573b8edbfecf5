/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Projection onto the top-k cone.
//!
//! ```text
//! min ½‖x − a‖²   s.t.   x ≥ 0,   x_i ≤ (1/k) Σ_j x_j
//! ```
//!
//! No coordinate may exceed `1/k` of the total mass, so at least `k`
//! coordinates carry it. The solution is `x_i = clamp(a_i − t, 0, hi)` with
//! `hi = Σx / k`. Let `U` be the `u` capped coordinates, `M` the `m` free
//! ones, and `A_U`, `A_M` their sums in `a`. Stationarity gives
//!
//! ```text
//! (k − u)·t  = u·hi − A_U
//! (k − u)·hi = A_M − m·t
//! ```
//!
//! hence, with `D = (k − u)² + u·m`,
//!
//! ```text
//! t  = (u·A_M − (k − u)·A_U) / D
//! hi = ((k − u)·A_M + m·A_U) / D
//! ```
//!
//! # Cases
//!
//! | Case | Condition | Solution |
//! |------|-----------|----------|
//! | zero | sum of the k largest `≤ 0` | `x = 0` |
//! | constant | all other entries `≤ a_(k) − hi`, `hi` = mean of the k largest | k largest at `hi`, rest 0 |
//! | general | otherwise | search over `u = 0..k` |
//!
//! The zero and constant cases need only the k-th order statistic and run in
//! O(n). The general search sorts and then scans.

use crate::num::{descending, sort_descending, Element, Real};
use crate::summation::{RunningSum, Summation};
use crate::thresholds::Thresholds;

/// Outcome of [`special_cases`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConeCase<R> {
    /// The origin is the projection.
    Zero(Thresholds<R>),
    /// The k largest entries share a uniform cap; everything else is zero.
    Constant(Thresholds<R>),
    /// Neither shortcut applies; run [`search`].
    General,
}

impl<R> ConeCase<R> {
    /// Thresholds of a resolved case, `None` for [`ConeCase::General`].
    pub fn resolved(self) -> Option<Thresholds<R>> {
        match self {
            Self::Zero(th) | Self::Constant(th) => Some(th),
            Self::General => None,
        }
    }
}

/// Clamp `k` into `[1, n]`.
#[inline]
pub(crate) fn effective_k(k: usize, n: usize) -> usize {
    k.clamp(1, n.max(1))
}

/// Detect the zero and constant cases in O(n).
///
/// Moves the k largest entries to the front of `values` (in no particular
/// order among themselves).
pub fn special_cases<T, R, S>(values: &mut [T], k: usize, summation: &S) -> ConeCase<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    let n = values.len();
    if n == 0 {
        return ConeCase::Zero(Thresholds::zero());
    }
    let k = effective_k(k, n);

    values.select_nth_unstable_by(k - 1, descending);
    let top = summation.sum(&values[..k], R::zero());
    if top <= R::zero() {
        return ConeCase::Zero(Thresholds::zero());
    }

    let hi = top / R::from_count(k);
    let t = values[k - 1].widen() - hi;
    let rest = values[k..]
        .iter()
        .fold(R::neg_infinity(), |acc, v| acc.max(v.widen()));
    if rest <= t {
        ConeCase::Constant(Thresholds::new(t, R::zero(), hi, k, k))
    } else {
        ConeCase::General
    }
}

/// General search over the number of capped coordinates.
///
/// Sorts `values` descending. For each `u` the free block is grown in sorted
/// order while the next entry lies above the running threshold; each added
/// entry pulls `t` towards itself, so the first entry at or below `t` ends
/// the block. The partition is accepted once the capped and free blocks agree
/// with `hi`.
///
/// Intended for inputs where [`special_cases`] returned
/// [`ConeCase::General`]; other inputs get the closest partition it finds.
pub fn search<T, R, S>(values: &mut [T], k: usize, summation: &S) -> Thresholds<R>
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
    sort_descending(values);

    let kr = R::from_count(k);
    let mut capped = RunningSum::new(*summation);
    let mut fallback = Thresholds::zero();

    for u in 0..k {
        if u > 0 {
            capped.add(values[u - 1].widen());
        }
        let a_u = capped.value();
        let ur = R::from_count(u);
        let gap = kr - ur;
        let gap_sq = gap * gap;

        let mut free = RunningSum::new(*summation);
        let mut m = 0;
        let mut t = -a_u / gap;
        while u + m < n {
            let v = values[u + m].widen();
            if v <= t {
                break;
            }
            free.add(v);
            m += 1;
            t = (ur * free.value() - gap * a_u) / (gap_sq + ur * R::from_count(m));
        }
        if m == 0 {
            continue;
        }

        let mr = R::from_count(m);
        let hi = (gap * free.value() + mr * a_u) / (gap_sq + ur * mr);
        let candidate = Thresholds::new(t, R::zero(), hi, u, u + m);

        let eps = R::epsilon() * hi.abs().max(R::one());
        let capped_ok = u == 0 || values[u - 1].widen() - t >= hi - eps;
        let free_ok = values[u].widen() - t <= hi + eps;
        if capped_ok && free_ok {
            return candidate;
        }
        fallback = candidate;
    }

    fallback
}

/// Thresholds for the top-k cone projection.
pub fn thresholds<T, R, S>(values: &mut [T], k: usize, summation: &S) -> Thresholds<R>
where
    T: Element<R>,
    R: Real,
    S: Summation<R>,
{
    match special_cases(values, k, summation).resolved() {
        Some(th) => th,
        None => search(values, k, summation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summation::KahanSum;

    fn project<const N: usize>(a: [f64; N], k: usize) -> [f64; N] {
        let mut buf = a;
        let th = thresholds::<f64, f64, _>(&mut buf, k, &KahanSum);
        a.map(|v| th.clamp(v))
    }

    fn assert_in_cone(x: &[f64], k: usize) {
        let s: f64 = x.iter().sum();
        for &v in x {
            assert!(v >= 0.0, "negative coordinate {}", v);
            assert!(v <= s / k as f64 + 1e-12, "coordinate {} exceeds cap {}", v, s / k as f64);
        }
    }

    #[test]
    fn test_zero_case_all_negative() {
        let mut buf = [-1.0_f64, -2.0, -3.0];
        assert_eq!(
            special_cases::<f64, f64, _>(&mut buf, 2, &KahanSum),
            ConeCase::Zero(Thresholds::zero())
        );
    }

    #[test]
    fn test_zero_case_with_positive_entry() {
        // With k = n = 2 the cone is the ray x1 = x2; (1, −10) projects to 0.
        let x = project([1.0, -10.0], 2);
        assert_eq!(x, [0.0, 0.0]);
    }

    #[test]
    fn test_k_one_is_positive_part() {
        let x = project([0.7, -0.2, 1.5, 0.0], 1);
        assert_eq!(x, [0.7, 0.0, 1.5, 0.0]);
    }

    #[test]
    fn test_constant_case_full_k_averages() {
        let mut buf = [2.0_f64, 1.0, 0.0];
        match special_cases::<f64, f64, _>(&mut buf, 3, &KahanSum) {
            ConeCase::Constant(th) => {
                assert!((th.hi - 1.0).abs() < 1e-12);
                assert_eq!((th.first, th.last), (3, 3));
            }
            other => panic!("expected constant case, got {:?}", other),
        }
        assert_eq!(project([2.0, 1.0, 0.0], 3), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_constant_case_with_dropped_tail() {
        // Two large entries, tail far below a_(2) − hi.
        let x = project([4.0, 2.0, -5.0], 2);
        assert_eq!(x, [3.0, 3.0, 0.0]);
    }

    #[test]
    fn test_general_case_with_one_capped() {
        let a = [1.0, 0.1, 0.1];
        let mut buf = a;
        assert_eq!(special_cases::<f64, f64, _>(&mut buf, 2, &KahanSum), ConeCase::General);
        let th = search::<f64, f64, _>(&mut buf, 2, &KahanSum);
        assert_eq!((th.first, th.last), (1, 3));
        assert!((th.t + 0.8 / 3.0).abs() < 1e-12, "t = {}", th.t);
        assert!((th.hi - 2.2 / 3.0).abs() < 1e-12, "hi = {}", th.hi);
        let x = project(a, 2);
        assert_in_cone(&x, 2);
    }

    #[test]
    fn test_general_case_nothing_capped() {
        // max(a, 0) already lies in the cone: t = 0, cap unused.
        let x = project([0.3, 0.3, 0.2, -1.0], 2);
        assert_eq!(x, [0.3, 0.3, 0.2, 0.0]);
    }

    #[test]
    fn test_oversized_k_is_clamped() {
        assert_eq!(project([2.0, 1.0, 0.0], 10), project([2.0, 1.0, 0.0], 3));
    }

    #[test]
    fn test_empty_input_is_zero() {
        let mut buf: [f64; 0] = [];
        assert_eq!(thresholds::<f64, f64, _>(&mut buf, 1, &KahanSum), Thresholds::zero());
    }
}
