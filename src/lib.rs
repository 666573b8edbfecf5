//! # prox-topk
//!
//! Euclidean projections onto the constraint sets of top-k multiclass
//! training: the simplex, the knapsack polytope, the top-k cone and the top-k
//! simplex.
//!
//! ---
//!
//! ## Where this sits
//!
//! Dual coordinate ascent visits one training example at a time, takes a
//! gradient step on that example's per-class dual variables, and maps them
//! back onto the feasible set. That last step is a Euclidean projection:
//!
//! ```text
//! x* = argmin ½‖x − a‖²  over  C
//! ```
//!
//! It runs once per example per epoch, so it has to be exact, allocation-free
//! and O(n log n). Every projection here has the form
//! `x_i = clamp(a_i − t, lo, hi)`; the work is finding `t`.
//!
//! ## The sets
//!
//! | Set | Constraints |
//! |-----|-------------|
//! | knapsack | `lo ≤ x_i ≤ hi`, `Σx = rhs` or `Σx ≤ rhs` |
//! | simplex | `x ≥ 0`, `Σx ≤ rhs` |
//! | top-k cone | `x ≥ 0`, `x_i ≤ Σx / k` |
//! | top-k simplex | `x ≥ 0`, `x_i ≤ Σx / k`, `Σx ≤ rhs` |
//!
//! ## The pipeline
//!
//! ```text
//! Projector ─→ Strategy ─→ topk_simplex ─→ topk_cone / knapsack ─→ Summation
//!    │                                                                  ↑
//!    └── scratch copy, clamp(a − t, lo, hi) written back    PlainSum / KahanSum
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`summation`] | [`Summation`], [`KahanSum`], [`PlainSum`] | Plain and compensated running sums |
//! | [`thresholds`] | [`Thresholds`] | `(t, lo, hi)` plus the capped/free/lower block boundaries |
//! | [`knapsack`] | | Box + sum constraint, equality and inequality |
//! | [`topk_cone`] | [`topk_cone::ConeCase`] | Zero/constant shortcuts and the general search |
//! | [`topk_simplex`] | | Cone ∩ sum bound by case dispatch |
//! | [`projector`] | [`Projector`], [`Strategy`], [`Verbosity`] | In-place, scratch and batch drivers |
//! | [`error`] | [`ProjectionError`] | Parameter and shape validation |
//!
//! ## Features
//!
//! - `alloc` (default): [`Projector::project`], which allocates its own scratch.
//! - `std`: std-backed float intrinsics.
//! - `serde`: serialisable strategies, projector configuration and thresholds.
//! - `parallel`: rayon batch driver, one scratch column per worker.
//! - `python-ffi`: PyO3 module `prox_topk`.
//!
//! Without `std` the crate is `no_std`; without `alloc` it never touches the heap.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod knapsack;
pub mod num;
pub mod projector;
pub mod summation;
pub mod thresholds;
pub mod topk_cone;
pub mod topk_simplex;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use error::{check_finite, ProjectionError};
pub use num::{Element, Real};
pub use projector::{Projector, Strategy, Verbosity};
pub use summation::{KahanSum, PlainSum, RunningSum, Summation};
pub use thresholds::Thresholds;
