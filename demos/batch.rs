//! # Batch projection inside a dual coordinate ascent loop
//!
//! Simulates the inner step of top-k multiclass training: a `classes × examples`
//! matrix of dual variables is nudged by a pseudo-gradient each epoch and
//! every column is projected back onto the top-k simplex.
//!
//! Run with `--features parallel` to use the rayon driver as well.

use prox_topk::{Projector, Strategy, Verbosity};

const CLASSES: usize = 10;
const EXAMPLES: usize = 2_000;
const EPOCHS: usize = 5;

// ── Deterministic pseudo-gradient ────────────────────────────────────────────

/// Small linear congruential generator, enough for repeatable noise.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn step(duals: &mut [f64], rng: &mut Lcg, epoch: usize) {
    let rate = 1.0 / (epoch as f64 + 1.0);
    for (i, d) in duals.iter_mut().enumerate() {
        let class = i % CLASSES;
        let bias = if class < 3 { 0.4 } else { -0.1 };
        *d += rate * (bias + rng.next_f64() - 0.5);
    }
}

// ── Column statistics ────────────────────────────────────────────────────────

fn summarize(duals: &[f64], k: usize) {
    let mut mass = 0.0;
    let mut support = 0usize;
    let mut worst_cap = 0.0_f64;
    for column in duals.chunks_exact(CLASSES) {
        let total: f64 = column.iter().sum();
        let max = column.iter().cloned().fold(0.0, f64::max);
        mass += total;
        support += column.iter().filter(|&&v| v > 0.0).count();
        worst_cap = worst_cap.max(max - total / k as f64);
    }
    let n = (duals.len() / CLASSES) as f64;
    println!(
        "  mean Σ = {:.4}   mean support = {:.2}   max(x_i − Σx/k) = {:+.2e}",
        mass / n,
        support as f64 / n,
        worst_cap
    );
}

fn main() {
    let k = 3;
    let projector = Projector::new(Strategy::TopKSimplex { k, rhs: 1.0 }).with_verbosity(Verbosity::Summary);
    if let Err(e) = projector.strategy.validate(CLASSES) {
        eprintln!("invalid configuration: {}", e);
        return;
    }

    let mut rng = Lcg(0x5eed);
    let mut duals = vec![0.0_f64; CLASSES * EXAMPLES];
    let mut scratch = vec![0.0_f64; CLASSES];

    println!("top-{} simplex, {} classes × {} examples", k, CLASSES, EXAMPLES);
    for epoch in 0..EPOCHS {
        step(&mut duals, &mut rng, epoch);
        match projector.project_columns(CLASSES, &mut duals, &mut scratch) {
            Ok(columns) => print!("epoch {} ({} columns)", epoch, columns),
            Err(e) => {
                eprintln!("projection failed: {}", e);
                return;
            }
        }
        summarize(&duals, k);
    }

    #[cfg(feature = "parallel")]
    {
        let mut par = duals.clone();
        step(&mut duals, &mut rng, EPOCHS);
        par.copy_from_slice(&duals);
        let seq_result = projector.project_columns(CLASSES, &mut duals, &mut scratch);
        let par_result = projector.par_project_columns(CLASSES, &mut par);
        match (seq_result, par_result) {
            (Ok(_), Ok(_)) => println!("parallel driver agrees: {}", duals == par),
            (Err(e), _) | (_, Err(e)) => eprintln!("projection failed: {}", e),
        }
    }
}
