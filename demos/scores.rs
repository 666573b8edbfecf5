//! # Projecting one score vector
//!
//! Walks a single vector of class scores through every supported set and
//! prints the projection, its mass and the active set reported by the
//! thresholds.

use prox_topk::{PlainSum, Projector, Strategy};

// ── Display helpers ──────────────────────────────────────────────────────────

fn row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:>7.4}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn show(label: &str, strategy: Strategy<f64>, scores: &[f64]) {
    let projector = Projector::new(strategy);
    let mut x = scores.to_vec();
    let mut scratch = vec![0.0; scores.len()];
    let result = strategy
        .validate(scores.len())
        .and_then(|()| projector.project_with_scratch(&mut x, &mut scratch));
    let th = match result {
        Ok(th) => th,
        Err(e) => {
            println!("  {:<26} error: {}", label, e);
            return;
        }
    };
    let mass: f64 = x.iter().sum();
    println!(
        "  {:<26} {}   Σ = {:.4}   t = {:>7.4}   capped {} / free {}",
        label,
        row(&x),
        mass,
        th.t,
        th.num_upper(),
        th.num_free()
    );
}

fn main() {
    let scores = [1.8, 0.9, 0.85, -0.3, 0.1, 1.2];

    println!("scores                       {}", row(&scores));
    println!();

    show("simplex Σ ≤ 1", Strategy::Simplex { rhs: 1.0 }, &scores);
    show("knapsack [0, .3], Σ = 1", Strategy::KnapsackEq { lo: 0.0, hi: 0.3, rhs: 1.0 }, &scores);
    show("knapsack [0, .3], Σ ≤ 4", Strategy::KnapsackLe { lo: 0.0, hi: 0.3, rhs: 4.0 }, &scores);
    for k in [1, 2, 3] {
        show(&format!("top-{} cone", k), Strategy::TopKCone { k }, &scores);
    }
    for k in [1, 2, 3, 6] {
        show(&format!("top-{} simplex Σ ≤ 1", k), Strategy::TopKSimplex { k, rhs: 1.0 }, &scores);
    }
    show("top-7 simplex (invalid k)", Strategy::TopKSimplex { k: 7, rhs: 1.0 }, &scores);

    // Compensation matters once prefix sums mix magnitudes.
    println!();
    let mut spread: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 1e8 } else { 1e-8 }).collect();
    spread[0] = 1e8 + 1.0;
    for (name, kahan) in [("plain", false), ("kahan", true)] {
        let mut x = spread.clone();
        let mut scratch = vec![0.0; x.len()];
        let strategy = Strategy::TopKSimplex { k: 100, rhs: 1e10 };
        let th = if kahan {
            Projector::new(strategy).project_with_scratch(&mut x, &mut scratch)
        } else {
            Projector::new(strategy)
                .with_summation(PlainSum)
                .project_with_scratch(&mut x, &mut scratch)
        };
        if let Ok(th) = th {
            let mass: f64 = x.iter().sum();
            println!("  {} summation: t = {:e}, hi = {:e}, Σ = {:e}", name, th.t, th.hi, mass);
        }
    }
}
