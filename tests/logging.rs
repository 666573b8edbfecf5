//! Verbosity gating of the driver's `log` records.
//!
//! The logger is process-global, so every level is exercised from a single
//! test in its own binary.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use prox_topk::{Projector, Strategy, Verbosity};

// ── Capturing logger ─────────────────────────────────────────────────────────

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

struct Capture;

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture;

fn drain() -> Vec<(Level, String)> {
    std::mem::take(&mut *RECORDS.lock().unwrap())
}

fn run_batch(verbosity: Verbosity) -> Vec<(Level, String)> {
    let projector = Projector::new(Strategy::TopKSimplex { k: 1, rhs: 1.0_f64 }).with_verbosity(verbosity);
    let mut data = vec![2.0, 1.0, 0.0, 0.5, 0.5, 0.5];
    let mut scratch = vec![0.0; 3];
    drain();
    projector.project_columns(3, &mut data, &mut scratch).unwrap();
    drain()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_verbosity_gates_log_records() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    // Quiet: nothing, even with the logger accepting every level.
    assert!(run_batch(Verbosity::Quiet).is_empty());

    // Summary: exactly one debug record for the batch.
    let summary = run_batch(Verbosity::Summary);
    assert_eq!(summary.len(), 1, "records: {:?}", summary);
    assert_eq!(summary[0].0, Level::Debug);
    assert!(
        summary[0].1.contains("topk-simplex") && summary[0].1.contains("2 columns"),
        "message: {}",
        summary[0].1
    );

    // Trace: one trace record per column, then the batch summary.
    let trace = run_batch(Verbosity::Trace);
    let levels: Vec<Level> = trace.iter().map(|(level, _)| *level).collect();
    assert_eq!(levels, vec![Level::Trace, Level::Trace, Level::Debug], "records: {:?}", trace);
    assert!(trace[0].1.contains("capped"), "message: {}", trace[0].1);

    // Single-vector projection only ever emits the per-column record.
    let projector = Projector::<f64>::new(Strategy::TopKCone { k: 2 }).with_verbosity(Verbosity::Trace);
    let mut x = [1.0_f64, 0.1, 0.1];
    let mut scratch = [0.0; 3];
    drain();
    projector.project_with_scratch(&mut x, &mut scratch).unwrap();
    let single = drain();
    assert_eq!(single.len(), 1, "records: {:?}", single);
    assert!(single[0].1.starts_with("topk-cone"), "message: {}", single[0].1);
}
