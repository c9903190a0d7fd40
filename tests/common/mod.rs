//! Common Test Utilities
//!
//! Shared helpers used across the test suite: unique run identifiers so
//! parallel tests never share a collection namespace, and ready-made
//! deterministic workload fixtures. Not every harness uses every helper.
#![allow(dead_code)]

use fsm_harness::scheduler::{RunOptions, Runner};
use fsm_harness::store::Store;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global test counter for generating unique run identifiers
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique run id for a given test
///
/// Combines the test name, process id, an atomic counter and a timestamp
/// so no two tests ever share a collection namespace, even when running
/// in parallel.
pub fn unique_run_id(test_name: &str) -> String {
    let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!(
        "{}_{}_{}_{}",
        test_name,
        std::process::id(),
        unique_id,
        timestamp
    )
}

/// A fresh store, a runner over it, and run options with a unique run id.
pub fn test_runner(test_name: &str) -> (Arc<Store>, Runner, RunOptions) {
    let store = Arc::new(Store::new());
    let runner = Runner::new(Arc::clone(&store));
    let options = RunOptions::new(unique_run_id(test_name));
    (store, runner, options)
}

/// The collection namespace a workload gets within a run.
pub fn namespace(options: &RunOptions, workload: &str) -> String {
    format!("{}_{}", options.run_id, workload)
}

/// Deterministic workload fixtures
pub mod fixtures;
