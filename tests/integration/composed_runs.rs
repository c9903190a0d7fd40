//! Composed-mode runs: workloads interleaved within shared threads.

use crate::common::{fixtures, namespace, test_runner};
use fsm_harness::scheduler::RunMode;

#[test]
fn test_composed_run_interleaves_both_workloads() {
    let (store, runner, mut options) = test_runner("composed_pair");
    options.mode = RunMode::Composed;
    options.seed = 99;
    let first = fixtures::counting_workload("first", 3, 200);
    let second = fixtures::counting_workload("second", 2, 200);

    let report = runner.run(&[first, second], &options).unwrap();

    assert!(report.succeeded(), "failures: {:?}", report.failures);
    // Shared pool: the larger thread request wins
    assert_eq!(report.workers_requested, 3);
    assert_eq!(report.workers_spawned, 3);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].threads_granted, 3);
    assert_eq!(report.outcomes[1].threads_granted, 3);

    // Every thread performs max(iterations) interleaved steps in total
    let total: u64 = report
        .outcomes
        .iter()
        .map(|o| o.iterations_completed)
        .sum();
    assert_eq!(total, 3 * 200);
    // With equal weights over 200 draws, both members get stepped
    assert!(report.outcomes.iter().all(|o| o.iterations_completed > 0));

    // Each member keeps its own namespace
    assert!(store
        .existing_collection(&namespace(&options, "first"))
        .is_ok());
    assert!(store
        .existing_collection(&namespace(&options, "second"))
        .is_ok());
}

#[test]
fn test_composed_selection_follows_iteration_weights() {
    let (_store, runner, mut options) = test_runner("composed_weights");
    options.mode = RunMode::Composed;
    options.seed = 7;
    // 9:1 iteration weighting
    let heavy = fixtures::counting_workload("heavy", 2, 900);
    let light = fixtures::counting_workload("light", 2, 100);

    let report = runner.run(&[heavy, light], &options).unwrap();

    assert!(report.succeeded());
    let heavy_iters = report.outcomes[0].iterations_completed as f64;
    let light_iters = report.outcomes[1].iterations_completed as f64;
    let heavy_share = heavy_iters / (heavy_iters + light_iters);
    assert!(
        heavy_share > 0.85 && heavy_share < 0.95,
        "heavy share = {}",
        heavy_share
    );
}

#[test]
fn test_composed_thread_pool_respects_cap() {
    let (_store, runner, mut options) = test_runner("composed_cap");
    options.mode = RunMode::Composed;
    options.thread_cap = 2;
    let first = fixtures::counting_workload("first", 8, 50);
    let second = fixtures::counting_workload("second", 4, 50);

    let report = runner.run(&[first, second], &options).unwrap();
    assert_eq!(report.workers_requested, 2);
    assert_eq!(report.workers_spawned, 2);
}

#[test]
fn test_composed_failure_stops_the_worker() {
    let (_store, runner, mut options) = test_runner("composed_failure");
    options.mode = RunMode::Composed;
    options.seed = 3;
    let healthy = fixtures::counting_workload("healthy", 2, 100);
    let broken = fixtures::failing_workload("broken", 2, 100, 3);

    let report = runner.run(&[healthy, broken], &options).unwrap();

    assert!(!report.succeeded());
    // Both shared workers hit the broken member's third tick eventually
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.workload == "broken"));
}
