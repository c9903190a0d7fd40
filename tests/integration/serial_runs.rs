//! Serial-mode runs: one workload at a time.

use crate::common::{fixtures, namespace, test_runner};

#[test]
fn test_single_workload_run() {
    let (store, runner, options) = test_runner("serial_single");
    let workload = fixtures::counting_workload("count", 4, 50);

    let report = runner.run(&[workload], &options).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.workers_requested, 4);
    assert_eq!(report.workers_spawned, 4);
    assert_eq!(report.outcomes.len(), 1);

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.name, "count");
    assert_eq!(outcome.threads_granted, 4);
    assert_eq!(outcome.iterations_completed, 4 * 50);
    // Every worker runs init exactly once, then ticks
    assert_eq!(outcome.state_counts["init"], 4);
    assert_eq!(outcome.state_counts["tick"], 4 * 49);

    // The store agrees with the tallies
    let collection = store
        .existing_collection(&namespace(&options, "count"))
        .unwrap();
    let total_ticks: u64 = collection
        .scan()
        .unwrap()
        .iter()
        .map(|(_, doc)| doc["ticks"].as_u64().unwrap_or(0))
        .sum();
    assert_eq!(total_ticks, 4 * 49);
}

#[test]
fn test_serial_workloads_get_distinct_namespaces() {
    let (store, runner, options) = test_runner("serial_pair");
    let first = fixtures::counting_workload("first", 2, 20);
    let second = fixtures::counting_workload("second", 3, 20);

    let report = runner.run(&[first, second], &options).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.workers_requested, 5);

    let first_coll = store
        .existing_collection(&namespace(&options, "first"))
        .unwrap();
    let second_coll = store
        .existing_collection(&namespace(&options, "second"))
        .unwrap();
    assert_eq!(first_coll.len().unwrap(), 2);
    assert_eq!(second_coll.len().unwrap(), 3);
}

#[test]
fn test_serial_workers_have_unique_ordinals() {
    let (store, runner, options) = test_runner("serial_ordinals");
    let first = fixtures::counting_workload("first", 2, 10);
    let second = fixtures::counting_workload("second", 2, 10);

    runner.run(&[first, second], &options).unwrap();

    // Worker documents are keyed by global ordinal; between the two
    // workloads all four keys must be distinct.
    let mut keys = Vec::new();
    for name in ["first", "second"] {
        let collection = store
            .existing_collection(&namespace(&options, name))
            .unwrap();
        keys.extend(collection.keys().unwrap());
    }
    let before = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), before);
}

#[test]
fn test_setup_seed_visible_to_every_worker() {
    let (_store, runner, options) = test_runner("serial_seeded");
    let workload = fixtures::seeded_data_workload("seeded", 4, 25);

    let report = runner.run(&[workload], &options).unwrap();
    assert!(report.succeeded(), "failures: {:?}", report.failures);
}

#[test]
fn test_zero_iteration_override_still_runs_lifecycle() {
    let (store, runner, mut options) = test_runner("serial_zero");
    options.iterations_override = Some(0);
    // failing_workload would fail on its fifth tick, but with zero
    // iterations only setup/teardown run
    let workload = fixtures::failing_workload("idle", 3, 100, 5);

    let report = runner.run(&[workload], &options).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.workers_spawned, 3);
    assert_eq!(report.outcomes[0].iterations_completed, 0);
    let collection = store
        .existing_collection(&namespace(&options, "idle"))
        .unwrap();
    assert!(collection.contains("teardown_ran").unwrap());
}

#[test]
fn test_iterations_override_applies() {
    let (_store, runner, mut options) = test_runner("serial_override");
    options.iterations_override = Some(7);
    let workload = fixtures::counting_workload("count", 2, 1000);

    let report = runner.run(&[workload], &options).unwrap();
    assert_eq!(report.outcomes[0].iterations_completed, 2 * 7);
}
