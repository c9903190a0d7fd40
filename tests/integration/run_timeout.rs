//! Driving the blocking scheduler from async with a deadline, the way
//! the run command does.

use crate::common::{fixtures, test_runner};
use std::time::Duration;

#[tokio::test]
async fn test_slow_run_hits_the_deadline() {
    let (_store, runner, options) = test_runner("timeout_slow");
    // 100 iterations x 10ms per state: roughly a second of work
    let workload = fixtures::sleepy_workload("sleepy", 1, 100, Duration::from_millis(10));

    let outcome = tokio::time::timeout(
        Duration::from_millis(100),
        tokio::task::spawn_blocking(move || runner.run(&[workload], &options)),
    )
    .await;

    assert!(outcome.is_err(), "expected the deadline to expire");
}

#[tokio::test]
async fn test_fast_run_completes_within_the_deadline() {
    let (_store, runner, options) = test_runner("timeout_fast");
    let workload = fixtures::counting_workload("count", 2, 20);

    let outcome = tokio::time::timeout(
        Duration::from_secs(30),
        tokio::task::spawn_blocking(move || runner.run(&[workload], &options)),
    )
    .await;

    let report = outcome
        .expect("deadline should not expire")
        .expect("spawn_blocking should not panic")
        .expect("run should succeed");
    assert!(report.succeeded());
}
