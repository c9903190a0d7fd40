//! Deterministic workload fixtures for scheduler and report tests.

use fsm_harness::errors::{StateError, StateResult};
use fsm_harness::fsm::{SetupContext, WorkerContext};
use fsm_harness::workload::{DynWorkload, Workload};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CountingData {
    pub ticks: u64,
}

/// Two-state workload where every worker counts its ticks both in its
/// thread data and in a per-worker store document.
pub fn counting_workload(name: &str, threads: u32, iterations: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, CountingData::default())
            .threads(threads)
            .iterations(iterations)
            .state("init", |cx: &WorkerContext, _data: &mut CountingData| {
                cx.collection()?
                    .upsert(&format!("worker_{}", cx.worker_id()), json!({"ticks": 0}))?;
                Ok(())
            })
            .state("tick", |cx: &WorkerContext, data: &mut CountingData| {
                data.ticks += 1;
                cx.collection()?
                    .update(&format!("worker_{}", cx.worker_id()), |doc| {
                        let ticks = doc["ticks"].as_u64().unwrap_or(0);
                        doc["ticks"] = json!(ticks + 1);
                    })?;
                Ok(())
            })
            .transition("init", "tick", 1.0)
            .transition("tick", "tick", 1.0)
            .build()
            .expect("counting workload fixture is valid"),
    )
}

fn record_visit(cx: &WorkerContext, state: &str) -> StateResult {
    let key = format!("trace_w{}", cx.worker_id());
    let collection = cx.collection()?;
    if !collection.contains(&key)? {
        collection.upsert(&key, json!({"seq": []}))?;
    }
    collection.update(&key, |doc| {
        if let Some(seq) = doc["seq"].as_array_mut() {
            seq.push(json!(state));
        }
    })?;
    Ok(())
}

/// Three-state workload that records every visited state per worker, so
/// tests can compare full state sequences across runs.
pub fn tracing_workload(name: &str, threads: u32, iterations: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, ())
            .threads(threads)
            .iterations(iterations)
            .state("a", |cx: &WorkerContext, _data: &mut ()| {
                record_visit(cx, "a")
            })
            .state("b", |cx: &WorkerContext, _data: &mut ()| {
                record_visit(cx, "b")
            })
            .state("c", |cx: &WorkerContext, _data: &mut ()| {
                record_visit(cx, "c")
            })
            .transition("a", "b", 2.0)
            .transition("a", "c", 1.0)
            .transition("b", "a", 1.0)
            .transition("b", "c", 3.0)
            .transition("c", "a", 1.0)
            .transition("c", "b", 1.0)
            .build()
            .expect("tracing workload fixture is valid"),
    )
}

/// Workload whose workers all fail deterministically at `fail_at` ticks.
pub fn failing_workload(name: &str, threads: u32, iterations: u64, fail_at: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, CountingData::default())
            .threads(threads)
            .iterations(iterations)
            .state("work", move |_cx: &WorkerContext, data: &mut CountingData| {
                data.ticks += 1;
                if data.ticks == fail_at {
                    return Err(StateError::Assertion(format!(
                        "deliberate failure at tick {}",
                        fail_at
                    )));
                }
                Ok(())
            })
            .transition("work", "work", 1.0)
            .teardown(|cx: &SetupContext, _data: &mut CountingData| {
                cx.collection()?.upsert("teardown_ran", json!(true))?;
                Ok(())
            })
            .build()
            .expect("failing workload fixture is valid"),
    )
}

/// Workload whose workers panic on their third tick.
pub fn panicking_workload(name: &str, threads: u32, iterations: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, CountingData::default())
            .threads(threads)
            .iterations(iterations)
            .state("work", |_cx: &WorkerContext, data: &mut CountingData| {
                data.ticks += 1;
                if data.ticks == 3 {
                    panic!("fixture panic on tick 3");
                }
                Ok(())
            })
            .transition("work", "work", 1.0)
            .build()
            .expect("panicking workload fixture is valid"),
    )
}

/// Workload whose setup hook always fails.
pub fn setup_failing_workload(name: &str) -> DynWorkload {
    Arc::new(
        Workload::builder(name, ())
            .threads(2)
            .iterations(10)
            .setup(|_cx: &SetupContext, _data: &mut ()| Err(StateError::Other("setup exploded".to_string())))
            .state("work", |_cx: &WorkerContext, _data: &mut ()| Ok(()))
            .transition("work", "work", 1.0)
            .build()
            .expect("setup-failing workload fixture is valid"),
    )
}

/// Workload that leaves a teardown marker, then fails the teardown.
pub fn teardown_failing_workload(name: &str, threads: u32, iterations: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, ())
            .threads(threads)
            .iterations(iterations)
            .state("work", |_cx: &WorkerContext, _data: &mut ()| Ok(()))
            .transition("work", "work", 1.0)
            .teardown(|cx: &SetupContext, _data: &mut ()| {
                cx.collection()?.upsert("teardown_ran", json!(true))?;
                Err(StateError::Other("teardown exploded".to_string()))
            })
            .build()
            .expect("teardown-failing workload fixture is valid"),
    )
}

/// Workload whose every state sleeps, for timeout tests.
pub fn sleepy_workload(name: &str, threads: u32, iterations: u64, delay: Duration) -> DynWorkload {
    Arc::new(
        Workload::builder(name, ())
            .threads(threads)
            .iterations(iterations)
            .state("sleep", move |_cx: &WorkerContext, _data: &mut ()| {
                std::thread::sleep(delay);
                Ok(())
            })
            .transition("sleep", "sleep", 1.0)
            .build()
            .expect("sleepy workload fixture is valid"),
    )
}

/// Setup seeds a value into the data prototype; states assert every
/// worker observed it. Exercises the setup-then-clone contract.
pub fn seeded_data_workload(name: &str, threads: u32, iterations: u64) -> DynWorkload {
    Arc::new(
        Workload::builder(name, CountingData::default())
            .threads(threads)
            .iterations(iterations)
            .setup(|_cx: &SetupContext, data: &mut CountingData| {
                data.ticks = 1000;
                Ok(())
            })
            .state("check", |_cx: &WorkerContext, data: &mut CountingData| {
                if data.ticks < 1000 {
                    return Err(StateError::Assertion(format!(
                        "worker data missing setup seed: {}",
                        data.ticks
                    )));
                }
                data.ticks += 1;
                Ok(())
            })
            .transition("check", "check", 1.0)
            .build()
            .expect("seeded data workload fixture is valid"),
    )
}
