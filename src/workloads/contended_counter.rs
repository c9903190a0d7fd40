//! All workers hammer a small fixed set of counters.
//!
//! Each increment also bumps the worker's own tally document, so teardown
//! can check that no read-modify-write was lost: the counters' grand
//! total must equal the sum of the tallies.

use crate::errors::{HarnessResult, StateError};
use crate::fsm::{SetupContext, WorkerContext};
use crate::workload::{DynWorkload, Workload};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CounterData {
    counters: usize,
}

impl Default for CounterData {
    fn default() -> Self {
        Self { counters: 8 }
    }
}

fn bump(document: &mut serde_json::Value, field: &str) {
    let value = document[field].as_i64().unwrap_or(0);
    document[field] = json!(value + 1);
}

pub fn workload() -> HarnessResult<DynWorkload> {
    let workload = Workload::builder("contended_counter", CounterData::default())
        .threads(8)
        .iterations(300)
        .setup(|cx: &SetupContext, data: &mut CounterData| {
            let collection = cx.collection()?;
            for index in 0..data.counters {
                collection.insert(&format!("counter_{}", index), json!({"value": 0}))?;
            }
            Ok(())
        })
        .state("init", |cx: &WorkerContext, _data: &mut CounterData| {
            cx.collection()?
                .upsert(&format!("tally_w{}", cx.worker_id()), json!({"count": 0}))?;
            Ok(())
        })
        .state("increment", |cx: &WorkerContext, data: &mut CounterData| {
            let collection = cx.collection()?;
            let counter = cx.gen_index(data.counters);
            collection.update(&format!("counter_{}", counter), |doc| bump(doc, "value"))?;
            collection.update(&format!("tally_w{}", cx.worker_id()), |doc| {
                bump(doc, "count")
            })?;
            Ok(())
        })
        .state("read", |cx: &WorkerContext, data: &mut CounterData| {
            let counter = cx.gen_index(data.counters);
            let document = cx.collection()?.get(&format!("counter_{}", counter))?;
            match document["value"].as_i64() {
                Some(value) if value >= 0 => Ok(()),
                other => Err(StateError::Assertion(format!(
                    "counter_{} holds {:?}, expected a non-negative integer",
                    counter, other
                ))),
            }
        })
        .transition("init", "increment", 1.0)
        .transition("increment", "increment", 7.0)
        .transition("increment", "read", 3.0)
        .transition("read", "increment", 1.0)
        .teardown(|cx: &SetupContext, data: &mut CounterData| {
            let collection = cx.collection()?;
            let mut counter_total = 0i64;
            for index in 0..data.counters {
                let document = collection.get(&format!("counter_{}", index))?;
                counter_total += document["value"].as_i64().unwrap_or(0);
            }
            let mut tally_total = 0i64;
            for key in collection.keys_with_prefix("tally_w")? {
                let document = collection.get(&key)?;
                tally_total += document["count"].as_i64().unwrap_or(0);
            }
            if counter_total != tally_total {
                return Err(StateError::Assertion(format!(
                    "counters total {} but worker tallies total {}: an increment was lost",
                    counter_total, tally_total
                )));
            }
            Ok(())
        })
        .build()?;
    Ok(Arc::new(workload))
}
