//! Insert/read/overwrite/remove churn over per-worker documents.
//!
//! Every worker owns its keys (prefixed with its worker id), so document
//! lookups must always succeed; a miss means the store lost a write.

use crate::errors::{HarnessResult, StateError, StateResult};
use crate::fsm::{SetupContext, WorkerContext};
use crate::workload::{DynWorkload, Workload};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct ChurnData {
    next_id: u64,
    /// Keys this worker currently has live in the collection.
    live: Vec<String>,
}

fn insert_document(cx: &WorkerContext, data: &mut ChurnData) -> StateResult {
    let key = format!("w{}_d{}", cx.worker_id(), data.next_id);
    cx.collection()?.insert(
        &key,
        json!({
            "worker": cx.worker_id(),
            "seq": data.next_id,
            "rev": 0,
        }),
    )?;
    data.next_id += 1;
    data.live.push(key);
    Ok(())
}

pub fn workload() -> HarnessResult<DynWorkload> {
    let workload = Workload::builder("crud_churn", ChurnData::default())
        .threads(8)
        .iterations(200)
        .state("init", insert_document)
        .state("insert", insert_document)
        .state("read", |cx: &WorkerContext, data: &mut ChurnData| {
            let Some(key) = cx.pick(&data.live).cloned() else {
                return Ok(());
            };
            let document = cx.collection()?.get(&key)?;
            let worker = document["worker"].as_u64();
            if worker != Some(cx.worker_id() as u64) {
                return Err(StateError::Assertion(format!(
                    "document '{}' belongs to worker {:?}, expected {}",
                    key,
                    worker,
                    cx.worker_id()
                )));
            }
            Ok(())
        })
        .state("overwrite", |cx: &WorkerContext, data: &mut ChurnData| {
            let Some(key) = cx.pick(&data.live).cloned() else {
                return Ok(());
            };
            cx.collection()?.update(&key, |document| {
                let rev = document["rev"].as_u64().unwrap_or(0);
                document["rev"] = json!(rev + 1);
            })?;
            Ok(())
        })
        .state("remove", |cx: &WorkerContext, data: &mut ChurnData| {
            if data.live.is_empty() {
                return Ok(());
            }
            let index = cx.gen_index(data.live.len());
            let key = data.live.swap_remove(index);
            cx.collection()?.remove(&key)?;
            Ok(())
        })
        .transition("init", "insert", 1.0)
        .transition("insert", "insert", 2.5)
        .transition("insert", "read", 3.0)
        .transition("insert", "overwrite", 2.5)
        .transition("insert", "remove", 2.0)
        .transition("read", "insert", 5.0)
        .transition("read", "overwrite", 3.0)
        .transition("read", "remove", 2.0)
        .transition("overwrite", "read", 4.0)
        .transition("overwrite", "insert", 4.0)
        .transition("overwrite", "remove", 2.0)
        .transition("remove", "insert", 6.0)
        .transition("remove", "read", 4.0)
        .teardown(|cx: &SetupContext, _data: &mut ChurnData| {
            // Threads are gone; whatever remains must still be well-formed.
            for (key, document) in cx.collection()?.scan()? {
                if document["worker"].as_u64().is_none() || document["seq"].as_u64().is_none() {
                    return Err(StateError::Assertion(format!(
                        "malformed document left behind at '{}'",
                        key
                    )));
                }
            }
            Ok(())
        })
        .build()?;
    Ok(Arc::new(workload))
}
