//! Partitioned inserts that must never collide.
//!
//! Each worker inserts into its own key partition. A duplicate-key error
//! inside a partition would mean two workers shared an identity or the
//! store mixed up keyspaces; the audit state cross-checks the partition
//! size against the worker's own insert count.

use crate::errors::{HarnessResult, StateError, StoreError};
use crate::fsm::WorkerContext;
use crate::workload::{DynWorkload, Workload};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct InsertData {
    inserted: u64,
}

pub fn workload() -> HarnessResult<DynWorkload> {
    let workload = Workload::builder("exclusive_inserts", InsertData::default())
        .threads(8)
        .iterations(250)
        .state("init", |cx: &WorkerContext, _data: &mut InsertData| {
            let prefix = format!("p{}_", cx.worker_id());
            let existing = cx.collection()?.keys_with_prefix(&prefix)?;
            if !existing.is_empty() {
                return Err(StateError::Assertion(format!(
                    "partition '{}' already holds {} keys at worker start",
                    prefix,
                    existing.len()
                )));
            }
            Ok(())
        })
        .state("insert", |cx: &WorkerContext, data: &mut InsertData| {
            let key = format!("p{}_{:06}", cx.worker_id(), data.inserted);
            match cx.collection()?.insert(&key, json!({"seq": data.inserted})) {
                Ok(()) => {
                    data.inserted += 1;
                    Ok(())
                }
                Err(StoreError::DuplicateKey { .. }) => Err(StateError::Assertion(format!(
                    "key '{}' already present in an exclusive partition",
                    key
                ))),
                Err(err) => Err(err.into()),
            }
        })
        .state("audit", |cx: &WorkerContext, data: &mut InsertData| {
            let prefix = format!("p{}_", cx.worker_id());
            let count = cx.collection()?.keys_with_prefix(&prefix)?.len() as u64;
            if count != data.inserted {
                return Err(StateError::Assertion(format!(
                    "partition '{}' holds {} keys but this worker inserted {}",
                    prefix, count, data.inserted
                )));
            }
            Ok(())
        })
        .transition("init", "insert", 1.0)
        .transition("insert", "insert", 4.0)
        .transition("insert", "audit", 1.0)
        .transition("audit", "insert", 1.0)
        .build()?;
    Ok(Arc::new(workload))
}
