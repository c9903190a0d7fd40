//! Scans racing writers and deleters over a bounded keyspace.
//!
//! Writers upsert and delete within a fixed set of keys while scanners
//! take snapshots. A snapshot must never contain a torn or malformed
//! document, and can never hold more keys than the keyspace allows.
//! Deletes race each other by design; losing one is expected.

use crate::errors::{HarnessResult, StateError, StateResult, StoreError};
use crate::fsm::WorkerContext;
use crate::workload::{DynWorkload, Workload};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ScanData {
    keyspace: usize,
}

impl Default for ScanData {
    fn default() -> Self {
        Self { keyspace: 32 }
    }
}

fn write_document(cx: &WorkerContext, data: &mut ScanData) -> StateResult {
    let key = format!("k{:02}", cx.gen_index(data.keyspace));
    cx.collection()?.upsert(
        &key,
        json!({
            "worker": cx.worker_id(),
            "value": cx.gen_range(0, 1_000_000),
        }),
    )?;
    Ok(())
}

pub fn workload() -> HarnessResult<DynWorkload> {
    let workload = Workload::builder("scan_churn", ScanData::default())
        .threads(8)
        .iterations(200)
        .state("init", write_document)
        .state("write", write_document)
        .state("delete", |cx: &WorkerContext, data: &mut ScanData| {
            let key = format!("k{:02}", cx.gen_index(data.keyspace));
            match cx.collection()?.remove(&key) {
                Ok(_) => Ok(()),
                // Another deleter got there first; that race is the point.
                Err(StoreError::KeyNotFound { .. }) => Ok(()),
                Err(err) => Err(err.into()),
            }
        })
        .state("scan", |cx: &WorkerContext, data: &mut ScanData| {
            let snapshot = cx.collection()?.scan()?;
            if snapshot.len() > data.keyspace {
                return Err(StateError::Assertion(format!(
                    "snapshot holds {} keys but the keyspace is {}",
                    snapshot.len(),
                    data.keyspace
                )));
            }
            for (key, document) in snapshot {
                if document["worker"].as_u64().is_none() || document["value"].as_u64().is_none() {
                    return Err(StateError::Assertion(format!(
                        "snapshot caught a malformed document at '{}': {}",
                        key, document
                    )));
                }
            }
            Ok(())
        })
        .transition("init", "write", 1.0)
        .transition("write", "write", 4.0)
        .transition("write", "delete", 2.0)
        .transition("write", "scan", 2.0)
        .transition("delete", "write", 3.0)
        .transition("delete", "scan", 1.0)
        .transition("scan", "write", 2.0)
        .transition("scan", "delete", 1.0)
        .build()?;
    Ok(Arc::new(workload))
}
