//! The per-thread FSM loop.

use crate::errors::{StateError, StateResult};
use crate::fsm::WorkerContext;
use crate::report::WorkerFailure;
use crate::workload::{AnyWorkload, ThreadData};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// What one worker hands back when it finishes: per-state execution
/// counts (index-aligned with the workload's state table) and the
/// failure that stopped it, if any.
#[derive(Debug)]
pub struct WorkerTally {
    pub worker_id: usize,
    pub workload: String,
    pub iterations_completed: u64,
    pub state_counts: Vec<u64>,
    pub failure: Option<WorkerFailure>,
}

/// Drive one workload FSM for `iterations` steps on the calling thread.
///
/// Each step executes the current state's handler and then picks the next
/// state by weighted random choice. A handler error (or panic) stops the
/// worker and is carried in the tally; remaining iterations are skipped.
pub fn run_worker(
    workload: &dyn AnyWorkload,
    cx: &WorkerContext,
    data: &mut ThreadData,
    iterations: u64,
) -> WorkerTally {
    let table = workload.transitions();
    let name = workload.descriptor().name.clone();
    let mut state_counts = vec![0u64; table.state_count()];
    let mut iterations_completed = 0u64;
    let mut failure = None;
    let mut state = table.start();

    debug!(
        "worker {} starting workload '{}' in state '{}'",
        cx.worker_id(),
        name,
        table.state_name(state)
    );

    for _ in 0..iterations {
        match execute_state(workload, state, cx, data) {
            Ok(()) => {
                state_counts[state] += 1;
                iterations_completed += 1;
                cx.advance_iteration();
                state = cx.with_rng(|rng| table.choose(state, rng));
            }
            Err(err) => {
                failure = Some(WorkerFailure {
                    worker_id: cx.worker_id(),
                    workload: name.clone(),
                    state: table.state_name(state).to_string(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    WorkerTally {
        worker_id: cx.worker_id(),
        workload: name,
        iterations_completed,
        state_counts,
        failure,
    }
}

/// Execute one state, converting a handler panic into a [`StateError`]
/// so a buggy workload fails its worker instead of aborting the run.
pub(crate) fn execute_state(
    workload: &dyn AnyWorkload,
    index: usize,
    cx: &WorkerContext,
    data: &mut ThreadData,
) -> StateResult {
    match panic::catch_unwind(AssertUnwindSafe(|| workload.run_state(index, cx, data))) {
        Ok(result) => result,
        Err(payload) => Err(StateError::Other(format!(
            "state panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
