//! Interleaved (composed) workload execution.
//!
//! In a composed run every worker thread carries all of the selected
//! workloads at once: its own data copy and FSM cursor per workload.
//! Each iteration steps exactly one workload's machine, chosen by
//! iteration-weighted probability, so workloads interleave within the
//! thread the way independent clients would interleave against a shared
//! deployment.

use crate::fsm::worker::execute_state;
use crate::fsm::{WorkerContext, WorkerTally};
use crate::report::WorkerFailure;
use crate::workload::{DynWorkload, ThreadData};
use rand::rngs::StdRng;
use rand::Rng;

/// One workload's slice of a composed worker: the erased workload, this
/// thread's data copy, and the current FSM state.
pub(crate) struct ComposedMember {
    pub workload: DynWorkload,
    pub data: ThreadData,
    pub state: usize,
}

/// Cumulative selection bounds from per-workload weights.
pub(crate) fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.0;
    weights
        .iter()
        .map(|weight| {
            cumulative += weight / total;
            cumulative
        })
        .collect()
}

/// Pick an index from cumulative bounds with one uniform draw.
pub(crate) fn pick_weighted(cumulative: &[f64], rng: &mut StdRng) -> usize {
    let draw: f64 = rng.gen();
    for (index, bound) in cumulative.iter().enumerate() {
        if draw < *bound {
            return index;
        }
    }
    cumulative.len() - 1
}

/// Drive a composed worker for `iterations` interleaved steps.
///
/// `contexts` is index-aligned with `members`; each workload keeps its
/// own namespace and RNG. A failing step stops the whole worker - the
/// thread is considered broken, not just the one workload - and the
/// failure lands in the failing member's tally.
pub(crate) fn run_composed_worker(
    worker_id: usize,
    members: &mut [ComposedMember],
    contexts: &[WorkerContext],
    cumulative: &[f64],
    iterations: u64,
    chooser: &mut StdRng,
) -> Vec<WorkerTally> {
    let mut tallies: Vec<WorkerTally> = members
        .iter()
        .map(|member| WorkerTally {
            worker_id,
            workload: member.workload.descriptor().name.clone(),
            iterations_completed: 0,
            state_counts: vec![0u64; member.workload.transitions().state_count()],
            failure: None,
        })
        .collect();

    for _ in 0..iterations {
        let index = pick_weighted(cumulative, chooser);
        let member = &mut members[index];
        let cx = &contexts[index];
        let workload = member.workload.clone();
        let table = workload.transitions();

        match execute_state(workload.as_ref(), member.state, cx, &mut member.data) {
            Ok(()) => {
                tallies[index].state_counts[member.state] += 1;
                tallies[index].iterations_completed += 1;
                cx.advance_iteration();
                member.state = cx.with_rng(|rng| table.choose(member.state, rng));
            }
            Err(err) => {
                tallies[index].failure = Some(WorkerFailure {
                    worker_id,
                    workload: workload.descriptor().name.clone(),
                    state: table.state_name(member.state).to_string(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    tallies
}
