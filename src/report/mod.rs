//! Run reports
//!
//! Aggregates per-worker tallies into per-workload outcomes and renders
//! the end-of-run summary. Reports serialise to JSON for machine
//! consumers and print a banner-style block for humans.

use crate::fsm::WorkerTally;
use crate::scheduler::RunMode;
use crate::utils::time::format_elapsed_time;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One worker's failure, with enough context to find the broken state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerFailure {
    pub worker_id: usize,
    pub workload: String,
    pub state: String,
    pub message: String,
}

/// A teardown hook that failed after its workers were joined.
#[derive(Debug, Clone, Serialize)]
pub struct TeardownError {
    pub workload: String,
    pub message: String,
}

/// Merged results for a single workload within a run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadOutcome {
    pub name: String,
    pub threads_granted: u32,
    pub iterations_completed: u64,
    pub state_counts: BTreeMap<String, u64>,
}

impl WorkloadOutcome {
    pub fn new(name: impl Into<String>, threads_granted: u32) -> Self {
        Self {
            name: name.into(),
            threads_granted,
            iterations_completed: 0,
            state_counts: BTreeMap::new(),
        }
    }

    /// Fold one worker's tally into this outcome. `state_names` is the
    /// workload's index-aligned name table.
    pub fn absorb(&mut self, state_names: &[String], tally: &WorkerTally) {
        self.iterations_completed += tally.iterations_completed;
        for (index, count) in tally.state_counts.iter().enumerate() {
            if *count > 0 {
                *self
                    .state_counts
                    .entry(state_names[index].clone())
                    .or_insert(0) += count;
            }
        }
    }
}

/// Everything a run produced, success or not.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub mode: RunMode,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub workers_requested: usize,
    pub workers_spawned: usize,
    pub outcomes: Vec<WorkloadOutcome>,
    pub failures: Vec<WorkerFailure>,
    pub teardown_errors: Vec<TeardownError>,
}

impl RunReport {
    /// A run succeeds only when every worker and every teardown did.
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty() && self.teardown_errors.is_empty()
    }

    /// Total state executions across all workloads.
    pub fn total_state_executions(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|outcome| outcome.state_counts.values().sum::<u64>())
            .sum()
    }

    /// Human-readable report block.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("=== FSM Workload Run Report ===\n");
        out.push_str(&format!(
            "Run: {} | Mode: {} | Seed: {}\n",
            self.run_id, self.mode, self.seed
        ));
        out.push_str(&format!(
            "Duration: {} | Workers: {} spawned / {} requested\n",
            format_elapsed_time(self.duration_secs),
            self.workers_spawned,
            self.workers_requested
        ));
        let executions = self.total_state_executions();
        let rate = if self.duration_secs > 0.0 {
            executions as f64 / self.duration_secs
        } else {
            0.0
        };
        out.push_str(&format!(
            "State executions: {} ({:.1}/sec)\n",
            executions, rate
        ));
        for outcome in &self.outcomes {
            out.push_str(&format!(
                "Workload '{}': {} threads, {} iterations\n",
                outcome.name, outcome.threads_granted, outcome.iterations_completed
            ));
            let states = outcome
                .state_counts
                .iter()
                .map(|(state, count)| format!("{}: {}", state, count))
                .collect::<Vec<_>>()
                .join(" | ");
            if !states.is_empty() {
                out.push_str(&format!("  {}\n", states));
            }
        }
        if self.failures.is_empty() && self.teardown_errors.is_empty() {
            out.push_str("Failures: none\n");
        } else {
            out.push_str(&format!(
                "Failures: {} worker(s), {} teardown(s)\n",
                self.failures.len(),
                self.teardown_errors.len()
            ));
            for failure in &self.failures {
                out.push_str(&format!(
                    "  worker {} [{} / {}]: {}\n",
                    failure.worker_id, failure.workload, failure.state, failure.message
                ));
            }
            for teardown in &self.teardown_errors {
                out.push_str(&format!(
                    "  teardown [{}]: {}\n",
                    teardown.workload, teardown.message
                ));
            }
        }
        out
    }
}
