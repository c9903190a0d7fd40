//! The run coordinator: setup, spawn, join, teardown, report.

use crate::errors::{HarnessResult, RunError};
use crate::fsm::{run_worker, worker_seed, SetupContext, WorkerContext, WorkerTally};
use crate::report::{RunReport, TeardownError, WorkloadOutcome};
use crate::scheduler::allocation::allocate_threads;
use crate::scheduler::compose::{cumulative_weights, run_composed_worker, ComposedMember};
use crate::scheduler::RunMode;
use crate::store::Store;
use crate::workload::{DynWorkload, ThreadData};
use chrono::Utc;
use crossbeam::channel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Global cap on worker threads; requests above it are scaled down.
    pub thread_cap: u32,
    /// Seed all per-worker RNGs derive from.
    pub seed: u64,
    /// Fraction of workers allowed to fail to spawn before the run aborts.
    pub allowed_spawn_failure_ratio: f64,
    /// Overrides every workload's configured iteration count when set.
    pub iterations_override: Option<u64>,
    /// Scales every workload's configured thread count.
    pub thread_multiplier: f64,
    /// Prefixes collection namespaces so concurrent runs stay isolated.
    pub run_id: String,
}

impl RunOptions {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            mode: RunMode::default(),
            thread_cap: 32,
            seed: 0,
            allowed_spawn_failure_ratio: 0.0,
            iterations_override: None,
            thread_multiplier: 1.0,
            run_id: run_id.into(),
        }
    }

    fn effective_threads(&self, requested: u32) -> u32 {
        ((f64::from(requested) * self.thread_multiplier).round() as u32).max(1)
    }

    fn effective_iterations(&self, configured: u64) -> u64 {
        self.iterations_override.unwrap_or(configured)
    }
}

/// Everything accumulated while workloads execute, before it becomes a
/// [`RunReport`].
#[derive(Default)]
struct RunAccumulator {
    outcomes: Vec<WorkloadOutcome>,
    failures: Vec<crate::report::WorkerFailure>,
    teardown_errors: Vec<TeardownError>,
    workers_requested: usize,
    workers_spawned: usize,
    /// Global worker ordinal counter, continuous across groups so every
    /// worker in a run draws from a distinct RNG stream.
    next_ordinal: usize,
}

/// Coordinates workload runs against a shared target store.
pub struct Runner {
    store: Arc<Store>,
}

impl Runner {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Execute the selected workloads and aggregate the results.
    ///
    /// Worker failures do not error out of this method - they land in the
    /// report, whose `succeeded()` drives the caller's exit status. Only
    /// orchestration problems (nothing selected, setup failure, spawn
    /// shortfall) surface as `Err`.
    pub fn run(&self, workloads: &[DynWorkload], options: &RunOptions) -> HarnessResult<RunReport> {
        if workloads.is_empty() {
            return Err(RunError::EmptyRun.into());
        }

        info!(
            "=== Starting FSM run '{}' ({} workload(s), mode: {}) ===",
            options.run_id,
            workloads.len(),
            options.mode
        );

        let started_at = Utc::now();
        let clock = Instant::now();
        let mut acc = RunAccumulator::default();

        match options.mode {
            RunMode::Serial => {
                for workload in workloads {
                    self.run_group(std::slice::from_ref(workload), options, &mut acc)?;
                }
            }
            RunMode::Parallel => self.run_group(workloads, options, &mut acc)?,
            RunMode::Composed => self.run_composed(workloads, options, &mut acc)?,
        }

        let report = RunReport {
            run_id: options.run_id.clone(),
            mode: options.mode,
            seed: options.seed,
            started_at,
            duration_secs: clock.elapsed().as_secs_f64(),
            workers_requested: acc.workers_requested,
            workers_spawned: acc.workers_spawned,
            outcomes: acc.outcomes,
            failures: acc.failures,
            teardown_errors: acc.teardown_errors,
        };

        if report.succeeded() {
            info!("Run '{}' completed cleanly", options.run_id);
        } else {
            warn!(
                "Run '{}' finished with {} worker failure(s), {} teardown error(s)",
                options.run_id,
                report.failures.len(),
                report.teardown_errors.len()
            );
        }

        Ok(report)
    }

    /// Run a group of workloads side by side, each with its own threads.
    fn run_group(
        &self,
        workloads: &[DynWorkload],
        options: &RunOptions,
        acc: &mut RunAccumulator,
    ) -> HarnessResult<()> {
        let requested: Vec<(String, u32)> = workloads
            .iter()
            .map(|w| {
                let descriptor = w.descriptor();
                (
                    descriptor.name.clone(),
                    options.effective_threads(descriptor.threads),
                )
            })
            .collect();
        let grants = allocate_threads(&requested, options.thread_cap);

        // Setup happens-before any worker. A setup failure unwinds the
        // workloads already prepared so their teardowns still run.
        let mut prepared: Vec<(DynWorkload, SetupContext, ThreadData)> = Vec::new();
        for workload in workloads {
            let name = workload.descriptor().name.clone();
            let namespace = format!("{}_{}", options.run_id, name);
            let cx = SetupContext::new(Arc::clone(&self.store), namespace);
            match workload.prepare(&cx) {
                Ok(prototype) => prepared.push((workload.clone(), cx, prototype)),
                Err(err) => {
                    self.run_teardowns(&mut prepared, acc);
                    return Err(RunError::Setup {
                        workload: name,
                        message: err.to_string(),
                    }
                    .into());
                }
            }
        }

        let requested_total: usize = grants.iter().map(|g| g.granted as usize).sum();
        let mut spawned_total = 0usize;
        let (tx, rx) = channel::unbounded::<WorkerTally>();

        // Index tallies back to their outcome slot as they arrive.
        let outcome_base = acc.outcomes.len();
        let mut outcome_slots: HashMap<String, usize> = HashMap::new();
        for (slot, grant) in grants.iter().enumerate() {
            outcome_slots.insert(grant.name.clone(), outcome_base + slot);
            acc.outcomes
                .push(WorkloadOutcome::new(grant.name.clone(), grant.granted));
        }

        let scope_result = crossbeam::thread::scope(|scope| {
            for (grant, (workload, setup_cx, prototype)) in grants.iter().zip(prepared.iter()) {
                let iterations =
                    options.effective_iterations(workload.descriptor().iterations);
                for thread_index in 0..grant.granted {
                    let ordinal = acc.next_ordinal;
                    acc.next_ordinal += 1;

                    let data = match workload.clone_data(prototype) {
                        Ok(data) => data,
                        Err(err) => {
                            acc.failures.push(crate::report::WorkerFailure {
                                worker_id: ordinal,
                                workload: grant.name.clone(),
                                state: "spawn".to_string(),
                                message: err.to_string(),
                            });
                            continue;
                        }
                    };

                    let workload = workload.clone();
                    let store = Arc::clone(&self.store);
                    let namespace = setup_cx.namespace().to_string();
                    let seed = worker_seed(options.seed, ordinal as u64);
                    let tx = tx.clone();

                    let spawn_result = scope
                        .builder()
                        .name(format!("fsm-worker-{}", ordinal))
                        .spawn(move |_| {
                            let cx = WorkerContext::new(
                                store,
                                namespace,
                                ordinal,
                                thread_index,
                                seed,
                            );
                            let mut data = data;
                            let tally =
                                run_worker(workload.as_ref(), &cx, &mut data, iterations);
                            // The receiver outlives the scope; a send can
                            // only fail if the coordinator already gave up.
                            let _ = tx.send(tally);
                        });
                    match spawn_result {
                        Ok(_) => spawned_total += 1,
                        Err(err) => {
                            warn!(
                                "failed to spawn worker {} for '{}': {}",
                                ordinal, grant.name, err
                            );
                        }
                    }
                }
            }
            drop(tx);

            // Draining the channel doubles as the join barrier: it closes
            // once every worker's sender is gone.
            for tally in rx.iter() {
                if let Some(slot) = outcome_slots.get(&tally.workload) {
                    let state_names = workloads
                        .iter()
                        .find(|w| w.descriptor().name == tally.workload)
                        .map(|w| w.transitions().state_names().to_vec())
                        .unwrap_or_default();
                    acc.outcomes[*slot].absorb(&state_names, &tally);
                }
                if let Some(failure) = tally.failure {
                    acc.failures.push(failure);
                }
            }
        });
        if scope_result.is_err() {
            self.run_teardowns(&mut prepared, acc);
            return Err(RunError::CoordinatorPanic(
                "worker scope panicked outside the state loop".to_string(),
            )
            .into());
        }

        acc.workers_requested += requested_total;
        acc.workers_spawned += spawned_total;

        let shortfall = requested_total.saturating_sub(spawned_total);
        let failed_fraction = shortfall as f64 / requested_total as f64;
        if shortfall > 0 && failed_fraction > options.allowed_spawn_failure_ratio {
            self.run_teardowns(&mut prepared, acc);
            return Err(RunError::SpawnShortfall {
                spawned: spawned_total,
                requested: requested_total,
                allowed: options.allowed_spawn_failure_ratio,
            }
            .into());
        }

        self.run_teardowns(&mut prepared, acc);
        Ok(())
    }

    /// Run all workloads interleaved within a shared pool of threads.
    fn run_composed(
        &self,
        workloads: &[DynWorkload],
        options: &RunOptions,
        acc: &mut RunAccumulator,
    ) -> HarnessResult<()> {
        let thread_count = workloads
            .iter()
            .map(|w| options.effective_threads(w.descriptor().threads))
            .max()
            .unwrap_or(1)
            .min(options.thread_cap)
            .max(1);

        // Selection weight and the composed iteration budget both come
        // from the per-workload iteration counts.
        let member_iterations: Vec<u64> = workloads
            .iter()
            .map(|w| options.effective_iterations(w.descriptor().iterations))
            .collect();
        let iterations = member_iterations.iter().copied().max().unwrap_or(0);
        let weights: Vec<f64> = member_iterations
            .iter()
            .map(|iters| (*iters).max(1) as f64)
            .collect();
        let cumulative = cumulative_weights(&weights);

        let mut prepared: Vec<(DynWorkload, SetupContext, ThreadData)> = Vec::new();
        for workload in workloads {
            let name = workload.descriptor().name.clone();
            let namespace = format!("{}_{}", options.run_id, name);
            let cx = SetupContext::new(Arc::clone(&self.store), namespace);
            match workload.prepare(&cx) {
                Ok(prototype) => prepared.push((workload.clone(), cx, prototype)),
                Err(err) => {
                    self.run_teardowns(&mut prepared, acc);
                    return Err(RunError::Setup {
                        workload: name,
                        message: err.to_string(),
                    }
                    .into());
                }
            }
        }

        let outcome_base = acc.outcomes.len();
        for workload in workloads {
            acc.outcomes.push(WorkloadOutcome::new(
                workload.descriptor().name.clone(),
                thread_count,
            ));
        }

        let requested_total = thread_count as usize;
        let mut spawned_total = 0usize;
        let (tx, rx) = channel::unbounded::<Vec<WorkerTally>>();

        let scope_result = crossbeam::thread::scope(|scope| {
            for composed_index in 0..thread_count {
                let ordinal = acc.next_ordinal;
                acc.next_ordinal += 1;

                let mut members = Vec::with_capacity(prepared.len());
                let mut contexts = Vec::with_capacity(prepared.len());
                let mut clone_failure = None;
                for (member_index, (workload, setup_cx, prototype)) in
                    prepared.iter().enumerate()
                {
                    match workload.clone_data(prototype) {
                        Ok(data) => {
                            members.push(ComposedMember {
                                workload: workload.clone(),
                                data,
                                state: workload.transitions().start(),
                            });
                            // Distinct stream per (worker, member) pair.
                            let seed = worker_seed(
                                options.seed.wrapping_add(member_index as u64 + 1),
                                ordinal as u64,
                            );
                            contexts.push(WorkerContext::new(
                                Arc::clone(&self.store),
                                setup_cx.namespace().to_string(),
                                ordinal,
                                composed_index,
                                seed,
                            ));
                        }
                        Err(err) => {
                            clone_failure = Some(crate::report::WorkerFailure {
                                worker_id: ordinal,
                                workload: workload.descriptor().name.clone(),
                                state: "spawn".to_string(),
                                message: err.to_string(),
                            });
                            break;
                        }
                    }
                }
                if let Some(failure) = clone_failure {
                    acc.failures.push(failure);
                    continue;
                }

                let cumulative = cumulative.clone();
                let chooser_seed = worker_seed(options.seed, ordinal as u64);
                let tx = tx.clone();

                let spawn_result = scope
                    .builder()
                    .name(format!("fsm-worker-{}", ordinal))
                    .spawn(move |_| {
                        let mut members = members;
                        let contexts = contexts;
                        let mut chooser = StdRng::seed_from_u64(chooser_seed);
                        let tallies = run_composed_worker(
                            ordinal,
                            &mut members,
                            &contexts,
                            &cumulative,
                            iterations,
                            &mut chooser,
                        );
                        let _ = tx.send(tallies);
                    });
                match spawn_result {
                    Ok(_) => spawned_total += 1,
                    Err(err) => {
                        warn!("failed to spawn composed worker {}: {}", ordinal, err);
                    }
                }
            }
            drop(tx);

            for tallies in rx.iter() {
                for tally in tallies {
                    if let Some(position) = workloads
                        .iter()
                        .position(|w| w.descriptor().name == tally.workload)
                    {
                        let state_names =
                            workloads[position].transitions().state_names().to_vec();
                        acc.outcomes[outcome_base + position].absorb(&state_names, &tally);
                    }
                    if let Some(failure) = tally.failure {
                        acc.failures.push(failure);
                    }
                }
            }
        });
        if scope_result.is_err() {
            self.run_teardowns(&mut prepared, acc);
            return Err(RunError::CoordinatorPanic(
                "composed worker scope panicked outside the state loop".to_string(),
            )
            .into());
        }

        acc.workers_requested += requested_total;
        acc.workers_spawned += spawned_total;

        let shortfall = requested_total.saturating_sub(spawned_total);
        let failed_fraction = shortfall as f64 / requested_total as f64;
        if shortfall > 0 && failed_fraction > options.allowed_spawn_failure_ratio {
            self.run_teardowns(&mut prepared, acc);
            return Err(RunError::SpawnShortfall {
                spawned: spawned_total,
                requested: requested_total,
                allowed: options.allowed_spawn_failure_ratio,
            }
            .into());
        }

        self.run_teardowns(&mut prepared, acc);
        Ok(())
    }

    /// Teardowns always run, in reverse preparation order. Errors are
    /// recorded, never propagated - they must not mask worker failures.
    fn run_teardowns(
        &self,
        prepared: &mut Vec<(DynWorkload, SetupContext, ThreadData)>,
        acc: &mut RunAccumulator,
    ) {
        while let Some((workload, cx, mut prototype)) = prepared.pop() {
            if let Err(err) = workload.run_teardown(&cx, &mut prototype) {
                let name = workload.descriptor().name.clone();
                warn!("teardown failed for '{}': {}", name, err);
                acc.teardown_errors.push(TeardownError {
                    workload: name,
                    message: err.to_string(),
                });
            }
        }
    }
}
