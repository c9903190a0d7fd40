//! Typed workload definitions and the builder that validates them.

use crate::errors::{DefinitionError, StateResult};
use crate::fsm::{SetupContext, TransitionTable, WorkerContext};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Function executed when a worker visits a state.
pub type StateHandler<D> =
    Arc<dyn Fn(&WorkerContext, &mut D) -> StateResult + Send + Sync + 'static>;

/// Setup/teardown hook. Setup mutates the data prototype; every worker
/// thread clones the post-setup value.
pub type LifecycleHook<D> =
    Arc<dyn Fn(&SetupContext, &mut D) -> StateResult + Send + Sync + 'static>;

/// Plain-data identity of a workload: what the scheduler needs to plan a
/// run without touching handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    pub name: String,
    pub threads: u32,
    pub iterations: u64,
    pub start: String,
}

/// Serialisable description of a workload for `describe`/`list` output.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadInfo {
    pub name: String,
    pub threads: u32,
    pub iterations: u64,
    pub start: String,
    pub states: Vec<StateInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateInfo {
    pub name: String,
    pub transitions: Vec<TransitionInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionInfo {
    pub target: String,
    pub probability: f64,
}

/// A validated workload over per-thread data `D`.
pub struct Workload<D> {
    descriptor: Descriptor,
    handlers: Vec<StateHandler<D>>,
    table: TransitionTable,
    setup: Option<LifecycleHook<D>>,
    teardown: Option<LifecycleHook<D>>,
    data: D,
}

impl<D> std::fmt::Debug for Workload<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workload")
            .field("descriptor", &self.descriptor)
            .field("states", &self.table.state_count())
            .finish()
    }
}

impl<D: Clone + Send + 'static> Workload<D> {
    /// Start building a workload with the given per-thread data prototype.
    pub fn builder(name: impl Into<String>, data: D) -> WorkloadBuilder<D> {
        WorkloadBuilder::new(name, data)
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.table
    }

    pub(crate) fn handlers(&self) -> &[StateHandler<D>] {
        &self.handlers
    }

    pub(crate) fn setup_hook(&self) -> Option<&LifecycleHook<D>> {
        self.setup.as_ref()
    }

    pub(crate) fn teardown_hook(&self) -> Option<&LifecycleHook<D>> {
        self.teardown.as_ref()
    }

    pub(crate) fn data_prototype(&self) -> &D {
        &self.data
    }

    pub fn info(&self) -> WorkloadInfo {
        let states = (0..self.table.state_count())
            .map(|index| StateInfo {
                name: self.table.state_name(index).to_string(),
                transitions: self
                    .table
                    .outgoing(index)
                    .into_iter()
                    .map(|(target, probability)| TransitionInfo {
                        target: self.table.state_name(target).to_string(),
                        probability,
                    })
                    .collect(),
            })
            .collect();
        WorkloadInfo {
            name: self.descriptor.name.clone(),
            threads: self.descriptor.threads,
            iterations: self.descriptor.iterations,
            start: self.descriptor.start.clone(),
            states,
        }
    }
}

/// Fluent workload construction. `build()` runs the full validation pass
/// and produces an immutable [`Workload`].
pub struct WorkloadBuilder<D> {
    name: String,
    threads: u32,
    iterations: u64,
    start: Option<String>,
    states: Vec<(String, StateHandler<D>)>,
    transitions: Vec<(String, String, f64)>,
    setup: Option<LifecycleHook<D>>,
    teardown: Option<LifecycleHook<D>>,
    data: D,
}

impl<D: Clone + Send + 'static> WorkloadBuilder<D> {
    fn new(name: impl Into<String>, data: D) -> Self {
        Self {
            name: name.into(),
            threads: 4,
            iterations: 100,
            start: None,
            states: Vec::new(),
            transitions: Vec::new(),
            setup: None,
            teardown: None,
            data,
        }
    }

    /// Default number of worker threads (subject to the run-time cap).
    pub fn threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Iterations each worker performs before finishing.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Start state. Defaults to the first declared state.
    pub fn start(mut self, state: impl Into<String>) -> Self {
        self.start = Some(state.into());
        self
    }

    /// Declare a state and its handler.
    pub fn state<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&WorkerContext, &mut D) -> StateResult + Send + Sync + 'static,
    {
        self.states.push((name.into(), Arc::new(handler)));
        self
    }

    /// Declare a weighted edge between two states.
    pub fn transition(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.transitions.push((source.into(), target.into(), weight));
        self
    }

    /// Hook run once before workers spawn; may mutate the data prototype.
    pub fn setup<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SetupContext, &mut D) -> StateResult + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(hook));
        self
    }

    /// Hook run once after all workers have been joined.
    pub fn teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SetupContext, &mut D) -> StateResult + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(hook));
        self
    }

    /// Validate the definition and produce the workload.
    pub fn build(self) -> Result<Workload<D>, DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.threads == 0 {
            return Err(DefinitionError::ZeroThreads(self.name));
        }
        if self.states.is_empty() {
            return Err(DefinitionError::NoStates(self.name));
        }

        let mut indices: HashMap<String, usize> = HashMap::new();
        for (index, (name, _)) in self.states.iter().enumerate() {
            if indices.insert(name.clone(), index).is_some() {
                return Err(DefinitionError::DuplicateState {
                    workload: self.name,
                    state: name.clone(),
                });
            }
        }

        let start_name = self
            .start
            .unwrap_or_else(|| self.states[0].0.clone());
        let start = *indices
            .get(&start_name)
            .ok_or_else(|| DefinitionError::UnknownStartState {
                workload: self.name.clone(),
                start: start_name.clone(),
            })?;

        let mut outgoing: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.states.len()];
        for (source, target, weight) in &self.transitions {
            let source_index =
                *indices
                    .get(source)
                    .ok_or_else(|| DefinitionError::UnknownSource {
                        workload: self.name.clone(),
                        src: source.clone(),
                    })?;
            let target_index =
                *indices
                    .get(target)
                    .ok_or_else(|| DefinitionError::UnknownTarget {
                        workload: self.name.clone(),
                        src: source.clone(),
                        target: target.clone(),
                    })?;
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(DefinitionError::InvalidWeight {
                    workload: self.name,
                    src: source.clone(),
                    target: target.clone(),
                    weight: *weight,
                });
            }
            if outgoing[source_index]
                .iter()
                .any(|(existing, _)| *existing == target_index)
            {
                return Err(DefinitionError::DuplicateTransition {
                    workload: self.name,
                    src: source.clone(),
                    target: target.clone(),
                });
            }
            outgoing[source_index].push((target_index, *weight));
        }

        for (index, edges) in outgoing.iter().enumerate() {
            if edges.is_empty() {
                return Err(DefinitionError::TerminalState {
                    workload: self.name,
                    state: self.states[index].0.clone(),
                });
            }
        }

        let (state_names, handlers): (Vec<String>, Vec<StateHandler<D>>) =
            self.states.into_iter().unzip();
        let table = TransitionTable::new(state_names, start, outgoing);

        Ok(Workload {
            descriptor: Descriptor {
                name: self.name,
                threads: self.threads,
                iterations: self.iterations,
                start: start_name,
            },
            handlers,
            table,
            setup: self.setup,
            teardown: self.teardown,
            data: self.data,
        })
    }
}
