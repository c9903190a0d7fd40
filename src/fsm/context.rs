//! Execution contexts handed to workload hooks.
//!
//! Setup and teardown see a [`SetupContext`]; state handlers see a
//! [`WorkerContext`]. Both resolve the workload's assigned collection
//! namespace so workloads never hard-code collection names and runs stay
//! isolated from each other.

use crate::errors::StoreError;
use crate::store::{Collection, Store};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::{Cell, RefCell};
use std::sync::Arc;

/// Context for setup/teardown hooks. Runs on the coordinating thread,
/// once per workload per run.
pub struct SetupContext {
    store: Arc<Store>,
    namespace: String,
}

impl SetupContext {
    pub fn new(store: Arc<Store>, namespace: String) -> Self {
        Self { store, namespace }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The collection namespace assigned to this workload for the run.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Handle to the workload's collection, created on first use.
    pub fn collection(&self) -> Result<Arc<Collection>, StoreError> {
        self.store.collection(&self.namespace)
    }
}

/// Context for state handlers. One per worker thread; not shared.
///
/// The RNG lives behind a `RefCell` so handlers can draw randomness
/// through `&self` without threading a generator parameter everywhere.
/// The context never crosses threads after construction.
pub struct WorkerContext {
    store: Arc<Store>,
    namespace: String,
    worker_id: usize,
    thread_index: u32,
    rng: RefCell<StdRng>,
    iteration: Cell<u64>,
}

impl WorkerContext {
    pub fn new(
        store: Arc<Store>,
        namespace: String,
        worker_id: usize,
        thread_index: u32,
        seed: u64,
    ) -> Self {
        Self {
            store,
            namespace,
            worker_id,
            thread_index,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            iteration: Cell::new(0),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The collection namespace assigned to this worker's workload.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Handle to the workload's collection, created on first use.
    pub fn collection(&self) -> Result<Arc<Collection>, StoreError> {
        self.store.collection(&self.namespace)
    }

    /// Global worker ordinal, unique across the whole run.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Index of this worker within its own workload's thread pool.
    pub fn thread_index(&self) -> u32 {
        self.thread_index
    }

    /// Iterations this worker has completed so far.
    pub fn iteration(&self) -> u64 {
        self.iteration.get()
    }

    pub(crate) fn advance_iteration(&self) {
        self.iteration.set(self.iteration.get() + 1);
    }

    /// Run a closure against the worker's RNG.
    pub fn with_rng<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut StdRng) -> R,
    {
        f(&mut self.rng.borrow_mut())
    }

    /// Uniform draw in `[0, bound)`.
    pub fn gen_index(&self, bound: usize) -> usize {
        self.with_rng(|rng| rng.gen_range(0..bound))
    }

    /// Uniform draw in `[low, high)`.
    pub fn gen_range(&self, low: u64, high: u64) -> u64 {
        self.with_rng(|rng| rng.gen_range(low..high))
    }

    /// Biased coin flip.
    pub fn gen_bool(&self, probability: f64) -> bool {
        self.with_rng(|rng| rng.gen_bool(probability))
    }

    /// Pick a random element of a slice, or None when empty.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.gen_index(items.len())])
        }
    }
}
