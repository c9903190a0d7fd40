//! Type-erased workload handles.
//!
//! The scheduler and registry hold heterogeneous workloads, so the typed
//! `Workload<D>` is erased behind [`AnyWorkload`]. Per-thread data is
//! boxed as `dyn Any` and only ever downcast by the workload that created
//! it, which keeps the cast an internal invariant rather than an API
//! hazard.

use crate::errors::{StateError, StateResult};
use crate::fsm::{SetupContext, TransitionTable, WorkerContext};
use crate::workload::definition::{Descriptor, Workload, WorkloadInfo};
use std::any::Any;
use std::sync::Arc;

/// Boxed per-thread workload data.
pub type ThreadData = Box<dyn Any + Send>;

/// A shareable, type-erased workload.
pub type DynWorkload = Arc<dyn AnyWorkload>;

/// Object-safe view of a workload used by the scheduler and registry.
pub trait AnyWorkload: Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    fn transitions(&self) -> &TransitionTable;

    fn info(&self) -> WorkloadInfo;

    /// Clone the data prototype, run the setup hook against the clone and
    /// return it. Worker threads clone their own copies from the result,
    /// so setup mutations are visible to every worker and a workload
    /// object can be reused across runs without leaking state.
    fn prepare(&self, cx: &SetupContext) -> Result<ThreadData, StateError>;

    /// Clone a worker's data copy from the post-setup prototype.
    fn clone_data(&self, prototype: &ThreadData) -> Result<ThreadData, StateError>;

    /// Execute the state at `index` against a worker's data copy.
    fn run_state(&self, index: usize, cx: &WorkerContext, data: &mut ThreadData) -> StateResult;

    /// Run the teardown hook against the post-setup prototype.
    fn run_teardown(&self, cx: &SetupContext, prototype: &mut ThreadData) -> StateResult;
}

impl std::fmt::Debug for dyn AnyWorkload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyWorkload")
            .field("descriptor", self.descriptor())
            .finish()
    }
}

fn mismatch(workload: &str) -> StateError {
    StateError::Other(format!(
        "thread data type mismatch for workload '{}'",
        workload
    ))
}

impl<D: Clone + Send + Sync + 'static> AnyWorkload for Workload<D> {
    fn descriptor(&self) -> &Descriptor {
        Workload::descriptor(self)
    }

    fn transitions(&self) -> &TransitionTable {
        Workload::transitions(self)
    }

    fn info(&self) -> WorkloadInfo {
        Workload::info(self)
    }

    fn prepare(&self, cx: &SetupContext) -> Result<ThreadData, StateError> {
        let mut data = self.data_prototype().clone();
        if let Some(setup) = self.setup_hook() {
            setup(cx, &mut data)?;
        }
        Ok(Box::new(data))
    }

    fn clone_data(&self, prototype: &ThreadData) -> Result<ThreadData, StateError> {
        let data = prototype
            .downcast_ref::<D>()
            .ok_or_else(|| mismatch(&self.descriptor().name))?;
        Ok(Box::new(data.clone()))
    }

    fn run_state(&self, index: usize, cx: &WorkerContext, data: &mut ThreadData) -> StateResult {
        let data = data
            .downcast_mut::<D>()
            .ok_or_else(|| mismatch(&self.descriptor().name))?;
        (self.handlers()[index])(cx, data)
    }

    fn run_teardown(&self, cx: &SetupContext, prototype: &mut ThreadData) -> StateResult {
        if let Some(teardown) = self.teardown_hook() {
            let data = prototype
                .downcast_mut::<D>()
                .ok_or_else(|| mismatch(&self.descriptor().name))?;
            teardown(cx, data)?;
        }
        Ok(())
    }
}
