//! Built-in workload corpus
//!
//! Ready-made workloads exercising the target store, registered under the
//! global registry the CLI runs from. Each is a small FSM with its own
//! per-thread data and invariant checks baked into states and teardown.

pub mod contended_counter;
pub mod crud_churn;
pub mod exclusive_inserts;
pub mod scan_churn;

use crate::errors::HarnessResult;
use crate::workload::Registry;
use lazy_static::lazy_static;

/// Build a fresh registry holding the built-in corpus.
pub fn builtin_registry() -> HarnessResult<Registry> {
    let mut registry = Registry::new();
    registry.register(contended_counter::workload()?)?;
    registry.register(crud_churn::workload()?)?;
    registry.register(exclusive_inserts::workload()?)?;
    registry.register(scan_churn::workload()?)?;
    Ok(registry)
}

lazy_static! {
    static ref BUILTINS: Registry =
        builtin_registry().expect("built-in workload definitions must validate");
}

/// The shared built-in registry.
pub fn builtins() -> &'static Registry {
    &BUILTINS
}
