//! Workload definitions
//!
//! A workload is a named finite-state machine: state handlers, a weighted
//! transition table, per-thread data, a declared thread count and
//! iteration count, and optional setup/teardown hooks. Definitions are
//! assembled through [`WorkloadBuilder`] and validated when built; the
//! scheduler and registry hold them in type-erased form.

pub mod definition;
pub mod dynamic;
pub mod lint;
pub mod registry;

pub use definition::{
    Descriptor, StateInfo, TransitionInfo, Workload, WorkloadBuilder, WorkloadInfo,
};
pub use dynamic::{AnyWorkload, DynWorkload, ThreadData};
pub use lint::{lint, LintWarning};
pub use registry::Registry;
