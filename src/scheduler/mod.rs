//! Run orchestration
//!
//! Plans thread allocations, spawns worker threads for one or more
//! workloads, joins them, and funnels tallies and failures into a run
//! report. Three run modes mirror the ways workloads combine: one at a
//! time, side by side, or interleaved within shared threads.

pub mod allocation;
pub mod compose;
pub mod runner;

pub use allocation::{allocate_threads, ThreadGrant};
pub use runner::{RunOptions, Runner};

use serde::Serialize;
use std::fmt;

/// How the selected workloads share the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Each workload runs to completion in turn.
    #[default]
    Serial,
    /// All workloads run at once, each with its own threads.
    Parallel,
    /// All workloads share every thread, interleaved step by step.
    Composed,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::Parallel => write!(f, "parallel"),
            Self::Composed => write!(f, "composed"),
        }
    }
}
