//! Advisory checks on workload definitions.
//!
//! `build()` rejects structurally broken machines; the lint pass flags
//! definitions that are legal but probably not what the author meant.

use crate::workload::AnyWorkload;
use serde::Serialize;
use std::fmt;

/// A non-fatal finding about a workload definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LintWarning {
    /// No path from the start state ever reaches this state.
    UnreachableState { workload: String, state: String },

    /// Workers will run setup/teardown but never execute a state.
    ZeroIterations { workload: String },

    /// Once entered, this state only transitions back to itself.
    AbsorbingState { workload: String, state: String },
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreachableState { workload, state } => write!(
                f,
                "{}: state '{}' is unreachable from the start state",
                workload, state
            ),
            Self::ZeroIterations { workload } => {
                write!(f, "{}: iterations is 0, no state will execute", workload)
            }
            Self::AbsorbingState { workload, state } => write!(
                f,
                "{}: state '{}' only transitions to itself",
                workload, state
            ),
        }
    }
}

/// Lint a single workload definition.
pub fn lint(workload: &dyn AnyWorkload) -> Vec<LintWarning> {
    let descriptor = workload.descriptor();
    let table = workload.transitions();
    let mut warnings = Vec::new();

    if descriptor.iterations == 0 {
        warnings.push(LintWarning::ZeroIterations {
            workload: descriptor.name.clone(),
        });
    }

    let reachable = table.reachable_from_start();
    for (index, is_reachable) in reachable.iter().enumerate() {
        if !is_reachable {
            warnings.push(LintWarning::UnreachableState {
                workload: descriptor.name.clone(),
                state: table.state_name(index).to_string(),
            });
        }
    }

    // A single-state machine looping on itself is the whole design, not a
    // trap; only flag absorbing states in larger machines.
    if table.state_count() > 1 {
        for index in 0..table.state_count() {
            let absorbing = table
                .outgoing(index)
                .iter()
                .all(|(target, _)| *target == index);
            if absorbing {
                warnings.push(LintWarning::AbsorbingState {
                    workload: descriptor.name.clone(),
                    state: table.state_name(index).to_string(),
                });
            }
        }
    }

    warnings
}
