//! Workload descriptions and the lint pass.

use fsm_harness::fsm::WorkerContext;
use fsm_harness::workload::{lint, AnyWorkload, LintWarning, Workload};

fn noop(_cx: &WorkerContext, _data: &mut ()) -> fsm_harness::errors::StateResult {
    Ok(())
}

#[test]
fn test_info_normalises_probabilities() {
    let workload = Workload::builder("probs", ())
        .state("a", noop)
        .state("b", noop)
        .transition("a", "a", 1.0)
        .transition("a", "b", 3.0)
        .transition("b", "a", 1.0)
        .build()
        .unwrap();

    let info = workload.info();
    assert_eq!(info.states.len(), 2);
    let a = &info.states[0];
    assert_eq!(a.name, "a");
    let total: f64 = a.transitions.iter().map(|t| t.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    let to_b = a
        .transitions
        .iter()
        .find(|t| t.target == "b")
        .expect("edge a -> b");
    assert!((to_b.probability - 0.75).abs() < 1e-9);
}

#[test]
fn test_info_serialises_to_json() {
    let workload = Workload::builder("json", ())
        .state("a", noop)
        .transition("a", "a", 1.0)
        .build()
        .unwrap();
    let rendered = serde_json::to_value(workload.info()).unwrap();
    assert_eq!(rendered["name"], "json");
    assert_eq!(rendered["states"][0]["name"], "a");
}

#[test]
fn test_lint_flags_unreachable_state() {
    let workload = Workload::builder("island", ())
        .state("a", noop)
        .state("b", noop)
        .transition("a", "a", 1.0)
        .transition("b", "b", 1.0)
        .build()
        .unwrap();
    let warnings = lint(&workload as &dyn AnyWorkload);
    assert!(warnings.contains(&LintWarning::UnreachableState {
        workload: "island".to_string(),
        state: "b".to_string(),
    }));
    // The unreachable self-loop is also absorbing
    assert!(warnings.contains(&LintWarning::AbsorbingState {
        workload: "island".to_string(),
        state: "b".to_string(),
    }));
}

#[test]
fn test_lint_flags_zero_iterations() {
    let workload = Workload::builder("idle", ())
        .iterations(0)
        .state("a", noop)
        .transition("a", "a", 1.0)
        .build()
        .unwrap();
    let warnings = lint(&workload as &dyn AnyWorkload);
    assert!(warnings.contains(&LintWarning::ZeroIterations {
        workload: "idle".to_string(),
    }));
}

#[test]
fn test_lint_accepts_single_state_machine() {
    // A one-state self-loop is the whole design, not an absorbing trap
    let workload = Workload::builder("single", ())
        .state("only", noop)
        .transition("only", "only", 1.0)
        .build()
        .unwrap();
    assert!(lint(&workload as &dyn AnyWorkload).is_empty());
}

#[test]
fn test_lint_clean_machine_has_no_warnings() {
    let workload = Workload::builder("clean", ())
        .state("a", noop)
        .state("b", noop)
        .transition("a", "b", 1.0)
        .transition("b", "a", 1.0)
        .build()
        .unwrap();
    assert!(lint(&workload as &dyn AnyWorkload).is_empty());
}
