//! Whole-table consistency audit.
//!
//! Registration errors are caught one at a time as they happen. The audit
//! looks at the finished program instead and reports everything that is
//! suspicious about it at once, using stillwater's `Validation` to
//! accumulate findings rather than stopping at the first.
//!
//! A failing audit does not stop the machine from running; dead-end
//! states, for example, are legitimate in some owners.
//!
//! # Example
//!
//! ```rust
//! use statebridge::audit::{audit, AuditFinding};
//! use statebridge::core::Action;
//! use statebridge::machine::StateMachine;
//! use stillwater::validation::Validation;
//!
//! let mut machine: StateMachine<(), &str, &str> = StateMachine::new("lamp");
//! machine.add_state("off", "Off").unwrap();
//! machine.add_state("on", "On").unwrap();
//! machine.add_input("toggle", "Toggle").unwrap();
//! machine.add_transition("off", "toggle", "on", Action::none()).unwrap();
//! machine.add_transition("on", "toggle", "off", Action::none()).unwrap();
//! machine.select_initial_state("off").unwrap();
//!
//! assert!(audit(&machine).is_success());
//! ```

mod findings;

pub use findings::AuditFinding;

use crate::core::{label, Symbol};
use crate::machine::StateMachine;
use std::collections::{HashSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Audit the machine's registrations, accumulating ALL findings.
///
/// Returns `Validation::Success(())` when nothing was found.
pub fn audit<O, S: Symbol, I: Symbol>(
    machine: &StateMachine<O, S, I>,
) -> Validation<(), NonEmptyVec<AuditFinding>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<AuditFinding>>> = Vec::new();

    // Reachability from the initial state
    match machine.initial_state() {
        None => checks.push(Validation::fail(AuditFinding::NoInitialState)),
        Some(initial) => {
            let reachable = reachable_from(machine, initial);
            for (state, name) in machine.states().iter() {
                let check = if reachable.contains(state) {
                    Validation::success(())
                } else {
                    Validation::fail(AuditFinding::UnreachableState {
                        state: name.to_string(),
                    })
                };
                checks.push(check);
            }
        }
    }

    // Inputs nothing reacts to
    let used_inputs: HashSet<&I> = machine.table().iter().map(|view| view.input).collect();
    for (input, name) in machine.inputs().iter() {
        let check = if used_inputs.contains(input) {
            Validation::success(())
        } else {
            Validation::fail(AuditFinding::UnusedInput {
                input: name.to_string(),
            })
        };
        checks.push(check);
    }

    // States with no way out
    let sources: HashSet<&S> = machine.table().iter().map(|view| view.from).collect();
    for (state, name) in machine.states().iter() {
        let check = if sources.contains(state) {
            Validation::success(())
        } else {
            Validation::fail(AuditFinding::DeadEndState {
                state: name.to_string(),
            })
        };
        checks.push(check);
    }

    Validation::all_vec(checks).map(|_| ())
}

fn reachable_from<'m, O, S: Symbol, I: Symbol>(
    machine: &'m StateMachine<O, S, I>,
    initial: &'m S,
) -> HashSet<&'m S> {
    let mut seen = HashSet::from([initial]);
    let mut frontier = VecDeque::from([initial]);
    while let Some(state) = frontier.pop_front() {
        for view in machine.table().iter().filter(|view| view.from == state) {
            if seen.insert(view.to) {
                log::trace!(
                    "{}: {} reachable",
                    machine.owner(),
                    label(machine.state_name(view.to), view.to)
                );
                frontier.push_back(view.to);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;

    fn base_machine() -> StateMachine<(), &'static str, &'static str> {
        let mut machine = StateMachine::new("audit");
        machine.add_state("idle", "Idle").unwrap();
        machine.add_state("busy", "Busy").unwrap();
        machine.add_input("start", "Start").unwrap();
        machine.add_input("stop", "Stop").unwrap();
        machine
            .add_transition("idle", "start", "busy", Action::none())
            .unwrap();
        machine
            .add_transition("busy", "stop", "idle", Action::none())
            .unwrap();
        machine
    }

    #[test]
    fn clean_machine_passes() {
        let mut machine = base_machine();
        machine.select_initial_state("idle").unwrap();

        assert!(audit(&machine).is_success());
    }

    #[test]
    fn missing_initial_state_is_reported() {
        let machine = base_machine();

        match audit(&machine) {
            Validation::Failure(findings) => {
                assert_eq!(findings.len(), 1);
                assert!(findings
                    .iter()
                    .any(|f| matches!(f, AuditFinding::NoInitialState)));
            }
            Validation::Success(_) => panic!("Expected findings, got success"),
        }
    }

    #[test]
    fn audit_accumulates_all_findings() {
        let mut machine = base_machine();
        machine.add_state("orphan", "Orphan").unwrap();
        machine.add_input("unused", "Unused").unwrap();
        machine.select_initial_state("idle").unwrap();

        match audit(&machine) {
            Validation::Failure(findings) => {
                // Orphan is both unreachable and a dead end.
                assert_eq!(findings.len(), 3);
                assert!(findings.iter().any(|f| *f
                    == AuditFinding::UnreachableState {
                        state: "Orphan".to_string()
                    }));
                assert!(findings.iter().any(|f| *f
                    == AuditFinding::UnusedInput {
                        input: "Unused".to_string()
                    }));
                assert!(findings.iter().any(|f| *f
                    == AuditFinding::DeadEndState {
                        state: "Orphan".to_string()
                    }));
            }
            Validation::Success(_) => panic!("Expected findings, got success"),
        }
    }

    #[test]
    fn reachability_follows_chains() {
        let mut machine: StateMachine<(), u8, u8> = StateMachine::new("chain");
        for state in 0..4u8 {
            machine.add_state(state, format!("S{}", state)).unwrap();
        }
        machine.add_input(0, "next").unwrap();
        for state in 0..3u8 {
            machine
                .add_transition(state, 0, state + 1, Action::none())
                .unwrap();
        }
        machine.add_transition(3, 0, 0, Action::none()).unwrap();
        machine.select_initial_state(0).unwrap();

        assert!(audit(&machine).is_success());
    }
}
