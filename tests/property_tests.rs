//! Property-based tests for the state machine engine.
//!
//! Machines are generated from random transition tables over small state
//! and input alphabets, then checked against a plain model of the table.

use proptest::prelude::*;
use statebridge::core::{Action, StateRegistry};
use statebridge::machine::{MachineConfig, StateMachine};
use statebridge::{ErrorKind, MachineError};
use std::collections::HashSet;

const STATES: u8 = 4;
const INPUTS: u8 = 3;

/// Every applied transition, as `(from, input)`, in order.
type Trace = Vec<(u8, u8)>;

/// One optional target per `(state, input)` pair, row-major.
fn arbitrary_table() -> impl Strategy<Value = Vec<Option<u8>>> {
    prop::collection::vec(prop::option::of(0..STATES), (STATES * INPUTS) as usize)
}

fn arbitrary_inputs() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0..INPUTS, 0..24)
}

fn target(table: &[Option<u8>], state: u8, input: u8) -> Option<u8> {
    table[(state * INPUTS + input) as usize]
}

fn build(table: &[Option<u8>], initial: u8) -> StateMachine<Trace, u8, u8> {
    let mut machine = StateMachine::new("prop");
    for state in 0..STATES {
        machine.add_state(state, format!("S{}", state)).unwrap();
    }
    for input in 0..INPUTS {
        machine.add_input(input, format!("I{}", input)).unwrap();
    }
    for state in 0..STATES {
        for input in 0..INPUTS {
            if let Some(to) = target(table, state, input) {
                let action = Action::new(move |trace: &mut Trace, _| trace.push((state, input)));
                machine.add_transition(state, input, to, action).unwrap();
            }
        }
    }
    machine.select_initial_state(initial).unwrap();
    machine.set_ready_to_run().unwrap();
    machine
}

/// Expected final state, trace and number of skipped inputs.
fn model(table: &[Option<u8>], initial: u8, inputs: &[u8]) -> (u8, Trace, usize) {
    let mut state = initial;
    let mut trace = Vec::new();
    let mut skipped = 0;
    for &input in inputs {
        match target(table, state, input) {
            Some(to) => {
                trace.push((state, input));
                state = to;
            }
            None => skipped += 1,
        }
    }
    (state, trace, skipped)
}

proptest! {
    #[test]
    fn duplicate_registration_keeps_one_entry(
        ids in prop::collection::vec(0..8u8, 0..32)
    ) {
        let mut registry = StateRegistry::new();
        let mut duplicates = 0;
        for id in &ids {
            if let Err(err) = registry.add_state(*id, format!("first-{}", id)) {
                prop_assert_eq!(err.kind(), ErrorKind::Registration);
                duplicates += 1;
            }
        }

        let distinct: HashSet<u8> = ids.iter().copied().collect();
        prop_assert_eq!(registry.len(), distinct.len());
        prop_assert_eq!(duplicates, ids.len() - distinct.len());
        for id in distinct {
            let expected = format!("first-{}", id);
            prop_assert_eq!(registry.name(&id), Some(expected.as_str()));
        }
    }

    #[test]
    fn batching_does_not_reorder_effects(
        table in arbitrary_table(),
        initial in 0..STATES,
        inputs in arbitrary_inputs(),
    ) {
        let mut batched = build(&table, initial);
        let mut batched_trace = Trace::new();
        for input in &inputs {
            batched.push_input(*input).unwrap();
        }
        batched.process_inputs(&mut batched_trace).unwrap();

        let mut single = build(&table, initial);
        let mut single_trace = Trace::new();
        for input in &inputs {
            single.push_input(*input).unwrap();
            single.process_inputs(&mut single_trace).unwrap();
        }

        prop_assert_eq!(batched.current_state(), single.current_state());
        prop_assert_eq!(batched_trace, single_trace);
    }

    #[test]
    fn undefined_inputs_are_skipped_alone(
        table in arbitrary_table(),
        initial in 0..STATES,
        inputs in arbitrary_inputs(),
    ) {
        let mut machine = build(&table, initial);
        let mut trace = Trace::new();
        for input in &inputs {
            machine.push_input(*input).unwrap();
        }
        let report = machine.process_inputs(&mut trace).unwrap();

        let (expected_state, expected_trace, skipped) = model(&table, initial, &inputs);
        prop_assert_eq!(machine.current_state(), Some(&expected_state));
        prop_assert_eq!(&trace, &expected_trace);
        prop_assert_eq!(report.consumed, inputs.len());
        prop_assert_eq!(report.applied, expected_trace.len());
        prop_assert_eq!(report.undefined_transitions(), skipped);
        prop_assert_eq!(machine.pending_inputs(), 0);
    }

    #[test]
    fn history_follows_applied_transitions(
        table in arbitrary_table(),
        initial in 0..STATES,
        inputs in arbitrary_inputs(),
    ) {
        let mut machine = build(&table, initial);
        for input in &inputs {
            machine.push_input(*input).unwrap();
        }
        machine.process_inputs(&mut Trace::new()).unwrap();

        let (_, expected_trace, _) = model(&table, initial, &inputs);
        let recorded: Trace = machine
            .history()
            .records()
            .map(|record| (record.from, record.input))
            .collect();
        prop_assert_eq!(recorded, expected_trace);
    }

    #[test]
    fn nothing_runs_without_readiness(
        table in arbitrary_table(),
        inputs in arbitrary_inputs(),
    ) {
        let mut machine: StateMachine<Trace, u8, u8> = StateMachine::new("unready");
        for state in 0..STATES {
            machine.add_state(state, format!("S{}", state)).unwrap();
        }
        for input in 0..INPUTS {
            machine.add_input(input, format!("I{}", input)).unwrap();
        }
        for state in 0..STATES {
            for input in 0..INPUTS {
                if let Some(to) = target(&table, state, input) {
                    machine.add_transition(state, input, to, Action::none()).unwrap();
                }
            }
        }

        prop_assert_eq!(machine.set_ready_to_run(), Err(MachineError::MissingInitialState));
        for input in &inputs {
            prop_assert!(machine.push_input(*input).is_err());
        }
        prop_assert!(machine.process_inputs(&mut Trace::new()).is_err());
        prop_assert!(machine.current_state().is_none());
        prop_assert_eq!(machine.pending_inputs(), 0);
    }

    #[test]
    fn cascade_stops_at_limit(limit in 1usize..64) {
        let config = MachineConfig::default().cascade_limit(limit);
        let mut machine: StateMachine<u32, u8, u8> = StateMachine::with_config("loop", config);
        machine.add_state(0, "Spin").unwrap();
        machine.add_input(0, "Again").unwrap();
        machine
            .add_transition(0, 0, 0, Action::new(|count: &mut u32, cascade| {
                *count += 1;
                cascade.push_input(0);
            }))
            .unwrap();
        machine.select_initial_state(0).unwrap();
        machine.set_ready_to_run().unwrap();

        let mut count = 0u32;
        machine.push_input(0).unwrap();
        let report = machine.process_inputs(&mut count).unwrap();

        prop_assert_eq!(report.consumed, limit);
        prop_assert_eq!(count as usize, limit);
        prop_assert_eq!(
            report.errors,
            vec![MachineError::CascadeLimitExceeded { limit, discarded: 1 }]
        );
        prop_assert_eq!(machine.pending_inputs(), 0);
    }
}
