//! Transition table keyed by (state, input).

use super::action::Action;
use super::error::MachineError;
use super::registry::{InputRegistry, StateRegistry};
use super::symbol::Symbol;
use std::collections::HashMap;

/// Target state and action of one table entry.
pub struct Transition<O, S, I> {
    to: S,
    action: Action<O, I>,
}

impl<O, S, I> Transition<O, S, I> {
    pub fn to(&self) -> &S {
        &self.to
    }

    pub fn action(&self) -> &Action<O, I> {
        &self.action
    }
}

/// Read-only view of an entry, used by exports and audits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionView<'a, S, I> {
    pub from: &'a S,
    pub input: &'a I,
    pub to: &'a S,
    pub has_action: bool,
    /// Name given with [`Action::named`], if any.
    pub action: Option<&'a str>,
}

/// Table mapping `(from, input)` to `(to, action)`.
///
/// At most one entry exists per pair; the first registration wins.
pub struct TransitionTable<O, S: Symbol, I: Symbol> {
    entries: HashMap<(S, I), Transition<O, S, I>>,
    order: Vec<(S, I)>,
}

impl<O, S: Symbol, I: Symbol> TransitionTable<O, S, I> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a transition after validating it against the registries.
    ///
    /// Checks run in order and the first failure aborts this registration
    /// only: source state registered, input registered, target state
    /// registered, no existing entry for the pair.
    pub fn add_transition(
        &mut self,
        states: &StateRegistry<S>,
        inputs: &InputRegistry<I>,
        from: S,
        input: I,
        to: S,
        action: Action<O, I>,
    ) -> Result<(), MachineError> {
        if !states.has_state(&from) {
            return Err(MachineError::UnknownSourceState {
                state: format!("{:?}", from),
            });
        }
        if !inputs.has_input(&input) {
            return Err(MachineError::UnknownInput {
                input: format!("{:?}", input),
            });
        }
        if !states.has_state(&to) {
            return Err(MachineError::UnknownTargetState {
                state: format!("{:?}", to),
            });
        }

        let key = (from, input);
        if self.entries.contains_key(&key) {
            return Err(MachineError::DuplicateTransition {
                state: label(states.name(&key.0), &key.0),
                input: label(inputs.name(&key.1), &key.1),
            });
        }

        self.order.push(key.clone());
        self.entries.insert(key, Transition { to, action });
        Ok(())
    }

    /// Look up the entry for `(from, input)`. `None` means undefined.
    pub fn resolve(&self, from: &S, input: &I) -> Option<&Transition<O, S, I>> {
        // HashMap lookups on a tuple key need an owned tuple.
        self.entries.get(&(from.clone(), input.clone()))
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = TransitionView<'_, S, I>> + '_ {
        self.order.iter().map(move |key| {
            let entry = &self.entries[key];
            TransitionView {
                from: &key.0,
                input: &key.1,
                to: &entry.to,
                has_action: !entry.action.is_none(),
                action: entry.action.name(),
            }
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<O, S: Symbol, I: Symbol> Default for TransitionTable<O, S, I> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn label<K: std::fmt::Debug>(name: Option<&str>, id: &K) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("{:?}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
        ChangeMind,
        NotRegistered,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestInput {
        Quarter,
        Cancel,
        NotRegistered,
    }

    struct Owner;

    fn registries() -> (StateRegistry<TestState>, InputRegistry<TestInput>) {
        let mut states = StateRegistry::new();
        states.add_state(TestState::Idle, "IdleState").unwrap();
        states.add_state(TestState::ChangeMind, "ChangeMindState").unwrap();
        let mut inputs = InputRegistry::new();
        inputs.add_input(TestInput::Quarter, "QuarterInserted").unwrap();
        inputs.add_input(TestInput::Cancel, "Cancel").unwrap();
        (states, inputs)
    }

    #[test]
    fn resolve_returns_registered_entry() {
        let (states, inputs) = registries();
        let mut table: TransitionTable<Owner, _, _> = TransitionTable::new();
        table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::Quarter,
                TestState::ChangeMind,
                Action::none(),
            )
            .unwrap();

        let entry = table.resolve(&TestState::Idle, &TestInput::Quarter).unwrap();
        assert_eq!(entry.to(), &TestState::ChangeMind);
        assert!(entry.action().is_none());
        assert!(table.resolve(&TestState::Idle, &TestInput::Cancel).is_none());
    }

    #[test]
    fn validation_runs_in_order() {
        let (states, inputs) = registries();
        let mut table: TransitionTable<Owner, _, _> = TransitionTable::new();

        // Every argument is bad; the source state is reported first.
        let err = table
            .add_transition(
                &states,
                &inputs,
                TestState::NotRegistered,
                TestInput::NotRegistered,
                TestState::NotRegistered,
                Action::none(),
            )
            .unwrap_err();
        assert!(matches!(err, MachineError::UnknownSourceState { .. }));

        let err = table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::NotRegistered,
                TestState::NotRegistered,
                Action::none(),
            )
            .unwrap_err();
        assert!(matches!(err, MachineError::UnknownInput { .. }));

        let err = table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::Quarter,
                TestState::NotRegistered,
                Action::none(),
            )
            .unwrap_err();
        assert!(matches!(err, MachineError::UnknownTargetState { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn duplicate_pair_keeps_first_transition() {
        let (states, inputs) = registries();
        let mut table: TransitionTable<Owner, _, _> = TransitionTable::new();
        table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::Quarter,
                TestState::Idle,
                Action::none(),
            )
            .unwrap();

        let err = table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::Quarter,
                TestState::ChangeMind,
                Action::none(),
            )
            .unwrap_err();

        assert_eq!(
            err,
            MachineError::DuplicateTransition {
                state: "IdleState".to_string(),
                input: "QuarterInserted".to_string(),
            }
        );
        assert_eq!(table.len(), 1);
        let entry = table.resolve(&TestState::Idle, &TestInput::Quarter).unwrap();
        assert_eq!(entry.to(), &TestState::Idle);
    }

    #[test]
    fn iter_reports_action_presence() {
        let (states, inputs) = registries();
        let mut table: TransitionTable<Owner, _, _> = TransitionTable::new();
        table
            .add_transition(
                &states,
                &inputs,
                TestState::Idle,
                TestInput::Quarter,
                TestState::ChangeMind,
                Action::new(|_: &mut Owner, _| {}),
            )
            .unwrap();
        table
            .add_transition(
                &states,
                &inputs,
                TestState::ChangeMind,
                TestInput::Cancel,
                TestState::Idle,
                Action::none(),
            )
            .unwrap();

        let views: Vec<_> = table.iter().collect();
        assert_eq!(views.len(), 2);
        assert!(views[0].has_action);
        assert_eq!(views[1].from, &TestState::ChangeMind);
        assert!(!views[1].has_action);
    }
}
