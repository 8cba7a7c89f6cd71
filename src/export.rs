//! Debugging exports of a machine's transition graph.
//!
//! None of these affect behavior. They render what was registered so it
//! can be inspected: Graphviz `.dot`, Aldebaran-style LTS text, or a
//! serializable [`MachineDescription`].

use crate::core::{label, Symbol};
use crate::machine::StateMachine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

/// Render the transition graph in Graphviz dot syntax.
///
/// Nodes are states (the initial state is drawn bold), edges are labelled
/// with the input name, followed by the action name for actions built
/// with [`Action::named`](crate::core::Action::named). With `skip_loops`,
/// self-transitions are omitted.
///
/// # Example
///
/// ```rust
/// use statebridge::core::Action;
/// use statebridge::export::to_dot;
/// use statebridge::machine::StateMachine;
///
/// let mut machine: StateMachine<(), &str, &str> = StateMachine::new("door");
/// machine.add_state("open", "Open").unwrap();
/// machine.add_state("closed", "Closed").unwrap();
/// machine.add_input("push", "Push").unwrap();
/// machine.add_transition("open", "push", "closed", Action::none()).unwrap();
///
/// let dot = to_dot(&machine, false);
/// assert!(dot.contains("\"Open\" -> \"Closed\" [label=\"Push\"];"));
/// ```
pub fn to_dot<O, S: Symbol, I: Symbol>(
    machine: &StateMachine<O, S, I>,
    skip_loops: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape(machine.owner()));

    for (state, name) in machine.states().iter() {
        if machine.initial_state() == Some(state) {
            let _ = writeln!(out, "  \"{}\" [style=bold];", escape(name));
        } else {
            let _ = writeln!(out, "  \"{}\";", escape(name));
        }
    }

    for view in machine.table().iter() {
        if skip_loops && view.from == view.to {
            continue;
        }
        let mut edge = label(machine.input_name(view.input), view.input);
        if let Some(action) = view.action {
            edge = format!("{} / {}", edge, action);
        }
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\"];",
            escape(&label(machine.state_name(view.from), view.from)),
            escape(&label(machine.state_name(view.to), view.to)),
            escape(&edge),
        );
    }

    out.push_str("}\n");
    out
}

/// Render the transition graph as a labelled transition system.
///
/// The header is `des (initial, transitions, states)`; each following line
/// is `(from, "input", to)` with states numbered in registration order.
pub fn to_lts<O, S: Symbol, I: Symbol>(machine: &StateMachine<O, S, I>) -> String {
    let index: HashMap<&S, usize> = machine
        .states()
        .iter()
        .enumerate()
        .map(|(i, (state, _))| (state, i))
        .collect();
    let initial = machine
        .initial_state()
        .and_then(|s| index.get(s).copied())
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "des ({}, {}, {})",
        initial,
        machine.table().len(),
        machine.states().len()
    );
    for view in machine.table().iter() {
        let _ = writeln!(
            out,
            "({}, \"{}\", {})",
            index[view.from],
            escape(&label(machine.input_name(view.input), view.input)),
            index[view.to],
        );
    }
    out
}

/// Serializable description of a machine's registrations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDescription {
    pub owner: String,
    pub initial_state: Option<String>,
    pub current_state: Option<String>,
    pub states: Vec<String>,
    pub inputs: Vec<String>,
    pub transitions: Vec<TransitionDescription>,
}

/// One edge of a [`MachineDescription`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub from: String,
    pub input: String,
    pub to: String,
    pub has_action: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Describe the machine using registered display names.
pub fn describe<O, S: Symbol, I: Symbol>(machine: &StateMachine<O, S, I>) -> MachineDescription {
    let state_label = |s: &S| label(machine.state_name(s), s);

    MachineDescription {
        owner: machine.owner().to_string(),
        initial_state: machine.initial_state().map(state_label),
        current_state: machine.current_state().map(state_label),
        states: machine.states().iter().map(|(_, n)| n.to_string()).collect(),
        inputs: machine.inputs().iter().map(|(_, n)| n.to_string()).collect(),
        transitions: machine
            .table()
            .iter()
            .map(|view| TransitionDescription {
                from: state_label(view.from),
                input: label(machine.input_name(view.input), view.input),
                to: state_label(view.to),
                has_action: view.has_action,
                action: view.action.map(str::to_string),
            })
            .collect(),
    }
}

/// Pretty-printed JSON of [`describe`].
pub fn to_json<O, S: Symbol, I: Symbol>(
    machine: &StateMachine<O, S, I>,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&describe(machine))
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
