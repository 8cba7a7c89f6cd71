//! State machine engine composed by an owner object.

use crate::core::{
    label, Action, Cascade, ErrorKind, InputRegistry, MachineError, StateHistory, StateRegistry,
    Symbol, TransitionRecord, TransitionTable,
};
use crate::machine::config::MachineConfig;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Lifecycle of the engine itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Registries and table are open; no initial state yet.
    Constructing,
    /// An initial state has been selected.
    Configured,
    /// `set_ready_to_run()` succeeded; inputs are accepted.
    Ready,
    /// At least one `process_inputs()` call has run.
    Running,
}

impl Lifecycle {
    pub fn accepts_inputs(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

/// Outcome of one `process_inputs()` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Inputs taken off the queue.
    pub consumed: usize,
    /// Transitions applied.
    pub applied: usize,
    /// Actions invoked. Transitions bound to `Action::none()` do not count.
    pub actions: usize,
    /// Non-fatal errors met while draining, in order.
    pub errors: Vec<MachineError>,
}

impl ProcessReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn undefined_transitions(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.kind() == ErrorKind::UndefinedTransition)
            .count()
    }
}

/// Table-driven state machine owned by exactly one object.
///
/// The owner registers states, inputs and transitions at construction,
/// selects an initial state and calls [`set_ready_to_run`]. Afterwards its
/// request methods push inputs and call [`process_inputs`], handing the
/// engine the part of itself that actions operate on.
///
/// Every misuse is logged and returned as a [`MachineError`]; nothing
/// panics and the engine's own state is left unchanged.
///
/// # Example
///
/// ```rust
/// use statebridge::core::Action;
/// use statebridge::machine::StateMachine;
///
/// #[derive(Default)]
/// struct Vending {
///     credits: u32,
/// }
///
/// let mut machine = StateMachine::new("vending");
/// machine.add_state("idle", "Idle").unwrap();
/// machine.add_state("credit", "Credit").unwrap();
/// machine.add_input("quarter", "QuarterInserted").unwrap();
/// machine
///     .add_transition("idle", "quarter", "credit", Action::new(|v: &mut Vending, _| v.credits += 1))
///     .unwrap();
/// machine.select_initial_state("idle").unwrap();
/// machine.set_ready_to_run().unwrap();
///
/// let mut vending = Vending::default();
/// machine.push_input("quarter").unwrap();
/// machine.process_inputs(&mut vending).unwrap();
///
/// assert_eq!(machine.current_state_name(), Some("Credit"));
/// assert_eq!(vending.credits, 1);
/// ```
///
/// [`set_ready_to_run`]: StateMachine::set_ready_to_run
/// [`process_inputs`]: StateMachine::process_inputs
pub struct StateMachine<O, S: Symbol, I: Symbol> {
    owner: String,
    config: MachineConfig,
    states: StateRegistry<S>,
    inputs: InputRegistry<I>,
    table: TransitionTable<O, S, I>,
    initial: Option<S>,
    current: Option<S>,
    queue: VecDeque<I>,
    lifecycle: Lifecycle,
    history: StateHistory<S, I>,
}

impl<O, S: Symbol, I: Symbol> StateMachine<O, S, I> {
    /// Create an engine for the owner called `owner` (used in log lines).
    pub fn new(owner: impl Into<String>) -> Self {
        Self::with_config(owner, MachineConfig::default())
    }

    pub fn with_config(owner: impl Into<String>, mut config: MachineConfig) -> Self {
        // A zero limit would discard every queue without applying anything.
        config.cascade_limit = config.cascade_limit.max(1);
        Self {
            owner: owner.into(),
            config,
            states: StateRegistry::new(),
            inputs: InputRegistry::new(),
            table: TransitionTable::new(),
            initial: None,
            current: None,
            queue: VecDeque::new(),
            lifecycle: Lifecycle::Constructing,
            history: StateHistory::with_capacity(config.history_capacity),
        }
    }

    pub fn add_state(&mut self, id: S, name: impl Into<String>) -> Result<(), MachineError> {
        self.ensure_open("a state")?;
        self.states.add_state(id, name).map_err(|e| self.reject(e))
    }

    pub fn add_input(&mut self, id: I, name: impl Into<String>) -> Result<(), MachineError> {
        self.ensure_open("an input")?;
        self.inputs.add_input(id, name).map_err(|e| self.reject(e))
    }

    /// Program the transition `from --input--> to`, running `action` on entry.
    pub fn add_transition(
        &mut self,
        from: S,
        input: I,
        to: S,
        action: Action<O, I>,
    ) -> Result<(), MachineError> {
        self.ensure_open("a transition")?;
        self.table
            .add_transition(&self.states, &self.inputs, from, input, to, action)
            .map_err(|e| self.reject(e))
    }

    /// Choose the state the machine starts in. May be called again to change it
    /// until the machine is ready.
    pub fn select_initial_state(&mut self, id: S) -> Result<(), MachineError> {
        if self.lifecycle.accepts_inputs() {
            return Err(self.reject(MachineError::AlreadyReady));
        }
        if !self.states.has_state(&id) {
            return Err(self.reject(MachineError::UnknownInitialState {
                state: format!("{:?}", id),
            }));
        }
        self.initial = Some(id.clone());
        self.current = Some(id);
        self.lifecycle = Lifecycle::Configured;
        Ok(())
    }

    /// Close registration and start accepting inputs. Succeeds only once.
    pub fn set_ready_to_run(&mut self) -> Result<(), MachineError> {
        match self.lifecycle {
            Lifecycle::Ready | Lifecycle::Running => Err(self.reject(MachineError::AlreadyReady)),
            Lifecycle::Constructing => Err(self.reject(MachineError::MissingInitialState)),
            Lifecycle::Configured => {
                self.lifecycle = Lifecycle::Ready;
                log::debug!(
                    "{}: ready to run in state {}",
                    self.owner,
                    self.current_state_label()
                );
                Ok(())
            }
        }
    }

    /// Append `input` to the pending queue.
    pub fn push_input(&mut self, input: I) -> Result<(), MachineError> {
        if !self.lifecycle.accepts_inputs() {
            return Err(self.reject(MachineError::NotReady {
                operation: "push_input",
            }));
        }
        self.enqueue(input)
    }

    /// Push `if_true` when `condition` holds, `if_false` otherwise.
    pub fn push_input_boolean(
        &mut self,
        condition: bool,
        if_true: I,
        if_false: I,
    ) -> Result<(), MachineError> {
        self.push_input(if condition { if_true } else { if_false })
    }

    /// Drain the queue, applying one transition per input in FIFO order.
    ///
    /// Actions run synchronously on `owner` before the next input is taken.
    /// Inputs they push are appended to the same queue and drained by this
    /// call. An input with no transition from the current state is reported
    /// and skipped; the rest of the queue is still processed.
    ///
    /// Draining stops after [`MachineConfig::cascade_limit`] inputs; what
    /// remains is discarded and reported.
    pub fn process_inputs(&mut self, owner: &mut O) -> Result<ProcessReport, MachineError> {
        if !self.lifecycle.accepts_inputs() {
            return Err(self.reject(MachineError::NotReady {
                operation: "process_inputs",
            }));
        }
        self.lifecycle = Lifecycle::Running;

        let mut report = ProcessReport::default();
        while let Some(input) = self.queue.pop_front() {
            if report.consumed == self.config.cascade_limit {
                let discarded = self.queue.len() + 1;
                self.queue.clear();
                let err = MachineError::CascadeLimitExceeded {
                    limit: self.config.cascade_limit,
                    discarded,
                };
                report.errors.push(self.reject(err));
                break;
            }
            report.consumed += 1;
            self.step(owner, input, &mut report);
        }
        Ok(report)
    }

    fn step(&mut self, owner: &mut O, input: I, report: &mut ProcessReport) {
        let Some(from) = self.current.clone() else {
            return;
        };

        let Some(transition) = self.table.resolve(&from, &input) else {
            let err = MachineError::UndefinedTransition {
                state: label(self.states.name(&from), &from),
                input: label(self.inputs.name(&input), &input),
            };
            report.errors.push(self.reject(err));
            return;
        };

        let to = transition.to().clone();
        log::debug!(
            "{}: {} --{}--> {}",
            self.owner,
            label(self.states.name(&from), &from),
            label(self.inputs.name(&input), &input),
            label(self.states.name(&to), &to)
        );
        self.current = Some(to.clone());
        self.history.record(TransitionRecord {
            from,
            input,
            to,
            timestamp: Utc::now(),
        });
        report.applied += 1;

        let mut cascade = Cascade::new();
        if transition.action().invoke(owner, &mut cascade) {
            report.actions += 1;
        }
        for pushed in cascade.take() {
            if let Err(err) = self.enqueue(pushed) {
                report.errors.push(err);
            }
        }
    }

    fn enqueue(&mut self, input: I) -> Result<(), MachineError> {
        if !self.inputs.has_input(&input) {
            return Err(self.reject(MachineError::UnregisteredInput {
                input: format!("{:?}", input),
            }));
        }
        self.queue.push_back(input);
        Ok(())
    }

    fn ensure_open(&self, item: &str) -> Result<(), MachineError> {
        if self.lifecycle.accepts_inputs() {
            return Err(self.reject(MachineError::RegistrationClosed {
                item: item.to_string(),
            }));
        }
        Ok(())
    }

    /// Log `err` at the level its kind calls for and hand it back.
    fn reject(&self, err: MachineError) -> MachineError {
        match err.kind() {
            ErrorKind::Registration | ErrorKind::UndefinedTransition => {
                log::warn!("{}: {}", self.owner, err)
            }
            ErrorKind::Readiness | ErrorKind::Usage | ErrorKind::Cascade => {
                log::error!("{}: {}", self.owner, err)
            }
        }
        err
    }

    fn current_state_label(&self) -> String {
        match &self.current {
            Some(state) => label(self.states.name(state), state),
            None => "<none>".to_string(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.accepts_inputs()
    }

    pub fn current_state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.current.as_ref().and_then(|s| self.states.name(s))
    }

    pub fn initial_state(&self) -> Option<&S> {
        self.initial.as_ref()
    }

    pub fn state_name(&self, id: &S) -> Option<&str> {
        self.states.name(id)
    }

    pub fn input_name(&self, id: &I) -> Option<&str> {
        self.inputs.name(id)
    }

    /// Number of inputs waiting for the next `process_inputs()` call.
    pub fn pending_inputs(&self) -> usize {
        self.queue.len()
    }

    pub fn states(&self) -> &StateRegistry<S> {
        &self.states
    }

    pub fn inputs(&self) -> &InputRegistry<I> {
        &self.inputs
    }

    pub fn table(&self) -> &TransitionTable<O, S, I> {
        &self.table
    }

    pub fn history(&self) -> &StateHistory<S, I> {
        &self.history
    }
}
