//! The run-time engine.
//!
//! A [`StateMachine`] owns the registries, the transition table, the
//! current state and a FIFO input queue for one owner object. The owner
//! composes it as a field and drives it from its request methods:
//!
//! 1. register states, inputs and transitions
//! 2. `select_initial_state()`, then `set_ready_to_run()` exactly once
//! 3. `push_input()` one or more inputs, then `process_inputs(&mut owner)`
//!
//! `process_inputs()` runs to completion on the calling thread. Inputs
//! pushed by actions are drained by the same call, bounded by
//! [`MachineConfig::cascade_limit`].

mod config;
mod engine;

pub use config::{MachineConfig, DEFAULT_CASCADE_LIMIT, DEFAULT_HISTORY_CAPACITY};
pub use engine::{Lifecycle, ProcessReport, StateMachine};
