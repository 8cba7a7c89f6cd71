//! Statebridge: table-driven state machines for device owners
//!
//! An owner object (a tracker, an imager, a communication port) composes
//! one [`StateMachine`] and programs it at construction: states, inputs and
//! `(state, input) -> (state, action)` transitions. Its request methods push
//! inputs and call `process_inputs`, which drains the queue in FIFO order
//! and runs each bound action synchronously on the owner. Actions may push
//! follow-up inputs that are drained by the same call.
//!
//! Hardware events reach the machine through the [`device`] module: a
//! background thread writes acquired data into a lock-protected buffer and
//! the owner reads it back inside an action. The state machine itself is
//! only ever touched from the owner's thread.
//!
//! # Core Concepts
//!
//! - **Registration**: write-once states, inputs and transitions
//! - **Readiness**: select an initial state, then `set_ready_to_run` once
//! - **Cascade**: inputs pushed by actions, bounded per call
//! - **Double buffering**: producer thread and state-machine consumer
//!   sharing one lock
//!
//! # Example
//!
//! ```rust
//! use statebridge::{symbol_enum, Action, StateMachine};
//!
//! symbol_enum! {
//!     pub enum Coin {
//!         Idle,
//!         OneCredit,
//!         TwoCredit,
//!     }
//! }
//!
//! symbol_enum! {
//!     pub enum CoinInput {
//!         QuarterInserted,
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Slot {
//!     quarters: u32,
//! }
//!
//! let mut machine: StateMachine<Slot, Coin, CoinInput> = StateMachine::new("slot");
//! for state in Coin::ALL {
//!     machine.add_state(*state, state.name()).unwrap();
//! }
//! machine.add_input(CoinInput::QuarterInserted, "QuarterInserted").unwrap();
//! let count = || Action::new(|slot: &mut Slot, _| slot.quarters += 1);
//! machine
//!     .add_transition(Coin::Idle, CoinInput::QuarterInserted, Coin::OneCredit, count())
//!     .unwrap();
//! machine
//!     .add_transition(Coin::OneCredit, CoinInput::QuarterInserted, Coin::TwoCredit, count())
//!     .unwrap();
//! machine.select_initial_state(Coin::Idle).unwrap();
//! machine.set_ready_to_run().unwrap();
//!
//! let mut slot = Slot::default();
//! machine.push_input(CoinInput::QuarterInserted).unwrap();
//! machine.push_input(CoinInput::QuarterInserted).unwrap();
//! machine.process_inputs(&mut slot).unwrap();
//!
//! assert_eq!(machine.current_state(), Some(&Coin::TwoCredit));
//! assert_eq!(slot.quarters, 2);
//! ```

// Lets `symbol_enum!` name this crate the same way inside and outside it.
extern crate self as statebridge;

pub mod audit;
pub mod core;
pub mod device;
pub mod export;
pub mod machine;
pub mod snapshot;
pub mod tracker;

mod macros;

#[doc(hidden)]
pub use serde as __serde;

// Re-export commonly used types
pub use crate::core::{Action, Cascade, ErrorKind, MachineError, Symbol};
pub use crate::machine::{Lifecycle, MachineConfig, ProcessReport, StateMachine};
