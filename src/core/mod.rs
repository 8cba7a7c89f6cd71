//! Building blocks of a state machine.
//!
//! This module contains the parts the engine is assembled from:
//! - Identifier bound via the `Symbol` trait
//! - Write-once state and input registries
//! - The `(state, input) -> (state, action)` transition table
//! - Bounded transition history
//!
//! Nothing here runs actions or owns a queue; see [`crate::machine`].

mod action;
mod error;
mod history;
mod registry;
mod symbol;
mod table;

pub use action::{Action, Cascade};
pub use error::{ErrorKind, MachineError};
pub use history::{StateHistory, TransitionRecord};
pub use registry::{InputRegistry, StateRegistry};
pub use symbol::Symbol;
pub use table::{Transition, TransitionTable, TransitionView};

pub(crate) use table::label;
