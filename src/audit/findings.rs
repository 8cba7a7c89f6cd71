//! Findings reported by the table audit.

use thiserror::Error;

/// A questionable property of a programmed machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditFinding {
    #[error("No initial state selected")]
    NoInitialState,

    #[error("State '{state}' cannot be reached from the initial state")]
    UnreachableState { state: String },

    #[error("Input '{input}' has no transition from any state")]
    UnusedInput { input: String },

    #[error("State '{state}' has no outgoing transition")]
    DeadEndState { state: String },
}
