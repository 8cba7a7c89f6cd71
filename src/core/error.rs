//! Errors reported by registries, the transition table and the engine.

use thiserror::Error;

/// Broad category of a [`MachineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad state, input or transition registration. Only that item is skipped.
    Registration,
    /// Misuse of the initial-state / ready-to-run protocol.
    Readiness,
    /// Run-time call made while the engine cannot accept it.
    Usage,
    /// No transition exists for the current state and the received input.
    UndefinedTransition,
    /// A single processing pass consumed more inputs than allowed.
    Cascade,
}

/// Errors that can occur while programming or running a state machine.
///
/// None of these are fatal: the engine logs each one, leaves its own
/// state untouched, and returns the error so callers may inspect it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State '{name}' is already registered")]
    DuplicateState { name: String },

    #[error("Input '{name}' is already registered")]
    DuplicateInput { name: String },

    #[error("Transition source state {state} is not registered")]
    UnknownSourceState { state: String },

    #[error("Transition input {input} is not registered")]
    UnknownInput { input: String },

    #[error("Transition target state {state} is not registered")]
    UnknownTargetState { state: String },

    #[error("A transition from '{state}' on '{input}' already exists")]
    DuplicateTransition { state: String, input: String },

    #[error("Cannot register {item} after the machine is ready to run")]
    RegistrationClosed { item: String },

    #[error("Initial state {state} is not registered")]
    UnknownInitialState { state: String },

    #[error("No initial state selected. Call select_initial_state() before set_ready_to_run()")]
    MissingInitialState,

    #[error("set_ready_to_run() was already called")]
    AlreadyReady,

    #[error("{operation}() called before set_ready_to_run()")]
    NotReady { operation: &'static str },

    #[error("Pushed input {input} is not registered")]
    UnregisteredInput { input: String },

    #[error("Invalid request '{input}' for current state '{state}'")]
    UndefinedTransition { state: String, input: String },

    #[error("Cascade limit of {limit} inputs reached; {discarded} queued inputs discarded")]
    CascadeLimitExceeded { limit: usize, discarded: usize },
}

impl MachineError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateState { .. }
            | Self::DuplicateInput { .. }
            | Self::UnknownSourceState { .. }
            | Self::UnknownInput { .. }
            | Self::UnknownTargetState { .. }
            | Self::DuplicateTransition { .. }
            | Self::RegistrationClosed { .. } => ErrorKind::Registration,
            Self::UnknownInitialState { .. } | Self::MissingInitialState | Self::AlreadyReady => {
                ErrorKind::Readiness
            }
            Self::NotReady { .. } | Self::UnregisteredInput { .. } => ErrorKind::Usage,
            Self::UndefinedTransition { .. } => ErrorKind::UndefinedTransition,
            Self::CascadeLimitExceeded { .. } => ErrorKind::Cascade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let duplicate = MachineError::DuplicateTransition {
            state: "Idle".to_string(),
            input: "Quarter".to_string(),
        };
        assert_eq!(duplicate.kind(), ErrorKind::Registration);
        assert_eq!(MachineError::AlreadyReady.kind(), ErrorKind::Readiness);
        assert_eq!(
            MachineError::NotReady {
                operation: "process_inputs"
            }
            .kind(),
            ErrorKind::Usage
        );
        assert_eq!(
            MachineError::CascadeLimitExceeded {
                limit: 4,
                discarded: 1
            }
            .kind(),
            ErrorKind::Cascade
        );
    }

    #[test]
    fn messages_name_the_offender() {
        let err = MachineError::UndefinedTransition {
            state: "IdleState".to_string(),
            input: "Cancel".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid request 'Cancel' for current state 'IdleState'"
        );
    }
}
