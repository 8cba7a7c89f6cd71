//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default bound on inputs consumed by one `process_inputs` call.
pub const DEFAULT_CASCADE_LIMIT: usize = 1024;

/// Default number of transitions kept in the history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Tunables for a [`StateMachine`](super::StateMachine).
///
/// # Example
///
/// ```rust
/// use statebridge::machine::MachineConfig;
///
/// let config: MachineConfig = serde_json::from_str(r#"{ "cascade_limit": 16 }"#).unwrap();
/// assert_eq!(config.cascade_limit, 16);
/// assert_eq!(config.history_capacity, statebridge::machine::DEFAULT_HISTORY_CAPACITY);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Inputs one `process_inputs` call may consume, cascaded ones included.
    /// Values below one are raised to one when the engine is built.
    pub cascade_limit: usize,
    /// Transitions retained in the history. Zero disables recording.
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cascade_limit: DEFAULT_CASCADE_LIMIT,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MachineConfig {
    pub fn cascade_limit(mut self, limit: usize) -> Self {
        self.cascade_limit = limit.max(1);
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_limit_setter_never_goes_below_one() {
        assert_eq!(MachineConfig::default().cascade_limit(0).cascade_limit, 1);
        assert_eq!(MachineConfig::default().cascade_limit(8).cascade_limit, 8);
    }
}
