//! Tracker configuration.

use crate::device::CommunicationConfig;
use crate::machine::MachineConfig;
use serde::{Deserialize, Serialize};

/// Settings for a [`Tracker`](super::Tracker).
///
/// Every field has a default, so a JSON document only needs the ones it
/// changes.
///
/// # Example
///
/// ```rust
/// use statebridge::tracker::TrackerConfig;
///
/// let config = TrackerConfig::from_json(r#"{ "name": "optical", "validity_ms": 50 }"#).unwrap();
/// assert_eq!(config.name, "optical");
/// assert_eq!(config.validity_ms, 50);
/// assert_eq!(config.poll_interval_ms, TrackerConfig::default().poll_interval_ms);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Owner name used in log lines.
    pub name: String,
    /// How long a transform stays valid after it is acquired.
    pub validity_ms: u64,
    /// Pause between acquisitions on the communication thread.
    pub poll_interval_ms: u64,
    pub thread_name: String,
    /// Acquisition faults held until the next status update. Extra ones are
    /// dropped.
    pub fault_queue_capacity: usize,
    /// Events held until read. Extra ones are dropped.
    pub event_queue_capacity: usize,
    pub machine: MachineConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            name: "tracker".to_string(),
            validity_ms: 100,
            poll_interval_ms: 10,
            thread_name: "tracker-io".to_string(),
            fault_queue_capacity: 16,
            event_queue_capacity: 256,
            machine: MachineConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Settings handed to the communication thread.
    pub fn communication(&self) -> CommunicationConfig {
        CommunicationConfig {
            thread_name: self.thread_name.clone(),
            poll_interval_ms: self.poll_interval_ms,
            validity_ms: self.validity_ms,
        }
    }
}
