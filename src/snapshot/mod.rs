//! Diagnostic snapshots of a running machine.
//!
//! A snapshot captures what can be inspected after the fact: where the
//! machine is, which lifecycle stage it reached and the transitions it
//! recently applied. Actions are closures and are never captured, so a
//! snapshot describes a machine but cannot rebuild one.
//!
//! Snapshots encode to JSON for reading and to bincode for compact
//! storage. Decoding checks [`SNAPSHOT_VERSION`].

use crate::core::{StateHistory, Symbol};
use crate::machine::{Lifecycle, StateMachine};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable picture of a machine at one instant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot<S, I> {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Owner name the machine logs under
    pub owner: String,

    pub lifecycle: Lifecycle,

    /// `None` until an initial state is selected
    pub current_state: Option<S>,

    /// Retained transition history
    pub history: StateHistory<S, I>,
}

impl<S, I> Snapshot<S, I>
where
    S: Serialize + DeserializeOwned,
    I: Serialize + DeserializeOwned,
{
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }
}

impl<O, S: Symbol, I: Symbol> StateMachine<O, S, I> {
    /// Capture the machine's current state, lifecycle and history.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statebridge::core::Action;
    /// use statebridge::machine::{Lifecycle, StateMachine};
    /// use statebridge::snapshot::Snapshot;
    ///
    /// let mut machine: StateMachine<(), u8, u8> = StateMachine::new("counter");
    /// machine.add_state(0, "Zero").unwrap();
    /// machine.add_state(1, "One").unwrap();
    /// machine.add_input(0, "Inc").unwrap();
    /// machine.add_transition(0, 0, 1, Action::none()).unwrap();
    /// machine.select_initial_state(0).unwrap();
    /// machine.set_ready_to_run().unwrap();
    /// machine.push_input(0).unwrap();
    /// machine.process_inputs(&mut ()).unwrap();
    ///
    /// let json = machine.snapshot().to_json().unwrap();
    /// let restored: Snapshot<u8, u8> = Snapshot::from_json(&json).unwrap();
    /// assert_eq!(restored.current_state, Some(1));
    /// assert_eq!(restored.lifecycle, Lifecycle::Running);
    /// ```
    pub fn snapshot(&self) -> Snapshot<S, I> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            owner: self.owner().to_string(),
            lifecycle: self.lifecycle(),
            current_state: self.current_state().cloned(),
            history: self.history().clone(),
        };
        log::debug!("{}: snapshot {} taken", snapshot.owner, snapshot.id);
        snapshot
    }
}
