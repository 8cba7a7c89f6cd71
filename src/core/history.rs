//! Bounded log of applied transitions.
//!
//! The engine records one entry per transition it applies. Once the log
//! reaches its capacity the oldest entry is dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single applied transition.
///
/// # Example
///
/// ```rust
/// use statebridge::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     from: "Idle",
///     input: "QuarterInserted",
///     to: "OneCredit",
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "OneCredit");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord<S, I> {
    /// The state being left
    pub from: S,
    /// The input that triggered the move
    pub input: I,
    /// The state being entered
    pub to: S,
    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of applied transitions.
///
/// # Example
///
/// ```rust
/// use statebridge::core::{StateHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_capacity(8);
/// history.record(TransitionRecord {
///     from: "Start",
///     input: "go",
///     to: "Middle",
///     timestamp: Utc::now(),
/// });
/// history.record(TransitionRecord {
///     from: "Middle",
///     input: "go",
///     to: "End",
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec![&"Start", &"Middle", &"End"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<S, I> {
    records: VecDeque<TransitionRecord<S, I>>,
    capacity: usize,
}

impl<S, I> StateHistory<S, I> {
    /// Create an empty history holding at most `capacity` records.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord<S, I>) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// States traversed: the oldest retained `from`, then every `to`.
    pub fn path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        path.extend(self.records.iter().map(|record| &record.to));
        path
    }

    /// Time between the oldest and newest retained records.
    ///
    /// Returns `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.records.front()?;
        let last = self.records.back()?;
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord<S, I>> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn record(
        from: TestState,
        to: TestState,
        timestamp: DateTime<Utc>,
    ) -> TransitionRecord<TestState, u8> {
        TransitionRecord {
            from,
            input: 0,
            to,
            timestamp,
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState, u8> = StateHistory::with_capacity(4);
        assert!(history.is_empty());
        assert!(history.path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn path_returns_state_sequence() {
        let mut history = StateHistory::with_capacity(4);
        history.record(record(TestState::Initial, TestState::Processing, Utc::now()));
        history.record(record(TestState::Processing, TestState::Complete, Utc::now()));

        let path = history.path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &TestState::Initial);
        assert_eq!(path[1], &TestState::Processing);
        assert_eq!(path[2], &TestState::Complete);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = StateHistory::with_capacity(2);
        history.record(record(TestState::Initial, TestState::Processing, Utc::now()));
        history.record(record(TestState::Processing, TestState::Complete, Utc::now()));
        history.record(record(TestState::Complete, TestState::Initial, Utc::now()));

        assert_eq!(history.len(), 2);
        assert_eq!(history.path()[0], &TestState::Processing);
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = StateHistory::with_capacity(0);
        history.record(record(TestState::Initial, TestState::Processing, Utc::now()));
        assert!(history.is_empty());
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let mut history = StateHistory::with_capacity(4);
        history.record(record(TestState::Initial, TestState::Processing, start));
        history.record(record(
            TestState::Processing,
            TestState::Complete,
            start + chrono::Duration::milliseconds(25),
        ));

        assert_eq!(history.duration(), Some(Duration::from_millis(25)));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::with_capacity(4);
        history.record(record(TestState::Initial, TestState::Processing, Utc::now()));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState, u8> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.capacity(), 4);
    }
}
