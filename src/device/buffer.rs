//! Lock-protected handoff between device I/O and the state machine.

use super::stamp::Stamped;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-key slot of a [`StatusBuffer`].
#[derive(Clone, Debug, PartialEq)]
pub struct BufferEntry<P> {
    /// Set by the producer when the last frame contained this key.
    pub present: bool,
    /// Last value written. Kept when the key drops out of a frame.
    pub latest: Option<Stamped<P>>,
}

impl<P> Default for BufferEntry<P> {
    fn default() -> Self {
        Self {
            present: false,
            latest: None,
        }
    }
}

/// What the consumer found for one key.
#[derive(Clone, Debug, PartialEq)]
pub enum Reading<P> {
    /// Fresh data was present in the last frame.
    Visible(Stamped<P>),
    /// Nothing present for this key.
    NotAvailable,
}

impl<P> Reading<P> {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }
}

/// Shared per-key status written by a producer thread and read by the owner.
///
/// Clones share the same buffer. Every access goes through one scoped lock
/// held for the length of a single read or write, and a poisoned lock is
/// recovered rather than propagated: the data is plain values, so the last
/// completed write is still consistent.
///
/// Only registered keys are tracked. Frames mentioning other keys are
/// ignored for those keys.
///
/// # Example
///
/// ```rust
/// use statebridge::device::{Reading, Stamped, StatusBuffer, TimeStamp};
/// use chrono::{Duration, Utc};
///
/// let buffer: StatusBuffer<&str, f64> = StatusBuffer::new();
/// buffer.register("probe");
/// buffer.register("reference");
///
/// let stamp = TimeStamp::new(Utc::now(), Duration::milliseconds(100));
/// buffer.write_frame(vec![("probe", Stamped::new(1.5, stamp))]);
///
/// let readings = buffer.read_all();
/// assert!(readings.iter().any(|(k, r)| *k == "probe" && r.is_visible()));
/// assert!(readings.iter().any(|(k, r)| *k == "reference" && *r == Reading::NotAvailable));
/// ```
#[derive(Debug)]
pub struct StatusBuffer<K, P> {
    slots: Arc<Mutex<HashMap<K, BufferEntry<P>>>>,
}

impl<K, P> Clone for StatusBuffer<K, P> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<K, P> Default for StatusBuffer<K, P> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, P> StatusBuffer<K, P>
where
    K: Clone + Eq + Hash + Debug,
    P: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with the buffer locked. The lock is released when `f` returns
    /// or unwinds.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut HashMap<K, BufferEntry<P>>) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slots)
    }

    /// Start tracking `key`. Returns false if it was already registered.
    pub fn register(&self, key: K) -> bool {
        self.with_lock(|slots| {
            if slots.contains_key(&key) {
                return false;
            }
            slots.insert(key, BufferEntry::default());
            true
        })
    }

    /// Stop tracking `key` and drop its data.
    pub fn remove(&self, key: &K) -> bool {
        self.with_lock(|slots| slots.remove(key).is_some())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.with_lock(|slots| slots.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.with_lock(|slots| slots.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Producer side: record one acquired frame.
    ///
    /// Every registered key in `frame` becomes present with its new value.
    /// Registered keys missing from `frame` become absent but keep their
    /// last value.
    pub fn write_frame(&self, frame: Vec<(K, Stamped<P>)>) {
        self.with_lock(|slots| {
            for entry in slots.values_mut() {
                entry.present = false;
            }
            for (key, value) in frame {
                match slots.get_mut(&key) {
                    Some(entry) => {
                        entry.present = true;
                        entry.latest = Some(value);
                    }
                    None => log::trace!("ignoring data for unregistered key {:?}", key),
                }
            }
        });
    }

    /// Mark every key absent without touching stored values.
    pub fn clear_presence(&self) {
        self.with_lock(|slots| {
            for entry in slots.values_mut() {
                entry.present = false;
            }
        });
    }

    /// Consumer side: one reading per registered key.
    ///
    /// Never blocks waiting for new data. A present key reports whatever was
    /// last written, expired or not.
    pub fn read_all(&self) -> Vec<(K, Reading<P>)> {
        self.with_lock(|slots| {
            slots
                .iter()
                .map(|(key, entry)| {
                    let reading = match (&entry.present, &entry.latest) {
                        (true, Some(latest)) => Reading::Visible(latest.clone()),
                        _ => Reading::NotAvailable,
                    };
                    (key.clone(), reading)
                })
                .collect()
        })
    }

    /// Copy of the slot for `key`.
    pub fn entry(&self, key: &K) -> Option<BufferEntry<P>> {
        self.with_lock(|slots| slots.get(key).cloned())
    }
}
