//! Write-once registries of states and inputs.
//!
//! Both registries map an identifier to its display name and remember
//! registration order so that exports are deterministic. There is no
//! removal: entries live as long as the owning machine.

use super::error::MachineError;
use super::symbol::Symbol;
use std::collections::HashMap;

#[derive(Debug)]
struct Entries<K: Symbol> {
    names: HashMap<K, String>,
    order: Vec<K>,
}

impl<K: Symbol> Entries<K> {
    fn new() -> Self {
        Self {
            names: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Returns the already-registered name on collision.
    fn insert(&mut self, id: K, name: String) -> Result<(), String> {
        if let Some(existing) = self.names.get(&id) {
            return Err(existing.clone());
        }
        self.order.push(id.clone());
        self.names.insert(id, name);
        Ok(())
    }

    fn name(&self, id: &K) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    fn iter(&self) -> impl Iterator<Item = (&K, &str)> + '_ {
        self.order.iter().map(move |id| (id, self.names[id].as_str()))
    }
}

/// Registry of the states a machine may occupy.
///
/// # Example
///
/// ```rust
/// use statebridge::core::StateRegistry;
///
/// let mut states = StateRegistry::new();
/// states.add_state("idle", "IdleState").unwrap();
///
/// assert!(states.has_state(&"idle"));
/// assert!(states.add_state("idle", "Again").is_err());
/// assert_eq!(states.name(&"idle"), Some("IdleState"));
/// ```
#[derive(Debug)]
pub struct StateRegistry<S: Symbol> {
    entries: Entries<S>,
}

impl<S: Symbol> StateRegistry<S> {
    pub fn new() -> Self {
        Self {
            entries: Entries::new(),
        }
    }

    /// Register a state. A duplicate identifier keeps the first name.
    pub fn add_state(&mut self, id: S, name: impl Into<String>) -> Result<(), MachineError> {
        self.entries
            .insert(id, name.into())
            .map_err(|name| MachineError::DuplicateState { name })
    }

    pub fn has_state(&self, id: &S) -> bool {
        self.entries.names.contains_key(id)
    }

    pub fn name(&self, id: &S) -> Option<&str> {
        self.entries.name(id)
    }

    /// States in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &str)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.order.is_empty()
    }
}

impl<S: Symbol> Default for StateRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of the inputs a machine accepts.
#[derive(Debug)]
pub struct InputRegistry<I: Symbol> {
    entries: Entries<I>,
}

impl<I: Symbol> InputRegistry<I> {
    pub fn new() -> Self {
        Self {
            entries: Entries::new(),
        }
    }

    /// Register an input. A duplicate identifier keeps the first name.
    pub fn add_input(&mut self, id: I, name: impl Into<String>) -> Result<(), MachineError> {
        self.entries
            .insert(id, name.into())
            .map_err(|name| MachineError::DuplicateInput { name })
    }

    pub fn has_input(&self, id: &I) -> bool {
        self.entries.names.contains_key(id)
    }

    pub fn name(&self, id: &I) -> Option<&str> {
        self.entries.name(id)
    }

    /// Inputs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&I, &str)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.order.is_empty()
    }
}

impl<I: Symbol> Default for InputRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}
