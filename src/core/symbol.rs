//! Identifier bound shared by states and inputs.
//!
//! States and inputs are plain tagged values. Any cheap, hashable,
//! debuggable value works: a fieldless enum (see [`symbol_enum!`]),
//! an interned `&'static str`, or a small integer.
//!
//! [`symbol_enum!`]: crate::symbol_enum

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state and input identifiers.
///
/// # Required Traits
///
/// - `Clone`: identifiers are copied into the queue and the history
/// - `Eq` + `Hash`: identifiers key the registries and the transition table
/// - `Debug`: identifiers appear in diagnostics when no name is registered
/// - `Send` + `Sync`: owners may be moved across threads
///
/// The trait is implemented for every type meeting these bounds.
///
/// # Example
///
/// ```rust
/// use statebridge::core::Symbol;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum DoorState {
///     Open,
///     Closed,
/// }
///
/// fn assert_symbol<T: Symbol>() {}
/// assert_symbol::<DoorState>();
/// assert_symbol::<&'static str>();
/// ```
pub trait Symbol: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Symbol for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}
