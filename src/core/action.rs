//! Transition actions and the cascade handle they receive.

use super::symbol::Symbol;
use std::fmt;

type ActionFn<O, I> = Box<dyn Fn(&mut O, &mut Cascade<I>) + Send>;

/// Callback bound to a transition, run on the owner after the state changes.
///
/// An action receives the owner and a [`Cascade`] through which it may
/// push follow-up inputs. Those inputs join the tail of the machine's
/// queue and are drained by the same `process_inputs` call.
///
/// # Example
///
/// ```rust
/// use statebridge::core::Action;
///
/// struct Counter {
///     hits: u32,
/// }
///
/// let count: Action<Counter, &str> = Action::new(|owner: &mut Counter, _| owner.hits += 1);
/// let nothing: Action<Counter, &str> = Action::none();
///
/// assert!(!count.is_none());
/// assert!(nothing.is_none());
///
/// let named: Action<Counter, &str> = Action::named("Count", |owner: &mut Counter, _| owner.hits += 1);
/// assert_eq!(named.name(), Some("Count"));
/// ```
pub struct Action<O, I> {
    name: Option<String>,
    callback: Option<ActionFn<O, I>>,
}

impl<O, I: Symbol> Action<O, I> {
    /// Wrap a closure as an action.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut O, &mut Cascade<I>) + Send + 'static,
    {
        Self {
            name: None,
            callback: Some(Box::new(callback)),
        }
    }

    /// Wrap a closure under a name shown in graph exports.
    pub fn named<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut O, &mut Cascade<I>) + Send + 'static,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(callback)
        }
    }

    /// Action that changes state and invokes nothing.
    pub fn none() -> Self {
        Self {
            name: None,
            callback: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.callback.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns `false` when there was nothing to call.
    pub(crate) fn invoke(&self, owner: &mut O, cascade: &mut Cascade<I>) -> bool {
        match &self.callback {
            Some(callback) => {
                callback(owner, cascade);
                true
            }
            None => false,
        }
    }
}

impl<O, I> fmt::Debug for Action<O, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.callback) {
            (Some(name), Some(_)) => write!(f, "Action({})", name),
            (None, Some(_)) => f.write_str("Action(<callback>)"),
            (_, None) => f.write_str("Action(none)"),
        }
    }
}

/// Inputs pushed by an action while it runs.
#[derive(Debug)]
pub struct Cascade<I> {
    pushed: Vec<I>,
}

impl<I: Symbol> Cascade<I> {
    pub(crate) fn new() -> Self {
        Self { pushed: Vec::new() }
    }

    /// Queue `input` behind everything already pending.
    pub fn push_input(&mut self, input: I) {
        self.pushed.push(input);
    }

    /// Queue `if_true` when `condition` holds, `if_false` otherwise.
    pub fn push_input_boolean(&mut self, condition: bool, if_true: I, if_false: I) {
        self.push_input(if condition { if_true } else { if_false });
    }

    pub(crate) fn take(&mut self) -> Vec<I> {
        std::mem::take(&mut self.pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Owner {
        calls: Vec<&'static str>,
    }

    #[test]
    fn invoke_runs_callback_with_owner() {
        let action: Action<Owner, &str> = Action::new(|owner: &mut Owner, cascade| {
            owner.calls.push("ran");
            cascade.push_input("next");
        });
        let mut owner = Owner { calls: Vec::new() };
        let mut cascade = Cascade::new();

        assert!(action.invoke(&mut owner, &mut cascade));
        assert_eq!(owner.calls, vec!["ran"]);
        assert_eq!(cascade.take(), vec!["next"]);
    }

    #[test]
    fn none_action_invokes_nothing() {
        let action: Action<Owner, &str> = Action::none();
        let mut owner = Owner { calls: Vec::new() };
        let mut cascade = Cascade::new();

        assert!(!action.invoke(&mut owner, &mut cascade));
        assert!(owner.calls.is_empty());
    }

    #[test]
    fn named_action_keeps_its_name() {
        let action: Action<Owner, &str> =
            Action::named("Record", |owner: &mut Owner, _| owner.calls.push("named"));
        let mut owner = Owner { calls: Vec::new() };

        assert_eq!(action.name(), Some("Record"));
        assert_eq!(format!("{:?}", action), "Action(Record)");
        assert!(action.invoke(&mut owner, &mut Cascade::new()));
        assert_eq!(owner.calls, vec!["named"]);
        assert_eq!(Action::<Owner, &str>::none().name(), None);
    }

    #[test]
    fn push_input_boolean_picks_one() {
        let mut cascade = Cascade::new();
        cascade.push_input_boolean(true, "success", "failure");
        cascade.push_input_boolean(false, "success", "failure");

        assert_eq!(cascade.take(), vec!["success", "failure"]);
        assert!(cascade.take().is_empty());
    }
}
