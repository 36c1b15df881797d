//! Source Trait
//!
//! `Source` is the readable half of the state contract: anything that can be
//! read and observed. Writable states ([`State`]) and derived read-only
//! states ([`ReadState`]) both implement it, which is what lets the
//! combinators accept either as an upstream.
//!
//! [`State`]: crate::State
//! [`ReadState`]: crate::ReadState

use std::sync::Arc;

/// A readable, observable state.
///
/// Implementors guarantee that effects registered through [`Source::effect`]
/// run in registration order after every committed update, each invoked with
/// the committed new value and the old value captured by that update.
pub trait Source: Send + Sync {
    /// The type of value held by this state.
    type Value: Clone + Send + Sync + 'static;

    /// Return a clone of the current value.
    fn get(&self) -> Self::Value;

    /// Read the current value in place without cloning it.
    fn with<R, F>(&self, read: F) -> R
    where
        F: FnOnce(&Self::Value) -> R;

    /// Append `effect` to this state's effect list.
    ///
    /// Registration never invokes the effect; it first runs after the next
    /// committed update. A panicking effect unwinds out of the update call
    /// and skips the rest of that firing.
    fn effect<F>(&self, effect: F)
    where
        F: Fn(&Self::Value, &Self::Value) + Send + Sync + 'static;

    /// Register `effect` and then immediately invoke it once with the
    /// current value and `None` in the old-value slot.
    ///
    /// On subsequent updates the effect runs like any other, with the old
    /// value present. Registration happens before the immediate invocation,
    /// so an update racing with `effect_now` cannot slip between the two
    /// unobserved.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let count = State::basic(3);
    /// count.effect_now(|new, old| match old {
    ///     None => println!("currently {new}"),
    ///     Some(old) => println!("{old} -> {new}"),
    /// });
    /// ```
    fn effect_now<F>(&self, effect: F)
    where
        F: Fn(&Self::Value, Option<&Self::Value>) + Send + Sync + 'static,
    {
        let effect = Arc::new(effect);
        let registered = Arc::clone(&effect);
        self.effect(move |new, old| (*registered)(new, Some(old)));
        self.with(|current| (*effect)(current, None));
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
