//! Read-Only State Handles
//!
//! A `ReadState` exposes the readable half of a state and deliberately no
//! way to update it. The combinators return this type, and any writable
//! state can be downgraded to one with [`State::read_only`].
//!
//! [`State::read_only`]: crate::State::read_only

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::cell::Cell;
use super::source::Source;

/// A read-only handle to a state.
///
/// Cloning is cheap and produces another handle to the same underlying
/// value; clones observe each other's upstream-driven changes.
pub struct ReadState<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// The shared cell holding the value and its effects.
    cell: Arc<Cell<V>>,

    /// Keeps upstream sources alive for as long as this handle (or a clone
    /// of it) exists. Effect closures registered on those sources hold only
    /// weak references back, so dropping every handle releases the chain.
    upstream: Vec<Arc<dyn Any + Send + Sync>>,
}

impl<V> ReadState<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(cell: Arc<Cell<V>>, upstream: Vec<Arc<dyn Any + Send + Sync>>) -> Self {
        Self { cell, upstream }
    }

    /// Return a clone of the current value.
    pub fn get(&self) -> V {
        self.cell.get()
    }

    /// Read the current value in place without cloning it.
    pub fn with<R, F>(&self, read: F) -> R
    where
        F: FnOnce(&V) -> R,
    {
        self.cell.with(read)
    }

    /// Append an effect invoked with `(new, old)` after every committed
    /// update of this state.
    pub fn effect<F>(&self, effect: F)
    where
        F: Fn(&V, &V) + Send + Sync + 'static,
    {
        self.cell.subscribe(Arc::new(effect));
    }

    /// Number of registered effects.
    pub fn effect_count(&self) -> usize {
        self.cell.effect_count()
    }
}

impl<V> Source for ReadState<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;

    fn get(&self) -> V {
        self.cell.get()
    }

    fn with<R, F>(&self, read: F) -> R
    where
        F: FnOnce(&V) -> R,
    {
        self.cell.with(read)
    }

    fn effect<F>(&self, effect: F)
    where
        F: Fn(&V, &V) + Send + Sync + 'static,
    {
        self.cell.subscribe(Arc::new(effect));
    }
}

impl<V> Clone for ReadState<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            upstream: self.upstream.clone(),
        }
    }
}

impl<V> Debug for ReadState<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadState")
            .field("value", &self.get())
            .field("effect_count", &self.effect_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
