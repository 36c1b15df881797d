//! Cell Implementation
//!
//! A Cell is the shared node behind every state handle. It holds the current
//! value and the ordered list of effects observing it.
//!
//! # How Commits Work
//!
//! 1. The new value is written under the value lock, which is then released.
//!
//! 2. The effect list is snapshotted in registration order.
//!
//! 3. Every effect in the snapshot runs synchronously with the new and old
//!    values. Effects registered while a firing is in flight join the next
//!    firing, not the current one.
//!
//! # Thread Safety
//!
//! The value and the effect list sit behind separate parking_lot locks, so
//! readers never contend with effect registration. Because the value lock is
//! released before effects run, an effect may freely read this cell or update
//! other states without deadlocking.

use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::trace;

/// A registered effect: invoked with `(new value, old value)`.
pub(crate) type EffectFn<V> = Arc<dyn Fn(&V, &V) + Send + Sync>;

/// Effect slots stored inline before spilling to the heap. Most states have
/// zero, one, or two observers.
const INLINE_EFFECTS: usize = 2;

/// Shared storage for one state: the value plus its effect list.
pub(crate) struct Cell<V> {
    /// The current value.
    value: RwLock<V>,

    /// Effects in registration order. Append-only.
    effects: RwLock<SmallVec<[EffectFn<V>; INLINE_EFFECTS]>>,
}

impl<V> Cell<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cell holding `value` with no effects.
    pub(crate) fn new(value: V) -> Self {
        Self {
            value: RwLock::new(value),
            effects: RwLock::new(SmallVec::new()),
        }
    }

    /// Return a clone of the current value.
    pub(crate) fn get(&self) -> V {
        self.value.read().clone()
    }

    /// Read the current value in place without cloning it.
    pub(crate) fn with<R, F>(&self, read: F) -> R
    where
        F: FnOnce(&V) -> R,
    {
        read(&self.value.read())
    }

    /// Append an effect to the list.
    pub(crate) fn subscribe(&self, effect: EffectFn<V>) {
        self.effects.write().push(effect);
    }

    /// Number of registered effects.
    pub(crate) fn effect_count(&self) -> usize {
        self.effects.read().len()
    }

    /// Install `next` as the current value, then fire every effect that was
    /// registered at commit time, in registration order, with `(next, old)`.
    ///
    /// `old` is supplied by the caller rather than read here: an update
    /// captures its old value when it is invoked, and that capture is what
    /// effects observe even if another commit landed in between.
    pub(crate) fn commit(&self, next: V, old: V) {
        {
            *self.value.write() = next.clone();
        }

        let effects: SmallVec<[EffectFn<V>; INLINE_EFFECTS]> = self.effects.read().clone();
        trace!(effects = effects.len(), "committed new value");

        for effect in &effects {
            (**effect)(&next, &old);
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
