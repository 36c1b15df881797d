//! Debounced States
//!
//! A debounced state trails its source by a fixed delay and collapses
//! bursts of source updates into a single downstream update.
//!
//! # How the Window Works
//!
//! 1. A source update arriving while no window is open opens one: the value
//!    is captured, and a timer task is spawned for the delay.
//!
//! 2. Source updates arriving while the window is open are recorded but
//!    schedule nothing.
//!
//! 3. When the timer elapses, the value captured at the window opening is
//!    committed downstream and the window closes.
//!
//! A value recorded mid-window is therefore never pushed on its own; it
//! reaches the debounced state only if a later source update opens a new
//! window. This matches debounce-to-first semantics rather than
//! trailing-edge semantics.

use std::any::Any;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::trace;

use crate::state::cell::Cell;
use crate::state::{ReadState, Source};

/// Delay used by [`debounced`] callers that have no tuning requirement of
/// their own.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Window bookkeeping shared between the source watch and the timer task.
struct Gate<V> {
    /// True when no window is open and the next source update may open one.
    ready: bool,

    /// The most recent source value, recorded on every update.
    latest: V,
}

/// Derive a read-only state that follows `source` after `delay`, collapsing
/// bursts of updates into one.
///
/// The debounced state starts at the source's current value. Each commit it
/// makes fires its effects on a runtime worker thread, not on the thread
/// that updated the source.
///
/// The returned handle keeps `source` alive; dropping every handle to the
/// debounced state disconnects it and lets any in-flight window lapse
/// without committing.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime; the timer tasks need a
/// runtime to land on, and capturing the handle up front makes the
/// requirement visible at construction instead of at the first update.
pub fn debounced<S>(source: S, delay: Duration) -> ReadState<S::Value>
where
    S: Source + 'static,
{
    let runtime = Handle::current();
    let initial = source.get();
    let cell = Arc::new(Cell::new(initial.clone()));
    let gate = Arc::new(Mutex::new(Gate {
        ready: true,
        latest: initial,
    }));

    let watch = {
        let cell = Arc::downgrade(&cell);
        let gate = Arc::clone(&gate);
        move |new: &S::Value, _old: &S::Value| {
            let mut guard = gate.lock();
            guard.latest = new.clone();
            if !guard.ready {
                trace!("window open; update recorded");
                return;
            }
            guard.ready = false;
            let captured = guard.latest.clone();
            drop(guard);

            trace!(delay_ms = delay.as_millis() as u64, "window opened");
            let cell = Weak::clone(&cell);
            let gate = Arc::clone(&gate);
            runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(cell) = cell.upgrade() {
                    let old = cell.get();
                    cell.commit(captured, old);
                }
                gate.lock().ready = true;
            });
        }
    };
    source.effect(watch);

    let keep: Arc<dyn Any + Send + Sync> = Arc::new(source);
    ReadState::new(cell, vec![keep])
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use std::sync::atomic::{AtomicI32, Ordering};
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn debounce_starts_at_the_source_value() {
        let source = State::basic(3);
        let lazy = debounced(source.clone(), DEFAULT_DEBOUNCE);
        assert_eq!(lazy.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn one_window_collapses_a_burst() {
        let source = State::basic(0);
        let lazy = debounced(source.clone(), Duration::from_millis(650));

        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();
        lazy.effect(move |_: &i32, _: &i32| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        source.update(1).unwrap();
        sleep(Duration::from_millis(100)).await;
        source.update(2).unwrap();
        sleep(Duration::from_millis(600)).await;

        // One push, carrying the value captured when the window opened.
        assert_eq!(lazy.get(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn value_recorded_mid_window_is_not_flushed_later() {
        let source = State::basic(0);
        let lazy = debounced(source.clone(), Duration::from_millis(650));

        source.update(1).unwrap();
        sleep(Duration::from_millis(100)).await;
        source.update(2).unwrap();

        sleep(Duration::from_secs(60)).await;
        assert_eq!(lazy.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_later_update_opens_a_new_window() {
        let source = State::basic(0);
        let lazy = debounced(source.clone(), Duration::from_millis(650));

        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();
        lazy.effect(move |_: &i32, _: &i32| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        source.update(1).unwrap();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(lazy.get(), 1);

        source.update(9).unwrap();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(lazy.get(), 9);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_debounced_state_lapses_the_window() {
        let source = State::basic(0);
        {
            let _lazy = debounced(source.clone(), Duration::from_millis(650));
            source.update(1).unwrap();
        }

        // The timer task upgrades to nothing and commits nowhere.
        sleep(Duration::from_millis(700)).await;
        assert_eq!(source.get(), 1);
    }
}
