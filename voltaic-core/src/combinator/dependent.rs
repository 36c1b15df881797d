//! Dependent States
//!
//! A dependent state derives its value from one upstream source through a
//! pure mapping function. It recomputes eagerly: every committed update of
//! the source recomputes the dependent value and fires the dependent
//! state's own effects.

use std::any::Any;
use std::sync::Arc;

use crate::state::cell::Cell;
use crate::state::{ReadState, Source};

/// Derive a read-only state from `source` through `get_value`.
///
/// `get_value` is called once at construction with
/// `(&current, None, None)` to seed the value, and then after every
/// committed update of the source with the new source value, the old source
/// value, and the dependent state's own previous value.
///
/// The returned handle keeps `source` alive; dropping every handle to the
/// dependent state disconnects it from the source.
///
/// # Example
///
/// ```rust,ignore
/// let count = State::basic(42);
/// let shifted = dependent(count.clone(), |n, _, _| n + 5);
/// assert_eq!(shifted.get(), 47);
///
/// count.update(69)?;
/// assert_eq!(shifted.get(), 74);
/// ```
pub fn dependent<S, U, F>(source: S, get_value: F) -> ReadState<U>
where
    S: Source + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(&S::Value, Option<&S::Value>, Option<&U>) -> U + Send + Sync + 'static,
{
    let initial = source.with(|current| get_value(current, None, None));
    let cell = Arc::new(Cell::new(initial));

    let watch = {
        let cell = Arc::downgrade(&cell);
        move |new: &S::Value, old: &S::Value| {
            let Some(cell) = cell.upgrade() else { return };
            let previous = cell.get();
            let next = get_value(new, Some(old), Some(&previous));
            cell.commit(next, previous);
        }
    };
    source.effect(watch);

    let keep: Arc<dyn Any + Send + Sync> = Arc::new(source);
    ReadState::new(cell, vec![keep])
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
