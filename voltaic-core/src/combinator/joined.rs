//! Joined States
//!
//! A joined state combines several sources into one tuple-valued read-only
//! state. Each source is watched independently: whenever any of them
//! commits, the joined state re-reads every source and commits the fresh
//! tuple.
//!
//! Joining is defined for tuples of two, three, and four sources. The
//! sources do not need to hold the same value type, and writable and
//! read-only handles can be mixed freely.

use std::any::Any;
use std::sync::Arc;

use crate::state::cell::Cell;
use crate::state::{ReadState, Source};

/// Tuples of sources that can be joined into a single tuple-valued state.
pub trait Join {
    /// The tuple of source values, index-aligned with the sources.
    type Value: Clone + Send + Sync + 'static;

    /// Combine the sources into one read-only state.
    ///
    /// Equivalent to [`joined`]; the method form reads better when the
    /// tuple is built inline.
    fn joined(self) -> ReadState<Self::Value>;
}

/// Combine a tuple of sources into one tuple-valued read-only state.
///
/// The joined state starts at a snapshot of all current source values and
/// recomputes after every committed update of any source. The returned
/// handle keeps all sources alive; dropping every handle to the joined
/// state disconnects it.
///
/// # Example
///
/// ```rust,ignore
/// let width = State::basic(800);
/// let height = State::basic(600);
/// let size = joined((width.clone(), height.clone()));
///
/// assert_eq!(size.get(), (800, 600));
/// width.update(1024)?;
/// assert_eq!(size.get(), (1024, 600));
/// ```
pub fn joined<J: Join>(sources: J) -> ReadState<J::Value> {
    sources.joined()
}

impl<A, B> Join for (A, B)
where
    A: Source + 'static,
    B: Source + 'static,
{
    type Value = (A::Value, B::Value);

    fn joined(self) -> ReadState<Self::Value> {
        let sources = Arc::new(self);
        let cell = Arc::new(Cell::new((sources.0.get(), sources.1.get())));

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &A::Value, _: &A::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit((sources.0.get(), sources.1.get()), old);
            }
        };
        sources.0.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &B::Value, _: &B::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit((sources.0.get(), sources.1.get()), old);
            }
        };
        sources.1.effect(watch);

        let keep: Arc<dyn Any + Send + Sync> = sources;
        ReadState::new(cell, vec![keep])
    }
}

impl<A, B, C> Join for (A, B, C)
where
    A: Source + 'static,
    B: Source + 'static,
    C: Source + 'static,
{
    type Value = (A::Value, B::Value, C::Value);

    fn joined(self) -> ReadState<Self::Value> {
        let sources = Arc::new(self);
        let cell = Arc::new(Cell::new((
            sources.0.get(),
            sources.1.get(),
            sources.2.get(),
        )));

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &A::Value, _: &A::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (sources.0.get(), sources.1.get(), sources.2.get()),
                    old,
                );
            }
        };
        sources.0.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &B::Value, _: &B::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (sources.0.get(), sources.1.get(), sources.2.get()),
                    old,
                );
            }
        };
        sources.1.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &C::Value, _: &C::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (sources.0.get(), sources.1.get(), sources.2.get()),
                    old,
                );
            }
        };
        sources.2.effect(watch);

        let keep: Arc<dyn Any + Send + Sync> = sources;
        ReadState::new(cell, vec![keep])
    }
}

impl<A, B, C, D> Join for (A, B, C, D)
where
    A: Source + 'static,
    B: Source + 'static,
    C: Source + 'static,
    D: Source + 'static,
{
    type Value = (A::Value, B::Value, C::Value, D::Value);

    fn joined(self) -> ReadState<Self::Value> {
        let sources = Arc::new(self);
        let cell = Arc::new(Cell::new((
            sources.0.get(),
            sources.1.get(),
            sources.2.get(),
            sources.3.get(),
        )));

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &A::Value, _: &A::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (
                        sources.0.get(),
                        sources.1.get(),
                        sources.2.get(),
                        sources.3.get(),
                    ),
                    old,
                );
            }
        };
        sources.0.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &B::Value, _: &B::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (
                        sources.0.get(),
                        sources.1.get(),
                        sources.2.get(),
                        sources.3.get(),
                    ),
                    old,
                );
            }
        };
        sources.1.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &C::Value, _: &C::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (
                        sources.0.get(),
                        sources.1.get(),
                        sources.2.get(),
                        sources.3.get(),
                    ),
                    old,
                );
            }
        };
        sources.2.effect(watch);

        let watch = {
            let sources = Arc::downgrade(&sources);
            let cell = Arc::downgrade(&cell);
            move |_: &D::Value, _: &D::Value| {
                let (Some(sources), Some(cell)) = (sources.upgrade(), cell.upgrade()) else {
                    return;
                };
                let old = cell.get();
                cell.commit(
                    (
                        sources.0.get(),
                        sources.1.get(),
                        sources.2.get(),
                        sources.3.get(),
                    ),
                    old,
                );
            }
        };
        sources.3.effect(watch);

        let keep: Arc<dyn Any + Send + Sync> = sources;
        ReadState::new(cell, vec![keep])
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
