//! State Implementation
//!
//! A State is the fundamental primitive: a container for a value that can
//! only change by applying a transaction through the state's reducer.
//!
//! # How Updates Work
//!
//! 1. The update captures a clone of the current value (the old value).
//!
//! 2. The reducer maps `(transaction, &old)` to a [`Step`]: either the next
//!    value, ready immediately, or a future still computing it.
//!
//! 3. A ready value is committed at once and effects fire before the update
//!    call returns. A deferred value is driven to completion first; see
//!    [`State::update`] and [`State::update_async`] for the two flavors.
//!
//! # Concurrency
//!
//! Updates are not queued or serialized against each other. Two updates in
//! flight at once each capture their own old value, and whichever commits
//! last determines the final value. Effects always receive the pair the
//! committing update captured, which after a race may not be the value the
//! commit actually replaced.
//!
//! # Thread Safety
//!
//! `State` is `Send + Sync` and cheap to clone; clones share the same value
//! and effect list.

use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::runtime::Handle;
use tracing::{debug, error};

use super::cell::Cell;
use super::error::{BoxError, UpdateError};
use super::read::ReadState;
use super::source::Source;

/// Outcome of a reducer: the next value, now or behind a future.
pub enum Step<V> {
    /// The next value is ready; it is committed and effects fire before the
    /// update call returns.
    Ready(V),

    /// The next value is still being computed. [`State::update`] schedules
    /// the continuation on the ambient Tokio runtime; [`State::update_async`]
    /// awaits it inline.
    Deferred(BoxFuture<'static, Result<V, BoxError>>),
}

impl<V> Step<V> {
    /// Wrap a future that resolves to the next value.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let fetch = State::new(Profile::default(), |id: UserId, _current| {
    ///     Ok(Step::deferred(async move { load_profile(id).await }))
    /// });
    /// ```
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<V, BoxError>> + Send + 'static,
    {
        Step::Deferred(Box::pin(future))
    }
}

impl<V: Debug> Debug for Step<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Step::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// The reducer stored by a state: maps a transaction and the current value
/// to the next step.
type Reducer<V, T> = Arc<dyn Fn(T, &V) -> Result<Step<V>, BoxError> + Send + Sync>;

/// A transactional state holding a value of type `V`, updated by applying
/// transactions of type `T` through its reducer.
///
/// # Type Parameters
///
/// - `V`: The type of value stored. Must be `Clone + Send + Sync`.
/// - `T`: The transaction type accepted by [`State::update`]. Defaults to
///   `V` for plain replace-the-value states.
///
/// # Example
///
/// ```rust,ignore
/// let total = State::new(0, |delta: i64, current| {
///     Ok(Step::Ready(current + delta))
/// });
///
/// total.update(5)?;
/// total.update(-2)?;
/// assert_eq!(total.get(), 3);
/// ```
pub struct State<V, T = V>
where
    V: Clone + Send + Sync + 'static,
    T: 'static,
{
    /// The shared cell holding the value and its effects.
    cell: Arc<Cell<V>>,

    /// Maps `(transaction, current value)` to the next step.
    reducer: Reducer<V, T>,
}

impl<V, T> State<V, T>
where
    V: Clone + Send + Sync + 'static,
    T: 'static,
{
    /// Create a state with the given initial value and reducer.
    ///
    /// The reducer runs once per update, on the updating thread. Returning
    /// an error rejects the transaction and leaves the value unchanged.
    pub fn new<R>(initial: V, reducer: R) -> Self
    where
        R: Fn(T, &V) -> Result<Step<V>, BoxError> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(Cell::new(initial)),
            reducer: Arc::new(reducer),
        }
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
    /// update. Effects run synchronously on the committing thread, in
    /// registration order. Registration never invokes the effect.
    ///
    /// A panicking effect unwinds out of the update call that committed;
    /// effects later in the list do not run for that firing.
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

    /// A read-only handle sharing this state's value and effect list.
    pub fn read_only(&self) -> ReadState<V> {
        ReadState::new(Arc::clone(&self.cell), Vec::new())
    }

    /// Apply `trans` to the current value, fire-and-forget flavor.
    ///
    /// If the reducer returns [`Step::Ready`], the value is committed and
    /// all effects fire before this call returns. If it returns
    /// [`Step::Deferred`], the continuation is spawned onto the ambient
    /// Tokio runtime and this call returns immediately; the commit and its
    /// effects happen later, on a runtime worker. A deferred computation
    /// that fails is logged and the value stays unchanged, since the caller
    /// is gone by then.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::Reducer`] if the reducer itself rejects `trans`.
    /// - [`UpdateError::NoRuntime`] if the reducer deferred but the calling
    ///   thread has no Tokio runtime to spawn onto.
    pub fn update(&self, trans: T) -> Result<(), UpdateError> {
        let old = self.cell.get();
        let step = (*self.reducer)(trans, &old).map_err(UpdateError::Reducer)?;
        match step {
            Step::Ready(next) => {
                self.cell.commit(next, old);
                Ok(())
            }
            Step::Deferred(future) => {
                let handle = Handle::try_current().map_err(|_| UpdateError::NoRuntime)?;
                let cell = Arc::clone(&self.cell);
                debug!("deferred update scheduled");
                handle.spawn(async move {
                    match future.await {
                        Ok(next) => cell.commit(next, old),
                        Err(error) => {
                            error!(%error, "deferred update failed; value unchanged");
                        }
                    }
                });
                Ok(())
            }
        }
    }

    /// Apply `trans` to the current value, awaiting any deferred step
    /// inline.
    ///
    /// On success the commit has happened and every effect has fired by the
    /// time this returns. Dropping the returned future before completion
    /// abandons the update: the value is unchanged and no effects fire.
    ///
    /// # Errors
    ///
    /// [`UpdateError::Reducer`] if the reducer or its deferred computation
    /// fails.
    pub async fn update_async(&self, trans: T) -> Result<(), UpdateError> {
        let old = self.cell.get();
        let step = (*self.reducer)(trans, &old).map_err(UpdateError::Reducer)?;
        match step {
            Step::Ready(next) => {
                self.cell.commit(next, old);
                Ok(())
            }
            Step::Deferred(future) => {
                let next = future.await.map_err(UpdateError::Reducer)?;
                self.cell.commit(next, old);
                Ok(())
            }
        }
    }
}

impl<V> State<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// A state with the identity reducer: `update(next)` replaces the value
    /// with `next`.
    pub fn basic(initial: V) -> Self {
        State::new(initial, |next, _current: &V| Ok(Step::Ready(next)))
    }

    /// A state whose reducer ignores every transaction and keeps the
    /// current value. Updates succeed, and effects still fire with the
    /// unchanged value in both slots.
    pub fn constant(initial: V) -> Self {
        State::new(initial, |_trans, current: &V| Ok(Step::Ready(current.clone())))
    }
}

impl<V, T> Source for State<V, T>
where
    V: Clone + Send + Sync + 'static,
    T: 'static,
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

impl<V, T> Clone for State<V, T>
where
    V: Clone + Send + Sync + 'static,
    T: 'static,
{
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            reducer: Arc::clone(&self.reducer),
        }
    }
}

impl<V, T> Debug for State<V, T>
where
    V: Clone + Send + Sync + Debug + 'static,
    T: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.get())
            .field("effect_count", &self.effect_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn basic_get_and_update() {
        let state = State::basic(0);
        assert_eq!(state.get(), 0);

        state.update(42).unwrap();
        assert_eq!(state.get(), 42);
    }

    #[test]
    fn reducer_sees_transaction_and_current_value() {
        let total = State::new(10, |delta: i32, current: &i32| {
            Ok(Step::Ready(current + delta))
        });

        total.update(5).unwrap();
        total.update(-3).unwrap();
        assert_eq!(total.get(), 12);
    }

    #[test]
    fn constant_ignores_transactions_but_fires_effects() {
        let state = State::constant(7);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        state.effect(move |new: &i32, old: &i32| {
            seen_clone.lock().push((*new, *old));
        });

        state.update(99).unwrap();
        assert_eq!(state.get(), 7);
        assert_eq!(*seen.lock(), vec![(7, 7)]);
    }

    #[test]
    fn failed_reducer_leaves_value_and_fires_nothing() {
        let state = State::new(10, |next: i32, _current: &i32| {
            if next < 0 {
                return Err("negative values are rejected".into());
            }
            Ok(Step::Ready(next))
        });

        let fired = Arc::new(AtomicI32::new(0));
        let fired_clone = fired.clone();
        state.effect(move |_: &i32, _: &i32| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        let error = state.update(-1).unwrap_err();
        assert!(matches!(error, UpdateError::Reducer(_)));
        assert_eq!(state.get(), 10);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        state.update(3).unwrap();
        assert_eq!(state.get(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn effects_fire_with_new_and_old_in_order() {
        let state = State::basic(1);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_first = seen.clone();
        state.effect(move |new: &i32, old: &i32| {
            seen_first.lock().push(("first", *new, *old));
        });
        let seen_second = seen.clone();
        state.effect(move |new: &i32, old: &i32| {
            seen_second.lock().push(("second", *new, *old));
        });

        state.update(2).unwrap();
        assert_eq!(
            *seen.lock(),
            vec![("first", 2, 1), ("second", 2, 1)]
        );
    }

    #[test]
    fn panicking_effect_skips_the_rest_of_the_firing() {
        let state = State::basic(0);
        let later = Arc::new(AtomicI32::new(0));

        state.effect(|_: &i32, _: &i32| panic!("effect rejected the value"));
        let later_clone = later.clone();
        state.effect(move |_: &i32, _: &i32| {
            later_clone.fetch_add(1, Ordering::SeqCst);
        });

        let panicked =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| state.update(1)));
        assert!(panicked.is_err());

        // The commit preceded the firing; the panic stopped the firing, not
        // the update.
        assert_eq!(state.get(), 1);
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn state_clone_shares_state() {
        let state1 = State::basic(0);
        let state2 = state1.clone();

        state1.update(42).unwrap();
        assert_eq!(state2.get(), 42);

        state2.update(100).unwrap();
        assert_eq!(state1.get(), 100);
    }

    #[test]
    fn with_reads_in_place() {
        let state = State::basic(String::from("voltaic"));
        let len = state.with(|s| s.len());
        assert_eq!(len, 7);
    }

    #[test]
    fn deferred_without_runtime_is_an_error() {
        let state = State::new(0, |next: i32, _current: &i32| {
            Ok(Step::deferred(async move { Ok(next) }))
        });

        let error = state.update(1).unwrap_err();
        assert!(matches!(error, UpdateError::NoRuntime));
        assert_eq!(state.get(), 0);
    }

    #[tokio::test]
    async fn update_async_commits_deferred_value() {
        let state = State::new(0, |next: i32, _current: &i32| {
            Ok(Step::deferred(async move { Ok(next * 2) }))
        });

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        state.effect(move |new: &i32, old: &i32| {
            seen_clone.lock().push((*new, *old));
        });

        state.update_async(21).await.unwrap();
        assert_eq!(state.get(), 42);
        assert_eq!(*seen.lock(), vec![(42, 0)]);
    }

    #[tokio::test]
    async fn update_async_propagates_deferred_failure() {
        let state = State::new(5, |_next: i32, _current: &i32| {
            Ok(Step::deferred(async move {
                Err("backend unavailable".into())
            }))
        });

        let error = state.update_async(1).await.unwrap_err();
        assert!(matches!(error, UpdateError::Reducer(_)));
        assert_eq!(state.get(), 5);
    }

    #[tokio::test]
    async fn update_spawns_deferred_and_returns_before_commit() {
        let state = State::new(0, |next: i32, _current: &i32| {
            Ok(Step::deferred(async move { Ok(next) }))
        });

        state.update(8).unwrap();
        // The continuation has not run yet on this single-threaded runtime.
        assert_eq!(state.get(), 0);

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(state.get(), 8);
    }

    #[tokio::test]
    async fn failed_fire_and_forget_update_leaves_value() {
        let state = State::new(3, |_next: i32, _current: &i32| {
            Ok(Step::deferred(async move {
                Err("backend unavailable".into())
            }))
        });

        state.update(1).unwrap();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(state.get(), 3);
    }

    #[test]
    fn debug_shows_value_and_effect_count() {
        let state = State::basic(5);
        state.effect(|_: &i32, _: &i32| {});
        let rendered = format!("{state:?}");
        assert!(rendered.contains("value: 5"));
        assert!(rendered.contains("effect_count: 1"));
    }
}
