//! Error types for the update pipeline.
//!
//! Reducers are user code and can fail with any error type, so the pipeline
//! carries failures as boxed trait objects rather than threading a generic
//! error parameter through every state.

use thiserror::Error;

/// Boxed error returned by reducers and deferred computations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure modes of [`State::update`] and [`State::update_async`].
///
/// In every case the state's value is unchanged and no effects fire.
///
/// [`State::update`]: crate::State::update
/// [`State::update_async`]: crate::State::update_async
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The reducer (or the deferred computation it returned) failed.
    #[error("reducer failed: {0}")]
    Reducer(#[source] BoxError),

    /// The reducer returned a deferred step, but no Tokio runtime is
    /// available on the calling thread to drive it.
    #[error("deferred update requires a tokio runtime")]
    NoRuntime,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
