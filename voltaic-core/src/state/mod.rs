//! State Primitives
//!
//! This module implements the core state system: transactional states,
//! read-only handles, and the effect machinery underneath them.
//!
//! # Concepts
//!
//! ## States
//!
//! A State is a container for a value that can only change by applying a
//! transaction through the state's reducer. The reducer produces the next
//! value either immediately or behind a future, so synchronous counters and
//! backend-driven states share one update pipeline.
//!
//! ## Effects
//!
//! An Effect is a callback observing one state. Effects run synchronously
//! after every committed update, in registration order, and receive both the
//! new value and the old value the update captured.
//!
//! ## Read-only handles
//!
//! A ReadState is the readable half of a state with no way to update it.
//! Derived states produced by the combinators are read-only by construction;
//! writable states can be downgraded with [`State::read_only`].
//!
//! # Implementation Notes
//!
//! Every handle is a thin wrapper around a shared cell holding the value and
//! the effect list. There is no dependency graph and no scheduler: updating
//! a state walks its own effect list and nothing else. Derived states are
//! wired up by registering plain effects on their upstreams.

pub(crate) mod cell;

mod error;
mod list;
mod read;
mod source;
mod state;

pub use error::{BoxError, UpdateError};
pub use list::{ListOp, ListState};
pub use read::ReadState;
pub use source::Source;
pub use state::{State, Step};
