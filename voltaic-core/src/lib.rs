//! Voltaic Core
//!
//! This crate provides the transactional state primitives for the Voltaic
//! toolkit. It implements:
//!
//! - Transactional states (every change goes through a reducer)
//! - Ordered effect subscriptions with new and old values
//! - Deferred updates driven by a Tokio runtime
//! - Combinators for derived states (dependent, debounced, joined)
//!
//! The model is deliberately graph-free: a derived state is wired to its
//! upstreams with ordinary effects, and an update never touches anything
//! beyond the effect lists of the states it commits to.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `state`: The `State` container, reducers, effects, and read handles
//! - `combinator`: Derived read-only states built on top of `state`
//!
//! # Example
//!
//! ```rust
//! use voltaic_core::{dependent, State};
//!
//! // A state with the identity reducer.
//! let count = State::basic(1);
//!
//! // A derived state that recomputes on every update.
//! let doubled = dependent(count.clone(), |n, _, _| n * 2);
//! assert_eq!(doubled.get(), 2);
//!
//! // Observe changes; effects receive the new and old values.
//! count.effect(|new, old| println!("count: {old} -> {new}"));
//!
//! count.update(5).unwrap();
//! assert_eq!(count.get(), 5);
//! assert_eq!(doubled.get(), 10);
//! ```

pub mod combinator;
pub mod state;

pub use combinator::{debounced, dependent, joined, Join, DEFAULT_DEBOUNCE};
pub use state::{BoxError, ListOp, ListState, ReadState, Source, State, Step, UpdateError};
