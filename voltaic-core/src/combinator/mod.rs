//! State Combinators
//!
//! Combinators build derived, read-only states out of existing ones. Each
//! one wires itself up with ordinary effects on its upstream sources; there
//! is no dependency graph behind them.
//!
//! - [`dependent`]: map one source through a function, eagerly.
//! - [`debounced`]: follow one source after a delay, collapsing bursts.
//! - [`joined`]: combine several sources into one tuple-valued state.
//!
//! All of them accept anything implementing [`Source`], so derived states
//! compose: a debounced dependent of a join is just nesting.
//!
//! [`Source`]: crate::Source

mod debounce;
mod dependent;
mod joined;

pub use debounce::{debounced, DEFAULT_DEBOUNCE};
pub use dependent::dependent;
pub use joined::{joined, Join};
