//! List States
//!
//! A list state holds an ordered `Vec` and is updated through [`ListOp`]
//! transactions instead of whole-list replacement. One operation either
//! appends an element or removes one, never both.

use super::state::{State, Step};

/// A transaction against a list-valued state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOp<E> {
    /// Append the element at the end of the list.
    Add(E),

    /// Remove the first element equal to this one. Removing an element that
    /// is not present leaves the list unchanged.
    Remove(E),
}

/// A state holding an ordered list, updated through [`ListOp`] transactions.
pub type ListState<E> = State<Vec<E>, ListOp<E>>;

impl<E> State<Vec<E>, ListOp<E>>
where
    E: Clone + PartialEq + Send + Sync + 'static,
{
    /// A list state with the append/remove reducer.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let tags = State::list(vec!["a"]);
    /// tags.update(ListOp::Add("b"))?;
    /// tags.update(ListOp::Remove("a"))?;
    /// assert_eq!(tags.get(), vec!["b"]);
    /// ```
    pub fn list(initial: Vec<E>) -> Self {
        State::new(initial, |op, current: &Vec<E>| {
            let mut next = current.clone();
            match op {
                ListOp::Add(element) => next.push(element),
                ListOp::Remove(element) => {
                    if let Some(index) = next.iter().position(|e| *e == element) {
                        next.remove(index);
                    }
                }
            }
            Ok(Step::Ready(next))
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
