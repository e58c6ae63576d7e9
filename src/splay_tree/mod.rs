//! Self-adjusting binary search tree with the additional property that recently accessed elements
//! are quick to access again.
//!
//! The tree doubles as an unbounded memoization cache: see [`memoize`] and [`fibonacci`].

mod memo;
mod node;
mod tree;

pub use self::memo::{fibonacci, memoize};
pub use self::tree::SplayTree;
