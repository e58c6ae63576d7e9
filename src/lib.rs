//! A splay tree used as an unbounded, self-adjusting memoization cache, together with the
//! fixed-capacity LRU cache and synthetic workloads it is benchmarked against.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod entry;
pub mod arena;
pub mod harness;
pub mod lru;
pub mod splay_tree;
pub mod workload;
