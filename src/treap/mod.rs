//! Probabilistic binary search tree where each node also maintains the heap invariant.

mod map;
mod node;
mod tree;

pub use self::map::{TreapMap, TreapMapIntoIter, TreapMapIter};
use std::result;
use thiserror::Error;

/// The invariant that an internal consistency check found broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corruption {
    /// The tracked size differs from the number of reachable nodes.
    SizeMismatch { tracked: usize, counted: usize },
    /// A key is out of order with respect to one of its ancestors.
    KeyOrder,
    /// A child has a strictly higher priority than its parent.
    HeapOrder,
}

/// An error returned by a fallible treap operation. A rejected operation leaves the treap
/// unchanged.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("key already exists in the treap")]
    DuplicateKey,
    #[error("key does not exist in the treap")]
    KeyNotFound,
    #[error("treap is empty")]
    EmptyTreap,
    #[error("treap is corrupted: {0:?}")]
    CorruptionDetected(Corruption),
}

pub type Result<T> = result::Result<T, Error>;
