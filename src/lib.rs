//! An ordered map implemented as a treap: a randomized binary search tree that also keeps its
//! nodes in heap order by priority.

mod entry;
pub mod treap;
