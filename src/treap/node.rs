use crate::entry::Entry;
use crate::treap::tree;
use std::mem;

/// A struct representing an internal node of a treap.
pub struct Node<T, U> {
    pub entry: Entry<T, U>,
    pub priority: u64,
    pub left: tree::Tree<T, U>,
    pub right: tree::Tree<T, U>,
}

impl<T, U> Node<T, U> {
    pub fn new(key: T, value: U, priority: u64) -> Self {
        Node {
            entry: Entry { key, value },
            priority,
            left: None,
            right: None,
        }
    }

    // A smaller priority value belongs closer to the root.
    pub fn is_heap_property_violated(&self, child: &tree::Tree<T, U>) -> bool {
        match child {
            Some(ref child_node) => self.priority > child_node.priority,
            None => false,
        }
    }

    // The node keeps its position in the parent while its contents are exchanged with the right
    // child, so no parent link has to be rewritten.
    pub fn rotate_left(&mut self) {
        let mut child = self
            .right
            .take()
            .expect("Expected right child node to be `Some`.");
        self.right = child.left.take();
        mem::swap(&mut *child, self);
        self.left = Some(child);
    }

    pub fn rotate_right(&mut self) {
        let mut child = self
            .left
            .take()
            .expect("Expected left child node to be `Some`.");
        self.left = child.right.take();
        mem::swap(&mut *child, self);
        self.right = Some(child);
    }
}
