use crate::entry::Entry;
use crate::treap::node::Node;
use crate::treap::{Corruption, Error, Result};
use std::borrow::Borrow;
use std::cmp::Ordering;

pub type Tree<T, U> = Option<Box<Node<T, U>>>;

enum RemovalCase {
    Splice,
    RotateLeft,
    RotateRight,
}

pub fn insert<T, U>(tree: &mut Tree<T, U>, new_node: Node<T, U>) -> Result<()>
where
    T: Ord,
{
    match tree {
        Some(ref mut node) => {
            match new_node.entry.key.cmp(&node.entry.key) {
                Ordering::Less => {
                    insert(&mut node.left, new_node)?;
                    if node.is_heap_property_violated(&node.left) {
                        node.rotate_right();
                    }
                },
                Ordering::Greater => {
                    insert(&mut node.right, new_node)?;
                    if node.is_heap_property_violated(&node.right) {
                        node.rotate_left();
                    }
                },
                Ordering::Equal => return Err(Error::DuplicateKey),
            }
            Ok(())
        },
        None => {
            *tree = Some(Box::new(new_node));
            Ok(())
        },
    }
}

fn get_removal_case<T, U>(node: &Node<T, U>) -> RemovalCase {
    match (&node.left, &node.right) {
        (Some(ref left_node), Some(ref right_node)) => {
            if right_node.priority < left_node.priority {
                RemovalCase::RotateLeft
            } else {
                RemovalCase::RotateRight
            }
        },
        _ => RemovalCase::Splice,
    }
}

// Pushes the root of `tree` down towards the child with the higher priority until it has at most
// one child, then splices it out.
fn rotate_down<T, U>(tree: &mut Tree<T, U>) -> Option<Entry<T, U>> {
    let case = tree.as_ref().map(|node| get_removal_case(&**node))?;
    match case {
        RemovalCase::RotateLeft => tree.as_mut().and_then(|node| {
            node.rotate_left();
            rotate_down(&mut node.left)
        }),
        RemovalCase::RotateRight => tree.as_mut().and_then(|node| {
            node.rotate_right();
            rotate_down(&mut node.right)
        }),
        RemovalCase::Splice => tree.take().map(|node| {
            let Node {
                entry,
                left,
                right,
                ..
            } = *node;
            *tree = left.or(right);
            entry
        }),
    }
}

pub fn remove<T, U, V>(tree: &mut Tree<T, U>, key: &V) -> Option<Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let ordering = tree.as_ref().map(|node| key.cmp(node.entry.key.borrow()))?;
    match ordering {
        Ordering::Less => tree.as_mut().and_then(|node| remove(&mut node.left, key)),
        Ordering::Greater => tree.as_mut().and_then(|node| remove(&mut node.right, key)),
        Ordering::Equal => rotate_down(tree),
    }
}

pub fn get<'a, T, U, V>(tree: &'a Tree<T, U>, key: &V) -> Option<&'a Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    tree.as_ref().and_then(|node| {
        match key.cmp(node.entry.key.borrow()) {
            Ordering::Less => get(&node.left, key),
            Ordering::Greater => get(&node.right, key),
            Ordering::Equal => Some(&node.entry),
        }
    })
}

pub fn min<T, U>(tree: &Tree<T, U>) -> Option<&Entry<T, U>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.entry
    })
}

pub fn max<T, U>(tree: &Tree<T, U>) -> Option<&Entry<T, U>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.entry
    })
}

pub fn count<T, U>(tree: &Tree<T, U>) -> usize {
    match tree {
        Some(ref node) => 1 + count(&node.left) + count(&node.right),
        None => 0,
    }
}

// Checks key order against the exclusive bounds inherited from the ancestors and priority order
// against both children. Returns the number of nodes in the tree.
pub fn validate<'a, T, U>(
    tree: &'a Tree<T, U>,
    lower: Option<&'a T>,
    upper: Option<&'a T>,
) -> Result<usize>
where
    T: Ord,
{
    match tree {
        Some(ref node) => {
            let key = &node.entry.key;
            let below_lower = lower.map_or(false, |bound| key <= bound);
            let above_upper = upper.map_or(false, |bound| key >= bound);
            if below_lower || above_upper {
                return Err(Error::CorruptionDetected(Corruption::KeyOrder));
            }
            if node.is_heap_property_violated(&node.left)
                || node.is_heap_property_violated(&node.right)
            {
                return Err(Error::CorruptionDetected(Corruption::HeapOrder));
            }
            let left_count = validate(&node.left, lower, Some(key))?;
            let right_count = validate(&node.right, Some(key), upper)?;
            Ok(1 + left_count + right_count)
        },
        None => Ok(0),
    }
}
