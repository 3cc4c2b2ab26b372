use crate::entry::Entry;
use crate::treap::node::Node;
use crate::treap::{tree, Corruption, Error, Result};
use log::{debug, trace, warn};
use rand::{Rng, SeedableRng, XorShiftRng};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Index;

/// An ordered map implemented by a treap.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property. Each
/// node has a key, a value, and a priority. The key of any node is greater than all keys in its
/// left subtree and less than all keys occuring in its right subtree. The priority of a node is
/// numerically smaller than the priority of all nodes in its subtrees. By randomly generating
/// priorities, the expected height of the tree is proportional to the logarithm of the number of
/// keys.
///
/// Keys are unique. A value can only be updated by removing its entry and adding it again.
///
/// # Examples
///
/// ```
/// use treap_map::treap::{Error, TreapMap};
///
/// let mut map = TreapMap::new();
/// map.add(0, 1).unwrap();
/// map.add(3, 4).unwrap();
///
/// assert_eq!(map[&0], 1);
/// assert_eq!(map.get(&1), None);
/// assert_eq!(map.size(), 2);
/// assert_eq!(map.add(3, 5), Err(Error::DuplicateKey));
///
/// assert_eq!(map.min(), Some((&0, &1)));
/// assert_eq!(map.max(), Some((&3, &4)));
///
/// assert_eq!(map.remove(&0), Ok((0, 1)));
/// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
/// ```
pub struct TreapMap<T, U, R = XorShiftRng> {
    tree: tree::Tree<T, U>,
    rng: R,
    size: usize,
}

impl<T, U> TreapMap<T, U> {
    /// Constructs a new, empty `TreapMap<T, U>` whose priorities are drawn from an unseeded
    /// `XorShiftRng`.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::new();
    /// ```
    pub fn new() -> Self {
        Self::with_rng(XorShiftRng::new_unseeded())
    }

    /// Constructs a new, empty `TreapMap<T, U>` whose priorities are drawn from an `XorShiftRng`
    /// seeded with `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `seed` is all zeros.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::with_seed([1, 2, 3, 4]);
    /// ```
    pub fn with_seed(seed: [u32; 4]) -> Self {
        Self::with_rng(XorShiftRng::from_seed(seed))
    }
}

impl<T, U, R> TreapMap<T, U, R>
where
    R: Rng,
{
    /// Constructs a new, empty `TreapMap<T, U, R>` whose priorities are drawn from `rng`. The
    /// generator only needs to be uniformly distributed; a skewed source degrades the expected
    /// height of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{SeedableRng, XorShiftRng};
    /// use treap_map::treap::TreapMap;
    ///
    /// let rng = XorShiftRng::from_seed([1, 1, 1, 1]);
    /// let map: TreapMap<u32, u32, _> = TreapMap::with_rng(rng);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_rng(rng: R) -> Self {
        TreapMap {
            tree: None,
            rng,
            size: 0,
        }
    }

    /// Adds a key-value pair to the map with a randomly generated priority. Returns
    /// `Err(Error::DuplicateKey)` without modifying the map if the key already exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::{Error, TreapMap};
    ///
    /// let mut map = TreapMap::new();
    /// assert_eq!(map.add(1, 1), Ok(()));
    /// assert_eq!(map.get(&1), Some(&1));
    /// assert_eq!(map.add(1, 2), Err(Error::DuplicateKey));
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn add(&mut self, key: T, value: U) -> Result<()>
    where
        T: Ord,
    {
        let priority = self.rng.next_u64();
        self.add_with_priority(key, value, priority)
    }
}

impl<T, U, R> TreapMap<T, U, R> {
    /// Adds a key-value pair to the map with an explicit priority. A smaller priority places the
    /// entry closer to the root. Returns `Err(Error::DuplicateKey)` without modifying the map if
    /// the key already exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add_with_priority(1, 1, 10).unwrap();
    /// map.add_with_priority(2, 2, 5).unwrap();
    /// assert_eq!(map.root(), Some((&2, &2)));
    /// ```
    pub fn add_with_priority(&mut self, key: T, value: U, priority: u64) -> Result<()>
    where
        T: Ord,
    {
        let TreapMap {
            ref mut tree,
            ref mut size,
            ..
        } = self;
        tree::insert(tree, Node::new(key, value, priority))?;
        *size += 1;
        trace!("added entry with priority {}, size is now {}", priority, size);
        Ok(())
    }

    /// Removes a key-value pair from the map and returns it. Returns `Err(Error::EmptyTreap)` if
    /// the map has no entries and `Err(Error::KeyNotFound)` if it has entries but none with the
    /// key.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::{Error, TreapMap};
    ///
    /// let mut map = TreapMap::new();
    /// assert_eq!(map.remove(&1), Err(Error::EmptyTreap));
    /// map.add(1, 1).unwrap();
    /// map.add(2, 2).unwrap();
    /// assert_eq!(map.remove(&1), Ok((1, 1)));
    /// assert_eq!(map.remove(&1), Err(Error::KeyNotFound));
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Result<(T, U)>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let TreapMap {
            ref mut tree,
            ref mut size,
            ..
        } = self;
        if tree.is_none() {
            return Err(Error::EmptyTreap);
        }
        let Entry { key, value } = tree::remove(tree, key).ok_or(Error::KeyNotFound)?;
        *size -= 1;
        trace!("removed entry, size is now {}", size);
        Ok((key, value))
    }

    /// Returns the key-value pair associated with a particular key, or `None` if the key does
    /// not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 2).unwrap();
    /// assert_eq!(map.search(&0), None);
    /// assert_eq!(map.search(&1), Some((&1, &2)));
    /// ```
    pub fn search<V>(&self, key: &V) -> Option<(&T, &U)>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        tree::get(&self.tree, key).map(Entry::as_pair)
    }

    /// Checks if a key exists in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// assert!(!map.contains_key(&0));
    /// assert!(map.contains_key(&1));
    /// ```
    pub fn contains_key<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Returns an immutable reference to the value associated with a particular key. Returns
    /// `None` if the key does not exist in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// assert_eq!(map.get(&0), None);
    /// assert_eq!(map.get(&1), Some(&1));
    /// ```
    pub fn get<V>(&self, key: &V) -> Option<&U>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.search(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair stored at the root of the treap, which is the entry with the
    /// highest priority. Returns `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// assert_eq!(map.root(), None);
    /// map.add(1, 1).unwrap();
    /// assert_eq!(map.root(), Some((&1, &1)));
    /// ```
    pub fn root(&self) -> Option<(&T, &U)> {
        self.tree.as_ref().map(|node| node.entry.as_pair())
    }

    /// Returns the key-value pair with the minimum key in the map, or `None` if the map is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// assert_eq!(map.min(), None);
    /// map.add(3, 4).unwrap();
    /// map.add(1, 2).unwrap();
    /// assert_eq!(map.min(), Some((&1, &2)));
    /// ```
    pub fn min(&self) -> Option<(&T, &U)> {
        tree::min(&self.tree).map(Entry::as_pair)
    }

    /// Returns the key-value pair with the maximum key in the map, or `None` if the map is
    /// empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// assert_eq!(map.max(), None);
    /// map.add(3, 4).unwrap();
    /// map.add(1, 2).unwrap();
    /// assert_eq!(map.max(), Some((&3, &4)));
    /// ```
    pub fn max(&self) -> Option<(&T, &U)> {
        tree::max(&self.tree).map(Entry::as_pair)
    }

    /// Returns a freshly built vector of every key-value pair in the map in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(2, 'b').unwrap();
    /// map.add(1, 'a').unwrap();
    /// assert_eq!(map.entries(), vec![(&1, &'a'), (&2, &'b')]);
    /// ```
    pub fn entries(&self) -> Vec<(&T, &U)> {
        self.iter().collect()
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// assert_eq!(map.size(), 1);
    /// ```
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let map: TreapMap<u32, u32> = TreapMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the number of entries in the map after checking it against an independent count
    /// of the nodes in the tree. This walks the whole tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// assert_eq!(map.checked_size(), Ok(1));
    /// ```
    pub fn checked_size(&self) -> Result<usize> {
        let counted = tree::count(&self.tree);
        if counted != self.size {
            warn!("tracked size {} does not match {} reachable nodes", self.size, counted);
            return Err(Error::CorruptionDetected(Corruption::SizeMismatch {
                tracked: self.size,
                counted,
            }));
        }
        Ok(self.size)
    }

    /// Checks the key order, the priority order, and the size accounting of the whole tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// for key in 0..100 {
    ///     map.add(key, key).unwrap();
    /// }
    /// assert_eq!(map.validate(), Ok(()));
    /// ```
    pub fn validate(&self) -> Result<()>
    where
        T: Ord,
    {
        let counted = tree::validate(&self.tree, None, None).map_err(|err| {
            warn!("treap validation failed: {}", err);
            err
        })?;
        if counted != self.size {
            warn!("tracked size {} does not match {} reachable nodes", self.size, counted);
            return Err(Error::CorruptionDetected(Corruption::SizeMismatch {
                tracked: self.size,
                counted,
            }));
        }
        Ok(())
    }

    /// Clears the map, removing all entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// map.add(2, 2).unwrap();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.root(), None);
    /// ```
    pub fn clear(&mut self) {
        debug!("clearing treap with {} entries", self.size);
        self.tree = None;
        self.size = 0;
    }

    /// Returns an iterator over the map. The iterator will yield key-value pairs using in-order
    /// traversal.
    ///
    /// # Examples
    ///
    /// ```
    /// use treap_map::treap::TreapMap;
    ///
    /// let mut map = TreapMap::new();
    /// map.add(1, 1).unwrap();
    /// map.add(2, 2).unwrap();
    ///
    /// let mut iterator = map.iter();
    /// assert_eq!(iterator.next(), Some((&1, &1)));
    /// assert_eq!(iterator.next(), Some((&2, &2)));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> TreapMapIter<'_, T, U> {
        TreapMapIter {
            current: &self.tree,
            stack: Vec::new(),
        }
    }
}

impl<T, U, R> IntoIterator for TreapMap<T, U, R> {
    type IntoIter = TreapMapIntoIter<T, U>;
    type Item = (T, U);

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            current: self.tree,
            stack: Vec::new(),
        }
    }
}

impl<'a, T, U, R> IntoIterator for &'a TreapMap<T, U, R>
where
    T: 'a,
    U: 'a,
{
    type IntoIter = TreapMapIter<'a, T, U>;
    type Item = (&'a T, &'a U);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owning iterator for `TreapMap<T, U>`.
///
/// This iterator traverses the elements of the map in-order and yields owned entries.
pub struct TreapMapIntoIter<T, U> {
    current: tree::Tree<T, U>,
    stack: Vec<Node<T, U>>,
}

impl<T, U> Iterator for TreapMapIntoIter<T, U> {
    type Item = (T, U);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut node) = self.current.take() {
            self.current = node.left.take();
            self.stack.push(*node);
        }
        self.stack.pop().map(|node| {
            let Node {
                entry: Entry { key, value },
                right,
                ..
            } = node;
            self.current = right;
            (key, value)
        })
    }
}

/// An iterator for `TreapMap<T, U>`.
///
/// This iterator traverses the elements of the map in-order and yields immutable references.
pub struct TreapMapIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    current: &'a tree::Tree<T, U>,
    stack: Vec<&'a Node<T, U>>,
}

impl<'a, T, U> Iterator for TreapMapIter<'a, T, U>
where
    T: 'a,
    U: 'a,
{
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(ref node) = self.current {
            self.current = &node.left;
            self.stack.push(node);
        }
        self.stack.pop().map(|node| {
            let Node {
                entry: Entry { ref key, ref value },
                ref right,
                ..
            } = node;
            self.current = right;
            (key, value)
        })
    }
}

impl<T, U> Default for TreapMap<T, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, U, R> fmt::Debug for TreapMap<T, U, R>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, T, U, R, V> Index<&'a V> for TreapMap<T, U, R>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    type Output = U;

    fn index(&self, key: &V) -> &Self::Output {
        self.get(key).expect("Error: key does not exist.")
    }
}

#[cfg(test)]
mod tests {
    use super::TreapMap;
    use crate::treap::{Corruption, Error};

    #[derive(Debug, PartialEq)]
    enum Value {
        Int(i32),
        Text(&'static str),
    }

    fn letters() -> TreapMap<&'static str, Value> {
        let mut map = TreapMap::new();
        map.add("A", Value::Int(2)).unwrap();
        map.add("B", Value::Int(123)).unwrap();
        map.add("C", Value::Int(23)).unwrap();
        map.add("D", Value::Text("T")).unwrap();
        map
    }

    #[test]
    fn test_size_empty() {
        let map: TreapMap<u32, u32> = TreapMap::new();
        assert_eq!(map.size(), 0);
        assert_eq!(map.checked_size(), Ok(0));
    }

    #[test]
    fn test_is_empty() {
        let map: TreapMap<u32, u32> = TreapMap::new();
        assert!(map.is_empty());
    }

    #[test]
    fn test_min_max_empty() {
        let map: TreapMap<u32, u32> = TreapMap::new();
        assert_eq!(map.min(), None);
        assert_eq!(map.max(), None);
        assert_eq!(map.root(), None);
        assert!(map.entries().is_empty());
    }

    #[test]
    fn test_add() {
        let mut map = TreapMap::new();
        assert_eq!(map.add(1, 1), Ok(()));
        assert!(map.contains_key(&1));
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.search(&1), Some((&1, &1)));
    }

    #[test]
    fn test_add_duplicate() {
        let mut map = TreapMap::new();
        map.add("A", 2).unwrap();
        assert_eq!(map.add("A", 2), Err(Error::DuplicateKey));
        assert_eq!(map.add("A", 3), Err(Error::DuplicateKey));
        assert_eq!(map.size(), 1);
        assert_eq!(map.get("A"), Some(&2));
    }

    #[test]
    fn test_remove() {
        let mut map = TreapMap::new();
        map.add(1, 1).unwrap();
        let ret = map.remove(&1);
        assert!(!map.contains_key(&1));
        assert_eq!(ret, Ok((1, 1)));
        assert_eq!(map.size(), 0);
    }

    #[test]
    fn test_remove_empty() {
        let mut map: TreapMap<&str, u32> = TreapMap::new();
        assert_eq!(map.remove("X"), Err(Error::EmptyTreap));
        assert_eq!(map.size(), 0);
    }

    #[test]
    fn test_remove_missing() {
        let mut map = TreapMap::new();
        map.add(1, 1).unwrap();
        assert_eq!(map.remove(&2), Err(Error::KeyNotFound));
        assert_eq!(map.size(), 1);
    }

    #[test]
    fn test_letters() {
        let map = letters();
        assert_eq!(map.checked_size(), Ok(4));
        assert_eq!(
            map.entries(),
            vec![
                (&"A", &Value::Int(2)),
                (&"B", &Value::Int(123)),
                (&"C", &Value::Int(23)),
                (&"D", &Value::Text("T")),
            ],
        );
        assert_eq!(map.min(), Some((&"A", &Value::Int(2))));
        assert_eq!(map.max(), Some((&"D", &Value::Text("T"))));
        assert_eq!(map.search("A"), Some((&"A", &Value::Int(2))));
    }

    #[test]
    fn test_letters_remove() {
        let mut map = letters();
        assert_eq!(map.remove("A"), Ok(("A", Value::Int(2))));
        assert_eq!(map.size(), 3);
        assert_eq!(map.remove("C"), Ok(("C", Value::Int(23))));
        assert_eq!(map.checked_size(), Ok(2));
        assert_eq!(
            map.entries(),
            vec![(&"B", &Value::Int(123)), (&"D", &Value::Text("T"))],
        );
        assert_eq!(map.min(), Some((&"B", &Value::Int(123))));
        assert_eq!(map.max(), Some((&"D", &Value::Text("T"))));
        assert_eq!(map.validate(), Ok(()));

        map.add("F", Value::Int(0)).unwrap();
        assert_eq!(map.max(), Some((&"F", &Value::Int(0))));
        assert_eq!(map.size(), 3);
    }

    #[test]
    fn test_clear() {
        let mut map = letters();
        map.clear();
        assert_eq!(map.size(), 0);
        assert_eq!(map.checked_size(), Ok(0));
        assert_eq!(map.root(), None);

        map.add("A", Value::Int(5)).unwrap();
        assert_eq!(map.root(), Some((&"A", &Value::Int(5))));
        assert_eq!(map.size(), 1);
        assert_eq!(map.remove("A"), Ok(("A", Value::Int(5))));
        assert_eq!(map.root(), None);
    }

    #[test]
    fn test_add_with_priority() {
        let mut map = TreapMap::new();
        map.add_with_priority(2, 2, 30).unwrap();
        map.add_with_priority(1, 1, 20).unwrap();
        map.add_with_priority(3, 3, 10).unwrap();
        assert_eq!(map.root(), Some((&3, &3)));
        assert_eq!(map.validate(), Ok(()));

        assert_eq!(map.remove(&3), Ok((3, 3)));
        assert_eq!(map.root(), Some((&1, &1)));
        assert_eq!(map.validate(), Ok(()));
    }

    #[test]
    fn test_checked_size_mismatch() {
        let mut map = TreapMap::new();
        map.add(1, 1).unwrap();
        map.size = 2;
        let expected = Err(Error::CorruptionDetected(Corruption::SizeMismatch {
            tracked: 2,
            counted: 1,
        }));
        assert_eq!(map.checked_size(), expected);
        assert_eq!(map.validate(), expected.map(|_| ()));
    }

    #[test]
    fn test_index() {
        let mut map = TreapMap::new();
        map.add(1, 2).unwrap();
        assert_eq!(map[&1], 2);
    }

    #[test]
    #[should_panic]
    fn test_index_missing() {
        let map: TreapMap<u32, u32> = TreapMap::new();
        let _value = map[&1];
    }

    #[test]
    fn test_debug() {
        let mut map = TreapMap::new();
        map.add(2, "b").unwrap();
        map.add(1, "a").unwrap();
        assert_eq!(format!("{:?}", map), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_into_iter() {
        let mut map = TreapMap::new();
        map.add(1, 2).unwrap();
        map.add(5, 6).unwrap();
        map.add(3, 4).unwrap();

        assert_eq!(
            map.into_iter().collect::<Vec<(u32, u32)>>(),
            vec![(1, 2), (3, 4), (5, 6)],
        );
    }

    #[test]
    fn test_iter() {
        let mut map = TreapMap::new();
        map.add(1, 2).unwrap();
        map.add(5, 6).unwrap();
        map.add(3, 4).unwrap();

        assert_eq!(
            map.iter().collect::<Vec<(&u32, &u32)>>(),
            vec![(&1, &2), (&3, &4), (&5, &6)],
        );
        assert_eq!((&map).into_iter().count(), 3);
    }
}
