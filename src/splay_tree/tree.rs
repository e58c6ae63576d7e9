use crate::arena::{Handle, TypedArena};
use crate::splay_tree::node::{Node, Side};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

const CHUNK_SIZE: usize = 1024;

/// A self-adjusting binary search tree mapping keys to values.
///
/// Every successful `find` moves the matched node to the root through a sequence of zig, zig-zig
/// and zig-zag rotations, so keys that are accessed repeatedly, or close together, stay near the
/// top of the tree. Insertion places the new node as a leaf without splaying; the first `find` of
/// that key pays for moving it up.
///
/// Every key is stored at most once. Inserting a key that is already present replaces its value in
/// place, so rotations never have to order two equal keys.
///
/// Nodes are stored in a `TypedArena` and linked through handles. The tree only grows: there is no
/// removal, and every node is dropped together with the tree.
///
/// # Examples
///
/// ```
/// use splay_cache::splay_tree::SplayTree;
///
/// let mut tree = SplayTree::new();
/// tree.insert(5, "five");
/// tree.insert(3, "three");
/// tree.insert(8, "eight");
///
/// assert_eq!(tree.find(&3), Some(&"three"));
/// assert_eq!(tree.root_key(), Some(&3));
/// assert_eq!(tree.find(&4), None);
/// assert_eq!(tree.len(), 3);
/// ```
pub struct SplayTree<K, V> {
    arena: TypedArena<Node<K, V>>,
    root: Option<Handle>,
}

impl<K, V> SplayTree<K, V> {
    /// Constructs a new, empty `SplayTree<K, V>`.
    pub fn new() -> Self {
        SplayTree {
            arena: TypedArena::new(CHUNK_SIZE),
            root: None,
        }
    }

    /// Returns the number of distinct keys in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the key stored at the root of the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::splay_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// assert_eq!(tree.root_key(), None);
    /// tree.insert(2, ());
    /// tree.insert(1, ());
    /// assert_eq!(tree.root_key(), Some(&2));
    /// tree.find(&1);
    /// assert_eq!(tree.root_key(), Some(&1));
    /// ```
    pub fn root_key(&self) -> Option<&K> {
        self.root.map(|root| &self.arena[root].entry.key)
    }

    /// Inserts a key-value pair as a new leaf and returns `None`. If the key already exists, its
    /// value is replaced in place and the old value is returned. Either way the shape of the tree
    /// and its root are left alone, unless the tree was empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::splay_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// assert_eq!(tree.insert(1, 1), None);
    /// assert_eq!(tree.insert(1, 2), Some(1));
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree.find(&1), Some(&2));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        K: Ord,
    {
        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.root = Some(self.arena.allocate(Node::new(key, value, None)));
                return None;
            }
        };

        loop {
            let side = match key.cmp(&self.arena[current].entry.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    return Some(mem::replace(&mut self.arena[current].entry.value, value));
                }
            };
            match self.arena[current].child(side) {
                Some(child) => current = child,
                None => {
                    let leaf = self.arena.allocate(Node::new(key, value, Some(current)));
                    *self.arena[current].child_mut(side) = Some(leaf);
                    return None;
                }
            }
        }
    }

    /// Looks up a key and, if it exists, splays its node to the root and returns a reference to
    /// its value. A miss leaves the tree untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::splay_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// for key in &[5, 3, 8, 1, 4] {
    ///     tree.insert(*key, key * 10);
    /// }
    /// assert_eq!(tree.find(&1), Some(&10));
    /// assert_eq!(tree.root_key(), Some(&1));
    /// assert_eq!(tree.find(&7), None);
    /// assert_eq!(tree.root_key(), Some(&1));
    /// ```
    pub fn find<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.search(key)?;
        self.splay(node);
        Some(&self.arena[node].entry.value)
    }

    /// Returns the number of edges between the root and the node holding `key`, or `None`
    /// if the key does not exist. Does not splay the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::splay_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// tree.insert(1, ());
    /// tree.insert(2, ());
    /// tree.insert(3, ());
    /// assert_eq!(tree.depth(&3), Some(2));
    /// tree.find(&3);
    /// assert_eq!(tree.depth(&3), Some(0));
    /// assert_eq!(tree.depth(&1), Some(2));
    /// ```
    pub fn depth<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut depth = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = &self.arena[handle];
            current = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(depth),
            };
            depth += 1;
        }
        None
    }

    /// Walks the whole tree and checks that keys are in strict search order, that every child
    /// points back at its parent, that the root has no parent, and that every entry is reachable
    /// from the root exactly once.
    pub fn is_valid(&self) -> bool
    where
        K: Ord,
    {
        let root = match self.root {
            Some(root) => root,
            None => return self.arena.is_empty(),
        };
        if self.arena[root].parent.is_some() {
            return false;
        }

        // (node, exclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(Handle, Option<&K>, Option<&K>)> = vec![(root, None, None)];
        let mut visited = 0;
        while let Some((handle, lower, upper)) = stack.pop() {
            visited += 1;
            if visited > self.arena.len() {
                return false;
            }

            let node = &self.arena[handle];
            let key = &node.entry.key;
            let below = lower.map_or(false, |lower| key <= lower);
            let above = upper.map_or(false, |upper| key >= upper);
            if below || above {
                return false;
            }

            for &(child, side) in &[(node.left, Side::Left), (node.right, Side::Right)] {
                if let Some(child) = child {
                    if self.arena[child].parent != Some(handle) {
                        return false;
                    }
                    match side {
                        Side::Left => stack.push((child, lower, Some(key))),
                        Side::Right => stack.push((child, Some(key), upper)),
                    }
                }
            }
        }
        visited == self.arena.len()
    }

    fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = &self.arena[handle];
            current = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    fn side_of(&self, child: Handle, parent: Handle) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Moves `node` to the root. Each step lifts the node by one level (zig) or two levels
    /// (zig-zig, zig-zag).
    fn splay(&mut self, node: Handle) {
        while let Some(parent) = self.arena[node].parent {
            let node_side = self.side_of(node, parent);
            match self.arena[parent].parent {
                None => self.rotate(parent, node_side.opposite()),
                Some(grandparent) => {
                    let parent_side = self.side_of(parent, grandparent);
                    if node_side == parent_side {
                        self.rotate(grandparent, node_side.opposite());
                        self.rotate(parent, node_side.opposite());
                    } else {
                        self.rotate(parent, node_side.opposite());
                        self.rotate(grandparent, parent_side.opposite());
                    }
                }
            }
        }
    }

    /// Rotates `pivot` down towards `direction`, promoting its child on the opposite side into its
    /// place. Does nothing if that child does not exist.
    fn rotate(&mut self, pivot: Handle, direction: Side) {
        let child = match self.arena[pivot].child(direction.opposite()) {
            Some(child) => child,
            None => return,
        };

        let inner = self.arena[child].child(direction);
        *self.arena[pivot].child_mut(direction.opposite()) = inner;
        if let Some(inner) = inner {
            self.arena[inner].parent = Some(pivot);
        }

        let parent = self.arena[pivot].parent;
        self.arena[child].parent = parent;
        match parent {
            None => self.root = Some(child),
            Some(parent) => {
                let side = self.side_of(pivot, parent);
                *self.arena[parent].child_mut(side) = Some(child);
            }
        }

        *self.arena[child].child_mut(direction) = Some(pivot);
        self.arena[pivot].parent = Some(child);
    }

    #[cfg(test)]
    pub(crate) fn rotate_left(&mut self, pivot: Handle) {
        self.rotate(pivot, Side::Left);
    }

    #[cfg(test)]
    pub(crate) fn rotate_right(&mut self, pivot: Handle) {
        self.rotate(pivot, Side::Right);
    }
}

impl<K, V> Default for SplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
