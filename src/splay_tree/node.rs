use crate::arena::Handle;
use crate::entry::Entry;

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A struct representing an internal node of a splay tree.
///
/// `left` and `right` own their subtrees; `parent` is a back-reference used only to climb during a
/// splay.
pub struct Node<K, V> {
    pub entry: Entry<K, V>,
    pub parent: Option<Handle>,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<Handle>) -> Self {
        Node {
            entry: Entry::new(key, value),
            parent,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut Option<Handle> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}
