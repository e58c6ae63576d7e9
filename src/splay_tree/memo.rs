use crate::splay_tree::SplayTree;
use std::ops::Add;

/// Returns the value cached for `key`, computing and caching it on a miss.
///
/// A hit splays the cached entry to the root. On a miss `compute` receives the same tree, so it
/// may recursively memoize the sub-results it depends on before the result for `key` is inserted.
///
/// # Examples
///
/// ```
/// use splay_cache::splay_tree::{memoize, SplayTree};
///
/// let mut tree = SplayTree::new();
/// assert_eq!(memoize(&mut tree, 4, |_, key| key * key), 16);
/// assert_eq!(memoize(&mut tree, 4, |_, _| unreachable!()), 16);
/// assert_eq!(tree.len(), 1);
/// ```
pub fn memoize<K, V, F>(tree: &mut SplayTree<K, V>, key: K, compute: F) -> V
where
    K: Ord,
    V: Clone,
    F: FnOnce(&mut SplayTree<K, V>, &K) -> V,
{
    if let Some(value) = tree.find(&key).cloned() {
        return value;
    }
    let value = compute(tree, &key);
    tree.insert(key, value.clone());
    value
}

/// Computes the `n`-th Fibonacci number, memoizing every intermediate result in `tree`.
///
/// `V` only needs addition and a conversion from the base cases, so arbitrary precision integers
/// work as well as primitive ones.
///
/// # Examples
///
/// ```
/// use splay_cache::splay_tree::{fibonacci, SplayTree};
///
/// let mut tree: SplayTree<u64, u64> = SplayTree::new();
/// assert_eq!(fibonacci(10, &mut tree), 55);
/// assert_eq!(tree.len(), 11);
/// ```
pub fn fibonacci<V>(n: u64, tree: &mut SplayTree<u64, V>) -> V
where
    V: Clone + Add<Output = V> + From<u8>,
{
    memoize(tree, n, |tree, &n| {
        if n < 2 {
            V::from(n as u8)
        } else {
            fibonacci(n - 1, tree) + fibonacci(n - 2, tree)
        }
    })
}
