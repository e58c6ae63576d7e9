//! Index-addressed storage for linked nodes.
//!
//! Tree nodes point at their parent and children through `Handle`s into a `TypedArena` instead of
//! owning pointers, so parent links never create ownership cycles.

use std::ops::{Index, IndexMut};

/// A stable reference to an object allocated in a `TypedArena<T>`.
///
/// The arena never frees individual objects, so a handle stays valid for the lifetime of the
/// arena that issued it. Handles are plain indices and do not borrow the arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Handle(usize);

/// A grow-only, single-type allocator backed by a list of fixed-size chunks.
///
/// Allocation appends to the last chunk and starts a new chunk once it is full, so a large arena
/// never copies its existing objects while growing. Every object is dropped together with the
/// arena.
///
/// # Examples
///
/// ```
/// use splay_cache::arena::TypedArena;
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1);
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
/// assert_eq!(arena.len(), 1);
/// ```
pub struct TypedArena<T> {
    chunks: Vec<Vec<T>>,
    chunk_size: usize,
    len: usize,
}

impl<T> TypedArena<T> {
    /// Constructs a new, empty `TypedArena<T>` that holds `chunk_size` objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            chunks: Vec::new(),
            chunk_size,
            len: 0,
        }
    }

    fn locate(&self, handle: Handle) -> (usize, usize) {
        (handle.0 / self.chunk_size, handle.0 % self.chunk_size)
    }

    /// Allocates an object in the arena and returns its handle.
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.len % self.chunk_size == 0 {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
        }
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(value);
        }
        self.len += 1;
        Handle(self.len - 1)
    }

    /// Returns an immutable reference to an object in the arena, or `None` if the handle was not
    /// issued by this arena.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let (chunk_index, block_index) = self.locate(handle);
        self.chunks.get(chunk_index)?.get(block_index)
    }

    /// Returns a mutable reference to an object in the arena, or `None` if the handle was not
    /// issued by this arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_cache::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0);
    /// if let Some(value) = arena.get_mut(x) {
    ///     *value = 1;
    /// }
    /// assert_eq!(arena[x], 1);
    /// ```
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let (chunk_index, block_index) = self.locate(handle);
        self.chunks.get_mut(chunk_index)?.get_mut(block_index)
    }

    /// Returns the number of objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been allocated in the arena.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        let (chunk_index, block_index) = self.locate(handle);
        &self.chunks[chunk_index][block_index]
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        let (chunk_index, block_index) = self.locate(handle);
        &mut self.chunks[chunk_index][block_index]
    }
}

#[cfg(test)]
mod tests {
    use super::{Handle, TypedArena};

    #[test]
    #[should_panic]
    fn test_new_zero_chunk_size() {
        let _: TypedArena<u32> = TypedArena::new(0);
    }

    #[test]
    fn test_allocate_multiple_chunks() {
        let mut arena = TypedArena::new(2);
        let handles: Vec<Handle> = (0..5).map(|i| arena.allocate(i * 10)).collect();
        assert_eq!(arena.chunks.len(), 3);
        assert_eq!(arena.len(), 5);
        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(arena[*handle], i * 10);
        }
    }

    #[test]
    fn test_get_foreign_handle() {
        let mut arena = TypedArena::new(4);
        arena.allocate(0);
        assert_eq!(arena.get(Handle(1)), None);
        assert_eq!(arena.get(Handle(4)), None);
        assert!(arena.get_mut(Handle(9)).is_none());
    }

    #[test]
    #[should_panic]
    fn test_index_foreign_handle() {
        let arena: TypedArena<u32> = TypedArena::new(4);
        let _ = arena[Handle(0)];
    }

    #[test]
    fn test_index_mut() {
        let mut arena = TypedArena::new(1);
        let first = arena.allocate(0);
        let second = arena.allocate(1);
        arena[first] += 5;
        assert_eq!(arena.get(first), Some(&5));
        assert_eq!(arena.get(second), Some(&1));
        assert!(!arena.is_empty());
    }
}
