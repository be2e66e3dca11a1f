use super::RBTreeMap;
use crate::raw::RawRBTreeMap;

impl<K, V> RBTreeMap<K, V> {
    /// Creates an empty map with capacity for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use carmine_tree::RBTreeMap;
    ///
    /// let map: RBTreeMap<i32, i32> = RBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RBTreeMap {
            raw: RawRBTreeMap::with_capacity(capacity),
        }
    }

    /// Returns the current entry capacity of the map.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Shrinks the backing storage as much as possible.
    ///
    /// Entries parked in high arena slots migrate into free lower slots
    /// first; the migration moves structural positions only, so the tree
    /// shape and the iteration order are unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use carmine_tree::RBTreeMap;
    ///
    /// let mut map = RBTreeMap::new();
    /// for key in 0..100 {
    ///     map.insert(key, key).unwrap();
    /// }
    /// for key in 0..90 {
    ///     map.remove(&key);
    /// }
    /// map.shrink_to_fit();
    /// assert!(map.capacity() < 100);
    /// assert_eq!(map.len(), 10);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        self.raw.shrink_to_fit();
    }
}
