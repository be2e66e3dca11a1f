use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node};

/// The red-black tree engine backing `RBTreeMap`.
///
/// Nodes and values live in two arenas (the split keeps node traversal
/// cache-friendly and lets mutable iterators hand out `&mut V` without
/// touching node storage). The balancing code only links, unlinks, rotates,
/// and recolors handles; slot lifetime is the arenas' concern.
pub(crate) struct RawRBTreeMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Arena storing all values.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of entries in the tree.
    len: usize,
}

/// In-order successor: the leftmost node of the right subtree, or else the
/// first ancestor under which the node's subtree hangs to the left.
pub(crate) fn successor_in<K>(nodes: &Arena<Node<K>>, node: Handle) -> Option<Handle> {
    if let Some(right) = nodes.get(node).right {
        let mut current = right;
        while let Some(left) = nodes.get(current).left {
            current = left;
        }
        return Some(current);
    }

    let mut current = node;
    let mut parent = nodes.get(current).parent;
    while let Some(p) = parent {
        if nodes.get(p).right != Some(current) {
            break;
        }
        current = p;
        parent = nodes.get(p).parent;
    }
    parent
}

/// In-order predecessor; the mirror image of [`successor_in`].
pub(crate) fn predecessor_in<K>(nodes: &Arena<Node<K>>, node: Handle) -> Option<Handle> {
    if let Some(left) = nodes.get(node).left {
        let mut current = left;
        while let Some(right) = nodes.get(current).right {
            current = right;
        }
        return Some(current);
    }

    let mut current = node;
    let mut parent = nodes.get(current).parent;
    while let Some(p) = parent {
        if nodes.get(p).left != Some(current) {
            break;
        }
        current = p;
        parent = nodes.get(p).parent;
    }
    parent
}

impl<K, V> RawRBTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Creates a new tree with capacity for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entry capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Clears all entries from the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the handle of the smallest entry.
    pub(crate) fn first(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(left) = self.nodes.get(current).left {
            current = left;
        }
        Some(current)
    }

    /// Returns the handle of the largest entry.
    pub(crate) fn last(&self) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(right) = self.nodes.get(current).right {
            current = right;
        }
        Some(current)
    }

    /// Returns the next handle in sorted order, if any.
    pub(crate) fn successor(&self, node: Handle) -> Option<Handle> {
        successor_in(&self.nodes, node)
    }

    /// Returns the previous handle in sorted order, if any.
    pub(crate) fn predecessor(&self, node: Handle) -> Option<Handle> {
        predecessor_in(&self.nodes, node)
    }

    /// Returns the key-value pair stored at `handle`.
    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (&node.key, self.values.get(node.value))
    }

    /// Returns the node arena behind a raw map pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawRBTreeMap<K, V>`.
    /// - No mutable reference to the node arena may exist during `'a`.
    pub(crate) unsafe fn nodes_ptr<'a>(ptr: *const Self) -> &'a Arena<Node<K>> {
        // SAFETY: Caller guarantees `ptr` is valid. Only the `nodes` field is
        // referenced, so `&mut V` handed out of the value arena is not aliased.
        unsafe { &*core::ptr::addr_of!((*ptr).nodes) }
    }

    /// Returns a mutable value reference behind a raw map pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawRBTreeMap<K, V>`.
    /// - The caller must have logical exclusive access to the value at `handle`.
    pub(crate) unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: Only the `values` field is referenced, avoiding aliasing
        // with node references obtained through `nodes_ptr`.
        unsafe { (*core::ptr::addr_of_mut!((*ptr).values)).get_mut(handle) }
    }

    /// Unlinks `node` from the tree, frees both arena slots, and returns the
    /// entry. The handle must be tree-resident; a stale handle panics.
    pub(crate) fn remove(&mut self, node: Handle) -> (K, V) {
        self.unlink(node);
        let node = self.nodes.take(node);
        let value = self.values.take(node.value);
        self.len -= 1;
        (node.key, value)
    }

    /// Removes all entries in sorted order by walking the in-order handle
    /// sequence up front, avoiding any rebalancing work.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let handles = self.in_order_handles();

        let mut result = Vec::with_capacity(handles.len());
        for handle in handles {
            let node = self.nodes.take(handle);
            let value = self.values.take(node.value);
            result.push((node.key, value));
        }

        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
        result
    }

    /// Compacts both arenas and releases excess capacity.
    ///
    /// Nodes sitting in high slots migrate into free low slots; each
    /// migration is a structural-position move, so the tree shape, coloring,
    /// and traversal order are all untouched.
    pub(crate) fn shrink_to_fit(&mut self) {
        for handle in self.in_order_handles() {
            if let Some(moved) = self.nodes.relocate(handle) {
                self.replace(handle, moved);
            }
        }
        self.nodes.shrink_to_fit();

        for handle in self.in_order_handles() {
            let value = self.nodes.get(handle).value;
            if let Some(moved) = self.values.relocate(value) {
                self.nodes.get_mut(handle).value = moved;
            }
        }
        self.values.shrink_to_fit();
    }

    fn in_order_handles(&self) -> Vec<Handle> {
        let mut handles = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            handles.push(handle);
            current = self.successor(handle);
        }
        handles
    }

    /// Migrates a node's structural position from `victim` to `replacement`.
    ///
    /// The node's state must already live at `replacement`; this relinks the
    /// parent's child slot, both children's parent back references, and the
    /// root. No rebalancing runs, as shape and coloring are unchanged.
    fn replace(&mut self, victim: Handle, replacement: Handle) {
        let (parent, left, right) = {
            let node = self.nodes.get(replacement);
            (node.parent, node.left, node.right)
        };

        match parent {
            Some(p) => {
                let parent_node = self.nodes.get_mut(p);
                if parent_node.left == Some(victim) {
                    parent_node.left = Some(replacement);
                } else {
                    parent_node.right = Some(replacement);
                }
            }
            None => self.root = Some(replacement),
        }

        if let Some(left) = left {
            self.nodes.get_mut(left).parent = Some(replacement);
        }
        if let Some(right) = right {
            self.nodes.get_mut(right).parent = Some(replacement);
        }
    }

    /// Splices `node` out of the tree and rebalances. Arena slots are left
    /// alone; the caller frees them once no link can reach the node.
    fn unlink(&mut self, node: Handle) {
        let child: Option<Handle>;
        let parent: Option<Handle>;
        let color: Color;

        let left = self.nodes.get(node).left;
        let right = self.nodes.get(node).right;

        match (left, right) {
            (Some(_), Some(right)) => {
                // Two children: the in-order successor is spliced out of its
                // own position and physically takes over this node's
                // position, color included.
                let old = node;
                let mut succ = right;
                while let Some(left) = self.nodes.get(succ).left {
                    succ = left;
                }

                match self.nodes.get(old).parent {
                    Some(p) => {
                        let parent_node = self.nodes.get_mut(p);
                        if parent_node.left == Some(old) {
                            parent_node.left = Some(succ);
                        } else {
                            parent_node.right = Some(succ);
                        }
                    }
                    None => self.root = Some(succ),
                }

                child = self.nodes.get(succ).right;
                let succ_parent = self
                    .nodes
                    .get(succ)
                    .parent
                    .expect("`RawRBTreeMap::unlink()` - successor has no parent!");
                color = self.nodes.get(succ).color;

                if succ_parent == old {
                    parent = Some(succ);
                } else {
                    if let Some(c) = child {
                        self.nodes.get_mut(c).parent = Some(succ_parent);
                    }
                    self.nodes.get_mut(succ_parent).left = child;

                    self.nodes.get_mut(succ).right = Some(right);
                    self.nodes.get_mut(right).parent = Some(succ);
                    parent = Some(succ_parent);
                }

                let (old_color, old_parent, old_left) = {
                    let old_node = self.nodes.get(old);
                    (old_node.color, old_node.parent, old_node.left)
                };
                let succ_node = self.nodes.get_mut(succ);
                succ_node.color = old_color;
                succ_node.parent = old_parent;
                succ_node.left = old_left;
                if let Some(left) = old_left {
                    self.nodes.get_mut(left).parent = Some(succ);
                }
            }
            _ => {
                // At most one child: splice directly.
                child = left.or(right);
                parent = self.nodes.get(node).parent;
                color = self.nodes.get(node).color;

                if let Some(c) = child {
                    self.nodes.get_mut(c).parent = parent;
                }
                match parent {
                    Some(p) => {
                        let parent_node = self.nodes.get_mut(p);
                        if parent_node.left == Some(node) {
                            parent_node.left = child;
                        } else {
                            parent_node.right = child;
                        }
                    }
                    None => self.root = child,
                }
            }
        }

        // Removing a RED node cannot change any black height. An absent
        // replacement participates in fixup as a phantom BLACK leaf.
        if color == Color::Black {
            self.remove_fixup(child, parent);
        }
    }

    /// Restores black-height balance after a BLACK node was spliced out,
    /// starting from the replacement position `node` (possibly absent) under
    /// `parent`.
    fn remove_fixup(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while !self.is_red(node) && node != self.root {
            let p = parent.expect("`RawRBTreeMap::remove_fixup()` - non-root position has no parent!");

            if self.nodes.get(p).left == node {
                let mut sibling = self
                    .nodes
                    .get(p)
                    .right
                    .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");

                if self.nodes.get(sibling).is_red() {
                    self.nodes.get_mut(sibling).color = Color::Black;
                    self.nodes.get_mut(p).color = Color::Red;
                    self.rotate_left(p);
                    sibling = self
                        .nodes
                        .get(p)
                        .right
                        .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");
                }

                let sibling_left = self.nodes.get(sibling).left;
                let sibling_right = self.nodes.get(sibling).right;

                if !self.is_red(sibling_left) && !self.is_red(sibling_right) {
                    self.nodes.get_mut(sibling).color = Color::Red;
                    node = Some(p);
                    parent = self.nodes.get(p).parent;
                } else {
                    if !self.is_red(sibling_right) {
                        let sibling_left = sibling_left
                            .expect("`RawRBTreeMap::remove_fixup()` - sibling has no RED child!");
                        self.nodes.get_mut(sibling_left).color = Color::Black;
                        self.nodes.get_mut(sibling).color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = self
                            .nodes
                            .get(p)
                            .right
                            .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");
                    }

                    self.nodes.get_mut(sibling).color = self.nodes.get(p).color;
                    self.nodes.get_mut(p).color = Color::Black;
                    let sibling_right = self
                        .nodes
                        .get(sibling)
                        .right
                        .expect("`RawRBTreeMap::remove_fixup()` - sibling has no RED right child!");
                    self.nodes.get_mut(sibling_right).color = Color::Black;
                    self.rotate_left(p);
                    node = self.root;
                    break;
                }
            } else {
                let mut sibling = self
                    .nodes
                    .get(p)
                    .left
                    .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");

                if self.nodes.get(sibling).is_red() {
                    self.nodes.get_mut(sibling).color = Color::Black;
                    self.nodes.get_mut(p).color = Color::Red;
                    self.rotate_right(p);
                    sibling = self
                        .nodes
                        .get(p)
                        .left
                        .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");
                }

                let sibling_left = self.nodes.get(sibling).left;
                let sibling_right = self.nodes.get(sibling).right;

                if !self.is_red(sibling_left) && !self.is_red(sibling_right) {
                    self.nodes.get_mut(sibling).color = Color::Red;
                    node = Some(p);
                    parent = self.nodes.get(p).parent;
                } else {
                    if !self.is_red(sibling_left) {
                        let sibling_right = sibling_right
                            .expect("`RawRBTreeMap::remove_fixup()` - sibling has no RED child!");
                        self.nodes.get_mut(sibling_right).color = Color::Black;
                        self.nodes.get_mut(sibling).color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = self
                            .nodes
                            .get(p)
                            .left
                            .expect("`RawRBTreeMap::remove_fixup()` - double-black position has no sibling!");
                    }

                    self.nodes.get_mut(sibling).color = self.nodes.get(p).color;
                    self.nodes.get_mut(p).color = Color::Black;
                    let sibling_left = self
                        .nodes
                        .get(sibling)
                        .left
                        .expect("`RawRBTreeMap::remove_fixup()` - sibling has no RED left child!");
                    self.nodes.get_mut(sibling_left).color = Color::Black;
                    self.rotate_right(p);
                    node = self.root;
                    break;
                }
            }
        }

        if let Some(node) = node {
            self.nodes.get_mut(node).color = Color::Black;
        }
    }

    /// Restores the red-black invariants after `start` was linked as a RED
    /// leaf. Classic recolor/rotate loop: a RED uncle means recolor and
    /// climb; a BLACK uncle means at most two rotations and termination.
    fn insert_fixup(&mut self, start: Handle) {
        let mut node = start;

        loop {
            let Some(parent) = self.nodes.get(node).parent else {
                break;
            };
            if !self.nodes.get(parent).is_red() {
                break;
            }

            // A RED parent is never the root, so the grandparent exists.
            let gparent = self
                .nodes
                .get(parent)
                .parent
                .expect("`RawRBTreeMap::insert_fixup()` - RED parent has no parent!");

            if Some(parent) == self.nodes.get(gparent).left {
                let uncle = self.nodes.get(gparent).right;
                if let Some(uncle) = uncle.filter(|&u| self.nodes.get(u).is_red()) {
                    self.nodes.get_mut(uncle).color = Color::Black;
                    self.nodes.get_mut(parent).color = Color::Black;
                    self.nodes.get_mut(gparent).color = Color::Red;
                    node = gparent;
                    continue;
                }

                let mut parent = parent;
                if self.nodes.get(parent).right == Some(node) {
                    // Inner child: straighten the lineage first.
                    self.rotate_left(parent);
                    let lifted = node;
                    node = parent;
                    parent = lifted;
                }

                self.nodes.get_mut(parent).color = Color::Black;
                self.nodes.get_mut(gparent).color = Color::Red;
                self.rotate_right(gparent);
            } else {
                let uncle = self.nodes.get(gparent).left;
                if let Some(uncle) = uncle.filter(|&u| self.nodes.get(u).is_red()) {
                    self.nodes.get_mut(uncle).color = Color::Black;
                    self.nodes.get_mut(parent).color = Color::Black;
                    self.nodes.get_mut(gparent).color = Color::Red;
                    node = gparent;
                    continue;
                }

                let mut parent = parent;
                if self.nodes.get(parent).left == Some(node) {
                    self.rotate_right(parent);
                    let lifted = node;
                    node = parent;
                    parent = lifted;
                }

                self.nodes.get_mut(parent).color = Color::Black;
                self.nodes.get_mut(gparent).color = Color::Red;
                self.rotate_left(gparent);
            }
        }

        let root = self.root.expect("`RawRBTreeMap::insert_fixup()` - tree is empty!");
        self.nodes.get_mut(root).color = Color::Black;
    }

    /// O(1) pointer surgery lifting `node`'s right child above it. Rotations
    /// re-point three link sets and never touch colors or the entry count.
    fn rotate_left(&mut self, node: Handle) {
        let right = self
            .nodes
            .get(node)
            .right
            .expect("`RawRBTreeMap::rotate_left()` - node has no right child!");
        let parent = self.nodes.get(node).parent;
        let right_left = self.nodes.get(right).left;

        self.nodes.get_mut(node).right = right_left;
        if let Some(right_left) = right_left {
            self.nodes.get_mut(right_left).parent = Some(node);
        }

        self.nodes.get_mut(right).left = Some(node);
        self.nodes.get_mut(right).parent = parent;

        match parent {
            Some(p) => {
                let parent_node = self.nodes.get_mut(p);
                if parent_node.left == Some(node) {
                    parent_node.left = Some(right);
                } else {
                    parent_node.right = Some(right);
                }
            }
            None => self.root = Some(right),
        }

        self.nodes.get_mut(node).parent = Some(right);
    }

    /// The mirror image of [`RawRBTreeMap::rotate_left`].
    fn rotate_right(&mut self, node: Handle) {
        let left = self
            .nodes
            .get(node)
            .left
            .expect("`RawRBTreeMap::rotate_right()` - node has no left child!");
        let parent = self.nodes.get(node).parent;
        let left_right = self.nodes.get(left).right;

        self.nodes.get_mut(node).left = left_right;
        if let Some(left_right) = left_right {
            self.nodes.get_mut(left_right).parent = Some(node);
        }

        self.nodes.get_mut(left).right = Some(node);
        self.nodes.get_mut(left).parent = parent;

        match parent {
            Some(p) => {
                let parent_node = self.nodes.get_mut(p);
                if parent_node.right == Some(node) {
                    parent_node.right = Some(left);
                } else {
                    parent_node.left = Some(left);
                }
            }
            None => self.root = Some(left),
        }

        self.nodes.get_mut(node).parent = Some(left);
    }

    /// Color of a possibly-absent position; absent children count as BLACK.
    fn is_red(&self, node: Option<Handle>) -> bool {
        node.is_some_and(|h| self.nodes.get(h).is_red())
    }

    /// Links a new RED leaf below `parent` and rebalances.
    fn link(&mut self, key: K, value: V, parent: Option<Handle>, as_left: bool) -> Handle {
        let value_handle = self.values.alloc(value);
        let node = self.nodes.alloc(Node::new(key, value_handle, parent));

        match parent {
            Some(p) => {
                if as_left {
                    self.nodes.get_mut(p).left = Some(node);
                } else {
                    self.nodes.get_mut(p).right = Some(node);
                }
            }
            None => self.root = Some(node),
        }

        self.len += 1;
        self.insert_fixup(node);
        node
    }
}

impl<K: Ord, V> RawRBTreeMap<K, V> {
    /// Binary descent by key; returns a matching handle or `None`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
                Ordering::Equal => return Some(handle),
            }
        }
        None
    }

    /// Inserts under unique-key policy. An equal key already present means no
    /// mutation at all: the pair comes straight back to the caller.
    pub(crate) fn insert_unique(&mut self, key: K, value: V) -> Result<Handle, (K, V)> {
        let mut parent = None;
        let mut as_left = false;
        let mut current = self.root;

        while let Some(handle) = current {
            parent = Some(handle);
            let node = self.nodes.get(handle);
            match key.cmp(&node.key) {
                Ordering::Less => {
                    current = node.left;
                    as_left = true;
                }
                Ordering::Greater => {
                    current = node.right;
                    as_left = false;
                }
                Ordering::Equal => return Err((key, value)),
            }
        }

        Ok(self.link(key, value, parent, as_left))
    }

    /// Inserts under repeat-key policy. Equal keys descend right, so a new
    /// duplicate lands after every existing equal key in traversal order
    /// (FIFO among equal keys). Always succeeds.
    pub(crate) fn insert_repeat(&mut self, key: K, value: V) -> Handle {
        let mut parent = None;
        let mut as_left = false;
        let mut current = self.root;

        while let Some(handle) = current {
            parent = Some(handle);
            let node = self.nodes.get(handle);
            if key.cmp(&node.key) == Ordering::Less {
                current = node.left;
                as_left = true;
            } else {
                current = node.right;
                as_left = false;
            }
        }

        self.link(key, value, parent, as_left)
    }

    /// Returns a reference to the value for `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.values.get(self.nodes.get(handle).value))
    }

    /// Returns a mutable reference to the value for `key`.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        let value = self.nodes.get(handle).value;
        Some(self.values.get_mut(value))
    }

    /// Returns the stored key-value pair for `key`.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.key_value(handle))
    }

    /// Returns true if the tree contains `key`.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Removes one entry matching `key`. An absent key is a silent no-op.
    pub(crate) fn remove_key<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.remove(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    impl<K: Ord, V> RawRBTreeMap<K, V> {
        /// Audits every invariant the tree promises between operations:
        /// BLACK root, no red-red edge, uniform black height, consistent
        /// parent links, sorted in-order sequence, and an accurate count.
        fn check_invariants(&self) {
            if let Some(root) = self.root {
                assert_eq!(self.nodes.get(root).color, Color::Black, "root must be BLACK");
                assert_eq!(self.nodes.get(root).parent, None, "root must have no parent");
            }

            self.check_subtree(self.root, None);

            let mut count = 0;
            let mut current = self.first();
            let mut previous: Option<Handle> = None;
            while let Some(handle) = current {
                if let Some(previous) = previous {
                    assert!(
                        self.nodes.get(previous).key <= self.nodes.get(handle).key,
                        "in-order sequence must be non-decreasing"
                    );
                    assert_eq!(self.predecessor(handle), Some(previous), "backward link must mirror forward");
                }
                count += 1;
                previous = current;
                current = self.successor(handle);
            }
            assert_eq!(count, self.len, "len must match the in-order node count");
        }

        /// Returns the black height of the subtree, treating absent children
        /// as BLACK leaves of height one.
        fn check_subtree(&self, handle: Option<Handle>, parent: Option<Handle>) -> usize {
            let Some(handle) = handle else { return 1 };
            let node = self.nodes.get(handle);
            assert_eq!(node.parent, parent, "parent back reference is stale");

            if node.is_red() {
                assert!(!self.is_red(node.left), "RED node has a RED left child");
                assert!(!self.is_red(node.right), "RED node has a RED right child");
            }

            let left_height = self.check_subtree(node.left, Some(handle));
            let right_height = self.check_subtree(node.right, Some(handle));
            assert_eq!(left_height, right_height, "black heights diverge");

            left_height + usize::from(node.color == Color::Black)
        }

        fn keys_in_order(&self) -> Vec<K>
        where
            K: Clone,
        {
            self.in_order_handles().iter().map(|&h| self.nodes.get(h).key.clone()).collect()
        }
    }

    #[test]
    fn unique_insert_erase_scenario() {
        let mut tree: RawRBTreeMap<i64, i64> = RawRBTreeMap::new();

        for key in [1, 1, -2, 252, 33, 3342, -9] {
            let _ = tree.insert_unique(key, key * 100);
            tree.check_invariants();
        }

        // The second insert of 1 was rejected without mutation.
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.get(&1), Some(&100));
        assert_eq!(tree.keys_in_order(), [-9, -2, 1, 33, 252, 3342]);

        assert!(tree.remove_key(&-2).is_some());
        assert!(tree.remove_key(&3342).is_some());
        tree.check_invariants();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.keys_in_order(), [-9, 1, 33, 252]);

        tree.insert_unique(44, 4400).unwrap();
        tree.insert_unique(-65, -6500).unwrap();
        tree.check_invariants();
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.keys_in_order(), [-65, -9, 1, 33, 44, 252]);
    }

    #[test]
    fn duplicate_key_returns_the_pair() {
        let mut tree: RawRBTreeMap<u32, &str> = RawRBTreeMap::new();
        tree.insert_unique(7, "first").unwrap();
        assert_eq!(tree.insert_unique(7, "second"), Err((7, "second")));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&7), Some(&"first"));
    }

    #[test]
    fn repeat_insert_is_fifo_among_equal_keys() {
        let mut tree: RawRBTreeMap<u32, u32> = RawRBTreeMap::new();
        for (sequence, key) in [5, 1, 5, 3, 5].into_iter().enumerate() {
            tree.insert_repeat(key, sequence as u32);
            tree.check_invariants();
        }

        let entries: Vec<(u32, u32)> = tree
            .in_order_handles()
            .iter()
            .map(|&h| {
                let (k, v) = tree.key_value(h);
                (*k, *v)
            })
            .collect();
        assert_eq!(entries, [(1, 1), (3, 3), (5, 0), (5, 2), (5, 4)]);
    }

    #[test]
    fn erased_keys_are_unreachable() {
        let mut tree: RawRBTreeMap<i32, i32> = RawRBTreeMap::new();
        for key in 0..64 {
            tree.insert_unique(key, key).unwrap();
        }
        for key in (0..64).step_by(3) {
            assert!(tree.remove_key(&key).is_some());
            tree.check_invariants();
            assert_eq!(tree.search(&key), None);
        }
        assert!(tree.remove_key(&0).is_none(), "absent key is a silent no-op");
    }

    #[test]
    fn traversal_is_reversible() {
        let mut tree: RawRBTreeMap<i32, ()> = RawRBTreeMap::new();
        for key in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            tree.insert_unique(key, ()).unwrap();
        }

        let forward = tree.in_order_handles();
        let mut backward = Vec::new();
        let mut current = tree.last();
        while let Some(handle) = current {
            backward.push(handle);
            current = tree.predecessor(handle);
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn shrink_to_fit_compacts_without_reordering() {
        let mut tree: RawRBTreeMap<u32, u32> = RawRBTreeMap::new();
        for key in 0..100 {
            tree.insert_unique(key, key).unwrap();
        }
        for key in (0..100).step_by(2) {
            tree.remove_key(&key);
        }

        let before = tree.keys_in_order();
        tree.shrink_to_fit();
        tree.check_invariants();

        assert_eq!(tree.keys_in_order(), before);
        assert_eq!(tree.len(), 50);
        for key in (1..100).step_by(2) {
            assert_eq!(tree.get(&key), Some(&key));
        }
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut tree: RawRBTreeMap<u8, u8> = RawRBTreeMap::new();
        for key in 0..10 {
            tree.insert_unique(key, key).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.first(), None);
        tree.insert_unique(1, 1).unwrap();
        tree.check_invariants();
    }

    #[derive(Clone, Debug)]
    enum TreeOp {
        InsertUnique(i16, i16),
        Remove(i16),
        Shrink,
    }

    fn tree_op_strategy() -> impl Strategy<Value = TreeOp> {
        prop_oneof![
            5 => (-200i16..200, any::<i16>()).prop_map(|(k, v)| TreeOp::InsertUnique(k, v)),
            3 => (-200i16..200).prop_map(TreeOp::Remove),
            1 => Just(TreeOp::Shrink),
        ]
    }

    proptest! {
        /// Replays random operation sequences against `BTreeMap`, auditing
        /// the structural invariants after every mutation.
        #[test]
        fn random_ops_match_btreemap(ops in prop::collection::vec(tree_op_strategy(), 0..400)) {
            let mut tree: RawRBTreeMap<i16, i16> = RawRBTreeMap::new();
            let mut model: BTreeMap<i16, i16> = BTreeMap::new();

            for op in ops {
                match op {
                    TreeOp::InsertUnique(k, v) => match tree.insert_unique(k, v) {
                        Ok(_) => {
                            prop_assert_eq!(model.insert(k, v), None);
                        }
                        Err((rk, rv)) => {
                            prop_assert_eq!(rk, k);
                            prop_assert_eq!(rv, v);
                            prop_assert!(model.contains_key(&k));
                        }
                    },
                    TreeOp::Remove(k) => {
                        prop_assert_eq!(tree.remove_key(&k).map(|(_, v)| v), model.remove(&k));
                    }
                    TreeOp::Shrink => tree.shrink_to_fit(),
                }

                tree.check_invariants();
                prop_assert_eq!(tree.len(), model.len());
            }

            let keys = tree.keys_in_order();
            let model_keys: Vec<i16> = model.keys().copied().collect();
            prop_assert_eq!(keys, model_keys);
        }

        /// Repeat-mode insertion keeps equal keys in insertion order, which
        /// a stable sort of the insertion sequence reproduces exactly.
        #[test]
        fn repeat_mode_matches_stable_sort(keys in prop::collection::vec(0u8..16, 0..300)) {
            let mut tree: RawRBTreeMap<u8, usize> = RawRBTreeMap::new();
            let mut model: Vec<(u8, usize)> = Vec::new();

            for (sequence, key) in keys.into_iter().enumerate() {
                tree.insert_repeat(key, sequence);
                model.push((key, sequence));
            }
            tree.check_invariants();

            model.sort_by_key(|&(key, _)| key);
            let entries: Vec<(u8, usize)> = tree
                .in_order_handles()
                .iter()
                .map(|&h| {
                    let (k, v) = tree.key_value(h);
                    (*k, *v)
                })
                .collect();
            prop_assert_eq!(entries, model);
        }
    }
}
