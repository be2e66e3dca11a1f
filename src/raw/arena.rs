use alloc::vec::Vec;

use super::handle::Handle;

/// Slot-vector allocator handing out stable [`Handle`]s.
///
/// Freed slots are recycled through a free list, so a handle stays valid for
/// exactly as long as its element is live. The arena is the sole owner of
/// element lifetime; the tree engine only links and unlinks handles.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot/handle.
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            // Strict less-than: `slots.len() < Handle::MAX` before the push
            // bounds the total element count at `Handle::MAX`.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Moves the element at `from` into the lowest free slot, provided that
    /// slot sits below `from`. Returns the element's new handle, or `None` if
    /// no lower slot is free. The old handle becomes invalid.
    ///
    /// The caller must rewire any stored handles that referenced `from`.
    pub(crate) fn relocate(&mut self, from: Handle) -> Option<Handle> {
        let target = self.free.iter().copied().min()?;
        if target >= from {
            return None;
        }

        let position = self
            .free
            .iter()
            .position(|&h| h == target)
            .expect("`Arena::relocate()` - free list is inconsistent!");
        self.free.swap_remove(position);

        let element = self.slots[from.to_index()].take().expect("`Arena::relocate()` - `from` is invalid!");
        self.slots[target.to_index()] = Some(element);
        self.free.push(from);
        Some(target)
    }

    /// Drops the free tail of the slot vector and releases excess capacity.
    /// Only trailing slots can be dropped; interior holes must first be
    /// emptied out via [`Arena::relocate`].
    pub(crate) fn shrink_to_fit(&mut self) {
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let len = self.slots.len();
        self.free.retain(|h| h.to_index() < len);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn arena_capacity() {
        let arena: Arena<u32> = Arena::with_capacity(10);
        assert_eq!(arena.capacity(), 10);
    }

    #[test]
    fn relocate_fills_lowest_hole() {
        let mut arena: Arena<u32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        let c = arena.alloc(3);

        arena.take(c);
        assert_eq!(arena.relocate(b), None, "no free slot below `b`");

        arena.take(a);
        let moved = arena.relocate(b).expect("slot 0 is free");
        assert_eq!(moved.to_index(), a.to_index());
        assert_eq!(*arena.get(moved), 2);

        arena.shrink_to_fit();
        assert_eq!(arena.len(), 1);
        let d = arena.alloc(4);
        assert!(d.to_index() < c.to_index(), "shrink dropped the freed tail slots");
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::new();

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::Get(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        prop_assert_eq!(*arena.get(handle), model[index].1);
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle) = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let value1 = arena.take(handle);
                        let (_, value2) = model.swap_remove(index);
                        prop_assert_eq!(value1, value2);
                    }
                    Operation::Relocate(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        if let Some(moved) = arena.relocate(handle) {
                            prop_assert!(moved.to_index() < handle.to_index());
                            model[index].0 = moved;
                        }
                    }
                    Operation::Shrink => {
                        arena.shrink_to_fit();
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());

                for &(handle, value) in &model {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        Get(usize),
        GetMut(usize, u32),
        Take(usize),
        Relocate(usize),
        Shrink,
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => any::<usize>().prop_map(Operation::Get),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            3 => any::<usize>().prop_map(Operation::Relocate),
            1 => Just(Operation::Shrink),
            1 => Just(Operation::Clear),
        ]
    }
}
