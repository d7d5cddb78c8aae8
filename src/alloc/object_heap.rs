//! Typed fixed-size-slot pool.

/// A typed pool with an independent free list, one heap per object kind.
///
/// Returns stable `usize` slot indices rather than raw pointers. A freed
/// slot's id may be reused by a later `alloc_object` call.
#[derive(Debug)]
pub struct ObjectHeap<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<usize>,
}

impl<T> Default for ObjectHeap<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }
}

impl<T> ObjectHeap<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocate a slot holding `value`, returning its stable index.
    pub fn alloc_object(&mut self, value: T) -> usize {
        if let Some(slot) = self.free_list.pop() {
            self.slots[slot] = Some(value);
            slot
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        }
    }

    /// Release the object at `slot`, making its index available for reuse.
    ///
    /// Returns the released value. Panics if `slot` is out of range or
    /// already free.
    pub fn free_object(&mut self, slot: usize) -> T {
        let value = self.slots[slot]
            .take()
            .unwrap_or_else(|| panic!("object_heap: slot {slot} is already free"));
        self.free_list.push(slot);
        value
    }

    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(|s| s.as_mut())
    }

    /// Number of live (allocated, not-yet-freed) objects.
    pub fn num_allocated(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Total memory footprint of the heap's backing storage, in bytes.
    pub fn get_total_memory(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Option<T>>()
            + self.free_list.capacity() * std::mem::size_of::<usize>()
    }

    /// Iterate over all live objects together with their stable slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (i, v)))
    }
}
