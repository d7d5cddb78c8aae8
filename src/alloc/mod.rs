//! Utility allocators consumed by the three components: a block allocator
//! and a typed object heap, realized as arenas with stable indices rather
//! than pointer-linked storage.

mod block_allocator;
mod object_heap;

pub use block_allocator::BlockAllocator;
pub use object_heap::ObjectHeap;
