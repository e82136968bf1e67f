//! The allocate/release contract shared by the arena and the heap.
//!
//! Consumers that build large structures (graph adjacency arrays and
//! the like) are written against [`BufferSource`] and never learn which
//! placement they run on. Releasing is a real free for heap buffers and a
//! no-op for arena buffers.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

use log::debug;
use physmem_core::ArenaError;

use crate::arena::DevMemArena;
use crate::buffer::{Buffer, Origin};

/// Something that hands out typed buffers and takes them back.
pub trait BufferSource {
    /// Allocate room for `count` contiguous, uninitialized `T`s.
    fn allocate<T>(&self, count: usize) -> Result<Buffer<'_, T>, ArenaError>;

    /// Give a buffer back. Values stored in it are not dropped.
    fn release<T>(&self, buffer: Buffer<'_, T>);
}

/// The ordinary global heap allocator.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapSource;

impl BufferSource for HeapSource {
    fn allocate<T>(&self, count: usize) -> Result<Buffer<'_, T>, ArenaError> {
        let layout = Layout::array::<T>(count).map_err(|_| ArenaError::LayoutOverflow {
            count,
            elem_size: mem::size_of::<T>(),
        })?;
        if layout.size() == 0 {
            // SAFETY: a dangling, aligned pointer is valid for zero bytes.
            return Ok(unsafe { Buffer::from_raw_parts(NonNull::dangling(), count, Origin::Heap) });
        }
        // SAFETY: layout has non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(ArenaError::HeapExhausted {
            bytes: layout.size(),
        })?;
        // SAFETY: fresh allocation of `layout`, aligned for T, owned by the buffer.
        Ok(unsafe { Buffer::from_raw_parts(ptr, count, Origin::Heap) })
    }

    fn release<T>(&self, buffer: Buffer<'_, T>) {
        let (ptr, len, origin) = buffer.into_raw_parts();
        if origin != Origin::Heap {
            debug!("HeapSource: ignoring release of a non-heap buffer");
            return;
        }
        let Ok(layout) = Layout::array::<T>(len) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        // SAFETY: heap-origin buffers of non-zero size come from
        // `alloc::alloc` with exactly this layout.
        unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) }
    }
}

impl BufferSource for DevMemArena {
    fn allocate<T>(&self, count: usize) -> Result<Buffer<'_, T>, ArenaError> {
        DevMemArena::allocate(self, count)
    }

    /// No-op: arena memory lives until the process exits.
    fn release<T>(&self, buffer: Buffer<'_, T>) {
        if !buffer.is_empty() && !self.contains(buffer.as_ptr()) {
            debug!("DevMemArena: ignoring release of a buffer outside the arena");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::MappedRegion;

    #[test]
    fn heap_round_trip() {
        let heap = HeapSource;
        let mut buf = heap.allocate::<u64>(32).unwrap();
        assert_eq!(buf.origin(), Origin::Heap);
        assert_eq!(buf.as_ptr() as usize % mem::align_of::<u64>(), 0);
        let data = buf.fill(3);
        assert_eq!(data.iter().sum::<u64>(), 96);
        heap.release(buf);
    }

    #[test]
    fn heap_zero_bytes_is_dangling_and_release_is_safe() {
        let heap = HeapSource;
        let buf = heap.allocate::<u32>(0).unwrap();
        assert!(buf.is_empty());
        heap.release(buf);
        let units = heap.allocate::<()>(10).unwrap();
        assert_eq!(units.len(), 10);
        heap.release(units);
    }

    #[test]
    fn heap_overflow_is_layout_error() {
        let err = HeapSource.allocate::<u32>(usize::MAX).unwrap_err();
        assert!(matches!(err, ArenaError::LayoutOverflow { .. }));
    }

    #[test]
    fn heap_refuses_to_free_arena_memory() {
        let arena = DevMemArena::from_region(MappedRegion::anonymous(4096).unwrap());
        let buf = arena.allocate::<u8>(16).unwrap();
        HeapSource.release(buf);
        assert_eq!(arena.cursor(), 16);
    }

    #[test]
    fn arena_release_does_not_move_cursor() {
        let arena = DevMemArena::from_region(MappedRegion::anonymous(4096).unwrap());
        let buf = BufferSource::allocate::<u32>(&arena, 8).unwrap();
        BufferSource::release(&arena, buf);
        assert_eq!(arena.cursor(), 32);
    }

    #[test]
    fn arena_release_ignores_foreign_heap_buffers() {
        let arena = DevMemArena::from_region(MappedRegion::anonymous(4096).unwrap());
        let mut heap_buf = HeapSource.allocate::<u64>(4).unwrap();
        heap_buf.fill(1);
        BufferSource::release(&arena, heap_buf);
        assert_eq!(arena.cursor(), 0);
    }

    fn build_prefix_sums<S: BufferSource>(source: &S, degrees: &[u32]) -> Vec<u32> {
        let mut offsets = source.allocate::<u32>(degrees.len() + 1).unwrap();
        let slots = offsets.as_uninit_mut();
        let mut total = 0;
        slots[0].write(0);
        for (i, d) in degrees.iter().enumerate() {
            total += d;
            slots[i + 1].write(total);
        }
        // SAFETY: every slot was written above.
        let out = unsafe { offsets.assume_init_mut() }.to_vec();
        source.release(offsets);
        out
    }

    #[test]
    fn same_consumer_code_runs_on_both_sources() {
        let arena = DevMemArena::from_region(MappedRegion::anonymous(4096).unwrap());
        let degrees = [2, 0, 3, 1];
        assert_eq!(build_prefix_sums(&arena, &degrees), vec![0, 2, 2, 5, 6]);
        assert_eq!(build_prefix_sums(&HeapSource, &degrees), vec![0, 2, 2, 5, 6]);
    }
}
