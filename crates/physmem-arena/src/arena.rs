//! The physical-memory bump arena.
//!
//! [`DevMemArena`] hands out aligned runs of bytes from one
//! [`MappedRegion`] by advancing a cursor. Nothing is ever freed: the
//! cursor only moves forward, and padding introduced by alignment is lost
//! for good. Allocated bytes are handed out as found in the region and
//! are not zeroed.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::mem;
use std::ptr::NonNull;

use log::{debug, info};
use physmem_core::{ArenaError, ArenaUsage};

use crate::buffer::{Buffer, Origin};
use crate::config::ArenaConfig;
use crate::region::MappedRegion;

/// Append-only allocator over a single mapped region.
///
/// Allocation takes `&self`, so buffers carved from the arena can be held
/// side by side; the cursor lives in a [`Cell`], which also makes the
/// arena `!Sync`. Every returned range is disjoint from every other and
/// from the unused tail `[cursor, capacity)`.
pub struct DevMemArena {
    region: MappedRegion,
    /// Offset of the next free byte from `base`. Never decreases.
    cursor: Cell<usize>,
}

impl DevMemArena {
    /// Map the physical range described by `config` and wrap it in an arena.
    pub fn map(config: &ArenaConfig) -> Result<Self, ArenaError> {
        MappedRegion::physical(config).map(Self::from_region)
    }

    /// Serve allocations from an already-mapped region.
    pub fn from_region(region: MappedRegion) -> Self {
        Self {
            region,
            cursor: Cell::new(0),
        }
    }

    /// Virtual address of the first byte of the region.
    pub fn base(&self) -> *const u8 {
        self.region.base().as_ptr()
    }

    /// Total size of the region in bytes.
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Offset of the next free byte.
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    /// The backing mapping.
    pub fn region(&self) -> &MappedRegion {
        &self.region
    }

    /// Reserve `layout.size()` bytes at the next address aligned to `layout.align()`.
    ///
    /// On failure the cursor is left where it was.
    pub fn allocate_raw(&self, layout: Layout) -> Result<NonNull<u8>, ArenaError> {
        let capacity = self.capacity();
        let cursor = self.cursor.get();
        let exhausted = |used: usize| ArenaError::CapacityExceeded {
            requested: layout.size(),
            used,
            capacity,
        };

        // Align the absolute address; `base` is only page-aligned.
        let base = self.base() as usize;
        let start = base
            .checked_add(cursor)
            .and_then(|addr| align_up(addr, layout.align()))
            .map(|addr| addr - base)
            .ok_or_else(|| exhausted(cursor))?;
        let end = start
            .checked_add(layout.size())
            .filter(|&end| end <= capacity)
            .ok_or_else(|| exhausted(start))?;

        self.cursor.set(end);
        // SAFETY: start <= end <= capacity, so base + start stays inside
        // (or one past the end of) the mapping and is non-null.
        Ok(unsafe { self.region.base().add(start) })
    }

    /// Reserve room for `count` elements of `T`, aligned for `T`.
    ///
    /// The contents are uninitialized.
    pub fn allocate<T>(&self, count: usize) -> Result<Buffer<'_, T>, ArenaError> {
        let layout = Layout::array::<T>(count).map_err(|_| ArenaError::LayoutOverflow {
            count,
            elem_size: mem::size_of::<T>(),
        })?;
        let ptr = self.allocate_raw(layout)?;
        debug!(
            "DevMemArena: {count} x {} at offset {}",
            std::any::type_name::<T>(),
            ptr.as_ptr() as usize - self.base() as usize
        );
        // SAFETY: the range was just carved from the mapping, is aligned for
        // T, holds `count` elements, and is never handed out again.
        Ok(unsafe { Buffer::from_raw_parts(ptr.cast::<T>(), count, Origin::Arena) })
    }

    /// Allocate `count` clones of `value`.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_filled<T: Clone>(&self, count: usize, value: T) -> Result<&mut [T], ArenaError> {
        let mut buf = self.allocate(count)?;
        buf.fill(value);
        // SAFETY: filled above; arena buffers are never released.
        Ok(unsafe { buf.into_init_slice() })
    }

    /// Allocate a copy of `src`.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_copy<T: Copy>(&self, src: &[T]) -> Result<&mut [T], ArenaError> {
        let mut buf = self.allocate(src.len())?;
        buf.copy_from_slice(src);
        // SAFETY: copied above; arena buffers are never released.
        Ok(unsafe { buf.into_init_slice() })
    }

    /// True iff `ptr` lies in `[base, base + capacity)`.
    pub fn contains<T: ?Sized>(&self, ptr: *const T) -> bool {
        let addr = ptr.cast::<u8>() as usize;
        let base = self.base() as usize;
        addr >= base && addr - base < self.capacity()
    }

    /// Current utilization.
    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage {
            used: self.cursor.get(),
            capacity: self.capacity(),
        }
    }

    /// Log and return the current utilization.
    pub fn report_usage(&self) -> ArenaUsage {
        let usage = self.usage();
        info!("DevMemArena: {usage}");
        usage
    }
}

impl std::fmt::Debug for DevMemArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevMemArena")
            .field("base", &self.base())
            .field("capacity", &self.capacity())
            .field("cursor", &self.cursor.get())
            .field("kind", &self.region.kind())
            .finish()
    }
}

/// Round `offset` up to a multiple of `align` (a power of two).
fn align_up(offset: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    offset.checked_add(align - 1).map(|v| v & !(align - 1))
}
