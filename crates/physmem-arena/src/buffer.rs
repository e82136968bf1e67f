//! Typed handle for a contiguous run of elements.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::NonNull;
use std::slice;

/// Which allocator produced a [`Buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Carved from a [`DevMemArena`](crate::DevMemArena); never freed.
    Arena,
    /// Obtained from the global heap allocator; freed on release.
    Heap,
}

/// `len` contiguous, possibly uninitialized `T`s borrowed from a source.
///
/// A buffer is the unit handed to [`BufferSource::release`](crate::BufferSource::release).
/// It does not free anything when dropped: a heap buffer that is never
/// released leaks, an arena buffer lives until the process exits either way.
///
/// Contents start uninitialized. Values written into the buffer are
/// never dropped.
#[derive(Debug)]
pub struct Buffer<'a, T> {
    ptr: NonNull<T>,
    len: usize,
    origin: Origin,
    _source: PhantomData<&'a mut [MaybeUninit<T>]>,
}

impl<'a, T> Buffer<'a, T> {
    /// # Safety
    ///
    /// `ptr` must be aligned for `T` and valid for reads and writes of
    /// `len` elements for `'a`, with no other live reference to that memory.
    pub(crate) unsafe fn from_raw_parts(ptr: NonNull<T>, len: usize, origin: Origin) -> Self {
        Self {
            ptr,
            len,
            origin,
            _source: PhantomData,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Which allocator produced this buffer.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Pointer to the first element.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the first element.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// View the storage as uninitialized slots.
    pub fn as_uninit_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: construction guarantees `len` valid, exclusively owned
        // slots; MaybeUninit<T> has the layout of T.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<MaybeUninit<T>>(), self.len) }
    }

    /// Write `value` into every slot and return the initialized slice.
    pub fn fill(&mut self, value: T) -> &mut [T]
    where
        T: Clone,
    {
        for slot in self.as_uninit_mut() {
            slot.write(value.clone());
        }
        // SAFETY: every slot was written above.
        unsafe { self.assume_init_mut() }
    }

    /// Copy `src` into the buffer and return the initialized slice.
    ///
    /// # Panics
    ///
    /// Panics if `src.len() != self.len()`.
    pub fn copy_from_slice(&mut self, src: &[T]) -> &mut [T]
    where
        T: Copy,
    {
        assert_eq!(
            src.len(),
            self.len,
            "source slice length does not match buffer length"
        );
        for (slot, &value) in self.as_uninit_mut().iter_mut().zip(src) {
            slot.write(value);
        }
        // SAFETY: every slot was written above.
        unsafe { self.assume_init_mut() }
    }

    /// View the storage as initialized `T`s.
    ///
    /// # Safety
    ///
    /// Every element must have been initialized.
    pub unsafe fn assume_init_mut(&mut self) -> &mut [T] {
        // SAFETY: the caller guarantees initialization; validity and
        // exclusivity come from construction.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Hand the storage out for the rest of `'a` as initialized `T`s.
    ///
    /// # Safety
    ///
    /// Every element must have been initialized. The buffer can no longer
    /// be released, so this is only sound to call on arena buffers or on
    /// heap buffers the caller is willing to leak.
    pub unsafe fn into_init_slice(self) -> &'a mut [T] {
        // SAFETY: as for `assume_init_mut`; the handle is consumed so the
        // returned slice is the only reference.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn into_raw_parts(self) -> (NonNull<T>, usize, Origin) {
        (self.ptr, self.len, self.origin)
    }
}
