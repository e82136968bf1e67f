//! Startup-time choice between the physical arena and the heap.

use log::info;
use physmem_core::{ArenaError, ArenaUsage};

use crate::arena::DevMemArena;
use crate::buffer::Buffer;
use crate::config::ArenaConfig;
use crate::source::{BufferSource, HeapSource};

/// Where buffers for long-lived structures come from.
///
/// Selected once at startup and then passed to every call site that
/// allocates. Both variants serve the same [`BufferSource`] contract.
#[derive(Debug)]
pub enum Placement {
    /// Physically placed, append-only arena.
    Arena(DevMemArena),
    /// Ordinary heap allocation and deallocation.
    Heap(HeapSource),
}

impl Placement {
    /// Map the arena if `config` is present, otherwise use the heap.
    ///
    /// Mapping failures are returned, never papered over with a heap
    /// fallback: callers asked for physical placement.
    pub fn from_config(config: Option<&ArenaConfig>) -> Result<Self, ArenaError> {
        match config {
            Some(config) => DevMemArena::map(config).map(Self::Arena),
            None => {
                info!("physmem: no physical range configured, allocating from the heap");
                Ok(Self::Heap(HeapSource))
            }
        }
    }

    /// [`from_config`](Self::from_config) driven by [`ArenaConfig::from_env`].
    pub fn from_env() -> Result<Self, ArenaError> {
        let config = ArenaConfig::from_env()?;
        Self::from_config(config.as_ref())
    }

    /// The arena, if this placement is arena-backed.
    pub fn arena(&self) -> Option<&DevMemArena> {
        match self {
            Self::Arena(arena) => Some(arena),
            Self::Heap(_) => None,
        }
    }

    /// True when allocations land in the physical arena.
    pub fn is_arena_backed(&self) -> bool {
        matches!(self, Self::Arena(_))
    }

    /// Arena utilization; `None` for the heap, which keeps no accounting.
    pub fn report_usage(&self) -> Option<ArenaUsage> {
        self.arena().map(DevMemArena::report_usage)
    }
}

impl BufferSource for Placement {
    fn allocate<T>(&self, count: usize) -> Result<Buffer<'_, T>, ArenaError> {
        match self {
            Self::Arena(arena) => arena.allocate(count),
            Self::Heap(heap) => heap.allocate(count),
        }
    }

    /// Arena-owned buffers are ignored; anything else goes back to the heap.
    fn release<T>(&self, buffer: Buffer<'_, T>) {
        if let Self::Arena(arena) = self {
            if arena.contains(buffer.as_ptr()) {
                return;
            }
        }
        HeapSource.release(buffer);
    }
}
