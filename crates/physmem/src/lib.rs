//! physmem: an append-only arena in a reserved physical memory range.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the physmem sub-crates. Large, long-lived buffers are carved from a
//! physical range mapped through `/dev/mem`, or from the ordinary heap
//! when no range is configured, behind one allocate/release contract.
//!
//! # Quick start
//!
//! ```rust
//! use physmem::prelude::*;
//!
//! // Heap placement when PHYSMEM_PHYS_ADDR / PHYSMEM_SIZE are unset.
//! let placement = Placement::from_config(None).unwrap();
//!
//! let mut offsets = placement.allocate::<u64>(5).unwrap();
//! offsets.copy_from_slice(&[0, 2, 2, 3, 6]);
//! assert_eq!(offsets.len(), 5);
//! placement.release(offsets);
//! ```
//!
//! Arena placement behaves the same, except that release is a no-op and
//! every buffer is accounted against a fixed capacity:
//!
//! ```rust
//! use physmem::prelude::*;
//!
//! let region = MappedRegion::anonymous(1024).unwrap();
//! let arena = DevMemArena::from_region(region);
//! arena.allocate::<u64>(10).unwrap();
//! arena.allocate::<u32>(1).unwrap();
//! assert_eq!(arena.cursor(), 84);
//! assert!(arena.allocate::<u8>(1000).unwrap_err().is_fatal());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `physmem-core` | Error taxonomy, usage accounting |
//! | [`arena`] | `physmem-arena` | Mapping, bump arena, strategies, startup selection |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Error and accounting types (`physmem-core`).
pub use physmem_core as types;

/// Mapping, arena, buffer sources, and placement selection (`physmem-arena`).
pub use physmem_arena as arena;

/// Common imports for allocating through a placement.
///
/// ```rust
/// use physmem::prelude::*;
/// ```
pub mod prelude {
    pub use physmem_arena::fatal::exit_on_fatal;
    pub use physmem_arena::{
        ArenaConfig, ArenaSlot, Buffer, BufferSource, DevMemArena, HeapSource, MappedRegion,
        Placement,
    };
    pub use physmem_core::{ArenaError, ArenaUsage, Severity};
}
