//! Append-only bump arena over a physically addressed memory range.
//!
//! A [`DevMemArena`] owns one mapping of a physical range exposed by the
//! memory device (`/dev/mem` by default) and serves aligned, never-freed
//! allocations from it. Large, long-lived structures can then live at a
//! known physical location, away from the general heap.
//!
//! # Architecture
//!
//! ```text
//! Placement (chosen once at startup from ArenaConfig / environment)
//! ├── Arena(DevMemArena)
//! │   └── MappedRegion (device mmap, never unmapped)
//! └── Heap(HeapSource) (std::alloc, real frees)
//! ```
//!
//! Both sides implement [`BufferSource`], so consumers allocate and
//! release through one call-site contract regardless of placement.
//! [`ArenaSlot`] models the map-once lifecycle for programs that keep a
//! single arena for the whole process.
//!
//! # Errors
//!
//! Every [`ArenaError`] is fatal. Callers either propagate it with `?`
//! or hand it to [`fatal::exit_on_fatal`] to terminate with a diagnostic.
//!
//! This crate contains the workspace's `unsafe` code, confined to the
//! mapping, the bump pointer arithmetic, and buffer views.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod buffer;
pub mod config;
pub mod fatal;
pub mod placement;
pub mod region;
pub mod slot;
pub mod source;

// Public re-exports for the primary API surface.
pub use arena::DevMemArena;
pub use buffer::{Buffer, Origin};
pub use config::{ArenaConfig, ConfigError};
pub use physmem_core::{ArenaError, ArenaUsage, Severity};
pub use placement::Placement;
pub use region::{MappedRegion, RegionKind};
pub use slot::ArenaSlot;
pub use source::{BufferSource, HeapSource};
