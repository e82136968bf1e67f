//! Core types for the physmem workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the error taxonomy shared by every allocation strategy and the
//! usage-accounting value reported by the arena.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod usage;

pub use error::{ArenaError, Severity};
pub use usage::ArenaUsage;
