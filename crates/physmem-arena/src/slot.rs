//! Map-once holder for a program's single arena.
//!
//! The arena has two states, uninitialized and initialized, and one
//! transition. [`ArenaSlot`] makes that explicit: the first
//! [`initialize`](ArenaSlot::initialize) maps the region, and every later
//! call warns and hands back the arena that already exists.

use log::warn;
use physmem_core::ArenaError;

use crate::arena::DevMemArena;
use crate::config::ArenaConfig;
use crate::region::MappedRegion;

/// Holds at most one [`DevMemArena`] for the lifetime of its owner.
#[derive(Debug, Default)]
pub struct ArenaSlot {
    arena: Option<DevMemArena>,
}

impl ArenaSlot {
    /// An empty, uninitialized slot.
    pub const fn new() -> Self {
        Self { arena: None }
    }

    /// Map the physical range on first call.
    ///
    /// Later calls log a warning and return the existing arena; its base,
    /// capacity and cursor are untouched and `config` is ignored.
    pub fn initialize(&mut self, config: &ArenaConfig) -> Result<&DevMemArena, ArenaError> {
        match self.arena {
            Some(ref arena) => {
                warn!(
                    "DevMemArena: initialize called twice (requested phys {:#x}, keeping {:p})",
                    config.phys_addr,
                    arena.base()
                );
                Ok(arena)
            }
            None => {
                let arena = DevMemArena::map(config)?;
                Ok(self.arena.insert(arena))
            }
        }
    }

    /// Like [`initialize`](Self::initialize) for a region mapped by the caller.
    ///
    /// If the slot is already initialized, `region` is dropped.
    pub fn initialize_with(&mut self, region: MappedRegion) -> &DevMemArena {
        match self.arena {
            Some(ref arena) => {
                warn!(
                    "DevMemArena: initialize called twice (keeping {:p})",
                    arena.base()
                );
                arena
            }
            None => self.arena.insert(DevMemArena::from_region(region)),
        }
    }

    /// The arena, once initialized.
    pub fn get(&self) -> Option<&DevMemArena> {
        self.arena.as_ref()
    }

    /// True after a successful initialization.
    pub fn is_initialized(&self) -> bool {
        self.arena.is_some()
    }
}
