//! Memory mappings backing an arena.
//!
//! [`MappedRegion::physical`] maps a physical range through the memory
//! device. Such mappings are deliberately never unmapped: the range
//! belongs to the process until exit and the underlying memory stays
//! reserved at the OS level for later processes.
//!
//! [`MappedRegion::anonymous`] maps ordinary private memory with the same
//! interface, for development machines and tests without device access.
//! Anonymous regions are unmapped on drop.

#![allow(unsafe_code)]

use std::fs::OpenOptions;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr::{self, NonNull};

use log::info;
use physmem_core::ArenaError;

use crate::config::ArenaConfig;

/// System page size in bytes.
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size < 1 {
        4096
    } else {
        size as usize
    }
}

/// What a [`MappedRegion`] is backed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionKind {
    /// A shared mapping of a physical range via the memory device.
    Physical {
        /// Physical address of the first mapped byte.
        phys_addr: u64,
    },
    /// Private anonymous memory.
    Anonymous,
}

/// A contiguous read/write mapping owned by a single arena.
#[derive(Debug)]
pub struct MappedRegion {
    base: NonNull<u8>,
    len: usize,
    kind: RegionKind,
}

impl MappedRegion {
    /// Map `[config.phys_addr, config.phys_addr + config.size)` from `config.device`.
    ///
    /// The device is opened read/write with `O_SYNC` and closed again once
    /// the mapping exists.
    pub fn physical(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let offset =
            libc::off_t::try_from(config.phys_addr).map_err(|_| ArenaError::InvalidConfig {
                reason: format!("phys_addr {:#x} does not fit in off_t", config.phys_addr),
            })?;

        let device = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&config.device)
            .map_err(|source| ArenaError::DeviceOpen {
                path: config.device.clone(),
                source,
            })?;

        // SAFETY: a fresh mapping (null hint, no MAP_FIXED) cannot alias
        // existing Rust objects. The fd is valid for the duration of the call.
        let mapped = unsafe {
            libc::mmap(
                ptr::null_mut(),
                config.size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                device.as_raw_fd(),
                offset,
            )
        };
        // Capture errno before closing the device.
        let map_err = io::Error::last_os_error();
        drop(device);

        let base = checked_base(mapped).ok_or_else(|| ArenaError::MapRejected {
            phys_addr: config.phys_addr,
            size: config.size,
            source: map_err,
        })?;

        info!(
            "DevMemArena: mapped phys {:#x} ({} MiB) at virt {:p}",
            config.phys_addr,
            config.size >> 20,
            base
        );
        Ok(Self {
            base,
            len: config.size,
            kind: RegionKind::Physical {
                phys_addr: config.phys_addr,
            },
        })
    }

    /// Map `size` bytes of private anonymous memory.
    pub fn anonymous(size: usize) -> Result<Self, ArenaError> {
        if size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "size must be non-zero".into(),
            });
        }
        // SAFETY: a fresh anonymous mapping with no fixed address.
        let mapped = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        let map_err = io::Error::last_os_error();
        let base = checked_base(mapped).ok_or(ArenaError::MapRejected {
            phys_addr: 0,
            size,
            source: map_err,
        })?;
        Ok(Self {
            base,
            len: size,
            kind: RegionKind::Anonymous,
        })
    }

    /// First byte of the mapping.
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Length of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; zero-length regions cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// What backs this region.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }
}

fn checked_base(mapped: *mut libc::c_void) -> Option<NonNull<u8>> {
    if mapped == libc::MAP_FAILED {
        return None;
    }
    NonNull::new(mapped.cast::<u8>())
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        if self.kind == RegionKind::Anonymous {
            // SAFETY: base/len describe a mapping created by `anonymous`
            // that nothing else unmaps.
            unsafe {
                libc::munmap(self.base.as_ptr().cast(), self.len);
            }
        }
    }
}
