//! Test fixtures for physmem development.
//!
//! Real physical mappings need root and a reserved memory range. These
//! fixtures stand in for them: [`anonymous_arena`] gives an arena over
//! private memory, and [`DeviceFile`] is a regular file that can be
//! mapped through the same device path code as `/dev/mem`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use physmem_arena::region::page_size;
use physmem_arena::{ArenaConfig, DevMemArena, MappedRegion};

/// An arena of exactly `capacity` bytes over anonymous memory.
pub fn anonymous_arena(capacity: usize) -> DevMemArena {
    let region = MappedRegion::anonymous(capacity).expect("anonymous mapping failed");
    DevMemArena::from_region(region)
}

/// A temporary file playing the role of the memory device.
///
/// The file is `len` bytes of zeroes and is removed on drop. Existing
/// mappings of it stay valid after removal.
pub struct DeviceFile {
    path: PathBuf,
}

impl DeviceFile {
    pub fn new(len: u64) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "physmem-device-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .expect("create device file");
        file.set_len(len).expect("size device file");
        Self { path }
    }

    /// A device file of `pages` system pages.
    pub fn with_pages(pages: usize) -> Self {
        Self::new((pages * page_size()) as u64)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Config mapping `[phys_addr, phys_addr + size)` of this file.
    pub fn config(&self, phys_addr: u64, size: usize) -> ArenaConfig {
        ArenaConfig::new(phys_addr, size).with_device(&self.path)
    }

    /// Read `len` bytes at `offset` straight from the file.
    pub fn read_at(&self, offset: u64, len: usize) -> Vec<u8> {
        let bytes = fs::read(&self.path).expect("read device file");
        let start = offset as usize;
        bytes[start..start + len].to_vec()
    }
}

impl Drop for DeviceFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_file_has_requested_length() {
        let dev = DeviceFile::new(8192);
        assert_eq!(fs::metadata(dev.path()).unwrap().len(), 8192);
    }

    #[test]
    fn device_file_removed_on_drop() {
        let path = {
            let dev = DeviceFile::new(4096);
            dev.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn anonymous_arena_has_exact_capacity() {
        let arena = anonymous_arena(1000);
        assert_eq!(arena.capacity(), 1000);
        assert_eq!(arena.cursor(), 0);
    }
}
