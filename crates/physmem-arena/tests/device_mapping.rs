//! Mapping through the device path, using a regular file as the device.

use physmem_arena::region::page_size;
use physmem_arena::{ArenaConfig, ArenaError, ArenaSlot, DevMemArena, Placement, RegionKind};
use physmem_test_utils::DeviceFile;

#[test]
fn writes_land_at_the_configured_offset() {
    let page = page_size();
    let dev = DeviceFile::with_pages(4);
    let arena = DevMemArena::map(&dev.config(page as u64, 2 * page)).unwrap();

    assert_eq!(
        arena.region().kind(),
        RegionKind::Physical {
            phys_addr: page as u64
        }
    );
    arena.allocate_copy(&b"physmem!"[..]).unwrap();

    assert_eq!(dev.read_at(page as u64, 8), b"physmem!");
    assert_eq!(dev.read_at(0, 8), vec![0; 8]);
}

#[test]
fn contents_persist_across_mappings() {
    let page = page_size();
    let dev = DeviceFile::with_pages(1);
    {
        let arena = DevMemArena::map(&dev.config(0, page)).unwrap();
        arena.allocate_copy(&[0xDEAD_BEEFu32, 42]).unwrap();
    }

    let again = DevMemArena::map(&dev.config(0, page)).unwrap();
    let mut view = again.allocate::<u32>(2).unwrap();
    // SAFETY: the bytes were written through the first mapping.
    let values = unsafe { view.assume_init_mut() };
    assert_eq!(values, &[0xDEAD_BEEF, 42]);
}

#[test]
fn slot_maps_once() {
    let page = page_size();
    let dev = DeviceFile::with_pages(2);
    let mut slot = ArenaSlot::new();

    let base = {
        let arena = slot.initialize(&dev.config(0, page)).unwrap();
        arena.allocate::<u8>(10).unwrap();
        arena.base()
    };

    let arena = slot.initialize(&dev.config(page as u64, page)).unwrap();
    assert_eq!(arena.base(), base);
    assert_eq!(arena.cursor(), 10);
    assert_eq!(arena.capacity(), page);
}

#[test]
fn placement_from_config_maps_the_device() {
    let page = page_size();
    let dev = DeviceFile::with_pages(1);
    let placement = Placement::from_config(Some(&dev.config(0, page))).unwrap();
    assert!(placement.is_arena_backed());
    assert_eq!(placement.report_usage().unwrap().capacity, page);
}

#[test]
fn unmappable_device_is_map_rejected() {
    let config = ArenaConfig::new(0, page_size()).with_device("/dev/null");
    let err = DevMemArena::map(&config).unwrap_err();
    assert!(matches!(err, ArenaError::MapRejected { .. }), "{err}");
    assert!(err.is_fatal());
}

#[test]
fn unaligned_offset_never_reaches_mmap() {
    let dev = DeviceFile::with_pages(2);
    let err = DevMemArena::map(&dev.config(1, page_size())).unwrap_err();
    assert!(matches!(err, ArenaError::InvalidConfig { .. }));
}
