use super::{FsConfig, DEFAULT_FAT_START_SECTOR, DEFAULT_SLOTS, SECTOR_SIZE};
use crate::error::LayoutError;

const FOUR_MIB: usize = 4 * 1024 * 1024;

#[test]
fn fat_region_rounds_up_to_whole_sectors() {
    assert_eq!(FsConfig::new(0, 8).fat_sectors(), 1);
    assert_eq!(FsConfig::new(0, 64).fat_sectors(), 1);
    assert_eq!(FsConfig::new(0, 65).fat_sectors(), 2);
    assert_eq!(FsConfig::new(0, 128).fat_sectors(), 2);
}

#[test]
fn storage_region_follows_the_table() {
    let layout = FsConfig::new(0x100, 64).layout(FOUR_MIB).unwrap();
    assert_eq!(layout.fat_sector_range(), 0x100..0x101);
    assert_eq!(layout.node_addr(0), 0x10_0000);
    assert_eq!(layout.node_addr(1), 0x10_0040);
    assert_eq!(layout.storage_sector(0), 0x101);
    assert_eq!(layout.storage_addr(3), 0x104 * SECTOR_SIZE as u32);
    assert_eq!(layout.end_sector(), 0x141);
}

#[test]
fn node_location_crosses_into_next_table_sector() {
    let layout = FsConfig::new(4, 128).layout(FOUR_MIB).unwrap();
    assert_eq!(layout.node_location(0), (4, 0));
    assert_eq!(layout.node_location(63), (4, 63 * 64));
    assert_eq!(layout.node_location(65), (5, 64));
    assert_eq!(layout.storage_sector(0), 6);
}

#[test]
fn layout_rejects_bad_geometry() {
    assert_eq!(
        FsConfig::new(0, 0).layout(FOUR_MIB),
        Err(LayoutError::NoSlots)
    );
    assert_eq!(
        FsConfig::new(u32::MAX, 8).layout(FOUR_MIB),
        Err(LayoutError::AddressOverflow)
    );
    assert_eq!(
        FsConfig::new(0, 8).layout(8 * SECTOR_SIZE),
        Err(LayoutError::ExceedsFlash {
            required: 9 * SECTOR_SIZE,
            capacity: 8 * SECTOR_SIZE,
        })
    );
}

#[test]
fn required_bytes_covers_whole_layout() {
    let config = FsConfig::new(2, 8);
    assert_eq!(config.required_bytes(), 11 * SECTOR_SIZE);
    assert!(config.layout(config.required_bytes()).is_ok());
}

#[test]
fn size_maps_pick_known_start_sectors() {
    assert_eq!(FsConfig::for_size_map(2).map(|c| c.fat_start_sector), Some(0x70));
    assert_eq!(FsConfig::for_size_map(4).map(|c| c.fat_start_sector), Some(0x100));
    assert_eq!(FsConfig::for_size_map(6).map(|c| c.fat_start_sector), Some(0x200));
    assert_eq!(FsConfig::for_size_map(3), None);
}

#[test]
fn overrides_accept_hex_and_decimal() {
    let config = FsConfig::from_overrides(Some("0x70"), Some("16"));
    assert_eq!(config, FsConfig::new(0x70, 16));

    let config = FsConfig::from_overrides(Some(" 300 "), None);
    assert_eq!(config, FsConfig::new(300, DEFAULT_SLOTS));
}

#[test]
fn invalid_overrides_fall_back_to_defaults() {
    let config = FsConfig::from_overrides(Some("zz"), Some("70000"));
    assert_eq!(config, FsConfig::new(DEFAULT_FAT_START_SECTOR, DEFAULT_SLOTS));
    assert_eq!(FsConfig::from_overrides(None, None), FsConfig::DEFAULT);
}
