use core::ops::Range;

use super::error::LayoutError;

#[cfg(test)]
mod tests;

pub const SECTOR_SIZE: usize = 4096;
pub const NODE_SIZE: usize = 64;
pub const NODES_PER_SECTOR: usize = SECTOR_SIZE / NODE_SIZE;
pub const NAME_MAX: usize = 54;

pub const DEFAULT_FAT_START_SECTOR: u32 = 0x100;
pub const DEFAULT_SLOTS: u16 = 64;

/// Where the node table starts and how many slots it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsConfig {
    pub fat_start_sector: u32,
    pub slots: u16,
}

impl FsConfig {
    pub const DEFAULT: Self = Self::new(DEFAULT_FAT_START_SECTOR, DEFAULT_SLOTS);

    pub const fn new(fat_start_sector: u32, slots: u16) -> Self {
        Self {
            fat_start_sector,
            slots,
        }
    }

    /// Start sector for the SPI flash size map the image was linked for.
    pub const fn for_size_map(map: u8) -> Option<Self> {
        let fat_start_sector = match map {
            2 => 0x70,
            4 => 0x100,
            6 => 0x200,
            _ => return None,
        };
        Some(Self::new(fat_start_sector, DEFAULT_SLOTS))
    }

    pub fn from_build_env() -> Self {
        Self::from_overrides(
            option_env!("NODEFS_FAT_START_SECTOR"),
            option_env!("NODEFS_SLOTS"),
        )
    }

    fn from_overrides(start: Option<&str>, slots: Option<&str>) -> Self {
        let mut config = Self::DEFAULT;
        if let Some(start) = start.and_then(parse_number) {
            config.fat_start_sector = start;
        }
        if let Some(slots) = slots
            .and_then(parse_number)
            .and_then(|value| u16::try_from(value).ok())
        {
            config.slots = slots;
        }
        config
    }

    pub const fn fat_sectors(&self) -> u32 {
        let bytes = self.slots as usize * NODE_SIZE;
        bytes.div_ceil(SECTOR_SIZE) as u32
    }

    /// Flash bytes needed from address zero up to the last storage sector.
    pub const fn required_bytes(&self) -> usize {
        let sectors =
            self.fat_start_sector as usize + self.fat_sectors() as usize + self.slots as usize;
        sectors * SECTOR_SIZE
    }

    pub fn layout(&self, capacity: usize) -> Result<Layout, LayoutError> {
        if self.slots == 0 {
            return Err(LayoutError::NoSlots);
        }
        let fat_sectors = self.fat_sectors();
        let end_sector = self
            .fat_start_sector
            .checked_add(fat_sectors)
            .and_then(|sector| sector.checked_add(self.slots as u32))
            .ok_or(LayoutError::AddressOverflow)?;
        let required = (end_sector as u64) * SECTOR_SIZE as u64;
        if required > u32::MAX as u64 + 1 {
            return Err(LayoutError::AddressOverflow);
        }
        if required > capacity as u64 {
            return Err(LayoutError::ExceedsFlash {
                required: required as usize,
                capacity,
            });
        }
        Ok(Layout {
            fat_start_sector: self.fat_start_sector,
            fat_sectors,
            slots: self.slots,
        })
    }
}

impl Default for FsConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_number(text: &str) -> Option<u32> {
    let text = text.trim();
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Validated region split: node table sectors followed by one storage sector per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    fat_start_sector: u32,
    fat_sectors: u32,
    slots: u16,
}

impl Layout {
    pub fn slots(&self) -> u16 {
        self.slots
    }

    pub fn fat_sectors(&self) -> u32 {
        self.fat_sectors
    }

    pub fn fat_start_sector(&self) -> u32 {
        self.fat_start_sector
    }

    pub fn fat_sector_range(&self) -> Range<u32> {
        self.fat_start_sector..self.fat_start_sector + self.fat_sectors
    }

    pub fn node_addr(&self, id: u16) -> u32 {
        sector_addr(self.fat_start_sector) + id as u32 * NODE_SIZE as u32
    }

    /// FAT sector holding `id` and the byte offset of its record inside it.
    pub fn node_location(&self, id: u16) -> (u32, usize) {
        let index = id as usize;
        (
            self.fat_start_sector + (index / NODES_PER_SECTOR) as u32,
            (index % NODES_PER_SECTOR) * NODE_SIZE,
        )
    }

    pub fn storage_sector(&self, id: u16) -> u32 {
        self.fat_start_sector + self.fat_sectors + id as u32
    }

    pub fn storage_addr(&self, id: u16) -> u32 {
        sector_addr(self.storage_sector(id))
    }

    pub fn end_sector(&self) -> u32 {
        self.fat_start_sector + self.fat_sectors + self.slots as u32
    }

    pub fn contains(&self, id: u16) -> bool {
        id < self.slots
    }
}

pub(crate) fn sector_addr(sector: u32) -> u32 {
    sector * SECTOR_SIZE as u32
}
