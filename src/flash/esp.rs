//! On-chip SPI flash of the ESP32.

use embedded_storage::nor_flash::ReadNorFlash;
use esp_storage::FlashStorage;
use log::{info, LevelFilter};

use crate::{
    config::FsConfig,
    error::FsError,
    fs::Fs,
    heartbeat::Heartbeat,
};

pub fn init_logging(level: LevelFilter) {
    esp_println::logger::init_logger(level);
}

pub fn open_flash<'d>(flash_peripheral: esp_hal::peripherals::FLASH<'d>) -> FlashStorage<'d> {
    FlashStorage::new(flash_peripheral).multicore_auto_park()
}

/// Mounts the store on the internal flash; the table is not formatted.
pub fn mount<'d, H: Heartbeat>(
    flash_peripheral: esp_hal::peripherals::FLASH<'d>,
    config: FsConfig,
    heartbeat: H,
) -> Result<Fs<FlashStorage<'d>, H>, FsError> {
    let flash = open_flash(flash_peripheral);
    let fs = Fs::with_heartbeat(flash, config, heartbeat)?;
    info!(
        "fs: mounted fat_start=0x{:03X} slots={} capacity={}",
        config.fat_start_sector,
        config.slots,
        fs.flash().capacity()
    );
    Ok(fs)
}
