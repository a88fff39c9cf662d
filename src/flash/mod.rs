use embedded_storage::nor_flash::NorFlash;
use log::{debug, error};

use super::{
    config::{sector_addr, SECTOR_SIZE},
    error::{FlashOp, FsError},
};

#[cfg(feature = "esp32")]
pub mod esp;
pub mod ram;

/// Sector-granular access to the flash through one reusable scratch sector.
///
/// A sector is only ever programmed by `store`, which erases it first and then
/// writes the whole scratch buffer back.
pub(crate) struct SectorIo<F> {
    flash: F,
    buf: [u8; SECTOR_SIZE],
}

impl<F: NorFlash> SectorIo<F> {
    pub(crate) fn new(flash: F) -> Self {
        Self {
            flash,
            buf: [0; SECTOR_SIZE],
        }
    }

    pub(crate) fn flash(&self) -> &F {
        &self.flash
    }

    pub(crate) fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub(crate) fn into_inner(self) -> F {
        self.flash
    }

    pub(crate) fn buf(&self) -> &[u8; SECTOR_SIZE] {
        &self.buf
    }

    pub(crate) fn buf_mut(&mut self) -> &mut [u8; SECTOR_SIZE] {
        &mut self.buf
    }

    pub(crate) fn load(&mut self, sector: u32) -> Result<(), FsError> {
        let addr = sector_addr(sector);
        self.flash.read(addr, &mut self.buf).map_err(|err| {
            error!("flash: read sector=0x{:03X} failed err={:?}", sector, err);
            FsError::flash(FlashOp::Read, addr, err)
        })
    }

    pub(crate) fn store(&mut self, sector: u32) -> Result<(), FsError> {
        let addr = sector_addr(sector);
        self.flash
            .erase(addr, addr + SECTOR_SIZE as u32)
            .map_err(|err| {
                error!("flash: erase sector=0x{:03X} failed err={:?}", sector, err);
                FsError::flash(FlashOp::Erase, addr, err)
            })?;
        self.flash.write(addr, &self.buf).map_err(|err| {
            error!("flash: write sector=0x{:03X} failed err={:?}", sector, err);
            FsError::flash(FlashOp::Write, addr, err)
        })?;
        debug!("flash: rewrote sector=0x{:03X}", sector);
        Ok(())
    }

    /// Erases `sector` and programs it with zeroes.
    pub(crate) fn clear(&mut self, sector: u32) -> Result<(), FsError> {
        self.buf.fill(0);
        self.store(sector)
    }

    pub(crate) fn read_exact(&mut self, addr: u32, out: &mut [u8]) -> Result<(), FsError> {
        self.flash.read(addr, out).map_err(|err| {
            error!("flash: read addr=0x{:06X} len={} failed err={:?}", addr, out.len(), err);
            FsError::flash(FlashOp::Read, addr, err)
        })
    }
}
