//! In-memory NOR flash.
//!
//! Programming follows NOR rules: a write can only clear bits, so writing over
//! a byte that was not erased first fails with [`RamFlashError::NotErased`].
//! Faults can be injected per sector and operation.

use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, NorFlash, NorFlashError, NorFlashErrorKind,
    ReadNorFlash,
};

use crate::{config::SECTOR_SIZE, error::FlashOp};


const ERASED: u8 = 0xFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RamFlashError {
    NotAligned,
    OutOfBounds,
    NotErased { addr: u32 },
    Injected { op: FlashOp, addr: u32 },
}

impl NorFlashError for RamFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            RamFlashError::NotAligned => NorFlashErrorKind::NotAligned,
            RamFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            RamFlashError::NotErased { .. } | RamFlashError::Injected { .. } => {
                NorFlashErrorKind::Other
            }
        }
    }
}

impl From<NorFlashErrorKind> for RamFlashError {
    fn from(value: NorFlashErrorKind) -> Self {
        match value {
            NorFlashErrorKind::NotAligned => RamFlashError::NotAligned,
            _ => RamFlashError::OutOfBounds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    pub op: FlashOp,
    pub sector: u32,
}

pub struct RamFlash<'a> {
    mem: &'a mut [u8],
    fault: Option<Fault>,
    erases: u32,
    writes: u32,
}

impl<'a> RamFlash<'a> {
    /// Wraps `mem` as-is; use [`RamFlash::erased`] for a blank chip.
    pub fn new(mem: &'a mut [u8]) -> Self {
        Self {
            mem,
            fault: None,
            erases: 0,
            writes: 0,
        }
    }

    pub fn erased(mem: &'a mut [u8]) -> Self {
        mem.fill(ERASED);
        Self::new(mem)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mem[..]
    }

    /// Raw access that bypasses NOR rules, for planting corrupt records.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.mem[..]
    }

    pub fn sector(&self, sector: u32) -> &[u8] {
        let start = sector as usize * SECTOR_SIZE;
        &self.mem[start..start + SECTOR_SIZE]
    }

    pub fn fail_on(&mut self, op: FlashOp, sector: u32) {
        self.fault = Some(Fault { op, sector });
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    pub fn erase_count(&self) -> u32 {
        self.erases
    }

    pub fn write_count(&self) -> u32 {
        self.writes
    }

    fn check_fault(&self, op: FlashOp, from: u32, len: usize) -> Result<(), RamFlashError> {
        let Some(fault) = self.fault else {
            return Ok(());
        };
        if fault.op != op || len == 0 {
            return Ok(());
        }
        let first = from / SECTOR_SIZE as u32;
        let last = (from + len as u32 - 1) / SECTOR_SIZE as u32;
        if (first..=last).contains(&fault.sector) {
            return Err(RamFlashError::Injected { op, addr: from });
        }
        Ok(())
    }
}

impl ErrorType for RamFlash<'_> {
    type Error = RamFlashError;
}

impl ReadNorFlash for RamFlash<'_> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        check_read(self, offset, bytes.len())?;
        self.check_fault(FlashOp::Read, offset, bytes.len())?;
        let start = offset as usize;
        bytes.copy_from_slice(&self.mem[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.mem.len()
    }
}

impl NorFlash for RamFlash<'_> {
    const WRITE_SIZE: usize = 1;
    const ERASE_SIZE: usize = SECTOR_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        check_erase(self, from, to)?;
        self.check_fault(FlashOp::Erase, from, (to - from) as usize)?;
        self.mem[from as usize..to as usize].fill(ERASED);
        self.erases += (to - from) / SECTOR_SIZE as u32;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        check_write(self, offset, bytes.len())?;
        self.check_fault(FlashOp::Write, offset, bytes.len())?;
        let start = offset as usize;
        let target = &mut self.mem[start..start + bytes.len()];
        if let Some(pos) = target
            .iter()
            .zip(bytes)
            .position(|(&old, &new)| new & !old != 0)
        {
            return Err(RamFlashError::NotErased {
                addr: offset + pos as u32,
            });
        }
        for (old, &new) in target.iter_mut().zip(bytes) {
            *old &= new;
        }
        self.writes += 1;
        Ok(())
    }
}
