use core::fmt;

use embedded_storage::nor_flash::{NorFlashError, NorFlashErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashOp {
    Read,
    Erase,
    Write,
}

impl FlashOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashOp::Read => "read",
            FlashOp::Erase => "erase",
            FlashOp::Write => "write",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    NoSlots,
    AddressOverflow,
    EraseSize { erase_size: usize },
    ExceedsFlash { required: usize, capacity: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FsError {
    NoSpace,
    FileExists,
    NotFound,
    InvalidName,
    ChainCycle { head: u16 },
    BrokenChain { id: u16 },
    Layout(LayoutError),
    Flash {
        op: FlashOp,
        addr: u32,
        kind: NorFlashErrorKind,
    },
}

impl From<LayoutError> for FsError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl FsError {
    pub(crate) fn flash<E: NorFlashError>(op: FlashOp, addr: u32, error: E) -> Self {
        Self::Flash {
            op,
            addr,
            kind: error.kind(),
        }
    }

    /// Read, erase or write failure on the underlying flash.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Flash { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSpace => "no free node",
            Self::FileExists => "file exists",
            Self::NotFound => "file not found",
            Self::InvalidName => "invalid file name",
            Self::ChainCycle { .. } => "node chain cycle",
            Self::BrokenChain { .. } => "broken node chain",
            Self::Layout(_) => "invalid flash layout",
            Self::Flash {
                op: FlashOp::Read, ..
            } => "flash read failed",
            Self::Flash {
                op: FlashOp::Erase,
                ..
            } => "flash erase failed",
            Self::Flash {
                op: FlashOp::Write,
                ..
            } => "flash write failed",
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChainCycle { head } => write!(f, "{} (head={})", self.as_str(), head),
            Self::BrokenChain { id } => write!(f, "{} (id={})", self.as_str(), id),
            Self::Layout(err) => write!(f, "{}: {:?}", self.as_str(), err),
            Self::Flash { addr, kind, .. } => {
                write!(f, "{} at 0x{:06X}: {:?}", self.as_str(), addr, kind)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}
