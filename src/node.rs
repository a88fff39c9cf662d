use core::fmt;

use super::{
    config::{NAME_MAX, NODE_SIZE},
    error::FsError,
};

#[cfg(test)]
mod tests;

pub const FLAG_FREE: u8 = 0;
pub const FLAG_ALLOCATED: u8 = 1;
/// Set on every node of a chain except its head.
pub const FLAG_CHAINED: u8 = 2;

const NAME_FIELD: usize = NAME_MAX + 1;
const FLAGS_OFFSET: usize = NAME_FIELD;
const SIZE_OFFSET: usize = 56;
const ID_OFFSET: usize = 60;
const NEXTID_OFFSET: usize = 62;

/// One 64-byte record of the node table.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node {
    name: [u8; NAME_FIELD],
    pub flags: u8,
    pub size: u32,
    pub id: u16,
    pub nextid: u16,
}

impl Node {
    pub const EMPTY: Self = Self {
        name: [0; NAME_FIELD],
        flags: FLAG_FREE,
        size: 0,
        id: 0,
        nextid: 0,
    };

    /// Decodes a record as stored on flash. The stored id is kept as-is;
    /// callers overwrite it with the slot position.
    pub fn decode(bytes: &[u8; NODE_SIZE]) -> Self {
        let mut name = [0u8; NAME_FIELD];
        name.copy_from_slice(&bytes[..NAME_FIELD]);
        Self {
            name,
            flags: bytes[FLAGS_OFFSET],
            size: u32::from_le_bytes([
                bytes[SIZE_OFFSET],
                bytes[SIZE_OFFSET + 1],
                bytes[SIZE_OFFSET + 2],
                bytes[SIZE_OFFSET + 3],
            ]),
            id: u16::from_le_bytes([bytes[ID_OFFSET], bytes[ID_OFFSET + 1]]),
            nextid: u16::from_le_bytes([bytes[NEXTID_OFFSET], bytes[NEXTID_OFFSET + 1]]),
        }
    }

    pub fn encode(&self, out: &mut [u8; NODE_SIZE]) {
        out[..NAME_FIELD].copy_from_slice(&self.name);
        out[FLAGS_OFFSET] = self.flags;
        out[SIZE_OFFSET..ID_OFFSET].copy_from_slice(&self.size.to_le_bytes());
        out[ID_OFFSET..NEXTID_OFFSET].copy_from_slice(&self.id.to_le_bytes());
        out[NEXTID_OFFSET..NODE_SIZE].copy_from_slice(&self.nextid.to_le_bytes());
    }

    /// Fresh single-node chain for slot `id`.
    pub(crate) fn allocated(id: u16, flags: u8, name: &[u8]) -> Self {
        let mut node = Self::EMPTY;
        let len = name.len().min(NAME_MAX);
        node.name[..len].copy_from_slice(&name[..len]);
        node.flags = flags;
        node.id = id;
        node.nextid = id;
        node
    }

    /// Name bytes up to the first NUL, never longer than `NAME_MAX`.
    pub fn name(&self) -> &[u8] {
        let field = &self.name[..NAME_MAX];
        let len = field.iter().position(|&b| b == 0).unwrap_or(NAME_MAX);
        &field[..len]
    }

    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name()).ok()
    }

    pub fn is_free(&self) -> bool {
        self.flags == FLAG_FREE
    }

    pub fn is_head(&self) -> bool {
        self.flags & FLAG_ALLOCATED != 0 && self.flags & FLAG_CHAINED == 0
    }

    pub fn is_continuation(&self) -> bool {
        self.flags & FLAG_ALLOCATED != 0 && self.flags & FLAG_CHAINED != 0
    }

    pub fn is_terminal(&self) -> bool {
        self.nextid == self.id
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name_str().unwrap_or("<bytes>"))
            .field("flags", &self.flags)
            .field("size", &self.size)
            .field("id", &self.id)
            .field("nextid", &self.nextid)
            .finish()
    }
}

/// Filter predicate of the table scan. `FLAG_FREE` is zero and can only
/// match through the equality branch.
pub fn matches(flags: u8, filter: u8) -> bool {
    (flags & filter) != 0 || flags == filter
}

pub fn validate_name(name: &[u8]) -> Result<(), FsError> {
    if name.is_empty() || name.len() > NAME_MAX || name.contains(&0) {
        return Err(FsError::InvalidName);
    }
    Ok(())
}
