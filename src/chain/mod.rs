use embedded_storage::nor_flash::NorFlash;
use log::debug;

use super::{
    config::SECTOR_SIZE,
    error::FsError,
    fs::{FileHandle, Fs},
    heartbeat::Heartbeat,
    node::Node,
    queue::ByteSource,
};


const SECTOR_CAPACITY: u32 = SECTOR_SIZE as u32;

/// Walks a chain from its head, one node per `advance`, giving up after as
/// many steps as the table has slots.
pub(crate) struct ChainCursor {
    head: u16,
    next: Option<u16>,
    steps: u16,
}

impl ChainCursor {
    pub(crate) fn new(head: u16) -> Self {
        Self {
            head,
            next: Some(head),
            steps: 0,
        }
    }

    pub(crate) fn advance<F: NorFlash, H: Heartbeat>(
        &mut self,
        fs: &mut Fs<F, H>,
    ) -> Result<Option<Node>, FsError> {
        let Some(id) = self.next else {
            return Ok(None);
        };
        if self.steps >= fs.layout.slots() {
            return Err(FsError::ChainCycle { head: self.head });
        }
        let node = fs.read_node(id)?;
        let well_placed = if self.steps == 0 {
            node.is_head()
        } else {
            node.is_continuation()
        };
        if !well_placed || node.size > SECTOR_CAPACITY {
            return Err(FsError::BrokenChain { id });
        }
        self.steps += 1;
        self.next = (!node.is_terminal()).then_some(node.nextid);
        Ok(Some(node))
    }
}

impl<F: NorFlash, H: Heartbeat> Fs<F, H> {
    /// Terminal node of the chain starting at `head`.
    pub(crate) fn walk_to_terminal(&mut self, head: u16) -> Result<Node, FsError> {
        let mut cursor = ChainCursor::new(head);
        let mut last = None;
        while let Some(node) = cursor.advance(self)? {
            last = Some(node);
        }
        last.ok_or(FsError::BrokenChain { id: head })
    }

    /// Drains `source` into the file, growing its chain one sector at a time.
    pub(crate) fn append<S: ByteSource + ?Sized>(
        &mut self,
        file: &mut FileHandle,
        source: &mut S,
    ) -> Result<usize, FsError> {
        let mut total = 0usize;
        while source.available() > 0 {
            let mut tail = self.walk_to_terminal(file.id())?;

            let room = SECTOR_CAPACITY - tail.size;
            if room > 0 {
                let copied = self.fill_tail_sector(&tail, room as usize, source)?;
                if copied == 0 {
                    break;
                }
                tail.size += copied as u32;
                self.commit_node(&tail)?;
                file.record_append(tail, copied as u32);
                total += copied;
            }

            if tail.size == SECTOR_CAPACITY && source.available() > 0 {
                let next = self.allocate_continuation()?;
                tail.nextid = next.id;
                self.commit_node(&tail)?;
                file.record_relink(next);
                debug!("chain: linked id={} -> id={}", tail.id, next.id);
            }
        }
        Ok(total)
    }

    /// Read-modify-erase-write of the tail's storage sector with up to `room`
    /// bytes from `source` placed after the bytes it already holds.
    fn fill_tail_sector<S: ByteSource + ?Sized>(
        &mut self,
        tail: &Node,
        room: usize,
        source: &mut S,
    ) -> Result<usize, FsError> {
        let sector = self.layout.storage_sector(tail.id);
        let start = tail.size as usize;
        let want = room.min(source.available());

        self.heartbeat.beat();
        self.io.load(sector)?;
        let copied = source.consume(&mut self.io.buf_mut()[start..start + want]);
        if copied == 0 {
            return Ok(0);
        }
        self.io.store(sector)?;
        debug!(
            "chain: appended id={} sector=0x{:03X} offset={} len={}",
            tail.id, sector, start, copied
        );
        Ok(copied)
    }
}
