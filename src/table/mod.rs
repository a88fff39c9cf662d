use embedded_storage::nor_flash::NorFlash;
use log::debug;

use super::{
    config::{NODES_PER_SECTOR, NODE_SIZE, SECTOR_SIZE},
    error::FsError,
    fs::Fs,
    heartbeat::Heartbeat,
    node::{self, Node},
};

mod lookup;

/// What a scan callback wants done with the slot it was shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Next,
    Stop,
    /// Replace the slot with this record, persist it, and stop.
    CommitAndStop(Node),
    Failed(FsError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    Stopped(Node),
    Committed(Node),
    /// Every slot was visited without a stop.
    Exhausted,
}

impl<F: NorFlash, H: Heartbeat> Fs<F, H> {
    /// Visits every slot whose flags match `filter`, in address order.
    ///
    /// The node handed to `callback` carries the slot position as its id.
    /// A committed record gets the same id regardless of what the callback set.
    pub fn scan<C>(&mut self, filter: u8, mut callback: C) -> Result<ScanOutcome, FsError>
    where
        C: FnMut(&Node) -> Verdict,
    {
        let slots = self.layout.slots() as usize;
        for (index, sector) in self.layout.fat_sector_range().enumerate() {
            self.heartbeat.beat();
            self.io.load(sector)?;
            let first = index * NODES_PER_SECTOR;
            for slot in 0..NODES_PER_SECTOR.min(slots.saturating_sub(first)) {
                let offset = slot * NODE_SIZE;
                let mut node = Node::decode(record(self.io.buf(), offset));
                if !node::matches(node.flags, filter) {
                    continue;
                }
                node.id = (first + slot) as u16;

                match callback(&node) {
                    Verdict::Next => {}
                    Verdict::Stop => return Ok(ScanOutcome::Stopped(node)),
                    Verdict::CommitAndStop(mut updated) => {
                        updated.id = node.id;
                        updated.encode(record_mut(self.io.buf_mut(), offset));
                        self.io.store(sector)?;
                        debug!(
                            "table: committed id={} flags={} size={} nextid={}",
                            updated.id, updated.flags, updated.size, updated.nextid
                        );
                        return Ok(ScanOutcome::Committed(updated));
                    }
                    Verdict::Failed(err) => return Err(err),
                }
            }
        }
        Ok(ScanOutcome::Exhausted)
    }

    /// Slot `id` as stored, whatever its flags.
    pub(crate) fn read_slot(&mut self, id: u16) -> Result<Node, FsError> {
        if !self.layout.contains(id) {
            return Err(FsError::BrokenChain { id });
        }
        let mut bytes = [0u8; NODE_SIZE];
        self.io.read_exact(self.layout.node_addr(id), &mut bytes)?;
        let mut node = Node::decode(&bytes);
        node.id = id;
        Ok(node)
    }

    /// Allocated node `id`; anything else means a chain points somewhere it should not.
    pub(crate) fn read_node(&mut self, id: u16) -> Result<Node, FsError> {
        let node = self.read_slot(id)?;
        if !node::matches(node.flags, node::FLAG_ALLOCATED) {
            return Err(FsError::BrokenChain { id });
        }
        Ok(node)
    }

    /// Persists `node` by rewriting the whole table sector that holds it.
    pub(crate) fn commit_node(&mut self, node: &Node) -> Result<(), FsError> {
        if !self.layout.contains(node.id) {
            return Err(FsError::BrokenChain { id: node.id });
        }
        let (sector, offset) = self.layout.node_location(node.id);
        self.heartbeat.beat();
        self.io.load(sector)?;
        node.encode(record_mut(self.io.buf_mut(), offset));
        self.io.store(sector)?;
        debug!(
            "table: persisted id={} size={} nextid={}",
            node.id, node.size, node.nextid
        );
        Ok(())
    }
}

fn record(buf: &[u8; SECTOR_SIZE], offset: usize) -> &[u8; NODE_SIZE] {
    let (records, _) = buf.as_chunks::<NODE_SIZE>();
    &records[offset / NODE_SIZE]
}

fn record_mut(buf: &mut [u8; SECTOR_SIZE], offset: usize) -> &mut [u8; NODE_SIZE] {
    let (records, _) = buf.as_chunks_mut::<NODE_SIZE>();
    &mut records[offset / NODE_SIZE]
}
