use embedded_storage::nor_flash::NorFlash;
use log::debug;

use super::{ScanOutcome, Verdict};
use crate::{
    error::FsError,
    fs::Fs,
    heartbeat::Heartbeat,
    node::{validate_name, Node, FLAG_ALLOCATED, FLAG_CHAINED, FLAG_FREE},
};

impl<F: NorFlash, H: Heartbeat> Fs<F, H> {
    /// Head node named `name`, if any.
    pub fn find_by_name(&mut self, name: &[u8]) -> Result<Option<Node>, FsError> {
        let outcome = self.scan(FLAG_ALLOCATED, |node| {
            if node.is_head() && node.name() == name {
                Verdict::Stop
            } else {
                Verdict::Next
            }
        })?;
        match outcome {
            ScanOutcome::Stopped(node) | ScanOutcome::Committed(node) => Ok(Some(node)),
            ScanOutcome::Exhausted => Ok(None),
        }
    }

    /// Claims the first free slot as the head of a new, empty file.
    ///
    /// Does not check for an existing file with the same name; `create` does.
    pub fn allocate(&mut self, name: &[u8]) -> Result<Node, FsError> {
        validate_name(name)?;
        self.claim_free_slot(FLAG_ALLOCATED, name)
    }

    /// Claims the first free slot as an unnamed continuation node.
    pub(crate) fn allocate_continuation(&mut self) -> Result<Node, FsError> {
        self.claim_free_slot(FLAG_ALLOCATED | FLAG_CHAINED, &[])
    }

    fn claim_free_slot(&mut self, flags: u8, name: &[u8]) -> Result<Node, FsError> {
        let outcome = self.scan(FLAG_FREE, |slot| {
            Verdict::CommitAndStop(Node::allocated(slot.id, flags, name))
        })?;
        match outcome {
            ScanOutcome::Committed(node) | ScanOutcome::Stopped(node) => {
                debug!("table: allocated id={} flags={}", node.id, node.flags);
                Ok(node)
            }
            ScanOutcome::Exhausted => Err(FsError::NoSpace),
        }
    }
}
