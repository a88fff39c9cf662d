use embedded_storage::nor_flash::NorFlash;
use heapless::Vec;
use log::{info, warn};

use super::{
    chain::ChainCursor,
    config::{FsConfig, Layout, NAME_MAX, SECTOR_SIZE},
    error::{FsError, LayoutError},
    flash::SectorIo,
    heartbeat::{Heartbeat, NoHeartbeat},
    node::{validate_name, Node},
    queue::ByteSource,
};


/// Flat file store over a NOR flash region.
pub struct Fs<F, H = NoHeartbeat> {
    pub(crate) io: SectorIo<F>,
    pub(crate) layout: Layout,
    pub(crate) heartbeat: H,
}

/// Open write session created by [`Fs::create`] and consumed by [`Fs::close`].
#[derive(Debug)]
pub struct FileHandle {
    head: Node,
    tail: Node,
    size: u32,
    written: u32,
}

impl FileHandle {
    fn open(head: Node) -> Self {
        Self {
            head,
            tail: head,
            size: head.size,
            written: 0,
        }
    }

    pub fn id(&self) -> u16 {
        self.head.id
    }

    pub fn name(&self) -> &[u8] {
        self.head.name()
    }

    pub fn head(&self) -> &Node {
        &self.head
    }

    /// Terminal node as of the last write.
    pub fn tail(&self) -> &Node {
        &self.tail
    }

    /// Total bytes in the file as seen by this handle.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Bytes appended through this handle.
    pub fn written(&self) -> u32 {
        self.written
    }

    pub(crate) fn record_append(&mut self, tail: Node, bytes: u32) {
        self.tail = tail;
        self.size += bytes;
        self.written += bytes;
    }

    pub(crate) fn record_relink(&mut self, tail: Node) {
        self.tail = tail;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub id: u16,
    pub name: Vec<u8, NAME_MAX>,
    pub size: u32,
    pub nodes: u16,
}

impl FileInfo {
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.name).ok()
    }
}

impl<F: NorFlash> Fs<F, NoHeartbeat> {
    pub fn new(flash: F, config: FsConfig) -> Result<Self, FsError> {
        Self::with_heartbeat(flash, config, NoHeartbeat)
    }
}

impl<F: NorFlash, H: Heartbeat> Fs<F, H> {
    pub fn with_heartbeat(flash: F, config: FsConfig, heartbeat: H) -> Result<Self, FsError> {
        if F::ERASE_SIZE == 0 || SECTOR_SIZE % F::ERASE_SIZE != 0 {
            return Err(LayoutError::EraseSize {
                erase_size: F::ERASE_SIZE,
            }
            .into());
        }
        let layout = config.layout(flash.capacity())?;
        Ok(Self {
            io: SectorIo::new(flash),
            layout,
            heartbeat,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn flash(&self) -> &F {
        self.io.flash()
    }

    pub fn flash_mut(&mut self) -> &mut F {
        self.io.flash_mut()
    }

    pub fn into_inner(self) -> F {
        self.io.into_inner()
    }

    /// Erases the node table and leaves every slot FREE. Storage sectors are
    /// left alone, so earlier file bytes become unreachable.
    pub fn format(&mut self) -> Result<(), FsError> {
        for sector in self.layout.fat_sector_range() {
            info!("fs: erasing sector=0x{:03X}", sector);
            self.heartbeat.beat();
            self.io.clear(sector)?;
        }
        info!(
            "fs: formatted slots={} fat_sectors={}",
            self.layout.slots(),
            self.layout.fat_sectors()
        );
        Ok(())
    }

    pub fn create(&mut self, name: &str) -> Result<FileHandle, FsError> {
        validate_name(name.as_bytes())?;
        if self.find_by_name(name.as_bytes())?.is_some() {
            warn!("fs: create exists name={}", name);
            return Err(FsError::FileExists);
        }
        let head = self.allocate(name.as_bytes()).inspect_err(|err| {
            if *err == FsError::NoSpace {
                warn!("fs: create no space name={}", name);
            }
        })?;
        info!("fs: created id={} name={}", head.id, name);
        Ok(FileHandle::open(head))
    }

    /// Appends everything `source` has buffered right now and returns the
    /// number of bytes stored. On error the chain keeps whatever was
    /// committed before the failure.
    pub fn write<S: ByteSource + ?Sized>(
        &mut self,
        file: &mut FileHandle,
        source: &mut S,
    ) -> Result<usize, FsError> {
        self.append(file, source)
    }

    pub fn close(&mut self, file: FileHandle) -> Result<FileInfo, FsError> {
        let info = self.info_for(file.id())?;
        info!(
            "fs: closed id={} size={} nodes={} written={}",
            info.id, info.size, info.nodes, file.written
        );
        Ok(info)
    }

    pub fn stat(&mut self, name: &str) -> Result<FileInfo, FsError> {
        let head = self.find_by_name(name.as_bytes())?.ok_or(FsError::NotFound)?;
        self.info_for(head.id)
    }

    /// Calls `visitor` for every file, in slot order.
    pub fn list<V: FnMut(&FileInfo)>(&mut self, mut visitor: V) -> Result<usize, FsError> {
        let mut files = 0usize;
        for id in 0..self.layout.slots() {
            let node = self.read_slot(id)?;
            if !node.is_head() {
                continue;
            }
            let info = self.info_for(id)?;
            visitor(&info);
            files += 1;
        }
        Ok(files)
    }

    /// Copies file bytes starting at `offset` into `buf`; returns how many were copied.
    pub fn read(&mut self, name: &str, offset: u32, buf: &mut [u8]) -> Result<usize, FsError> {
        let head = self.find_by_name(name.as_bytes())?.ok_or(FsError::NotFound)?;
        let mut cursor = ChainCursor::new(head.id);
        let mut skip = offset as usize;
        let mut copied = 0usize;
        while copied < buf.len() {
            let Some(node) = cursor.advance(self)? else {
                break;
            };
            let held = node.size as usize;
            if skip >= held {
                skip -= held;
                continue;
            }
            let take = (held - skip).min(buf.len() - copied);
            self.heartbeat.beat();
            self.io.load(self.layout.storage_sector(node.id))?;
            buf[copied..copied + take].copy_from_slice(&self.io.buf()[skip..skip + take]);
            copied += take;
            skip = 0;
        }
        Ok(copied)
    }

    /// Visits the nodes of `name` in chain order and returns how many there are.
    pub fn chain<V: FnMut(&Node)>(&mut self, name: &str, mut visitor: V) -> Result<u16, FsError> {
        let head = self.find_by_name(name.as_bytes())?.ok_or(FsError::NotFound)?;
        let mut cursor = ChainCursor::new(head.id);
        let mut count = 0u16;
        while let Some(node) = cursor.advance(self)? {
            visitor(&node);
            count += 1;
        }
        Ok(count)
    }

    fn info_for(&mut self, head_id: u16) -> Result<FileInfo, FsError> {
        let mut cursor = ChainCursor::new(head_id);
        let mut info = FileInfo {
            id: head_id,
            name: Vec::new(),
            size: 0,
            nodes: 0,
        };
        while let Some(node) = cursor.advance(self)? {
            if node.id == head_id {
                // Names are validated at create time and always fit.
                let _ = info.name.extend_from_slice(node.name());
            }
            info.size = info.size.saturating_add(node.size);
            info.nodes += 1;
        }
        Ok(info)
    }
}
