#![cfg_attr(not(test), no_std)]

mod chain;
pub mod config;
pub mod error;
pub mod flash;
pub mod fs;
pub mod heartbeat;
pub mod node;
pub mod queue;
pub mod table;
pub mod upload;

pub use config::{FsConfig, Layout, NAME_MAX, NODES_PER_SECTOR, NODE_SIZE, SECTOR_SIZE};
pub use error::{FlashOp, FsError, LayoutError};
pub use fs::{FileHandle, FileInfo, Fs};
pub use heartbeat::{Heartbeat, NoHeartbeat};
pub use node::Node;
pub use queue::ByteSource;
pub use table::{ScanOutcome, Verdict};
