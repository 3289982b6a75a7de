// multirom-rs/src/core/storage/mod.rs

//! Block storage behind two I/O ports.
//!
//! The host talks to the bridge through a control port and a data port; the
//! bridge turns that byte protocol into whole-sector calls on a
//! [`BlockDevice`].
//!
//! | Opcode | Command                                                  |
//! |--------|----------------------------------------------------------|
//! | `0x01` | initialise storage (control readback 0x00 / 0xFF)        |
//! | `0x02` | presence check (same encoding)                           |
//! | `0x03` | device identifier (1 data byte)                          |
//! | `0x04` | serial number (4 data bytes, little-endian)              |
//! | `0x05` | capacity in sectors (4 data bytes, little-endian)        |
//! | `0x06` | read sector: 4 address bytes, `0x06` again, 512 reads    |
//! | `0x07` | read the next sector                                     |
//! | `0x08` | write sector: 4 address bytes, 512 data writes           |

pub mod bridge;
pub mod memory_disk;

pub use bridge::{StorageBridge, StoragePhase, TransferDirection};
pub use memory_disk::MemoryDisk;

/// Sector size in bytes
pub const SECTOR_SIZE: usize = 512;

/// Default control port
pub const CONTROL_PORT: u8 = 0x9E;
/// Default data port
pub const DATA_PORT: u8 = 0x9F;

/// Control register values
pub const STATUS_OK: u8 = 0x00;
pub const STATUS_ERROR: u8 = 0xFF;

/// Command opcodes written to the control port
pub mod opcode {
    pub const INIT: u8 = 0x01;
    pub const PRESENT: u8 = 0x02;
    pub const IDENTIFY: u8 = 0x03;
    pub const SERIAL: u8 = 0x04;
    pub const CAPACITY: u8 = 0x05;
    pub const READ_BLOCK: u8 = 0x06;
    pub const READ_NEXT: u8 = 0x07;
    pub const WRITE_BLOCK: u8 = 0x08;
}

/// Storage driver failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Device missing or not initialised
    NotReady,
    /// Sector beyond the end of the device
    OutOfRange(u32),
    /// Transfer failed
    Io,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotReady => write!(f, "storage device not ready"),
            StorageError::OutOfRange(sector) => write!(f, "sector {} out of range", sector),
            StorageError::Io => write!(f, "storage transfer failed"),
        }
    }
}

impl std::error::Error for StorageError {}

pub type StorageResult<T> = Result<T, StorageError>;

/// Physical block storage driver
pub trait BlockDevice {
    fn init(&mut self) -> StorageResult<()>;
    fn read_sector(&mut self, sector: u32, buffer: &mut [u8; SECTOR_SIZE]) -> StorageResult<()>;
    fn write_sector(&mut self, sector: u32, buffer: &[u8; SECTOR_SIZE]) -> StorageResult<()>;
    /// Capacity in sectors (0 when no medium)
    fn sector_count(&self) -> u32;

    fn is_ready(&self) -> bool {
        self.sector_count() > 0
    }

    fn manufacturer_id(&self) -> u8 {
        0
    }

    fn serial(&self) -> u32 {
        0
    }
}
