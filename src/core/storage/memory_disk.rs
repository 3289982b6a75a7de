//! In-memory block device.
//!
//! Holds a raw disk image padded to whole sectors. Used by the host-side
//! simulation and the tests; faults can be injected per operation.

use log::debug;

use super::{BlockDevice, StorageError, StorageResult, SECTOR_SIZE};

#[derive(Debug, Clone, Default)]
pub struct MemoryDisk {
    data: Vec<u8>,
    manufacturer_id: u8,
    serial: u32,
    fail_init: bool,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryDisk {
    /// Blank disk of `sectors` zeroed sectors
    pub fn new(sectors: u32) -> Self {
        Self {
            data: vec![0; sectors as usize * SECTOR_SIZE],
            ..Self::default()
        }
    }

    /// Disk image from raw bytes; a partial last sector is zero-padded
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = bytes.to_vec();
        let padded = data.len().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
        data.resize(padded, 0);
        debug!("Memory disk: {} sector(s)", padded / SECTOR_SIZE);
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_identity(mut self, manufacturer_id: u8, serial: u32) -> Self {
        self.manufacturer_id = manufacturer_id;
        self.serial = serial;
        self
    }

    pub fn set_fail_init(&mut self, fail: bool) {
        self.fail_init = fail;
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Contents of one sector
    pub fn sector(&self, sector: u32) -> Option<&[u8]> {
        let start = (sector as usize).checked_mul(SECTOR_SIZE)?;
        self.data.get(start..start + SECTOR_SIZE)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn range(&self, sector: u32) -> StorageResult<std::ops::Range<usize>> {
        if sector >= self.sector_count() {
            return Err(StorageError::OutOfRange(sector));
        }
        let start = sector as usize * SECTOR_SIZE;
        Ok(start..start + SECTOR_SIZE)
    }
}

impl BlockDevice for MemoryDisk {
    fn init(&mut self) -> StorageResult<()> {
        if self.fail_init {
            return Err(StorageError::NotReady);
        }
        Ok(())
    }

    fn read_sector(&mut self, sector: u32, buffer: &mut [u8; SECTOR_SIZE]) -> StorageResult<()> {
        if self.fail_reads {
            return Err(StorageError::Io);
        }
        let range = self.range(sector)?;
        buffer.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write_sector(&mut self, sector: u32, buffer: &[u8; SECTOR_SIZE]) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Io);
        }
        let range = self.range(sector)?;
        self.data[range].copy_from_slice(buffer);
        Ok(())
    }

    fn sector_count(&self) -> u32 {
        (self.data.len() / SECTOR_SIZE) as u32
    }

    fn is_ready(&self) -> bool {
        !self.fail_init && self.sector_count() > 0
    }

    fn manufacturer_id(&self) -> u8 {
        self.manufacturer_id
    }

    fn serial(&self) -> u32 {
        self.serial
    }
}
