// multirom-rs/src/core/storage/bridge.rs

//! Storage command protocol state machine.
//!
//! ```text
//! Idle --0x06/0x08--> AwaitingAddress(0..4) --0x06 (read)--> AwaitingStart
//!                                         \--(write)------> Transferring(Write)
//! AwaitingStart --0x06--> Transferring(Read) --512 reads--> Idle
//! ```
//!
//! Any byte the current phase does not expect on the control port is taken
//! as a new opcode; a transfer in progress is dropped.

use log::{debug, info, warn};

use super::{
    opcode, BlockDevice, StorageError, CONTROL_PORT, DATA_PORT, SECTOR_SIZE, STATUS_ERROR,
    STATUS_OK,
};
use crate::core::bus::{bus_trace, BusCycle};
use crate::utils::{accumulate_le, le_byte};

/// Address bytes following 0x06 / 0x08
const ADDRESS_BYTES: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePhase {
    Idle,
    /// Number of address bytes received so far
    AwaitingAddress(u8),
    /// Address complete; waiting for the confirming 0x06
    AwaitingStart,
    Transferring(TransferDirection),
}

pub struct StorageBridge<D: BlockDevice> {
    device: D,
    control_port: u8,
    data_port: u8,

    opcode: u8,
    phase: StoragePhase,
    sector_address: u32,
    bytes_pending_in: u16,
    bytes_pending_out: u16,
    cursor: u16,
    block_buffer: [u8; SECTOR_SIZE],

    ctrl_reg: u8,
    data_reg: u8,
}

impl<D: BlockDevice> StorageBridge<D> {
    pub fn new(device: D) -> Self {
        Self::with_ports(device, CONTROL_PORT, DATA_PORT)
    }

    pub fn with_ports(device: D, control_port: u8, data_port: u8) -> Self {
        Self {
            device,
            control_port,
            data_port,
            opcode: 0,
            phase: StoragePhase::Idle,
            sector_address: 0,
            bytes_pending_in: 0,
            bytes_pending_out: 0,
            cursor: 0,
            block_buffer: [0; SECTOR_SIZE],
            ctrl_reg: STATUS_OK,
            data_reg: 0,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn phase(&self) -> StoragePhase {
        self.phase
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn ctrl_reg(&self) -> u8 {
        self.ctrl_reg
    }

    pub fn sector_address(&self) -> u32 {
        self.sector_address
    }

    pub fn bytes_pending_in(&self) -> u16 {
        self.bytes_pending_in
    }

    pub fn bytes_pending_out(&self) -> u16 {
        self.bytes_pending_out
    }

    /// True when the cycle targets one of the bridge ports
    pub fn claims(&self, cycle: &BusCycle) -> bool {
        cycle.io_request && (cycle.port() == self.control_port || cycle.port() == self.data_port)
    }

    /// Services one I/O cycle; returns the byte to drive for port reads.
    pub fn handle(&mut self, cycle: &BusCycle) -> Option<u8> {
        if !self.claims(cycle) {
            return None;
        }

        let port = cycle.port();
        bus_trace!(
            "io {:#04X} rd={} wr={} d={:#04X}",
            port,
            cycle.is_read,
            cycle.is_write,
            cycle.data
        );

        if cycle.is_read {
            Some(if port == self.control_port {
                self.read_control()
            } else {
                self.read_data()
            })
        } else {
            if cycle.is_write && port == self.control_port {
                self.write_control(cycle.data);
            } else if cycle.is_write {
                self.write_data(cycle.data);
            }
            None
        }
    }

    pub fn read_control(&self) -> u8 {
        self.ctrl_reg
    }

    pub fn write_control(&mut self, value: u8) {
        match self.phase {
            StoragePhase::AwaitingAddress(received) => {
                self.sector_address =
                    accumulate_le(self.sector_address, value, usize::from(received));
                let received = received + 1;
                if received < ADDRESS_BYTES {
                    self.phase = StoragePhase::AwaitingAddress(received);
                } else if self.opcode == opcode::WRITE_BLOCK {
                    bus_trace!("Storage: write sector {} armed", self.sector_address);
                    self.cursor = 0;
                    self.bytes_pending_in = SECTOR_SIZE as u16;
                    self.phase = StoragePhase::Transferring(TransferDirection::Write);
                } else {
                    self.phase = StoragePhase::AwaitingStart;
                }
            }
            StoragePhase::AwaitingStart if value == opcode::READ_BLOCK => {
                self.read_block();
            }
            _ => self.dispatch(value),
        }
    }

    pub fn read_data(&mut self) -> u8 {
        if self.bytes_pending_out == 0 {
            return self.data_reg;
        }

        let value = self.block_buffer[usize::from(self.cursor)];
        self.cursor += 1;
        self.bytes_pending_out -= 1;
        if self.bytes_pending_out == 0 {
            self.phase = StoragePhase::Idle;
        }
        value
    }

    pub fn write_data(&mut self, value: u8) {
        self.data_reg = value;

        if self.phase != StoragePhase::Transferring(TransferDirection::Write)
            || self.bytes_pending_in == 0
        {
            return;
        }

        self.block_buffer[usize::from(self.cursor)] = value;
        self.cursor += 1;
        self.bytes_pending_in -= 1;
        if self.bytes_pending_in == 0 {
            self.commit_block();
        }
    }

    fn dispatch(&mut self, op: u8) {
        self.opcode = op;
        self.phase = StoragePhase::Idle;
        self.bytes_pending_in = 0;
        self.bytes_pending_out = 0;
        self.cursor = 0;

        match op {
            opcode::INIT => {
                self.ctrl_reg = match self.device.init() {
                    Ok(()) => {
                        info!(
                            "Storage initialised: {} sector(s)",
                            self.device.sector_count()
                        );
                        STATUS_OK
                    }
                    Err(e) => {
                        warn!("Storage init failed: {}", e);
                        STATUS_ERROR
                    }
                };
            }
            opcode::PRESENT => {
                self.ctrl_reg = if self.device.is_ready() {
                    STATUS_OK
                } else {
                    STATUS_ERROR
                };
            }
            opcode::IDENTIFY => {
                let id = self.device.manufacturer_id();
                self.load_out(&[id]);
            }
            opcode::SERIAL => {
                let serial = self.device.serial();
                self.load_out_le(serial);
            }
            opcode::CAPACITY => {
                let sectors = self.device.sector_count();
                self.load_out_le(sectors);
            }
            opcode::READ_BLOCK | opcode::WRITE_BLOCK => {
                self.sector_address = 0;
                self.phase = StoragePhase::AwaitingAddress(0);
            }
            opcode::READ_NEXT => {
                self.sector_address = self.sector_address.wrapping_add(1);
                self.read_block();
            }
            other => {
                debug!("Storage: unknown opcode {:#04X} ignored", other);
            }
        }
    }

    /// Reads `sector_address` into the block buffer and arms 512 data reads
    fn read_block(&mut self) {
        match self.device.read_sector(self.sector_address, &mut self.block_buffer) {
            Ok(()) => {
                bus_trace!("Storage: read sector {}", self.sector_address);
                self.ctrl_reg = STATUS_OK;
                self.cursor = 0;
                self.bytes_pending_out = SECTOR_SIZE as u16;
                self.phase = StoragePhase::Transferring(TransferDirection::Read);
            }
            Err(e) => self.abort(e),
        }
    }

    fn commit_block(&mut self) {
        match self.device.write_sector(self.sector_address, &self.block_buffer) {
            Ok(()) => {
                bus_trace!("Storage: wrote sector {}", self.sector_address);
                self.ctrl_reg = STATUS_OK;
                self.sector_address = self.sector_address.wrapping_add(1);
                self.phase = StoragePhase::Idle;
            }
            Err(e) => self.abort(e),
        }
    }

    fn load_out(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(SECTOR_SIZE);
        self.block_buffer[..len].copy_from_slice(&bytes[..len]);
        self.cursor = 0;
        self.bytes_pending_out = len as u16;
        self.ctrl_reg = STATUS_OK;
        self.phase = StoragePhase::Transferring(TransferDirection::Read);
    }

    fn load_out_le(&mut self, value: u32) {
        let bytes: [u8; 4] = std::array::from_fn(|i| le_byte(value, i));
        self.load_out(&bytes);
    }

    fn abort(&mut self, error: StorageError) {
        warn!(
            "Storage: opcode {:#04X} sector {} failed: {}",
            self.opcode, self.sector_address, error
        );
        self.ctrl_reg = STATUS_ERROR;
        self.bytes_pending_in = 0;
        self.bytes_pending_out = 0;
        self.phase = StoragePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryDisk;

    /// Disk whose sector `n` is filled with a pattern starting at `n`
    fn patterned_disk(sectors: u32) -> MemoryDisk {
        let bytes: Vec<u8> = (0..sectors as usize * SECTOR_SIZE)
            .map(|i| ((i / SECTOR_SIZE) as u8).wrapping_add(i as u8))
            .collect();
        MemoryDisk::from_bytes(&bytes)
    }

    fn begin_read(bridge: &mut StorageBridge<MemoryDisk>, sector: u32) {
        bridge.write_control(opcode::READ_BLOCK);
        for byte in sector.to_le_bytes() {
            bridge.write_control(byte);
        }
        bridge.write_control(opcode::READ_BLOCK);
    }

    fn drain(bridge: &mut StorageBridge<MemoryDisk>, count: usize) -> Vec<u8> {
        (0..count).map(|_| bridge.read_data()).collect()
    }

    #[test]
    fn test_read_sector_zero() {
        let disk = patterned_disk(4);
        let expected = disk.sector(0).unwrap().to_vec();
        let mut bridge = StorageBridge::new(disk);

        begin_read(&mut bridge, 0);
        assert_eq!(bridge.ctrl_reg(), STATUS_OK);
        assert_eq!(bridge.bytes_pending_out(), SECTOR_SIZE as u16);
        assert_eq!(drain(&mut bridge, SECTOR_SIZE), expected);
        assert_eq!(bridge.phase(), StoragePhase::Idle);
    }

    #[test]
    fn test_address_bytes_are_little_endian() {
        let mut bridge = StorageBridge::new(patterned_disk(0x200));
        bridge.write_control(opcode::READ_BLOCK);
        for byte in [0x02, 0x01, 0x00, 0x00] {
            bridge.write_control(byte);
        }
        assert_eq!(bridge.phase(), StoragePhase::AwaitingStart);
        assert_eq!(bridge.sector_address(), 0x0102);
    }

    #[test]
    fn test_read_next_follows_previous_read() {
        let disk = patterned_disk(4);
        let sector2 = disk.sector(2).unwrap().to_vec();
        let mut bridge = StorageBridge::new(disk);

        begin_read(&mut bridge, 1);
        drain(&mut bridge, SECTOR_SIZE);
        bridge.write_control(opcode::READ_NEXT);
        assert_eq!(bridge.sector_address(), 2);
        assert_eq!(drain(&mut bridge, SECTOR_SIZE), sector2);
    }

    #[test]
    fn test_driver_failure_during_read() {
        let mut disk = patterned_disk(4);
        disk.set_fail_reads(true);
        let mut bridge = StorageBridge::new(disk);

        begin_read(&mut bridge, 0);
        assert_eq!(bridge.ctrl_reg(), STATUS_ERROR);
        assert_eq!(bridge.bytes_pending_out(), 0);
        assert_eq!(bridge.phase(), StoragePhase::Idle);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut bridge = StorageBridge::new(patterned_disk(2));
        begin_read(&mut bridge, 2);
        assert_eq!(bridge.read_control(), STATUS_ERROR);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(8));
        let payload: Vec<u8> = (0..SECTOR_SIZE).map(|i| (i * 7) as u8).collect();

        bridge.write_control(opcode::WRITE_BLOCK);
        for byte in 5u32.to_le_bytes() {
            bridge.write_control(byte);
        }
        assert_eq!(
            bridge.phase(),
            StoragePhase::Transferring(TransferDirection::Write)
        );
        for &byte in &payload {
            bridge.write_data(byte);
        }
        assert_eq!(bridge.ctrl_reg(), STATUS_OK);
        assert_eq!(bridge.sector_address(), 6);
        assert_eq!(bridge.phase(), StoragePhase::Idle);
        assert_eq!(bridge.device().sector(5).unwrap(), &payload[..]);

        begin_read(&mut bridge, 5);
        assert_eq!(drain(&mut bridge, SECTOR_SIZE), payload);
    }

    #[test]
    fn test_write_failure_aborts() {
        let mut disk = MemoryDisk::new(2);
        disk.set_fail_writes(true);
        let mut bridge = StorageBridge::new(disk);

        bridge.write_control(opcode::WRITE_BLOCK);
        for _ in 0..4 {
            bridge.write_control(0);
        }
        for _ in 0..SECTOR_SIZE {
            bridge.write_data(0x11);
        }
        assert_eq!(bridge.ctrl_reg(), STATUS_ERROR);
        assert_eq!(bridge.bytes_pending_in(), 0);
        assert_eq!(bridge.sector_address(), 0);
    }

    #[test]
    fn test_init_and_presence() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(4));
        bridge.write_control(opcode::INIT);
        assert_eq!(bridge.ctrl_reg(), STATUS_OK);
        bridge.write_control(opcode::PRESENT);
        assert_eq!(bridge.ctrl_reg(), STATUS_OK);

        bridge.device_mut().set_fail_init(true);
        bridge.write_control(opcode::INIT);
        assert_eq!(bridge.ctrl_reg(), STATUS_ERROR);
        bridge.write_control(opcode::PRESENT);
        assert_eq!(bridge.ctrl_reg(), STATUS_ERROR);

        let mut empty = StorageBridge::new(MemoryDisk::new(0));
        empty.write_control(opcode::PRESENT);
        assert_eq!(empty.ctrl_reg(), STATUS_ERROR);
    }

    #[test]
    fn test_identify_serial_capacity() {
        let disk = MemoryDisk::new(0x0203).with_identity(0x1B, 0xDEAD_BEEF);
        let mut bridge = StorageBridge::new(disk);

        bridge.write_control(opcode::IDENTIFY);
        assert_eq!(bridge.bytes_pending_out(), 1);
        assert_eq!(bridge.read_data(), 0x1B);

        bridge.write_control(opcode::SERIAL);
        assert_eq!(drain(&mut bridge, 4), vec![0xEF, 0xBE, 0xAD, 0xDE]);

        bridge.write_control(opcode::CAPACITY);
        assert_eq!(drain(&mut bridge, 4), vec![0x03, 0x02, 0x00, 0x00]);
        assert_eq!(bridge.phase(), StoragePhase::Idle);
    }

    #[test]
    fn test_address_phase_takes_any_byte() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(1));
        bridge.write_control(opcode::READ_BLOCK);
        bridge.write_control(0);
        bridge.write_control(0x42);
        assert_eq!(bridge.phase(), StoragePhase::AwaitingAddress(2));
    }

    #[test]
    fn test_unknown_opcode_returns_to_idle() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(1));
        bridge.write_control(0x42);
        assert_eq!(bridge.phase(), StoragePhase::Idle);
        assert_eq!(bridge.ctrl_reg(), STATUS_OK);
    }

    #[test]
    fn test_awaiting_start_accepts_new_opcode() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(4));
        bridge.write_control(opcode::READ_BLOCK);
        for _ in 0..4 {
            bridge.write_control(0);
        }
        bridge.write_control(opcode::CAPACITY);
        assert_eq!(bridge.opcode(), opcode::CAPACITY);
        assert_eq!(drain(&mut bridge, 4), vec![4, 0, 0, 0]);
    }

    #[test]
    fn test_new_opcode_drops_transfer() {
        let mut bridge = StorageBridge::new(patterned_disk(2));
        begin_read(&mut bridge, 0);
        drain(&mut bridge, 10);
        bridge.write_control(opcode::PRESENT);
        assert_eq!(bridge.bytes_pending_out(), 0);
    }

    #[test]
    fn test_idle_data_read_returns_data_register() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(1));
        assert_eq!(bridge.read_data(), 0);
        bridge.write_data(0x77);
        assert_eq!(bridge.read_data(), 0x77);
    }

    #[test]
    fn test_handle_routes_io_cycles() {
        let mut bridge = StorageBridge::new(MemoryDisk::new(3));

        assert_eq!(bridge.handle(&BusCycle::io_write(CONTROL_PORT, opcode::CAPACITY)), None);
        assert_eq!(bridge.handle(&BusCycle::io_read(DATA_PORT)), Some(3));
        assert_eq!(bridge.handle(&BusCycle::io_read(CONTROL_PORT)), Some(STATUS_OK));

        // memória e outras portas não pertencem à ponte
        assert_eq!(bridge.handle(&BusCycle::memory_read(0x009F)), None);
        assert_eq!(bridge.handle(&BusCycle::io_read(0x98)), None);
        assert_eq!(bridge.bytes_pending_out(), 3);
    }
}
