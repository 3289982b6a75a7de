// multirom-rs/src/core/cartridge/mapper/mapper_common.rs

use crate::core::memory::{MemoryError, MemoryResult};

/// Largest bank register file of any supported mapper
pub const MAX_BANK_REGISTERS: usize = 4;

/// Mapper type enumeration for all supported MSX cartridges
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperKind {
    /// Plain 16KB ROM at 0x4000
    Plain16,
    /// Plain 32KB ROM at 0x4000-0xBFFF
    Plain32,
    /// 48KB ROM mapped linearly from page 0
    Linear0_48K,
    /// Konami without SCC (bank 0 fixed)
    Konami,
    /// Konami with SCC sound chip
    KonamiSCC,
    /// ASCII 8KB segments
    ASCII8,
    /// ASCII 16KB segments
    ASCII16,
}

impl MapperKind {
    pub const ALL: [MapperKind; 7] = [
        MapperKind::Plain16,
        MapperKind::Plain32,
        MapperKind::Linear0_48K,
        MapperKind::Konami,
        MapperKind::KonamiSCC,
        MapperKind::ASCII8,
        MapperKind::ASCII16,
    ];

    /// Decodes the mapper byte of a configuration record
    pub fn from_code(code: u8) -> MemoryResult<Self> {
        match code {
            1 => Ok(MapperKind::Plain16),
            2 => Ok(MapperKind::Plain32),
            3 => Ok(MapperKind::KonamiSCC),
            4 => Ok(MapperKind::Linear0_48K),
            5 => Ok(MapperKind::ASCII8),
            6 => Ok(MapperKind::ASCII16),
            7 => Ok(MapperKind::Konami),
            other => Err(MemoryError::UnknownMapper(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            MapperKind::Plain16 => 1,
            MapperKind::Plain32 => 2,
            MapperKind::KonamiSCC => 3,
            MapperKind::Linear0_48K => 4,
            MapperKind::ASCII8 => 5,
            MapperKind::ASCII16 => 6,
            MapperKind::Konami => 7,
        }
    }

    /// True for kinds with writable bank registers
    pub fn is_banked(self) -> bool {
        !matches!(
            self,
            MapperKind::Plain16 | MapperKind::Plain32 | MapperKind::Linear0_48K
        )
    }
}

impl std::fmt::Display for MapperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperKind::Plain16 => write!(f, "Plain 16KB"),
            MapperKind::Plain32 => write!(f, "Plain 32KB"),
            MapperKind::Linear0_48K => write!(f, "Linear0 48KB"),
            MapperKind::Konami => write!(f, "Konami"),
            MapperKind::KonamiSCC => write!(f, "Konami SCC"),
            MapperKind::ASCII8 => write!(f, "ASCII8"),
            MapperKind::ASCII16 => write!(f, "ASCII16"),
        }
    }
}

/// Write range that selects a bank register instead of ROM data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRange {
    pub start: u16,
    pub end: u16,
    pub register: u8,
}

impl TriggerRange {
    pub const fn new(start: u16, end: u16, register: u8) -> Self {
        Self { start, end, register }
    }

    #[inline]
    pub fn contains(&self, address: u16) -> bool {
        address >= self.start && address <= self.end
    }
}

/// Unified mapper configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperConfig {
    pub kind: MapperKind,
    /// Offset of the image inside the backing store
    pub base_offset: u32,
    pub window_start: u16,
    pub window_end: u16,
    pub segment_size: u32,
    pub trigger_table: &'static [TriggerRange],
    /// Bank register values after reset
    pub reset_banks: &'static [u8],
}

impl MapperConfig {
    /// Number of bytes covered by the window
    pub fn window_len(&self) -> u32 {
        u32::from(self.window_end) - u32::from(self.window_start) + 1
    }

    /// Number of segments visible at once (= bank registers)
    pub fn slots(&self) -> usize {
        (self.window_len() / self.segment_size) as usize
    }

    /// Window length must be a whole number of segments
    pub fn is_valid(&self) -> bool {
        self.segment_size != 0
            && self.window_start <= self.window_end
            && self.window_len() % self.segment_size == 0
            && self.reset_banks.len() == self.slots()
            && self.slots() <= MAX_BANK_REGISTERS
            && self
                .trigger_table
                .iter()
                .all(|t| (t.register as usize) < self.slots())
    }

    #[inline]
    pub fn in_window(&self, address: u16) -> bool {
        address >= self.window_start && address <= self.window_end
    }

    /// Register selected by a write to `address`, if any
    #[inline]
    pub fn trigger_for(&self, address: u16) -> Option<usize> {
        self.trigger_table
            .iter()
            .find(|t| t.contains(address))
            .map(|t| t.register as usize)
    }

    /// Same config with a different base offset
    pub fn with_base_offset(mut self, base_offset: u32) -> Self {
        self.base_offset = base_offset;
        self
    }
}

/// Bank registers (fixed storage, `len` active entries)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankRegisterFile {
    regs: [u8; MAX_BANK_REGISTERS],
    len: usize,
}

impl BankRegisterFile {
    pub fn new(reset: &[u8]) -> Self {
        let mut regs = [0u8; MAX_BANK_REGISTERS];
        let len = reset.len().min(MAX_BANK_REGISTERS);
        regs[..len].copy_from_slice(&reset[..len]);
        Self { regs, len }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        if index < self.len {
            self.regs[index]
        } else {
            0
        }
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        if index < self.len {
            self.regs[index] = value;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.regs[..self.len]
    }
}
