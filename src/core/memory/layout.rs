//! Layout da imagem combinada gravada na flash.
//!
//! ```text
//! +------------------+---------------------------+----------------------+
//! | firmware         | região do menu (32KB)     | imagens de cartucho  |
//! |                  | menu 16KB | config 16KB   | (ordem da tabela)    |
//! +------------------+---------------------------+----------------------+
//! ```
//!
//! Os offsets dos registros são relativos ao início da imagem combinada.

use crate::core::cartridge::config::RomRecord;
use crate::core::memory::{MemoryError, MemoryResult, CONFIG_AREA_OFFSET, MENU_REGION_SIZE};

/// Visão somente leitura da imagem combinada
#[derive(Debug, Clone, Copy)]
pub struct CombinedImage<'a> {
    bytes: &'a [u8],
    firmware_len: usize,
}

impl<'a> CombinedImage<'a> {
    /// Cria a visão a partir dos bytes da flash e do tamanho do firmware
    pub fn new(bytes: &'a [u8], firmware_len: usize) -> Self {
        Self { bytes, firmware_len }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Offset (relativo à imagem) onde começa a região do menu
    pub fn menu_offset(&self) -> usize {
        self.firmware_len
    }

    /// Região de 32KB do menu; truncada se a imagem for menor
    pub fn menu_region(&self) -> &'a [u8] {
        self.clamp(self.firmware_len, MENU_REGION_SIZE)
    }

    /// Área de configuração (tabela de registros), logo após o programa do menu
    pub fn table_region(&self) -> &'a [u8] {
        self.clamp(
            self.firmware_len + CONFIG_AREA_OFFSET,
            MENU_REGION_SIZE - CONFIG_AREA_OFFSET,
        )
    }

    /// Offset onde começam as imagens de cartucho
    pub fn roms_offset(&self) -> usize {
        self.firmware_len + MENU_REGION_SIZE
    }

    /// Bytes da imagem descrita por um registro
    pub fn rom_bytes(&self, record: &RomRecord) -> MemoryResult<&'a [u8]> {
        let start = record.offset as usize;
        let end = start
            .checked_add(record.size as usize)
            .ok_or(MemoryError::InvalidAddress)?;
        self.bytes.get(start..end).ok_or(MemoryError::InvalidAddress)
    }

    fn clamp(&self, start: usize, len: usize) -> &'a [u8] {
        let start = start.min(self.bytes.len());
        let end = start.saturating_add(len).min(self.bytes.len());
        &self.bytes[start..end]
    }
}
