//! Buffer da ROM em RAM.
//! Copiado uma única vez da flash quando a imagem é selecionada; somente
//! leitura durante a emulação.

use crate::core::cartridge::config::{RomRecord, ROM_NAME_MAX};
use crate::core::cartridge::mapper::MapperKind;
use crate::core::memory::{CombinedImage, MemoryError, MemoryResult, MAX_ROM_SIZE};
use log::{info, warn};

/// Valor devolvido fora do buffer
const UNMAPPED: u8 = 0xFF;

#[derive(Debug, Clone)]
pub struct RomBackingStore {
    data: Vec<u8>,
    kind: MapperKind,
    name: String,
}

impl RomBackingStore {
    /// Copia a imagem descrita por `record` a partir da imagem combinada
    pub fn load(image: &CombinedImage<'_>, record: &RomRecord) -> MemoryResult<Self> {
        let kind = record.mapper_kind().map_err(|e| {
            warn!("Rejecting '{}': {}", record.name(), e);
            e
        })?;

        if record.size as usize > MAX_ROM_SIZE {
            warn!(
                "Rejecting '{}': {} bytes exceeds the {} byte buffer",
                record.name(),
                record.size,
                MAX_ROM_SIZE
            );
            return Err(MemoryError::RomTooLarge);
        }
        if record.size == 0 {
            return Err(MemoryError::InvalidCartridge);
        }

        let bytes = image.rom_bytes(record)?;
        let store = Self::from_bytes(bytes, kind, &record.name())?;
        info!(
            "Loaded '{}' ({}, {} bytes from offset {:#X})",
            store.name, kind, record.size, record.offset
        );
        Ok(store)
    }

    /// Copia `bytes` para um novo buffer
    pub fn from_bytes(bytes: &[u8], kind: MapperKind, name: &str) -> MemoryResult<Self> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(MemoryError::RomTooLarge);
        }

        Ok(Self {
            data: bytes.to_vec(),
            kind,
            name: name.chars().take(ROM_NAME_MAX).collect(),
        })
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(UNMAPPED)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn kind(&self) -> MapperKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
