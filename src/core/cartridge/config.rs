// multirom-rs/src/core/cartridge/config.rs

//! Configuration table reader.
//!
//! The table is a run of fixed 29-byte records written by the packaging tool:
//!
//! ```text
//! offset  size  field
//! 0       20    name (NUL/space padded)
//! 20      1     mapper code
//! 21      4     image size   (little-endian)
//! 25      4     image offset (little-endian, from the combined image start)
//! ```
//!
//! A record made only of `0xFF` bytes ends the table.

use bytemuck::{Pod, Zeroable};
use log::{debug, warn};

use crate::core::cartridge::mapper::MapperKind;
use crate::core::memory::MemoryResult;

/// Tamanho de um registro na área de configuração
pub const ROM_RECORD_SIZE: usize = 29;

/// Máximo de registros (índice cabe em um byte)
pub const MAX_ROM_RECORDS: usize = 256;

/// Tamanho máximo do nome
pub const ROM_NAME_MAX: usize = 20;

/// Layout cru do registro, lido direto dos bytes da flash
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawRomRecord {
    name: [u8; ROM_NAME_MAX],
    mapper: u8,
    size: [u8; 4],
    offset: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<RawRomRecord>() == ROM_RECORD_SIZE);

impl RawRomRecord {
    fn is_end_marker(&self) -> bool {
        bytemuck::bytes_of(self).iter().all(|&b| b == 0xFF)
    }
}

/// Descritor de uma imagem de cartucho
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomRecord {
    pub name: [u8; ROM_NAME_MAX],
    pub mapper: u8,
    pub size: u32,
    pub offset: u32,
}

impl RomRecord {
    /// Builds a record, truncating `name` to 20 bytes
    pub fn new(name: &str, mapper: u8, size: u32, offset: u32) -> Self {
        let mut padded = [0u8; ROM_NAME_MAX];
        let bytes = name.as_bytes();
        let len = bytes.len().min(ROM_NAME_MAX);
        padded[..len].copy_from_slice(&bytes[..len]);

        Self {
            name: padded,
            mapper,
            size,
            offset,
        }
    }

    /// Decodes one 29-byte record; `None` for the end marker or a short slice
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let raw: &RawRomRecord = bytemuck::try_from_bytes(bytes.get(..ROM_RECORD_SIZE)?).ok()?;
        if raw.is_end_marker() {
            return None;
        }

        Some(Self {
            name: raw.name,
            mapper: raw.mapper,
            size: u32::from_le_bytes(raw.size),
            offset: u32::from_le_bytes(raw.offset),
        })
    }

    /// Wire form of the record
    pub fn encode(&self) -> [u8; ROM_RECORD_SIZE] {
        let raw = RawRomRecord {
            name: self.name,
            mapper: self.mapper,
            size: self.size.to_le_bytes(),
            offset: self.offset.to_le_bytes(),
        };
        let mut out = [0u8; ROM_RECORD_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&raw));
        out
    }

    /// Nome sem o preenchimento final; bytes não UTF-8 viram `?`
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .rposition(|&b| b != 0 && b != b' ')
            .map_or(0, |i| i + 1);
        self.name[..end]
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect()
    }

    pub fn mapper_kind(&self) -> MemoryResult<MapperKind> {
        MapperKind::from_code(self.mapper)
    }
}

/// Reads records from the start of `region` until the end marker, 256
/// records, or the end of the region (a truncated record ends the table).
pub fn read_table(region: &[u8]) -> Vec<RomRecord> {
    let mut records = Vec::new();

    for chunk in region.chunks(ROM_RECORD_SIZE).take(MAX_ROM_RECORDS) {
        if chunk.len() < ROM_RECORD_SIZE {
            warn!("Truncated configuration record after {} entries", records.len());
            break;
        }
        match RomRecord::decode(chunk) {
            Some(record) => records.push(record),
            None => break,
        }
    }

    debug!("Configuration table: {} record(s)", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(records: &[RomRecord], terminate: bool) -> Vec<u8> {
        let mut bytes: Vec<u8> = records.iter().flat_map(|r| r.encode()).collect();
        if terminate {
            bytes.extend_from_slice(&[0xFF; ROM_RECORD_SIZE]);
        }
        bytes
    }

    #[test]
    fn test_record_layout() {
        let record = RomRecord::new("GAME", 3, 0x0002_0000, 0x0001_2345);
        let bytes = record.encode();

        assert_eq!(&bytes[..4], b"GAME");
        assert_eq!(bytes[4], 0);
        assert_eq!(bytes[20], 3);
        assert_eq!(&bytes[21..25], &[0x00, 0x00, 0x02, 0x00]);
        assert_eq!(&bytes[25..29], &[0x45, 0x23, 0x01, 0x00]);
        assert_eq!(RomRecord::decode(&bytes), Some(record));
    }

    #[test]
    fn test_stops_at_first_sentinel() {
        let a = RomRecord::new("A", 1, 0x4000, 0);
        let b = RomRecord::new("B", 2, 0x8000, 0x4000);
        let mut bytes = table(&[a], true);
        // registro válido depois do terminador não deve aparecer
        bytes.extend_from_slice(&b.encode());

        assert_eq!(read_table(&bytes), vec![a]);
    }

    #[test]
    fn test_immediate_sentinel_is_empty() {
        assert!(read_table(&[0xFF; ROM_RECORD_SIZE * 2]).is_empty());
        assert!(read_table(&[]).is_empty());
    }

    #[test]
    fn test_never_more_than_256_records() {
        let records: Vec<RomRecord> = (0..300u32)
            .map(|i| RomRecord::new("X", 2, 0x8000, i * 0x8000))
            .collect();
        let parsed = read_table(&table(&records, false));
        assert_eq!(parsed.len(), MAX_ROM_RECORDS);
        assert_eq!(parsed[255].offset, 255 * 0x8000);
    }

    #[test]
    fn test_truncated_record_ends_table() {
        let a = RomRecord::new("A", 1, 0x4000, 0);
        let mut bytes = table(&[a, a], false);
        bytes.truncate(ROM_RECORD_SIZE + 10);
        assert_eq!(read_table(&bytes).len(), 1);
    }

    #[test]
    fn test_name_trims_padding() {
        let mut record = RomRecord::new("Knightmare", 7, 0, 0);
        assert_eq!(record.name(), "Knightmare");

        record.name = *b"Metal Gear          ";
        assert_eq!(record.name(), "Metal Gear");

        record.name = [b'N'; ROM_NAME_MAX];
        assert_eq!(record.name().len(), ROM_NAME_MAX);
    }

    #[test]
    fn test_mapper_kind() {
        assert_eq!(
            RomRecord::new("S", 3, 0, 0).mapper_kind(),
            Ok(MapperKind::KonamiSCC)
        );
        assert!(RomRecord::new("S", 0x42, 0, 0).mapper_kind().is_err());
    }
}
