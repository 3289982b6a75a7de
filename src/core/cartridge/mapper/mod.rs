// multirom-rs/src/core/cartridge/mapper/mod.rs

//! Cartridge mapper module
//!
//! Um único motor, guiado por tabela, emula os sete esquemas de troca de
//! bancos suportados. Cada tipo contribui só com um `MapperConfig` estático
//! (janela, tamanho de segmento, faixas de gatilho); o laço de emulação é o
//! mesmo para todos.

pub mod mapper_common;
pub mod mapper_database;

// Re-export types and functions
pub use mapper_common::{BankRegisterFile, MapperConfig, MapperKind, TriggerRange};
pub use mapper_database::config_for;

use crate::core::bus::{bus_trace, BusCycle};
use crate::core::memory::{MemoryError, MemoryResult, RomBackingStore};
use log::{debug, warn};

/// Valor lido quando o offset cai fora do buffer (barramento aberto)
pub const OPEN_BUS: u8 = 0xFF;

/// Interface mínima de um mapeador de cartucho
pub trait Mapper {
    fn read(&self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
    fn reset(&mut self);
}

/// Decisão tomada pelo motor para um ciclo de barramento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperResponse {
    /// Ciclo não endereçado a este cartucho
    Ignored,
    /// Leitura atendida: byte a colocar no barramento
    Drive(u8),
    /// Escrita em faixa de gatilho
    BankSwitch { register: usize, value: u8 },
    /// Escrita dentro da janela mas fora de qualquer gatilho
    WriteIgnored,
}

/// Motor de mapeamento: configuração + registradores de banco + buffer da ROM
#[derive(Debug, Clone)]
pub struct MapperEngine {
    config: MapperConfig,
    banks: BankRegisterFile,
    available_segments: u32,
    store: RomBackingStore,
}

impl MapperEngine {
    /// Cria o motor para o tipo declarado no buffer
    pub fn new(store: RomBackingStore) -> Self {
        // tabela estática sempre válida, base 0
        Self::build(config_for(store.kind()), store)
    }

    /// Cria o motor com uma configuração explícita.
    /// Rejeita janelas que não se dividem em segmentos e bases que estouram 32 bits.
    pub fn with_config(config: MapperConfig, store: RomBackingStore) -> MemoryResult<Self> {
        if !config.is_valid() {
            warn!("Mapper {}: inconsistent configuration rejected", config.kind);
            return Err(MemoryError::InvalidCartridge);
        }

        let span = segments_for(store.size() as u32, config.segment_size)
            .checked_mul(config.segment_size)
            .and_then(|len| len.checked_add(config.base_offset));
        if span.is_none() {
            warn!(
                "Mapper {}: base offset {:#X} overflows the address space",
                config.kind, config.base_offset
            );
            return Err(MemoryError::InvalidCartridge);
        }

        Ok(Self::build(config, store))
    }

    fn build(config: MapperConfig, store: RomBackingStore) -> Self {
        let size = store.size() as u32;
        let available_segments = segments_for(size, config.segment_size);

        debug!(
            "Mapper {}: {} bytes, {} segment(s) of {:#X}",
            config.kind, size, available_segments, config.segment_size
        );

        Self {
            config,
            banks: BankRegisterFile::new(config.reset_banks),
            available_segments,
            store,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn kind(&self) -> MapperKind {
        self.config.kind
    }

    pub fn banks(&self) -> &[u8] {
        self.banks.as_slice()
    }

    pub fn available_segments(&self) -> u32 {
        self.available_segments
    }

    pub fn store(&self) -> &RomBackingStore {
        &self.store
    }

    /// Offset no buffer para uma leitura em `address`, `None` fora da janela
    pub fn offset_for(&self, address: u16) -> Option<u32> {
        if !self.config.in_window(address) {
            return None;
        }

        let relative = u32::from(address - self.config.window_start);
        let segment_size = self.config.segment_size;
        let segment = relative.checked_div(segment_size)? as usize;
        let bank = u32::from(self.banks.get(segment)) % self.available_segments;

        bank.checked_mul(segment_size)?
            .checked_add(relative % segment_size)?
            .checked_add(self.config.base_offset)
    }

    /// Processa um ciclo de memória
    pub fn handle(&mut self, cycle: &BusCycle) -> MapperResponse {
        if !cycle.chip_selected || !self.config.in_window(cycle.address) {
            return MapperResponse::Ignored;
        }

        if cycle.is_read {
            MapperResponse::Drive(self.read(cycle.address))
        } else if cycle.is_write {
            match self.config.trigger_for(cycle.address) {
                Some(register) => {
                    self.banks.set(register, cycle.data);
                    bus_trace!(
                        "{}: bank {} <- {:#04X} (write at {:#06X})",
                        self.config.kind, register, cycle.data, cycle.address
                    );
                    MapperResponse::BankSwitch {
                        register,
                        value: cycle.data,
                    }
                }
                None => MapperResponse::WriteIgnored,
            }
        } else {
            MapperResponse::Ignored
        }
    }
}

/// Segmentos reais da imagem (arredondado para cima, mínimo 1)
fn segments_for(size: u32, segment_size: u32) -> u32 {
    size.div_ceil(segment_size.max(1)).max(1)
}

impl Mapper for MapperEngine {
    fn read(&self, address: u16) -> u8 {
        self.offset_for(address)
            .map(|offset| self.store.read(offset as usize))
            .unwrap_or(OPEN_BUS)
    }

    fn write(&mut self, address: u16, value: u8) {
        if let Some(register) = self.config.trigger_for(address) {
            self.banks.set(register, value);
        }
    }

    fn reset(&mut self) {
        self.banks = BankRegisterFile::new(self.config.reset_banks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Imagem onde cada segmento de 8KB começa com o próprio índice
    fn tagged_store(kind: MapperKind, size: usize) -> RomBackingStore {
        let data: Vec<u8> = (0..size).map(|i| (i / 0x2000) as u8).collect();
        RomBackingStore::from_bytes(&data, kind, "TAGGED").unwrap()
    }

    fn read_cycle(address: u16) -> BusCycle {
        BusCycle::memory_read(address)
    }

    fn write_cycle(address: u16, data: u8) -> BusCycle {
        BusCycle::memory_write(address, data)
    }

    #[test]
    fn test_offsets_per_kind() {
        // (kind, image size, writes, address, expected offset)
        let cases: &[(MapperKind, usize, &[(u16, u8)], u16, u32)] = &[
            (MapperKind::Plain16, 0x4000, &[], 0x4000, 0x0000),
            (MapperKind::Plain16, 0x4000, &[], 0x7FFF, 0x3FFF),
            (MapperKind::Plain32, 0x8000, &[], 0x8000, 0x4000),
            (MapperKind::Plain32, 0x8000, &[], 0xBFFF, 0x7FFF),
            (MapperKind::Linear0_48K, 0xC000, &[], 0x0000, 0x0000),
            (MapperKind::Linear0_48K, 0xC000, &[], 0xBFFF, 0xBFFF),
            (MapperKind::KonamiSCC, 0x20000, &[], 0x6000, 0x2000),
            (MapperKind::KonamiSCC, 0x20000, &[(0x5000, 5)], 0x4010, 0xA010),
            (MapperKind::KonamiSCC, 0x20000, &[(0xB7FF, 9)], 0xBFFF, 0x13FFF),
            (MapperKind::Konami, 0x20000, &[(0x6000, 4)], 0x6001, 0x8001),
            (MapperKind::Konami, 0x20000, &[(0xA000, 7)], 0xA000, 0xE000),
            (MapperKind::ASCII8, 0x20000, &[(0x6800, 3)], 0x6000, 0x6000),
            (MapperKind::ASCII8, 0x20000, &[(0x7800, 0x0F)], 0xA123, 0x1E123),
            (MapperKind::ASCII16, 0x20000, &[(0x6000, 2)], 0x4000, 0x8000),
            (MapperKind::ASCII16, 0x20000, &[(0x77FF, 7)], 0x8001, 0x1C001),
        ];

        for &(kind, size, writes, address, expected) in cases {
            let mut engine = MapperEngine::new(tagged_store(kind, size));
            for &(addr, value) in writes {
                engine.handle(&write_cycle(addr, value));
            }
            assert_eq!(
                engine.offset_for(address),
                Some(expected),
                "{} at {:#06X}",
                kind,
                address
            );
        }
    }

    #[test]
    fn test_bank_values_wrap_modulo_available_segments() {
        // 64KB em segmentos de 8KB = 8 segmentos
        let mut engine = MapperEngine::new(tagged_store(MapperKind::ASCII8, 0x10000));
        assert_eq!(engine.available_segments(), 8);

        engine.handle(&write_cycle(0x6000, 10));
        assert_eq!(engine.offset_for(0x4000), Some(2 * 0x2000));
        assert_eq!(engine.handle(&read_cycle(0x4000)), MapperResponse::Drive(2));
    }

    #[test]
    fn test_non_trigger_writes_never_touch_registers() {
        for kind in MapperKind::ALL {
            let mut engine = MapperEngine::new(tagged_store(kind, 0x20000));
            let config = *engine.config();
            let before = engine.banks().to_vec();

            for address in 0..=0xFFFFu16 {
                if config.trigger_for(address).is_some() {
                    continue;
                }
                engine.handle(&write_cycle(address, 0x5A));
            }

            assert_eq!(engine.banks(), &before[..], "{}", kind);
        }
    }

    #[test]
    fn test_trigger_write_reports_bank_switch() {
        let mut engine = MapperEngine::new(tagged_store(MapperKind::KonamiSCC, 0x20000));
        assert_eq!(
            engine.handle(&write_cycle(0x9000, 6)),
            MapperResponse::BankSwitch { register: 2, value: 6 }
        );
        assert_eq!(engine.banks(), &[0, 1, 6, 3]);
        assert_eq!(engine.handle(&write_cycle(0x9800, 1)), MapperResponse::WriteIgnored);
    }

    #[test]
    fn test_konami_bank_zero_is_fixed() {
        let mut engine = MapperEngine::new(tagged_store(MapperKind::Konami, 0x20000));
        for address in 0x4000..0x6000u16 {
            engine.handle(&write_cycle(address, 9));
        }
        assert_eq!(engine.banks()[0], 0);
    }

    #[test]
    fn test_ignores_unselected_and_out_of_window_cycles() {
        let mut engine = MapperEngine::new(tagged_store(MapperKind::Plain32, 0x8000));

        let mut unselected = read_cycle(0x4000);
        unselected.chip_selected = false;
        assert_eq!(engine.handle(&unselected), MapperResponse::Ignored);
        assert_eq!(engine.handle(&read_cycle(0x0000)), MapperResponse::Ignored);
        assert_eq!(engine.handle(&read_cycle(0xC000)), MapperResponse::Ignored);
    }

    #[test]
    fn test_read_past_store_is_open_bus() {
        // 16KB em janela de 32KB: a metade superior não existe
        let engine = MapperEngine::new(tagged_store(MapperKind::Plain16, 0x4000));
        assert_eq!(engine.read(0x8000), OPEN_BUS);
        assert_eq!(engine.read(0x4000), 0);
    }

    #[test]
    fn test_reset_restores_identity_banks() {
        let mut engine = MapperEngine::new(tagged_store(MapperKind::ASCII16, 0x20000));
        engine.write(0x6000, 4);
        engine.write(0x7000, 5);
        assert_eq!(engine.banks(), &[4, 5]);
        engine.reset();
        assert_eq!(engine.banks(), &[0, 1]);
    }

    #[test]
    fn test_base_offset_shifts_reads() {
        let data: Vec<u8> = (0..0x100).map(|i| i as u8).collect();
        let store = RomBackingStore::from_bytes(&data, MapperKind::Plain16, "BASE").unwrap();
        let config = config_for(MapperKind::Plain16).with_base_offset(0x10);
        let engine = MapperEngine::with_config(config, store).unwrap();
        assert_eq!(engine.read(0x4000), 0x10);
    }

    #[test]
    fn test_with_config_rejects_zero_segment_size() {
        let mut config = config_for(MapperKind::ASCII8);
        config.segment_size = 0;
        let result = MapperEngine::with_config(config, tagged_store(MapperKind::ASCII8, 0x8000));
        assert_eq!(result.unwrap_err(), MemoryError::InvalidCartridge);

        // janela que não fecha em segmentos inteiros
        let mut config = config_for(MapperKind::ASCII16);
        config.segment_size = 0x3000;
        let result = MapperEngine::with_config(config, tagged_store(MapperKind::ASCII16, 0x8000));
        assert_eq!(result.unwrap_err(), MemoryError::InvalidCartridge);
    }

    #[test]
    fn test_with_config_rejects_overflowing_base_offset() {
        let config = config_for(MapperKind::ASCII8).with_base_offset(u32::MAX - 0x100);
        let result = MapperEngine::with_config(config, tagged_store(MapperKind::ASCII8, 0x20000));
        assert_eq!(result.unwrap_err(), MemoryError::InvalidCartridge);

        // no limite exato ainda é aceito
        let config = config_for(MapperKind::ASCII8).with_base_offset(u32::MAX - 0x20000);
        let mut engine =
            MapperEngine::with_config(config, tagged_store(MapperKind::ASCII8, 0x20000)).unwrap();
        engine.handle(&write_cycle(0x6000, 3));
        assert_eq!(engine.read(0x4000), OPEN_BUS);
    }

    #[test]
    fn test_reads_bank_past_256kb() {
        // 512KB ASCII8: 64 segmentos, banco 40 não dá a volta
        let mut engine = MapperEngine::new(tagged_store(MapperKind::ASCII8, 0x80000));
        assert_eq!(engine.available_segments(), 64);
        engine.handle(&write_cycle(0x6000, 40));
        assert_eq!(engine.offset_for(0x4000), Some(40 * 0x2000));
        assert_eq!(engine.handle(&read_cycle(0x4000)), MapperResponse::Drive(40));
    }
}
