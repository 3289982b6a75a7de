//! Sessão do menu.
//!
//! Antes de qualquer jogo, o cartucho se apresenta como uma ROM Plain32
//! contendo o programa do menu e a tabela de configuração. O menu grava o
//! índice escolhido no endereço monitor e reinicia o MSX; a busca do vetor
//! de reset em 0x0000 encerra a sessão.

use log::{debug, info, warn};

use crate::core::bus::BusCycle;
use crate::core::cartridge::config::{MAX_ROM_RECORDS, ROM_RECORD_SIZE};
use crate::core::cartridge::mapper::{MapperEngine, MapperKind, MapperResponse};
use crate::core::memory::{MemoryResult, RomBackingStore};

/// Endereço monitor: logo após a tabela (0x8000 + 29 * 256 + 1)
pub const MONITOR_ADDR: u16 = 0x8000 + (ROM_RECORD_SIZE * MAX_ROM_RECORDS) as u16 + 1;

/// Endereço lido pelo MSX ao reiniciar
pub const RESET_VECTOR: u16 = 0x0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Idle,
    /// Byte do menu a colocar no barramento
    Drive(u8),
    /// O menu gravou um índice no endereço monitor
    Selected(u8),
    /// Índice além da tabela; a seleção foi descartada
    Rejected(u8),
    /// Reset após seleção: carregar a imagem `index`
    Launch(u8),
}

pub struct MenuSession {
    engine: MapperEngine,
    record_count: usize,
    monitor_addr: u16,
    selected: Option<u8>,
}

impl MenuSession {
    /// Prepara a sessão a partir da região de 32KB do menu
    pub fn new(menu_region: &[u8], record_count: usize) -> MemoryResult<Self> {
        let store = RomBackingStore::from_bytes(menu_region, MapperKind::Plain32, "MENU")?;
        info!(
            "Menu session: {} bytes, {} image(s) available",
            menu_region.len(),
            record_count
        );

        Ok(Self {
            engine: MapperEngine::new(store),
            record_count,
            monitor_addr: MONITOR_ADDR,
            selected: None,
        })
    }

    pub fn with_monitor_addr(mut self, address: u16) -> Self {
        self.monitor_addr = address;
        self
    }

    pub fn selected(&self) -> Option<u8> {
        self.selected
    }

    /// Processa um ciclo de memória
    pub fn handle(&mut self, cycle: &BusCycle) -> MenuEvent {
        if cycle.is_read && !cycle.io_request && cycle.address == RESET_VECTOR {
            if let Some(index) = self.selected {
                if usize::from(index) < self.record_count {
                    info!("Menu selection confirmed: image {}", index);
                    return MenuEvent::Launch(index);
                }
                warn!(
                    "Selected image {} is beyond the table ({} records), staying in menu",
                    index, self.record_count
                );
                self.selected = None;
                return MenuEvent::Rejected(index);
            }
        }

        if cycle.chip_selected && cycle.is_write && cycle.address == self.monitor_addr {
            debug!("Menu wrote selection {}", cycle.data);
            self.selected = Some(cycle.data);
            return MenuEvent::Selected(cycle.data);
        }

        match self.engine.handle(cycle) {
            MapperResponse::Drive(value) => MenuEvent::Drive(value),
            _ => MenuEvent::Idle,
        }
    }
}
