// multirom-rs/src/core/system/mod.rs

//! Runtime do slot: boot a partir da imagem combinada, sessão do menu,
//! carga da imagem escolhida e montagem das duas tarefas.

pub mod handoff;
pub mod tasks;

pub use handoff::HandoffCell;
pub use tasks::{IoTask, MapperTask, TaskExit};

use log::{info, warn};

use crate::core::bus::{BusController, BusPins, DEFAULT_POLL_LIMIT};
use crate::core::cartridge::config::{read_table, RomRecord};
use crate::core::cartridge::mapper::MapperEngine;
use crate::core::cartridge::menu::{MenuEvent, MenuSession, MONITOR_ADDR};
use crate::core::memory::{CombinedImage, MemoryError, MemoryResult, RomBackingStore};
use crate::core::storage::{BlockDevice, StorageBridge, CONTROL_PORT, DATA_PORT};

/// Porta de re-seleção padrão
pub const RESELECT_PORT: u8 = 0x9D;

/// Parâmetros ajustáveis do slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConfig {
    pub control_port: u8,
    pub data_port: u8,
    pub reselect_port: u8,
    pub monitor_addr: u16,
    /// Leituras máximas ao esperar um strobe (builds hospedados)
    pub poll_limit: u32,
    /// Amostras por laço antes de desistir; `None` no hardware
    pub cycle_budget: Option<u64>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            control_port: CONTROL_PORT,
            data_port: DATA_PORT,
            reselect_port: RESELECT_PORT,
            monitor_addr: MONITOR_ADDR,
            poll_limit: DEFAULT_POLL_LIMIT,
            cycle_budget: None,
        }
    }
}

/// Estado do firmware após o boot
pub struct Firmware<'a> {
    image: CombinedImage<'a>,
    records: Vec<RomRecord>,
    config: SlotConfig,
}

impl<'a> Firmware<'a> {
    /// Lê a tabela de configuração da imagem combinada
    pub fn boot(image: CombinedImage<'a>) -> Self {
        let records = read_table(image.table_region());
        if records.is_empty() {
            warn!("No usable ROM records in the configuration area");
        }
        info!(
            "Firmware boot: {} ROM record(s), menu at {:#X}",
            records.len(),
            image.menu_offset()
        );

        Self {
            image,
            records,
            config: SlotConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SlotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn records(&self) -> &[RomRecord] {
        &self.records
    }

    pub fn image(&self) -> &CombinedImage<'a> {
        &self.image
    }

    /// Controlador de barramento com os parâmetros do slot
    pub fn bus<P: BusPins>(&self, pins: P) -> BusController<P> {
        BusController::with_poll_limit(pins, self.config.poll_limit)
    }

    pub fn menu_session(&self) -> MemoryResult<MenuSession> {
        Ok(MenuSession::new(self.image.menu_region(), self.records.len())?
            .with_monitor_addr(self.config.monitor_addr))
    }

    /// Serve o menu até o host confirmar uma seleção.
    /// `None` apenas quando o orçamento de ciclos acaba.
    pub fn run_menu<P: BusPins>(&self, bus: &mut BusController<P>) -> MemoryResult<Option<u8>> {
        let mut menu = self.menu_session()?;
        let mut remaining = self.config.cycle_budget;

        loop {
            if let Some(left) = remaining.as_mut() {
                if *left == 0 {
                    return Ok(None);
                }
                *left -= 1;
            }

            let cycle = bus.sample();
            match menu.handle(&cycle) {
                MenuEvent::Drive(value) => bus.respond(&cycle, value),
                MenuEvent::Selected(_) => bus.finish_write(&cycle),
                MenuEvent::Launch(index) => return Ok(Some(index)),
                MenuEvent::Rejected(_) | MenuEvent::Idle => {}
            }
        }
    }

    /// Copia a imagem `index` para a RAM com WAIT ativo e monta o mapeador
    pub fn load<P: BusPins>(
        &self,
        index: usize,
        bus: &mut BusController<P>,
    ) -> MemoryResult<MapperEngine> {
        let record = self
            .records
            .get(index)
            .ok_or(MemoryError::NoSuchRecord(index))?;

        bus.hold_wait();
        let result = RomBackingStore::load(&self.image, record).map(MapperEngine::new);
        bus.release_wait();

        if let Ok(engine) = &result {
            info!(
                "Image {} '{}' ready: {}, {} segment(s)",
                index,
                record.name(),
                engine.kind(),
                engine.available_segments()
            );
        }
        result
    }

    pub fn mapper_task<'h>(&self, engine: MapperEngine, handoff: &'h HandoffCell) -> MapperTask<'h> {
        MapperTask::new(engine, handoff).with_cycle_budget(self.config.cycle_budget)
    }

    pub fn io_task<'h, D: BlockDevice>(&self, device: D, handoff: &'h HandoffCell) -> IoTask<'h, D> {
        let bridge = StorageBridge::with_ports(device, self.config.control_port, self.config.data_port);
        IoTask::new(bridge, handoff, self.config.reselect_port)
            .with_cycle_budget(self.config.cycle_budget)
    }
}
