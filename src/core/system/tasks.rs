// multirom-rs/src/core/system/tasks.rs

//! Laços de serviço do slot.
//!
//! A tarefa primária atende ciclos de memória com o mapeador; a secundária
//! atende as portas de I/O. Cada uma tem seu próprio `BusController` e as duas
//! só compartilham a `HandoffCell`.

use log::{debug, info};

use crate::core::bus::{BusController, BusPins};
use crate::core::cartridge::mapper::{MapperEngine, MapperResponse};
use crate::core::storage::{BlockDevice, StorageBridge};
use crate::core::system::handoff::HandoffCell;

/// Motivo de saída de uma tarefa
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// O host pediu outra imagem (valor escrito na porta de re-seleção)
    Reselect(u8),
    /// Orçamento de ciclos esgotado (só em simulação)
    Halted,
}

/// Contador de amostras; `None` = sem limite
#[derive(Debug, Clone, Copy)]
struct CycleBudget(Option<u64>);

impl CycleBudget {
    #[inline]
    fn consume(&mut self) -> bool {
        match &mut self.0 {
            None => true,
            Some(0) => false,
            Some(left) => {
                *left -= 1;
                true
            }
        }
    }
}

/// Tarefa primária: ciclos de memória
pub struct MapperTask<'h> {
    engine: MapperEngine,
    handoff: &'h HandoffCell,
    budget: CycleBudget,
}

impl<'h> MapperTask<'h> {
    pub fn new(engine: MapperEngine, handoff: &'h HandoffCell) -> Self {
        Self {
            engine,
            handoff,
            budget: CycleBudget(None),
        }
    }

    pub fn with_cycle_budget(mut self, cycles: Option<u64>) -> Self {
        self.budget = CycleBudget(cycles);
        self
    }

    pub fn engine(&self) -> &MapperEngine {
        &self.engine
    }

    pub fn into_engine(self) -> MapperEngine {
        self.engine
    }

    pub fn run<P: BusPins>(&mut self, bus: &mut BusController<P>) -> TaskExit {
        info!("Mapper task running ({})", self.engine.kind());

        loop {
            // pedidos só entre ciclos
            if let Some(request) = self.handoff.take() {
                info!("Re-select requested: {:#04X}", request);
                return TaskExit::Reselect(request);
            }
            if !self.budget.consume() {
                return TaskExit::Halted;
            }

            let cycle = bus.sample();
            if !cycle.is_memory() {
                continue;
            }

            match self.engine.handle(&cycle) {
                MapperResponse::Drive(value) => bus.respond(&cycle, value),
                MapperResponse::BankSwitch { .. } | MapperResponse::WriteIgnored => {
                    bus.finish_write(&cycle)
                }
                MapperResponse::Ignored => {}
            }
        }
    }
}

/// Tarefa secundária: portas de armazenamento e porta de re-seleção
pub struct IoTask<'h, D: BlockDevice> {
    bridge: StorageBridge<D>,
    handoff: &'h HandoffCell,
    reselect_port: u8,
    budget: CycleBudget,
}

impl<'h, D: BlockDevice> IoTask<'h, D> {
    pub fn new(bridge: StorageBridge<D>, handoff: &'h HandoffCell, reselect_port: u8) -> Self {
        Self {
            bridge,
            handoff,
            reselect_port,
            budget: CycleBudget(None),
        }
    }

    pub fn with_cycle_budget(mut self, cycles: Option<u64>) -> Self {
        self.budget = CycleBudget(cycles);
        self
    }

    pub fn bridge(&self) -> &StorageBridge<D> {
        &self.bridge
    }

    pub fn into_bridge(self) -> StorageBridge<D> {
        self.bridge
    }

    /// Só retorna em simulação; no hardware o laço nunca termina
    pub fn run<P: BusPins>(&mut self, bus: &mut BusController<P>) -> TaskExit {
        info!("I/O task running (re-select port {:#04X})", self.reselect_port);

        while self.budget.consume() {
            let cycle = bus.sample();
            if !cycle.io_request {
                continue;
            }

            if cycle.is_write && cycle.port() == self.reselect_port {
                debug!("Re-select port write {:#04X}", cycle.data);
                self.handoff.publish(cycle.data);
                bus.finish_write(&cycle);
                continue;
            }

            match self.bridge.handle(&cycle) {
                Some(value) => bus.respond(&cycle, value),
                None if cycle.is_write && self.bridge.claims(&cycle) => bus.finish_write(&cycle),
                None => {}
            }
        }

        TaskExit::Halted
    }
}
