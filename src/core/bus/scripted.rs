//! Barramento roteirizado para testes e simulação no host.
//!
//! Reproduz uma fila de palavras GPIO; quando a fila acaba, o barramento
//! fica ocioso (todos os sinais de controle em repouso).

use std::collections::VecDeque;

use super::pins::IDLE_WORD;
use super::{BusCycle, BusPins};

/// Operação registrada nos pinos, na ordem em que ocorreu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    DataOutput,
    Put(u8),
    DataInput,
    Wait(bool),
    BusDirection(bool),
}

#[derive(Debug, Default)]
pub struct ScriptedBus {
    queue: VecDeque<u32>,
    events: Vec<PinEvent>,
    driven: Vec<u8>,
    samples: usize,
    data_output: bool,
    wait: bool,
    bus_direction: bool,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Um ciclo por palavra, cada um seguido do retorno do strobe ao repouso
    pub fn from_cycles<'c>(cycles: impl IntoIterator<Item = &'c BusCycle>) -> Self {
        let mut bus = Self::new();
        for cycle in cycles {
            bus.push_cycle(cycle);
            bus.push_raw(IDLE_WORD);
        }
        bus
    }

    pub fn push_raw(&mut self, raw: u32) {
        self.queue.push_back(raw);
    }

    pub fn push_cycle(&mut self, cycle: &BusCycle) {
        self.push_raw(cycle.to_gpio());
    }

    /// Palavras ainda não amostradas
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn samples_taken(&self) -> usize {
        self.samples
    }

    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Bytes colocados no barramento, em ordem
    pub fn driven(&self) -> &[u8] {
        &self.driven
    }

    pub fn is_driving(&self) -> bool {
        self.data_output
    }

    pub fn wait_asserted(&self) -> bool {
        self.wait
    }

    pub fn bus_direction(&self) -> bool {
        self.bus_direction
    }
}

impl BusPins for ScriptedBus {
    fn sample_raw(&mut self) -> u32 {
        self.samples += 1;
        self.queue.pop_front().unwrap_or(IDLE_WORD)
    }

    fn set_data_output(&mut self) {
        self.data_output = true;
        self.events.push(PinEvent::DataOutput);
    }

    fn put_data(&mut self, value: u8) {
        self.driven.push(value);
        self.events.push(PinEvent::Put(value));
    }

    fn set_data_input(&mut self) {
        self.data_output = false;
        self.events.push(PinEvent::DataInput);
    }

    fn set_wait(&mut self, asserted: bool) {
        self.wait = asserted;
        self.events.push(PinEvent::Wait(asserted));
    }

    fn set_bus_direction(&mut self, driving: bool) {
        self.bus_direction = driving;
        self.events.push(PinEvent::BusDirection(driving));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_then_idles() {
        let mut bus = ScriptedBus::from_cycles(&[BusCycle::memory_read(0x4000)]);
        assert_eq!(BusCycle::from_gpio(bus.sample_raw()).address, 0x4000);
        assert_eq!(bus.remaining(), 1);
        assert_eq!(bus.sample_raw(), IDLE_WORD);
        assert_eq!(bus.remaining(), 0);
        assert_eq!(bus.sample_raw(), IDLE_WORD);
        assert_eq!(bus.samples_taken(), 3);
    }
}
