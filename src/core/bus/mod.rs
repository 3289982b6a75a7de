// multirom-rs/src/core/bus/mod.rs

//! Bus cycle controller.
//!
//! Samples the cartridge edge (address, data and the four control lines),
//! drives the data lines for read cycles and controls WAIT/BUSDIR. Knows
//! nothing about cartridges; the mapper engine and the storage bridge decide
//! what to drive.
//!
//! Every driven byte follows the same sequence: BUSDIR on, data lines to
//! output, value placed, poll until the strobe returns idle, data lines back
//! to input, BUSDIR off.

pub mod pins;
pub mod scripted;

pub use scripted::{PinEvent, ScriptedBus};

use bitflags::bitflags;
use pins::{ADDR_MASK, CONTROL_MASK, CONTROL_SHIFT, DATA_MASK, DATA_SHIFT};

cfg_if::cfg_if! {
    if #[cfg(feature = "bus-trace")] {
        /// Log por ciclo, só com a feature `bus-trace`
        macro_rules! bus_trace {
            ($($arg:tt)*) => { log::trace!($($arg)*) };
        }
    } else {
        macro_rules! bus_trace {
            ($($arg:tt)*) => {
                if false {
                    log::trace!($($arg)*)
                }
            };
        }
    }
}
pub(crate) use bus_trace;

/// Limite padrão de leituras ao esperar o strobe (builds hospedados)
pub const DEFAULT_POLL_LIMIT: u32 = 100_000;

bitflags! {
    /// Sinais de controle em lógica positiva ("asserted")
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlLines: u8 {
        const RD = 1 << 0;
        const WR = 1 << 1;
        const IORQ = 1 << 2;
        const SLTSL = 1 << 3;
    }
}

impl ControlLines {
    /// Decodifica os bits de controle (ativos em nível baixo) da palavra GPIO
    pub fn from_gpio(raw: u32) -> Self {
        let level = ((raw & CONTROL_MASK) >> CONTROL_SHIFT) as u8;
        ControlLines::from_bits_truncate(!level)
    }

    /// Bits de controle no formato do fio
    pub fn to_gpio(self) -> u32 {
        (u32::from(!self.bits() & 0x0F) << CONTROL_SHIFT) & CONTROL_MASK
    }
}

/// Snapshot imutável de um instante do barramento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusCycle {
    pub address: u16,
    pub data: u8,
    pub is_read: bool,
    pub is_write: bool,
    pub chip_selected: bool,
    pub io_request: bool,
}

impl BusCycle {
    pub fn from_gpio(raw: u32) -> Self {
        Self::from_parts(
            (raw & ADDR_MASK) as u16,
            ((raw & DATA_MASK) >> DATA_SHIFT) as u8,
            ControlLines::from_gpio(raw),
        )
    }

    pub fn from_parts(address: u16, data: u8, lines: ControlLines) -> Self {
        Self {
            address,
            data,
            is_read: lines.contains(ControlLines::RD),
            is_write: lines.contains(ControlLines::WR),
            chip_selected: lines.contains(ControlLines::SLTSL),
            io_request: lines.contains(ControlLines::IORQ),
        }
    }

    /// Leitura de memória no slot do cartucho
    pub fn memory_read(address: u16) -> Self {
        Self::from_parts(address, 0, ControlLines::SLTSL | ControlLines::RD)
    }

    /// Escrita de memória no slot do cartucho
    pub fn memory_write(address: u16, data: u8) -> Self {
        Self::from_parts(address, data, ControlLines::SLTSL | ControlLines::WR)
    }

    /// Leitura de porta de I/O (porta no byte baixo do endereço)
    pub fn io_read(port: u8) -> Self {
        Self::from_parts(u16::from(port), 0, ControlLines::IORQ | ControlLines::RD)
    }

    pub fn io_write(port: u8, data: u8) -> Self {
        Self::from_parts(u16::from(port), data, ControlLines::IORQ | ControlLines::WR)
    }

    pub fn lines(&self) -> ControlLines {
        let mut lines = ControlLines::empty();
        lines.set(ControlLines::RD, self.is_read);
        lines.set(ControlLines::WR, self.is_write);
        lines.set(ControlLines::IORQ, self.io_request);
        lines.set(ControlLines::SLTSL, self.chip_selected);
        lines
    }

    /// Porta de I/O endereçada
    #[inline]
    pub fn port(&self) -> u8 {
        (self.address & 0x00FF) as u8
    }

    /// Strobe que sustenta este ciclo
    pub fn strobe(&self) -> ControlLines {
        self.lines() & (ControlLines::RD | ControlLines::WR)
    }

    /// Ciclo de memória no slot (não I/O)
    #[inline]
    pub fn is_memory(&self) -> bool {
        self.chip_selected && !self.io_request
    }

    /// Palavra GPIO equivalente (usada por simulação)
    pub fn to_gpio(&self) -> u32 {
        u32::from(self.address)
            | (u32::from(self.data) << DATA_SHIFT)
            | self.lines().to_gpio()
    }
}

/// Acesso aos pinos do adaptador
pub trait BusPins {
    /// Lê a palavra GPIO completa, sem bloquear
    fn sample_raw(&mut self) -> u32;
    fn set_data_output(&mut self);
    fn put_data(&mut self, value: u8);
    fn set_data_input(&mut self);
    /// `true` segura o host (WAIT em nível baixo)
    fn set_wait(&mut self, asserted: bool);
    /// `true` enquanto o cartucho dirige o barramento
    fn set_bus_direction(&mut self, driving: bool);
}

/// Controlador de ciclos sobre um conjunto de pinos
pub struct BusController<P: BusPins> {
    pins: P,
    poll_limit: u32,
}

impl<P: BusPins> BusController<P> {
    pub fn new(pins: P) -> Self {
        Self::with_poll_limit(pins, DEFAULT_POLL_LIMIT)
    }

    pub fn with_poll_limit(pins: P, poll_limit: u32) -> Self {
        Self {
            pins,
            poll_limit: poll_limit.max(1),
        }
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn into_pins(self) -> P {
        self.pins
    }

    pub fn poll_limit(&self) -> u32 {
        self.poll_limit
    }

    /// Amostra o barramento (não bloqueia)
    #[inline]
    pub fn sample(&mut self) -> BusCycle {
        let cycle = BusCycle::from_gpio(self.pins.sample_raw());
        bus_trace!(
            "bus {:#06X} d={:#04X} {:?}",
            cycle.address,
            cycle.data,
            cycle.lines()
        );
        cycle
    }

    /// Coloca `value` no barramento de dados
    #[inline]
    pub fn drive_byte(&mut self, value: u8) {
        self.pins.set_bus_direction(true);
        self.pins.set_data_output();
        self.pins.put_data(value);
    }

    /// Devolve as linhas de dados ao modo de entrada
    #[inline]
    pub fn release(&mut self) {
        self.pins.set_data_input();
        self.pins.set_bus_direction(false);
    }

    /// Atende um ciclo de leitura: dirige, espera o fim do strobe, libera
    pub fn respond(&mut self, cycle: &BusCycle, value: u8) {
        self.drive_byte(value);
        self.wait_strobe_idle(cycle.strobe());
        self.release();
    }

    /// Espera o fim de um ciclo de escrita sem dirigir o barramento
    pub fn finish_write(&mut self, cycle: &BusCycle) {
        self.wait_strobe_idle(cycle.strobe());
    }

    pub fn hold_wait(&mut self) {
        self.pins.set_wait(true);
    }

    pub fn release_wait(&mut self) {
        self.pins.set_wait(false);
    }

    /// Espera até que nenhum dos sinais de `strobe` esteja ativo.
    /// Retorna `false` se o limite de leituras foi atingido.
    pub fn wait_strobe_idle(&mut self, strobe: ControlLines) -> bool {
        if strobe.is_empty() {
            return true;
        }

        poll_until_idle(&mut self.pins, strobe, self.poll_limit)
    }
}

cfg_if::cfg_if! {
    if #[cfg(bare_metal)] {
        // No hardware o strobe sempre volta; sem limite
        #[inline(always)]
        fn poll_until_idle<P: BusPins>(pins: &mut P, strobe: ControlLines, _limit: u32) -> bool {
            while ControlLines::from_gpio(pins.sample_raw()).intersects(strobe) {
                std::hint::spin_loop();
            }
            true
        }
    } else {
        fn poll_until_idle<P: BusPins>(pins: &mut P, strobe: ControlLines, limit: u32) -> bool {
            for _ in 0..limit {
                if !ControlLines::from_gpio(pins.sample_raw()).intersects(strobe) {
                    return true;
                }
            }
            log::warn!("Strobe {:?} still asserted after {} polls", strobe, limit);
            false
        }
    }
}
