//! Atribuição de pinos do adaptador (palavra GPIO de 32 bits).
//!
//! A0-A15 nos bits 0-15, D0-D7 nos bits 16-23, sinais de controle
//! ativos em nível baixo a partir do bit 24.

pub const ADDR_MASK: u32 = 0x0000_FFFF;

pub const DATA_SHIFT: u32 = 16;
pub const DATA_MASK: u32 = 0x00FF_0000;

pub const PIN_RD: u32 = 24;
pub const PIN_WR: u32 = 25;
pub const PIN_IORQ: u32 = 26;
pub const PIN_SLTSL: u32 = 27;
/// Saída: mantida em nível baixo enquanto o cartucho não está pronto
pub const PIN_WAIT: u32 = 28;
/// Saída: ativa enquanto o cartucho dirige o barramento de dados
pub const PIN_BUSDIR: u32 = 29;

pub const CONTROL_SHIFT: u32 = PIN_RD;
pub const CONTROL_MASK: u32 = 0x0F00_0000;

/// Palavra com todos os sinais de controle em repouso (nível alto)
pub const IDLE_WORD: u32 = CONTROL_MASK;
