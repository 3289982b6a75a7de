//! Núcleo de emulação síncrona ao barramento do cartucho MSX.

pub mod bus;
pub mod cartridge;
pub mod memory;
pub mod storage;
pub mod system;
