// Este é o ponto de entrada principal da biblioteca.
// O mesmo código roda no microcontrolador (staticlib) e no host (testes e simulação).

// Módulos principais do projeto.
pub mod core;
pub mod utils;

// Re-exportações para facilitar o uso.
pub use crate::core::bus::{BusController, BusCycle, BusPins, ControlLines, ScriptedBus};
pub use crate::core::cartridge::config::{read_table, RomRecord};
pub use crate::core::cartridge::mapper::{
    Mapper, MapperConfig, MapperEngine, MapperKind, MapperResponse,
};
pub use crate::core::cartridge::menu::{MenuEvent, MenuSession};
pub use crate::core::memory::{CombinedImage, MemoryError, MemoryResult, RomBackingStore};
pub use crate::core::storage::{BlockDevice, MemoryDisk, StorageBridge, StorageError};
pub use crate::core::system::{Firmware, HandoffCell, IoTask, MapperTask, SlotConfig, TaskExit};

/// Versão do firmware.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Função conveniente para inicializar o firmware a partir da imagem combinada.
pub fn boot(image: &[u8], firmware_len: usize) -> Firmware<'_> {
    Firmware::boot(CombinedImage::new(image, firmware_len))
}
