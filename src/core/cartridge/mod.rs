//! Cartridge subsystem: tabela de configuração, motor de mapeamento e a
//! sessão do menu que escolhe qual imagem emular.

pub mod config;
pub mod mapper;
pub mod menu;

pub use config::{read_table, RomRecord, MAX_ROM_RECORDS, ROM_RECORD_SIZE};
pub use mapper::{MapperEngine, MapperKind, MapperResponse};
pub use menu::{MenuEvent, MenuSession};
