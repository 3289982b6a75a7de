//! Sistema de memória do cartucho.
//! Gerencia a imagem combinada gravada na flash e o buffer de ROM em RAM
//! usado durante a emulação.

pub mod layout;
pub mod rom;

// Re-exportações para facilitar o uso
pub use layout::CombinedImage;
pub use rom::RomBackingStore;

/// Tamanho máximo de ROM: 256 bancos de 16KB (4MB), o que um registrador
/// de banco de 8 bits alcança no maior segmento
pub const MAX_ROM_SIZE: usize = 256 * 16 * 1024;

/// Tamanho da região do menu (programa 16KB + área de configuração 16KB)
pub const MENU_REGION_SIZE: usize = 32 * 1024;

/// Deslocamento da tabela de configuração dentro da região do menu
pub const CONFIG_AREA_OFFSET: usize = 0x4000;

/// Erros do sistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    InvalidAddress,
    RomTooLarge,
    InvalidCartridge,
    UnknownMapper(u8),
    NoSuchRecord(usize),
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::InvalidAddress => write!(f, "address outside the combined image"),
            MemoryError::RomTooLarge => write!(f, "ROM image exceeds {} bytes", MAX_ROM_SIZE),
            MemoryError::InvalidCartridge => write!(f, "invalid cartridge image"),
            MemoryError::UnknownMapper(code) => write!(f, "unknown mapper code {}", code),
            MemoryError::NoSuchRecord(index) => write!(f, "no ROM record at index {}", index),
        }
    }
}

impl std::error::Error for MemoryError {}

/// Tipo de resultado para operações de memória
pub type MemoryResult<T> = Result<T, MemoryError>;
