// multirom-rs/src/core/cartridge/mapper/mapper_database.rs

//! Static per-kind mapper layouts.
//!
//! This table is the emulated hardware contract: windows, segment sizes and
//! bank-switch ranges must match the real cartridges.

use super::mapper_common::{MapperConfig, MapperKind, TriggerRange};

const ROM_WINDOW_START: u16 = 0x4000;
const ROM_WINDOW_END: u16 = 0xBFFF;

const NO_TRIGGERS: &[TriggerRange] = &[];

// Konami SCC: 0x800-wide ranges starting at the documented base
const KONAMI_SCC_TRIGGERS: &[TriggerRange] = &[
    TriggerRange::new(0x5000, 0x57FF, 0),
    TriggerRange::new(0x7000, 0x77FF, 1),
    TriggerRange::new(0x9000, 0x97FF, 2),
    TriggerRange::new(0xB000, 0xB7FF, 3),
];

// Konami without SCC: bank 0 is fixed
const KONAMI_TRIGGERS: &[TriggerRange] = &[
    TriggerRange::new(0x6000, 0x67FF, 1),
    TriggerRange::new(0x8000, 0x87FF, 2),
    TriggerRange::new(0xA000, 0xA7FF, 3),
];

const ASCII8_TRIGGERS: &[TriggerRange] = &[
    TriggerRange::new(0x6000, 0x67FF, 0),
    TriggerRange::new(0x6800, 0x6FFF, 1),
    TriggerRange::new(0x7000, 0x77FF, 2),
    TriggerRange::new(0x7800, 0x7FFF, 3),
];

// 0x77FF is used by some games for bank 1 and falls inside the range
const ASCII16_TRIGGERS: &[TriggerRange] = &[
    TriggerRange::new(0x6000, 0x67FF, 0),
    TriggerRange::new(0x7000, 0x77FF, 1),
];

const FOUR_BANKS: &[u8] = &[0, 1, 2, 3];
const TWO_BANKS: &[u8] = &[0, 1];
const SINGLE_BANK: &[u8] = &[0];

const PLAIN16: MapperConfig = MapperConfig {
    kind: MapperKind::Plain16,
    base_offset: 0,
    window_start: ROM_WINDOW_START,
    window_end: ROM_WINDOW_END,
    segment_size: 0x8000,
    trigger_table: NO_TRIGGERS,
    reset_banks: SINGLE_BANK,
};

const PLAIN32: MapperConfig = MapperConfig {
    kind: MapperKind::Plain32,
    ..PLAIN16
};

const LINEAR0_48K: MapperConfig = MapperConfig {
    kind: MapperKind::Linear0_48K,
    base_offset: 0,
    window_start: 0x0000,
    window_end: ROM_WINDOW_END,
    segment_size: 0xC000,
    trigger_table: NO_TRIGGERS,
    reset_banks: SINGLE_BANK,
};

const KONAMI_SCC: MapperConfig = MapperConfig {
    kind: MapperKind::KonamiSCC,
    base_offset: 0,
    window_start: ROM_WINDOW_START,
    window_end: ROM_WINDOW_END,
    segment_size: 0x2000,
    trigger_table: KONAMI_SCC_TRIGGERS,
    reset_banks: FOUR_BANKS,
};

const KONAMI: MapperConfig = MapperConfig {
    kind: MapperKind::Konami,
    trigger_table: KONAMI_TRIGGERS,
    ..KONAMI_SCC
};

const ASCII8: MapperConfig = MapperConfig {
    kind: MapperKind::ASCII8,
    trigger_table: ASCII8_TRIGGERS,
    ..KONAMI_SCC
};

const ASCII16: MapperConfig = MapperConfig {
    kind: MapperKind::ASCII16,
    base_offset: 0,
    window_start: ROM_WINDOW_START,
    window_end: ROM_WINDOW_END,
    segment_size: 0x4000,
    trigger_table: ASCII16_TRIGGERS,
    reset_banks: TWO_BANKS,
};

/// Template configuration for a mapper kind (base offset 0)
pub fn config_for(kind: MapperKind) -> MapperConfig {
    match kind {
        MapperKind::Plain16 => PLAIN16,
        MapperKind::Plain32 => PLAIN32,
        MapperKind::Linear0_48K => LINEAR0_48K,
        MapperKind::Konami => KONAMI,
        MapperKind::KonamiSCC => KONAMI_SCC,
        MapperKind::ASCII8 => ASCII8,
        MapperKind::ASCII16 => ASCII16,
    }
}
