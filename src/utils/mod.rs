//! Funções utilitárias compartilhadas pelo núcleo.

use num_traits::PrimInt;

/// Accumulates `byte` into `acc` as the `index`-th little-endian byte.
///
/// Bytes beyond the width of `T` are dropped.
#[inline]
pub fn accumulate_le<T: PrimInt>(acc: T, byte: u8, index: usize) -> T {
    let width = std::mem::size_of::<T>();
    if index >= width {
        return acc;
    }
    match T::from(byte) {
        Some(value) => acc | (value << (8 * index)),
        None => acc,
    }
}

/// Extracts the `index`-th little-endian byte of `value` (0 beyond its width).
#[inline]
pub fn le_byte<T: PrimInt>(value: T, index: usize) -> u8 {
    if index >= std::mem::size_of::<T>() {
        return 0;
    }
    ((value >> (8 * index)) & T::from(0xFFu8).unwrap_or_else(T::zero))
        .to_u8()
        .unwrap_or(0)
}
