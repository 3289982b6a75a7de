//! Célula de passagem entre as duas tarefas.
//!
//! Um escritor (tarefa de I/O) e um leitor (tarefa do mapeador). Sem mutex:
//! só um `AtomicU16` com um valor sentinela para "vazio".

use std::sync::atomic::{AtomicU16, Ordering};

const EMPTY: u16 = u16::MAX;

#[derive(Debug)]
pub struct HandoffCell {
    slot: AtomicU16,
}

impl HandoffCell {
    pub const fn new() -> Self {
        Self {
            slot: AtomicU16::new(EMPTY),
        }
    }

    /// Publica um pedido; um pedido ainda não consumido é substituído
    pub fn publish(&self, value: u8) {
        self.slot.store(u16::from(value), Ordering::Release);
    }

    /// Consome o pedido pendente, se houver
    pub fn take(&self) -> Option<u8> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            value => Some(value as u8),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Relaxed) != EMPTY
    }
}

impl Default for HandoffCell {
    fn default() -> Self {
        Self::new()
    }
}
