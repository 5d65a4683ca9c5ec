//! Processor state: the 68000 register file.

/// Register file and status register bit layout.
pub mod registers;

pub use registers::{
    RegisterField, Registers, CCR_MASK, FLAG_C, FLAG_N, FLAG_V, FLAG_X, FLAG_Z, REGISTER_COUNT,
    SR_INTERRUPT_MASK, SR_RESET, SR_SUPERVISOR, STACK_POINTER,
};
