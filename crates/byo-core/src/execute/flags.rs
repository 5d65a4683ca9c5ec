//! Condition code updates for the move and add instruction classes.

use crate::decoder::Size;
use crate::state::{Registers, FLAG_C, FLAG_N, FLAG_V, FLAG_X, FLAG_Z};

/// Describes how the condition codes change after an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// No change.
    #[default]
    None,
    /// Data movement: N and Z from the result, V and C cleared, X kept.
    Logical {
        /// Zero flag.
        zero: bool,
        /// Negative flag.
        negative: bool,
    },
    /// Addition: N, Z, V and C from the operation, X copied from C.
    Arithmetic {
        /// Zero flag.
        zero: bool,
        /// Negative flag.
        negative: bool,
        /// Overflow flag.
        overflow: bool,
        /// Carry flag.
        carry: bool,
    },
}

impl FlagsUpdate {
    /// Writes the update into the condition code register.
    pub const fn apply(self, regs: &mut Registers) {
        match self {
            Self::None => {}
            Self::Logical { zero, negative } => {
                regs.set_flag(FLAG_Z, zero);
                regs.set_flag(FLAG_N, negative);
                regs.set_flag(FLAG_V, false);
                regs.set_flag(FLAG_C, false);
            }
            Self::Arithmetic {
                zero,
                negative,
                overflow,
                carry,
            } => {
                regs.set_flag(FLAG_Z, zero);
                regs.set_flag(FLAG_N, negative);
                regs.set_flag(FLAG_V, overflow);
                regs.set_flag(FLAG_C, carry);
                regs.set_flag(FLAG_X, carry);
            }
        }
    }
}

/// Flags for a moved value of width `size`.
#[must_use]
pub const fn logical(result: u32, size: Size) -> FlagsUpdate {
    FlagsUpdate::Logical {
        zero: result & size.mask() == 0,
        negative: result & size.sign_bit() != 0,
    }
}

/// Adds `source` to `destination` at width `size`.
///
/// Returns the sum truncated to `size` and the resulting flags. Carry is
/// `S·D + ¬R·D + S·¬R` and overflow is `S·D·¬R + ¬S·¬D·R`, both taken at the
/// operand's most significant bit.
#[must_use]
pub const fn add(source: u32, destination: u32, size: Size) -> (u32, FlagsUpdate) {
    let mask = size.mask();
    let msb = size.sign_bit();
    let s = source & mask;
    let d = destination & mask;
    let r = s.wrapping_add(d) & mask;

    let carry = (s & d) | (!r & d) | (s & !r);
    let overflow = (s & d & !r) | (!s & !d & r);

    (
        r,
        FlagsUpdate::Arithmetic {
            zero: r == 0,
            negative: r & msb != 0,
            overflow: overflow & msb != 0,
            carry: carry & msb != 0,
        },
    )
}
