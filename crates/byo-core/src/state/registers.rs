use std::fmt;

/// Number of data registers (`D0..D7`) and of address registers (`A0..A7`).
pub const REGISTER_COUNT: usize = 8;
/// Condition code: carry.
pub const FLAG_C: u16 = 1 << 0;
/// Condition code: overflow.
pub const FLAG_V: u16 = 1 << 1;
/// Condition code: zero.
pub const FLAG_Z: u16 = 1 << 2;
/// Condition code: negative.
pub const FLAG_N: u16 = 1 << 3;
/// Condition code: extend.
pub const FLAG_X: u16 = 1 << 4;
/// Mask of the user-visible condition code bits (`X/N/Z/V/C`).
pub const CCR_MASK: u16 = FLAG_X | FLAG_N | FLAG_Z | FLAG_V | FLAG_C;
/// Interrupt priority mask field.
pub const SR_INTERRUPT_MASK: u16 = 0x0700;
/// Supervisor state bit.
pub const SR_SUPERVISOR: u16 = 1 << 13;
/// Status register value loaded on reset: supervisor state, interrupts
/// masked at level 7.
pub const SR_RESET: u16 = SR_SUPERVISOR | SR_INTERRUPT_MASK;
/// Address register used as the active stack pointer.
pub const STACK_POINTER: RegisterField = RegisterField::from_bits(7);

/// A 3-bit register number taken from an opcode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterField(u8);

impl RegisterField {
    /// Keeps the low three bits of `bits`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u16) -> Self {
        Self((bits & 0x7) as u8)
    }

    /// Register number in `0..=7`.
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegisterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 68000 programmer-visible register file.
///
/// Values are held in host byte order; conversion to bus order happens at
/// the bus boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Registers {
    d: [u32; REGISTER_COUNT],
    a: [u32; REGISTER_COUNT],
    pc: u32,
    sr: u16,
}

impl Registers {
    /// Reads data register `Dn`.
    #[must_use]
    pub const fn d(&self, reg: RegisterField) -> u32 {
        self.d[reg.index()]
    }

    /// Writes data register `Dn`.
    pub const fn set_d(&mut self, reg: RegisterField, value: u32) {
        self.d[reg.index()] = value;
    }

    /// Reads address register `An`.
    #[must_use]
    pub const fn a(&self, reg: RegisterField) -> u32 {
        self.a[reg.index()]
    }

    /// Writes address register `An`.
    pub const fn set_a(&mut self, reg: RegisterField, value: u32) {
        self.a[reg.index()] = value;
    }

    /// Reads the active stack pointer (`A7`).
    #[must_use]
    pub const fn sp(&self) -> u32 {
        self.a(STACK_POINTER)
    }

    /// Writes the active stack pointer (`A7`).
    pub const fn set_sp(&mut self, value: u32) {
        self.set_a(STACK_POINTER, value);
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u32) {
        self.pc = value;
    }

    /// Reads the full status register.
    #[must_use]
    pub const fn sr(&self) -> u16 {
        self.sr
    }

    /// Writes the full status register, privileged byte included.
    pub const fn set_sr(&mut self, value: u16) {
        self.sr = value;
    }

    /// Reads the condition code bits.
    #[must_use]
    pub const fn ccr(&self) -> u16 {
        self.sr & CCR_MASK
    }

    /// Replaces the condition code bits and leaves the rest of SR alone.
    pub const fn set_ccr(&mut self, value: u16) {
        self.sr = (self.sr & !CCR_MASK) | (value & CCR_MASK);
    }

    /// Returns `true` when a condition code bit is set.
    #[must_use]
    pub const fn flag_is_set(&self, flag: u16) -> bool {
        self.sr & flag & CCR_MASK != 0
    }

    /// Sets or clears condition code bits. Bits outside [`CCR_MASK`] are
    /// ignored.
    pub const fn set_flag(&mut self, flag: u16, enabled: bool) {
        if enabled {
            self.sr |= flag & CCR_MASK;
        } else {
            self.sr &= !(flag & CCR_MASK);
        }
    }

    /// Returns `true` in supervisor state.
    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        self.sr & SR_SUPERVISOR != 0
    }

    /// Renders the condition codes as `XNZVC`, with `-` for a clear bit.
    #[must_use]
    pub fn condition_codes_text(&self) -> String {
        [
            (FLAG_X, 'X'),
            (FLAG_N, 'N'),
            (FLAG_Z, 'Z'),
            (FLAG_V, 'V'),
            (FLAG_C, 'C'),
        ]
        .iter()
        .map(|&(flag, name)| if self.flag_is_set(flag) { name } else { '-' })
        .collect()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, (d, a)) in self.d.iter().zip(self.a.iter()).enumerate() {
            writeln!(f, "d{n} {d:08x}  a{n} {a:08x}")?;
        }
        write!(
            f,
            "pc {:08x}  sr {:04x}  {}",
            self.pc,
            self.sr,
            self.condition_codes_text()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{
        RegisterField, Registers, CCR_MASK, FLAG_C, FLAG_N, FLAG_V, FLAG_X, FLAG_Z, SR_RESET,
    };

    fn reg(n: u16) -> RegisterField {
        RegisterField::from_bits(n)
    }

    #[test]
    fn register_field_keeps_low_three_bits() {
        for bits in 0_u16..=0xFF {
            assert_eq!(u16::from(RegisterField::from_bits(bits).number()), bits & 7);
        }
    }

    #[test]
    fn data_and_address_files_are_independent() {
        let mut regs = Registers::default();
        for n in 0..8 {
            regs.set_d(reg(n), 0x1000 + u32::from(n));
            regs.set_a(reg(n), 0x2000 + u32::from(n));
        }
        for n in 0..8 {
            assert_eq!(regs.d(reg(n)), 0x1000 + u32::from(n));
            assert_eq!(regs.a(reg(n)), 0x2000 + u32::from(n));
        }
        assert_eq!(regs.sp(), 0x2007);
    }

    #[test]
    fn flag_writes_never_touch_the_system_byte() {
        let mut regs = Registers::default();
        regs.set_sr(SR_RESET);

        regs.set_flag(0xFFFF, true);
        assert_eq!(regs.sr(), SR_RESET | CCR_MASK);

        regs.set_flag(0xFFFF, false);
        assert_eq!(regs.sr(), SR_RESET);

        regs.set_ccr(0xFFFF);
        assert_eq!(regs.sr(), SR_RESET | CCR_MASK);
        assert!(regs.is_supervisor());
    }

    #[test]
    fn individual_flags_can_be_set_and_cleared() {
        let mut regs = Registers::default();
        for flag in [FLAG_C, FLAG_V, FLAG_Z, FLAG_N, FLAG_X] {
            regs.set_flag(flag, true);
            assert!(regs.flag_is_set(flag));
        }
        for flag in [FLAG_C, FLAG_V, FLAG_Z, FLAG_N, FLAG_X] {
            regs.set_flag(flag, false);
            assert!(!regs.flag_is_set(flag));
        }
        assert_eq!(regs.ccr(), 0);
    }

    #[test]
    fn condition_codes_render_in_xnzvc_order() {
        let mut regs = Registers::default();
        assert_eq!(regs.condition_codes_text(), "-----");

        regs.set_ccr(FLAG_X | FLAG_Z | FLAG_C);
        assert_eq!(regs.condition_codes_text(), "X-Z-C");

        regs.set_ccr(FLAG_N | FLAG_V);
        assert_eq!(regs.condition_codes_text(), "-N-V-");
    }

    #[test]
    fn display_dumps_every_register() {
        let mut regs = Registers::default();
        regs.set_d(reg(3), 0xCAFE_BABE);
        regs.set_pc(0x1000);
        regs.set_sr(SR_RESET | FLAG_Z);

        let text = regs.to_string();
        assert!(text.contains("d3 cafebabe"));
        assert!(text.contains("pc 00001000  sr 2704  --Z--"));
        assert_eq!(text.lines().count(), 9);
    }
}
