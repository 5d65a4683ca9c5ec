//! Instruction decoder for the 68000 table.
//!
//! Turns a raw opcode word into a [`DecodedInstruction`] that names the
//! operation, the operand size and both operands. The field extractors used
//! here are also the ones the disassembler renders from, so execution and
//! listing always agree on which register and mode an opcode names.

use std::fmt;

use crate::encoding::{matching_descriptors, Operation};
use crate::state::RegisterField;

/// Order of the two 3-bit fields inside a 6-bit effective-address window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLayout {
    /// Register in the upper three bits, mode in the lower three (the
    /// `MOVE` destination).
    RegisterMode,
    /// Mode in the upper three bits, register in the lower three (every
    /// other effective address).
    ModeRegister,
}

impl FieldLayout {
    /// Extracts `(mode, register)` from the 6-bit window whose most
    /// significant bit is bit `msb` of `opcode`.
    ///
    /// Window bits below bit 0 or above bit 15 read as zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
    pub const fn extract(self, opcode: u16, msb: u16) -> (u8, RegisterField) {
        let window = match ((opcode as u32) << 5).checked_shr(msb as u32) {
            Some(window) => window,
            None => 0,
        };
        let upper = ((window >> 3) & 0x7) as u16;
        let lower = (window & 0x7) as u16;
        match self {
            Self::RegisterMode => (lower as u8, RegisterField::from_bits(upper)),
            Self::ModeRegister => (upper as u8, RegisterField::from_bits(lower)),
        }
    }
}

impl fmt::Display for FieldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RegisterMode => "rm",
            Self::ModeRegister => "mr",
        })
    }
}

/// Operand size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Size {
    /// 8 bits.
    Byte,
    /// 16 bits.
    Word,
    /// 32 bits.
    Long,
}

impl Size {
    /// Decodes the two-bit size field used by `MOVE` (`01`=byte, `11`=word,
    /// `10`=long).
    #[must_use]
    pub const fn from_move_bits(bits: u16) -> Option<Self> {
        match bits & 0x3 {
            1 => Some(Self::Byte),
            3 => Some(Self::Word),
            2 => Some(Self::Long),
            _ => None,
        }
    }

    /// Decodes the standard two-bit size field (`00`=byte, `01`=word,
    /// `10`=long).
    #[must_use]
    pub const fn from_bits(bits: u16) -> Option<Self> {
        match bits & 0x3 {
            0 => Some(Self::Byte),
            1 => Some(Self::Word),
            2 => Some(Self::Long),
            _ => None,
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    /// Mask covering the operand bits.
    #[must_use]
    pub const fn mask(self) -> u32 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::Long => 0xFFFF_FFFF,
        }
    }

    /// The operand's most significant bit.
    #[must_use]
    pub const fn sign_bit(self) -> u32 {
        match self {
            Self::Byte => 0x80,
            Self::Word => 0x8000,
            Self::Long => 0x8000_0000,
        }
    }

    /// Assembler suffix letter.
    #[must_use]
    pub const fn suffix(self) -> char {
        match self {
            Self::Byte => 'b',
            Self::Word => 'w',
            Self::Long => 'l',
        }
    }

    /// Sign-extends the low `self` bits of `value` to 32 bits.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    pub const fn sign_extend(self, value: u32) -> u32 {
        match self {
            Self::Byte => value as u8 as i8 as i32 as u32,
            Self::Word => value as u16 as i16 as i32 as u32,
            Self::Long => value,
        }
    }
}

/// The twelve 68000 effective-address modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// `Dn`
    DataDirect(RegisterField),
    /// `An`
    AddressDirect(RegisterField),
    /// `(An)`
    Indirect(RegisterField),
    /// `(An)+`
    PostIncrement(RegisterField),
    /// `-(An)`
    PreDecrement(RegisterField),
    /// `(d16,An)`
    Displacement(RegisterField),
    /// `(d8,An,Xn)`
    Indexed(RegisterField),
    /// `(xxx).w`
    AbsoluteShort,
    /// `(xxx).l`
    AbsoluteLong,
    /// `(d16,PC)`
    PcDisplacement,
    /// `(d8,PC,Xn)`
    PcIndexed,
    /// `#imm`
    Immediate,
}

impl AddressingMode {
    /// Builds a mode from its 3-bit mode and register fields. Mode 7 with
    /// register 5, 6 or 7 is not an addressing mode.
    #[must_use]
    pub const fn from_fields(mode: u8, reg: RegisterField) -> Option<Self> {
        Some(match mode & 0x7 {
            0 => Self::DataDirect(reg),
            1 => Self::AddressDirect(reg),
            2 => Self::Indirect(reg),
            3 => Self::PostIncrement(reg),
            4 => Self::PreDecrement(reg),
            5 => Self::Displacement(reg),
            6 => Self::Indexed(reg),
            _ => match reg.number() {
                0 => Self::AbsoluteShort,
                1 => Self::AbsoluteLong,
                2 => Self::PcDisplacement,
                3 => Self::PcIndexed,
                4 => Self::Immediate,
                _ => return None,
            },
        })
    }

    /// Decodes the effective address whose 6-bit window ends at bit `msb`.
    #[must_use]
    pub const fn decode(layout: FieldLayout, opcode: u16, msb: u16) -> Option<Self> {
        let (mode, reg) = layout.extract(opcode, msb);
        Self::from_fields(mode, reg)
    }

    /// Number of extension bytes the mode consumes for an operand of `size`.
    #[must_use]
    pub const fn extension_len(self, size: Size) -> u32 {
        match self {
            Self::DataDirect(_)
            | Self::AddressDirect(_)
            | Self::Indirect(_)
            | Self::PostIncrement(_)
            | Self::PreDecrement(_) => 0,
            Self::Displacement(_)
            | Self::Indexed(_)
            | Self::AbsoluteShort
            | Self::PcDisplacement
            | Self::PcIndexed => 2,
            Self::AbsoluteLong => 4,
            Self::Immediate => match size {
                Size::Byte | Size::Word => 2,
                Size::Long => 4,
            },
        }
    }

    /// `An` direct.
    #[must_use]
    pub const fn is_address_register(self) -> bool {
        matches!(self, Self::AddressDirect(_))
    }

    /// Memory modes that may be written: `(An)` through `(xxx).l`.
    #[must_use]
    pub const fn is_memory_alterable(self) -> bool {
        matches!(
            self,
            Self::Indirect(_)
                | Self::PostIncrement(_)
                | Self::PreDecrement(_)
                | Self::Displacement(_)
                | Self::Indexed(_)
                | Self::AbsoluteShort
                | Self::AbsoluteLong
        )
    }

    /// `Dn` plus the memory-alterable modes.
    #[must_use]
    pub const fn is_data_alterable(self) -> bool {
        matches!(self, Self::DataDirect(_)) || self.is_memory_alterable()
    }
}

/// One instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// No operand.
    None,
    /// An effective address.
    Ea(AddressingMode),
    /// Data embedded in the opcode word, already sign-extended.
    Quick(u32),
}

impl Operand {
    /// Extension bytes consumed by this operand.
    #[must_use]
    pub const fn extension_len(self, size: Size) -> u32 {
        match self {
            Self::Ea(mode) => mode.extension_len(size),
            Self::None | Self::Quick(_) => 0,
        }
    }
}

/// Fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedInstruction {
    /// Raw opcode word.
    pub opcode: u16,
    /// Instruction family.
    pub operation: Operation,
    /// Operand size named by the opcode.
    pub size: Size,
    /// Source operand.
    pub source: Operand,
    /// Destination operand.
    pub destination: Operand,
}

impl DecodedInstruction {
    /// Width used to access the destination; address-register arithmetic is
    /// always 32 bits wide.
    #[must_use]
    pub const fn destination_size(&self) -> Size {
        match self.operation {
            Operation::Adda | Operation::Moveq => Size::Long,
            Operation::Move | Operation::Add | Operation::Nop => self.size,
        }
    }

    /// Extension bytes owned by the source operand. They precede the
    /// destination's in the instruction stream.
    #[must_use]
    pub const fn source_extension_len(&self) -> u32 {
        self.source.extension_len(self.size)
    }

    /// Extension bytes owned by the destination operand.
    #[must_use]
    pub const fn destination_extension_len(&self) -> u32 {
        self.destination.extension_len(self.destination_size())
    }

    /// Total extension bytes following the opcode word.
    #[must_use]
    pub const fn extension_len(&self) -> u32 {
        self.source_extension_len() + self.destination_extension_len()
    }

    /// Total instruction length in bytes.
    #[must_use]
    pub const fn length(&self) -> u32 {
        2 + self.extension_len()
    }
}

/// Instruction decoder.
///
/// Looks the opcode up in [`crate::encoding::INSTRUCTION_TABLE`] and lets the
/// first matching family that accepts the opcode's fields produce the
/// decoded form.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit opcode word; `None` means the opcode is invalid.
    #[must_use]
    pub fn decode(opcode: u16) -> Option<DecodedInstruction> {
        matching_descriptors(opcode).find_map(|descriptor| decode_as(descriptor.operation, opcode))
    }
}

/// Decodes `opcode` as a member of `operation`'s family, rejecting field
/// combinations the family does not own.
fn decode_as(operation: Operation, opcode: u16) -> Option<DecodedInstruction> {
    match operation {
        Operation::Move => decode_move(opcode),
        Operation::Moveq => Some(decode_moveq(opcode)),
        Operation::Add => decode_add(opcode),
        Operation::Adda => decode_adda(opcode),
        Operation::Nop => Some(DecodedInstruction {
            opcode,
            operation: Operation::Nop,
            size: Size::Word,
            source: Operand::None,
            destination: Operand::None,
        }),
    }
}

fn decode_move(opcode: u16) -> Option<DecodedInstruction> {
    let size = Size::from_move_bits(opcode >> 12)?;
    let source = AddressingMode::decode(FieldLayout::ModeRegister, opcode, 5)?;
    let destination = AddressingMode::decode(FieldLayout::RegisterMode, opcode, 11)?;

    if size == Size::Byte && (source.is_address_register() || destination.is_address_register())
    {
        return None;
    }
    if !(destination.is_data_alterable() || destination.is_address_register()) {
        return None;
    }

    Some(DecodedInstruction {
        opcode,
        operation: Operation::Move,
        size,
        source: Operand::Ea(source),
        destination: Operand::Ea(destination),
    })
}

#[allow(clippy::cast_lossless)]
const fn decode_moveq(opcode: u16) -> DecodedInstruction {
    DecodedInstruction {
        opcode,
        operation: Operation::Moveq,
        size: Size::Long,
        source: Operand::Quick(Size::Byte.sign_extend(opcode as u32)),
        destination: Operand::Ea(AddressingMode::DataDirect(RegisterField::from_bits(
            opcode >> 9,
        ))),
    }
}

fn decode_add(opcode: u16) -> Option<DecodedInstruction> {
    let data_reg = AddressingMode::DataDirect(RegisterField::from_bits(opcode >> 9));
    let opmode = (opcode >> 6) & 0x7;
    let ea = AddressingMode::decode(FieldLayout::ModeRegister, opcode, 5)?;

    let (size, source, destination) = match opmode {
        0..=2 => {
            let size = Size::from_bits(opmode)?;
            if size == Size::Byte && ea.is_address_register() {
                return None;
            }
            (size, ea, data_reg)
        }
        4..=6 => {
            if !ea.is_memory_alterable() {
                return None;
            }
            (Size::from_bits(opmode - 4)?, data_reg, ea)
        }
        _ => return None,
    };

    Some(DecodedInstruction {
        opcode,
        operation: Operation::Add,
        size,
        source: Operand::Ea(source),
        destination: Operand::Ea(destination),
    })
}

fn decode_adda(opcode: u16) -> Option<DecodedInstruction> {
    let size = if opcode & 0x0100 == 0 {
        Size::Word
    } else {
        Size::Long
    };
    let source = AddressingMode::decode(FieldLayout::ModeRegister, opcode, 5)?;
    Some(DecodedInstruction {
        opcode,
        operation: Operation::Adda,
        size,
        source: Operand::Ea(source),
        destination: Operand::Ea(AddressingMode::AddressDirect(RegisterField::from_bits(
            opcode >> 9,
        ))),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_as, AddressingMode, Decoder, FieldLayout, Operand, Size};
    use crate::encoding::{matching_descriptors, Operation};
    use crate::state::RegisterField;

    fn r(n: u16) -> RegisterField {
        RegisterField::from_bits(n)
    }

    #[test]
    fn field_layouts_read_the_same_window_in_opposite_orders() {
        // move.l d1,a2: destination bits 11..6 = 010 001, source 5..0 = 000 001
        let opcode = 0x2441;
        assert_eq!(FieldLayout::ModeRegister.extract(opcode, 5), (0, r(1)));
        assert_eq!(FieldLayout::RegisterMode.extract(opcode, 11), (1, r(2)));
        assert_eq!(FieldLayout::ModeRegister.to_string(), "mr");
        assert_eq!(FieldLayout::RegisterMode.to_string(), "rm");
    }

    #[test]
    fn field_windows_near_the_word_edges_read_zero_fill() {
        // bits 4..0 of 0x1234 are 10100; bit -1 reads as zero
        assert_eq!(FieldLayout::ModeRegister.extract(0x1234, 4), (5, r(0)));
        assert_eq!(FieldLayout::RegisterMode.extract(0x1234, 0), (0, r(0)));
        assert_eq!(FieldLayout::ModeRegister.extract(0xFFFF, 15), (7, r(7)));
        assert_eq!(FieldLayout::ModeRegister.extract(0xFFFF, 18), (0, r(7)));
        assert_eq!(FieldLayout::ModeRegister.extract(0xFFFF, u16::MAX), (0, r(0)));
    }

    #[test]
    fn move_size_field_uses_move_encoding() {
        assert_eq!(Size::from_move_bits(1), Some(Size::Byte));
        assert_eq!(Size::from_move_bits(2), Some(Size::Long));
        assert_eq!(Size::from_move_bits(3), Some(Size::Word));
        assert_eq!(Size::from_move_bits(0), None);
    }

    #[test]
    fn sign_extension_per_size() {
        assert_eq!(Size::Byte.sign_extend(0x80), 0xFFFF_FF80);
        assert_eq!(Size::Byte.sign_extend(0x1_7F), 0x7F);
        assert_eq!(Size::Word.sign_extend(0x8000), 0xFFFF_8000);
        assert_eq!(Size::Long.sign_extend(0x8000_0000), 0x8000_0000);
    }

    #[test]
    fn mode_seven_register_five_and_up_is_rejected() {
        for reg in 0..=4 {
            assert!(AddressingMode::from_fields(7, r(reg)).is_some());
        }
        for reg in 5..=7 {
            assert!(AddressingMode::from_fields(7, r(reg)).is_none());
        }
    }

    #[test]
    fn extension_lengths_follow_mode_and_size() {
        assert_eq!(AddressingMode::DataDirect(r(0)).extension_len(Size::Long), 0);
        assert_eq!(AddressingMode::Displacement(r(0)).extension_len(Size::Byte), 2);
        assert_eq!(AddressingMode::AbsoluteLong.extension_len(Size::Byte), 4);
        assert_eq!(AddressingMode::Immediate.extension_len(Size::Byte), 2);
        assert_eq!(AddressingMode::Immediate.extension_len(Size::Word), 2);
        assert_eq!(AddressingMode::Immediate.extension_len(Size::Long), 4);
    }

    #[test]
    fn decodes_move_long_to_address_register() {
        let instr = Decoder::decode(0x2441).expect("valid");
        assert_eq!(instr.operation, Operation::Move);
        assert_eq!(instr.size, Size::Long);
        assert_eq!(instr.source, Operand::Ea(AddressingMode::DataDirect(r(1))));
        assert_eq!(
            instr.destination,
            Operand::Ea(AddressingMode::AddressDirect(r(2)))
        );
        assert_eq!(instr.length(), 2);
    }

    #[test]
    fn move_immediate_long_carries_four_extension_bytes() {
        let instr = Decoder::decode(0x203C).expect("valid");
        assert_eq!(instr.source, Operand::Ea(AddressingMode::Immediate));
        assert_eq!(instr.source_extension_len(), 4);
        assert_eq!(instr.length(), 6);
    }

    #[test]
    fn move_rejects_byte_address_register_and_non_alterable_destination() {
        // move.b a0,d1
        assert!(Decoder::decode(0x1208).is_none());
        // move.b d0,a1
        assert!(Decoder::decode(0x1240).is_none());
        // destination (d16,PC)
        assert!(Decoder::decode(0x25C0).is_none());
        // destination #imm
        assert!(Decoder::decode(0x29C0).is_none());
    }

    #[test]
    fn decodes_moveq_with_sign_extended_data() {
        let instr = Decoder::decode(0x70FF).expect("valid");
        assert_eq!(instr.operation, Operation::Moveq);
        assert_eq!(instr.source, Operand::Quick(0xFFFF_FFFF));
        assert_eq!(
            instr.destination,
            Operand::Ea(AddressingMode::DataDirect(r(0)))
        );
        assert!(Decoder::decode(0x7105).is_none());
    }

    #[test]
    fn decodes_add_in_both_directions() {
        let to_register = Decoder::decode(0xD481).expect("add.l d1,d2");
        assert_eq!(to_register.operation, Operation::Add);
        assert_eq!(to_register.size, Size::Long);
        assert_eq!(
            to_register.destination,
            Operand::Ea(AddressingMode::DataDirect(r(2)))
        );

        let to_memory = Decoder::decode(0xD392).expect("add.l d1,(a2)");
        assert_eq!(
            to_memory.source,
            Operand::Ea(AddressingMode::DataDirect(r(1)))
        );
        assert_eq!(
            to_memory.destination,
            Operand::Ea(AddressingMode::Indirect(r(2)))
        );
    }

    #[test]
    fn add_to_non_memory_destination_is_not_add() {
        // Opmode 4..6 with Dn/An are ADDX encodings.
        assert!(Decoder::decode(0xD380).is_none());
        assert!(Decoder::decode(0xD388).is_none());
        // add.b a1,d2
        assert!(Decoder::decode(0xD409).is_none());
    }

    #[test]
    fn adda_claims_opmodes_three_and_seven() {
        let long = Decoder::decode(0xD5C1).expect("adda.l d1,a2");
        assert_eq!(long.operation, Operation::Adda);
        assert_eq!(long.size, Size::Long);
        assert_eq!(
            long.destination,
            Operand::Ea(AddressingMode::AddressDirect(r(2)))
        );

        let word = Decoder::decode(0xD4C1).expect("adda.w d1,a2");
        assert_eq!(word.size, Size::Word);
        assert_eq!(word.destination_size(), Size::Long);
    }

    #[test]
    fn at_most_one_table_entry_accepts_each_opcode() {
        for opcode in 0..=u16::MAX {
            let accepted = matching_descriptors(opcode)
                .filter(|d| decode_as(d.operation, opcode).is_some())
                .count();
            assert!(accepted <= 1, "opcode {opcode:#06x} accepted {accepted} times");
        }
    }
}
