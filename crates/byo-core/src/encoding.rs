//! Read-only instruction descriptor table keyed by opcode pattern.

/// Instruction families the engine can execute and disassemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    Move,
    Moveq,
    Add,
    Adda,
    Nop,
}

impl Operation {
    /// Assembler mnemonic without size suffix.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Moveq => "moveq",
            Self::Add => "add",
            Self::Adda => "adda",
            Self::Nop => "nop",
        }
    }
}

/// One table entry: an opcode matches when `opcode & mask == pattern`.
///
/// Register, mode and size fields are left out of `mask` and decoded from
/// the live opcode at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionDescriptor {
    /// Bits that identify the instruction family.
    pub mask: u16,
    /// Required value of the masked bits.
    pub pattern: u16,
    /// Family executed for matching opcodes.
    pub operation: Operation,
}

impl InstructionDescriptor {
    /// Returns `true` when `opcode` carries this descriptor's fixed bits.
    #[must_use]
    pub const fn matches(&self, opcode: u16) -> bool {
        opcode & self.mask == self.pattern
    }
}

const fn entry(mask: u16, pattern: u16, operation: Operation) -> InstructionDescriptor {
    InstructionDescriptor {
        mask,
        pattern,
        operation,
    }
}

/// Instruction table in lookup order.
///
/// Patterns may overlap (`ADDA` sits inside the `ADD` line); the decoder of
/// each family rejects the field combinations that belong to another family,
/// so at most one entry accepts any opcode.
pub const INSTRUCTION_TABLE: &[InstructionDescriptor] = &[
    entry(0xF000, 0x1000, Operation::Move),
    entry(0xF000, 0x2000, Operation::Move),
    entry(0xF000, 0x3000, Operation::Move),
    entry(0xFFFF, 0x4E71, Operation::Nop),
    entry(0xF100, 0x7000, Operation::Moveq),
    entry(0xF0C0, 0xD0C0, Operation::Adda),
    entry(0xF000, 0xD000, Operation::Add),
];

/// Iterates the descriptors whose fixed bits match `opcode`, in table order.
pub fn matching_descriptors(opcode: u16) -> impl Iterator<Item = &'static InstructionDescriptor> {
    INSTRUCTION_TABLE.iter().filter(move |d| d.matches(opcode))
}
