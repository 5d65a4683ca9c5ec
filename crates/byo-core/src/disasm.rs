//! Instruction disassembly.
//!
//! Rendering reuses the decoder's field extractors and the table lookup the
//! engine uses, reads the bus only, and never touches the register file.

use crate::decoder::{DecodedInstruction, FieldLayout, Operand};
use crate::encoding::Operation;
use crate::execute::fetch_operand;
use crate::{Bus, Decoder, Fault};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the opcode word.
    pub address: u32,
    /// Length in bytes, extension included.
    pub length: u32,
    /// Opcode word.
    pub opcode: u16,
    /// Mnemonic with size suffix (e.g. `move.l`), or `dc.w` for an illegal
    /// opcode.
    pub mnemonic: String,
    /// Formatted operands (e.g. `d1,a2`), empty when there are none.
    pub operands: String,
    /// Whether the opcode matched no table entry.
    pub is_illegal: bool,
}

impl DisassemblyRow {
    /// Mnemonic and operands joined by a tab, as returned by [`disassemble`].
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{}\t{}", self.mnemonic, self.operands)
        }
    }
}

/// Renders the effective address held in the 6-bit window ending at bit
/// `msb`.
///
/// Register direct, indirect, post-increment and pre-decrement forms render
/// as assembler text; every other mode renders as `<unhandled mode M/R>`.
#[must_use]
pub fn render_effective_address(layout: FieldLayout, opcode: u16, msb: u16) -> String {
    let (mode, reg) = layout.extract(opcode, msb);
    match mode {
        0 => format!("d{reg}"),
        1 => format!("a{reg}"),
        2 => format!("(a{reg})"),
        3 => format!("(a{reg})+"),
        4 => format!("-(a{reg})"),
        _ => format!("<unhandled mode {mode}/{reg}>"),
    }
}

/// Splits an instruction into mnemonic and operand text.
#[allow(clippy::cast_possible_wrap)]
fn render(instr: &DecodedInstruction) -> (String, String) {
    let opcode = instr.opcode;
    let name = instr.operation.mnemonic();
    let sized = format!("{name}.{}", instr.size.suffix());
    let register = (opcode >> 9) & 0x7;
    match instr.operation {
        Operation::Move => (
            sized,
            format!(
                "{},{}",
                render_effective_address(FieldLayout::ModeRegister, opcode, 5),
                render_effective_address(FieldLayout::RegisterMode, opcode, 11)
            ),
        ),
        Operation::Moveq => {
            let data = match instr.source {
                Operand::Quick(value) => value as i32,
                Operand::None | Operand::Ea(_) => 0,
            };
            (name.to_owned(), format!("#{data},d{register}"))
        }
        Operation::Add => {
            let ea = render_effective_address(FieldLayout::ModeRegister, opcode, 5);
            let operands = if opcode & 0x0100 == 0 {
                format!("{ea},d{register}")
            } else {
                format!("d{register},{ea}")
            };
            (sized, operands)
        }
        Operation::Adda => (
            sized,
            format!(
                "{},a{register}",
                render_effective_address(FieldLayout::ModeRegister, opcode, 5)
            ),
        ),
        Operation::Nop => (name.to_owned(), String::new()),
    }
}

fn disassemble_row(bus: &Bus, address: u32) -> Result<DisassemblyRow, Fault> {
    let opcode = bus.read_u16(u64::from(address))?;
    let instr = Decoder::decode(opcode).ok_or(Fault::InvalidOpcode {
        opcode,
        pc: address,
    })?;
    fetch_operand(bus, address.wrapping_add(2), &instr)?;
    let (mnemonic, operands) = render(&instr);
    Ok(DisassemblyRow {
        address,
        length: instr.length(),
        opcode,
        mnemonic,
        operands,
        is_illegal: false,
    })
}

/// Renders the instruction at `address` and returns `(text, length)`.
///
/// The text is the mnemonic, a tab and the operands, e.g. `move.l\td1,a2`.
///
/// # Errors
///
/// Returns [`Fault::InvalidOpcode`] when the opcode matches no table entry
/// and [`Fault::RegionNotFound`] when the opcode or its extension is
/// unmapped.
pub fn disassemble(bus: &Bus, address: u32) -> Result<(String, u32), Fault> {
    let row = disassemble_row(bus, address)?;
    Ok((row.text(), row.length))
}

/// Disassembles up to `count` consecutive instructions starting at `start`.
///
/// Illegal opcodes produce a `dc.w $XXXX` row and the walk continues two
/// bytes later. The walk stops early at the first unmapped address.
#[must_use]
pub fn disassemble_listing(bus: &Bus, start: u32, count: usize) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count);
    let mut address = start;
    for _ in 0..count {
        let row = match disassemble_row(bus, address) {
            Ok(row) => row,
            Err(Fault::InvalidOpcode { opcode, pc }) => DisassemblyRow {
                address: pc,
                length: 2,
                opcode,
                mnemonic: "dc.w".to_owned(),
                operands: format!("${opcode:04X}"),
                is_illegal: true,
            },
            Err(Fault::RegionNotFound { .. }) => break,
        };
        address = address.wrapping_add(row.length);
        rows.push(row);
    }
    rows
}
