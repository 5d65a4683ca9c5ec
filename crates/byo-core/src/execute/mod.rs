//! Instruction execution pipeline.
//!
//! Every table instruction runs the same five stages:
//! 1. Fetch the extension bytes that follow the opcode word
//! 2. Fetch the source operand
//! 3. Resolve (and for read-modify-write families, read) the destination
//! 4. Execute and update the condition codes
//! 5. Store the result
//!
//! Stages work on a scratch copy of the register file that is committed only
//! after the store succeeds, so a faulting instruction leaves the registers
//! exactly as they were. The store is the only memory write.

mod flags;
mod helpers;

pub use flags::{add, logical, FlagsUpdate};
pub use helpers::{compute_effective_address, read_operand, write_operand, Location};

use crate::api::Retired;
use crate::decoder::{DecodedInstruction, Operand, Size};
use crate::encoding::Operation;
use crate::state::Registers;
use crate::{Bus, Decoder, Fault};

/// Largest extension a table instruction carries: two absolute-long or
/// long-immediate operands.
pub const MAX_EXTENSION_BYTES: usize = 8;

/// Extension bytes of one instruction, source operand's first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    bytes: [u8; MAX_EXTENSION_BYTES],
    len: usize,
    source_len: usize,
}

impl Extension {
    /// Bytes owned by the source operand.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.bytes[..self.source_len]
    }

    /// Bytes owned by the destination operand.
    #[must_use]
    pub fn destination(&self) -> &[u8] {
        &self.bytes[self.source_len..self.len]
    }

    /// Number of extension bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the instruction is a single opcode word.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn source_len_u32(&self) -> u32 {
        self.source_len as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn len_u32(&self) -> u32 {
        self.len as u32
    }
}

/// Stage 1: reads the instruction's extension bytes starting at `address`.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when the extension is unmapped.
pub fn fetch_operand(
    bus: &Bus,
    address: u32,
    instr: &DecodedInstruction,
) -> Result<Extension, Fault> {
    let len = (instr.extension_len() as usize).min(MAX_EXTENSION_BYTES);
    let source_len = (instr.source_extension_len() as usize).min(len);
    let mut bytes = [0; MAX_EXTENSION_BYTES];
    if len > 0 {
        bus.read(u64::from(address), &mut bytes[..len])?;
    }
    Ok(Extension {
        bytes,
        len,
        source_len,
    })
}

/// Stage 2: produces the source value.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when a memory source is unmapped.
pub fn fetch_source(
    regs: &mut Registers,
    bus: &Bus,
    instr: &DecodedInstruction,
    extension: &Extension,
    extension_address: u32,
) -> Result<u32, Fault> {
    match instr.source {
        Operand::None => Ok(0),
        Operand::Quick(value) => Ok(value),
        Operand::Ea(mode) => {
            let location = compute_effective_address(
                regs,
                mode,
                instr.size,
                extension.source(),
                extension_address,
            );
            read_operand(regs, bus, location, instr.size)
        }
    }
}

/// Stage 3: resolves the destination and, for read-modify-write families,
/// reads its current value.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when a memory destination that must be
/// read is unmapped.
pub fn fetch_destination(
    regs: &mut Registers,
    bus: &Bus,
    instr: &DecodedInstruction,
    extension: &Extension,
    extension_address: u32,
) -> Result<(Option<Location>, u32), Fault> {
    let Operand::Ea(mode) = instr.destination else {
        return Ok((None, 0));
    };
    let size = instr.destination_size();
    let location = compute_effective_address(
        regs,
        mode,
        size,
        extension.destination(),
        extension_address.wrapping_add(extension.source_len_u32()),
    );
    let value = match instr.operation {
        Operation::Add | Operation::Adda => read_operand(regs, bus, location, size)?,
        Operation::Move | Operation::Moveq | Operation::Nop => 0,
    };
    Ok((Some(location), value))
}

/// Stage 4: computes the result and updates the condition codes.
///
/// `MOVE` into an address register sign-extends the source to 32 bits and
/// `ADDA` sign-extends a word source before the long addition.
pub const fn execute(
    regs: &mut Registers,
    instr: &DecodedInstruction,
    source: u32,
    destination: u32,
) -> u32 {
    match instr.operation {
        Operation::Move => {
            logical(source, instr.size).apply(regs);
            if matches!(instr.destination, Operand::Ea(mode) if mode.is_address_register()) {
                instr.size.sign_extend(source)
            } else {
                source
            }
        }
        Operation::Moveq => {
            logical(source, Size::Long).apply(regs);
            source
        }
        Operation::Add => {
            let (result, update) = add(source, destination, instr.size);
            update.apply(regs);
            result
        }
        Operation::Adda => {
            let (result, update) = add(instr.size.sign_extend(source), destination, Size::Long);
            update.apply(regs);
            result
        }
        Operation::Nop => 0,
    }
}

/// Stage 5: writes the result to the destination.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when a memory destination is unmapped.
pub fn store_destination(
    regs: &mut Registers,
    bus: &mut Bus,
    instr: &DecodedInstruction,
    location: Option<Location>,
    result: u32,
) -> Result<(), Fault> {
    location.map_or(Ok(()), |location| {
        write_operand(regs, bus, location, instr.destination_size(), result)
    })
}

/// Fetches, decodes and executes one instruction at the program counter.
///
/// On success the program counter has advanced past the opcode word and its
/// extension. On a fault the register file is unchanged.
///
/// # Errors
///
/// Returns [`Fault::InvalidOpcode`] when the opcode word matches no table
/// entry and [`Fault::RegionNotFound`] when any access is unmapped.
pub fn step_one(regs: &mut Registers, bus: &mut Bus) -> Result<Retired, Fault> {
    let pc = regs.pc();
    let opcode = bus.read_u16(u64::from(pc))?;
    let instr = Decoder::decode(opcode).ok_or(Fault::InvalidOpcode { opcode, pc })?;

    let extension_address = pc.wrapping_add(2);
    let extension = fetch_operand(bus, extension_address, &instr)?;

    let mut scratch = *regs;
    let source = fetch_source(&mut scratch, bus, &instr, &extension, extension_address)?;
    let (location, destination) =
        fetch_destination(&mut scratch, bus, &instr, &extension, extension_address)?;
    let result = execute(&mut scratch, &instr, source, destination);
    store_destination(&mut scratch, bus, &instr, location, result)?;

    let length = 2 + extension.len_u32();
    scratch.set_pc(pc.wrapping_add(length));
    *regs = scratch;

    Ok(Retired {
        pc,
        opcode,
        length,
    })
}
