//! Effective-address resolution and operand access.

use crate::decoder::{AddressingMode, Size};
use crate::state::{RegisterField, Registers, STACK_POINTER};
use crate::{Bus, Fault};

/// Where an operand lives once its effective address has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Data register `Dn`.
    DataRegister(RegisterField),
    /// Address register `An`.
    AddressRegister(RegisterField),
    /// Bus address.
    Memory(u32),
    /// Value taken from the extension words.
    Immediate(u32),
}

/// Big-endian word at the start of `extension`; missing bytes read as zero.
const fn extension_word(extension: &[u8]) -> u16 {
    match extension {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        [hi] => u16::from_be_bytes([*hi, 0]),
        [] => 0,
    }
}

fn extension_long(extension: &[u8]) -> u32 {
    let high = u32::from(extension_word(extension));
    let low = u32::from(extension_word(extension.get(2..).unwrap_or_default()));
    (high << 16) | low
}

/// Address register step for `(An)+` and `-(An)`. Byte accesses through the
/// stack pointer move it by two to keep it word aligned.
fn address_step(reg: RegisterField, size: Size) -> u32 {
    if size == Size::Byte && reg == STACK_POINTER {
        2
    } else {
        size.bytes()
    }
}

/// Adds a brief extension word's displacement and index register to `base`.
fn indexed(regs: &Registers, base: u32, brief: u16) -> u32 {
    let index_reg = RegisterField::from_bits(brief >> 12);
    let index = if brief & 0x8000 == 0 {
        regs.d(index_reg)
    } else {
        regs.a(index_reg)
    };
    let index = if brief & 0x0800 == 0 {
        Size::Word.sign_extend(index)
    } else {
        index
    };
    let displacement = Size::Byte.sign_extend(u32::from(brief));
    base.wrapping_add(displacement).wrapping_add(index)
}

/// Resolves `mode` to a [`Location`], applying `(An)+`/`-(An)` register
/// side effects.
///
/// `extension` holds the operand's own extension bytes and
/// `extension_address` is where they sit in the instruction stream, which is
/// the base for PC-relative modes.
pub fn compute_effective_address(
    regs: &mut Registers,
    mode: AddressingMode,
    size: Size,
    extension: &[u8],
    extension_address: u32,
) -> Location {
    let displacement = Size::Word.sign_extend(u32::from(extension_word(extension)));
    match mode {
        AddressingMode::DataDirect(reg) => Location::DataRegister(reg),
        AddressingMode::AddressDirect(reg) => Location::AddressRegister(reg),
        AddressingMode::Indirect(reg) => Location::Memory(regs.a(reg)),
        AddressingMode::PostIncrement(reg) => {
            let address = regs.a(reg);
            regs.set_a(reg, address.wrapping_add(address_step(reg, size)));
            Location::Memory(address)
        }
        AddressingMode::PreDecrement(reg) => {
            let address = regs.a(reg).wrapping_sub(address_step(reg, size));
            regs.set_a(reg, address);
            Location::Memory(address)
        }
        AddressingMode::Displacement(reg) => {
            Location::Memory(regs.a(reg).wrapping_add(displacement))
        }
        AddressingMode::Indexed(reg) => {
            Location::Memory(indexed(regs, regs.a(reg), extension_word(extension)))
        }
        AddressingMode::AbsoluteShort => Location::Memory(displacement),
        AddressingMode::AbsoluteLong => Location::Memory(extension_long(extension)),
        AddressingMode::PcDisplacement => {
            Location::Memory(extension_address.wrapping_add(displacement))
        }
        AddressingMode::PcIndexed => Location::Memory(indexed(
            regs,
            extension_address,
            extension_word(extension),
        )),
        AddressingMode::Immediate => Location::Immediate(match size {
            Size::Byte | Size::Word => u32::from(extension_word(extension)) & size.mask(),
            Size::Long => extension_long(extension),
        }),
    }
}

/// Reads a `size`-wide value from `location`.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when a memory operand is unmapped.
pub fn read_operand(
    regs: &Registers,
    bus: &Bus,
    location: Location,
    size: Size,
) -> Result<u32, Fault> {
    Ok(match location {
        Location::DataRegister(reg) => regs.d(reg) & size.mask(),
        Location::AddressRegister(reg) => regs.a(reg) & size.mask(),
        Location::Immediate(value) => value & size.mask(),
        Location::Memory(address) => {
            let address = u64::from(address);
            match size {
                Size::Byte => u32::from(bus.read_u8(address)?),
                Size::Word => u32::from(bus.read_u16(address)?),
                Size::Long => bus.read_u32(address)?,
            }
        }
    })
}

/// Writes a `size`-wide value to `location`.
///
/// Data register stores replace only the low `size` bits. Address register
/// stores always replace the whole register; callers sign-extend first.
///
/// # Errors
///
/// Returns [`Fault::RegionNotFound`] when a memory operand is unmapped.
#[allow(clippy::cast_possible_truncation)]
pub fn write_operand(
    regs: &mut Registers,
    bus: &mut Bus,
    location: Location,
    size: Size,
    value: u32,
) -> Result<(), Fault> {
    match location {
        Location::DataRegister(reg) => {
            let merged = (regs.d(reg) & !size.mask()) | (value & size.mask());
            regs.set_d(reg, merged);
        }
        Location::AddressRegister(reg) => regs.set_a(reg, value),
        Location::Memory(address) => {
            let address = u64::from(address);
            match size {
                Size::Byte => bus.write_u8(address, value as u8)?,
                Size::Word => bus.write_u16(address, value as u16)?,
                Size::Long => bus.write_u32(address, value)?,
            }
        }
        // The decoder never produces an immediate destination.
        Location::Immediate(_) => {}
    }
    Ok(())
}
