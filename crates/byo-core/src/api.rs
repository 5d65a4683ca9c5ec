//! Public host-facing API for embedding the emulator core.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::state::Registers;
use crate::{Bus, Fault, M68000};

/// Supported CPU models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CpuModel {
    /// Motorola 68000.
    #[default]
    M68000,
}

impl CpuModel {
    /// Name used on the command line and in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::M68000 => "68000",
        }
    }
}

impl fmt::Display for CpuModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a CPU type string names no supported model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid CPU type: {0}")]
pub struct UnknownCpuModel(pub String);

impl FromStr for CpuModel {
    type Err = UnknownCpuModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "68000" => Ok(Self::M68000),
            other => Err(UnknownCpuModel(other.to_owned())),
        }
    }
}

/// Top-level configuration for a CPU instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuConfig {
    /// Model to instantiate.
    pub model: CpuModel,
    /// Emits a `trace` log record with the disassembly of every instruction
    /// before it executes.
    pub trace_instructions: bool,
}

/// Report for one retired instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Retired {
    /// Address of the opcode word.
    pub pc: u32,
    /// Opcode word.
    pub opcode: u16,
    /// Instruction length in bytes, extension included.
    pub length: u32,
}

/// CPU contract consumed by hosts.
///
/// A CPU never owns the bus; every operation borrows it for its duration.
pub trait Cpu: Send + fmt::Debug {
    /// Model implemented by this CPU.
    fn model(&self) -> CpuModel;

    /// Loads the reset vectors from the bus and enters the reset state.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when a vector is unmapped.
    fn reset(&mut self, bus: &Bus) -> Result<(), Fault>;

    /// Executes one instruction at the program counter.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidOpcode`] for an opcode outside the table and
    /// [`Fault::RegionNotFound`] for an unmapped access. The register file is
    /// unchanged after a fault.
    fn step(&mut self, bus: &mut Bus) -> Result<Retired, Fault>;

    /// Programmer-visible registers.
    fn registers(&self) -> &Registers;

    /// Renders the instruction at `address` and returns its length.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidOpcode`] or [`Fault::RegionNotFound`] exactly
    /// as [`Cpu::step`] would for the same bytes.
    fn disassemble(&self, bus: &Bus, address: u32) -> Result<(String, u32), Fault>;
}

/// Creates the CPU selected by `config`.
#[must_use]
pub fn new_cpu(config: &CpuConfig) -> Box<dyn Cpu> {
    match config.model {
        CpuModel::M68000 => Box::new(M68000::new(config.clone())),
    }
}

/// Power-on sequence: broadcast a power-on reset to every region, then reset
/// the CPU so it reads its vectors from the freshly reset bus.
///
/// # Errors
///
/// Returns the fault raised by [`Cpu::reset`].
pub fn power_on(bus: &mut Bus, cpu: &mut dyn Cpu) -> Result<(), Fault> {
    bus.reset(true);
    cpu.reset(bus)
}
