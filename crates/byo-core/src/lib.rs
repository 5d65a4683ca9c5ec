//! Core emulator crate: a memory-mapped address bus and a table-driven 68000
//! engine with a matching disassembler.

/// Fault taxonomy shared by the bus and the CPU.
pub mod fault;
pub use fault::{Fault, FaultClass};

/// Address bus and the region capability contract.
pub mod bus;
pub use bus::{Bus, Region, RegionId};

/// Reference RAM and ROM region backings.
pub mod memory;
pub use memory::{LoadError, Ram, Rom};

/// Programmer-visible register file.
pub mod state;
pub use state::{
    RegisterField, Registers, CCR_MASK, FLAG_C, FLAG_N, FLAG_V, FLAG_X, FLAG_Z, REGISTER_COUNT,
    SR_INTERRUPT_MASK, SR_RESET, SR_SUPERVISOR, STACK_POINTER,
};

/// Read-only instruction descriptor table.
pub mod encoding;
pub use encoding::{InstructionDescriptor, Operation, INSTRUCTION_TABLE};

/// Opcode field extraction and instruction decode.
pub mod decoder;
pub use decoder::{AddressingMode, DecodedInstruction, Decoder, FieldLayout, Operand, Size};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{step_one, FlagsUpdate, Location};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble, disassemble_listing, DisassemblyRow};

/// Public host-facing API contract and configuration.
pub mod api;
pub use api::{new_cpu, power_on, Cpu, CpuConfig, CpuModel, Retired, UnknownCpuModel};

/// 68000 CPU implementation.
pub mod cpu;
pub use cpu::{M68000, RESET_PC_VECTOR, RESET_SSP_VECTOR};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
