//! Fault taxonomy shared by the bus, the engine and the disassembler.

use thiserror::Error;

/// Fault classes used for propagation policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Address did not resolve to any attached region.
    Bus,
    /// Opcode word has no instruction descriptor.
    Decode,
}

/// Every failure the core can report.
///
/// Bus faults abort the in-flight access; there is no bus-error exception
/// vector, the fault is handed back to the caller instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Fault {
    /// No attached region claims `address`.
    #[error("bus error: no region mapped at {address:#010x}")]
    RegionNotFound {
        /// Absolute bus address that failed to resolve.
        address: u64,
    },
    /// The opcode at `pc` is not present in the instruction table.
    #[error("invalid opcode {opcode:#06x} at {pc:#010x}")]
    InvalidOpcode {
        /// Raw 16-bit opcode word.
        opcode: u16,
        /// Address the opcode was fetched from.
        pc: u32,
    },
}

impl Fault {
    /// Returns the class of this fault.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::RegionNotFound { .. } => FaultClass::Bus,
            Self::InvalidOpcode { .. } => FaultClass::Decode,
        }
    }

    /// Invalid opcodes may be skipped or trapped by the caller; bus faults
    /// are fatal to the operation that raised them.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        matches!(self.class(), FaultClass::Decode)
    }
}
