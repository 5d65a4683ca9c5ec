//! 68000 CPU: register file plus the table-driven engine.

use log::{debug, log_enabled, trace, Level};

use crate::api::{Cpu, CpuConfig, CpuModel, Retired};
use crate::disasm::disassemble;
use crate::execute::step_one;
use crate::state::{Registers, SR_RESET};
use crate::{Bus, Fault};

/// Address of the initial supervisor stack pointer vector.
pub const RESET_SSP_VECTOR: u64 = 0x0000_0000;
/// Address of the initial program counter vector.
pub const RESET_PC_VECTOR: u64 = 0x0000_0004;

/// Motorola 68000.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct M68000 {
    regs: Registers,
    config: CpuConfig,
}

impl M68000 {
    /// Creates a CPU with all registers zero. Call [`Cpu::reset`] before
    /// stepping.
    #[must_use]
    pub fn new(config: CpuConfig) -> Self {
        Self {
            regs: Registers::default(),
            config,
        }
    }

    /// Configuration the CPU was built with.
    #[must_use]
    pub const fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Mutable register access for hosts and tests.
    pub const fn registers_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }
}

impl Cpu for M68000 {
    fn model(&self) -> CpuModel {
        CpuModel::M68000
    }

    fn reset(&mut self, bus: &Bus) -> Result<(), Fault> {
        let ssp = bus.read_u32(RESET_SSP_VECTOR)?;
        let pc = bus.read_u32(RESET_PC_VECTOR)?;
        self.regs.set_sr(SR_RESET);
        self.regs.set_sp(ssp);
        self.regs.set_pc(pc);
        debug!("reset: ssp={ssp:#010x} pc={pc:#010x}");
        Ok(())
    }

    fn step(&mut self, bus: &mut Bus) -> Result<Retired, Fault> {
        if self.config.trace_instructions && log_enabled!(Level::Trace) {
            let pc = self.regs.pc();
            match disassemble(bus, pc) {
                Ok((text, _)) => trace!("{pc:08x}  {text}"),
                Err(fault) => trace!("{pc:08x}  {fault}"),
            }
        }
        step_one(&mut self.regs, bus).inspect_err(|fault| debug!("step faulted: {fault}"))
    }

    fn registers(&self) -> &Registers {
        &self.regs
    }

    fn disassemble(&self, bus: &Bus, address: u32) -> Result<(String, u32), Fault> {
        disassemble(bus, address)
    }
}
