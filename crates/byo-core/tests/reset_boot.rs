//! Reset and boot sequencing integration coverage.

#![allow(clippy::pedantic, clippy::nursery)]

use std::io::Write;

use byo_core::{
    new_cpu, power_on, Bus, Cpu, CpuConfig, Fault, Ram, Rom, FLAG_Z, SR_RESET, SR_SUPERVISOR,
};
use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn vector_image(ssp: u32, pc: u32, program: &[u16]) -> Vec<u8> {
    let mut image = Vec::new();
    image.extend_from_slice(&ssp.to_be_bytes());
    image.extend_from_slice(&pc.to_be_bytes());
    for word in program {
        image.extend_from_slice(&word.to_be_bytes());
    }
    image
}

#[test]
fn reset_reads_stack_pointer_and_program_counter_vectors() {
    let mut bus = Bus::new();
    bus.attach(0x0000, Ram::new(0x8000));
    bus.write_u32(0, 0x0000_8000).expect("mapped");
    bus.write_u32(4, 0x0000_0400).expect("mapped");

    let mut cpu = new_cpu(&CpuConfig::default());
    cpu.reset(&bus).expect("vectors mapped");

    let regs = cpu.registers();
    assert_eq!(regs.sp(), 0x8000);
    assert_eq!(regs.pc(), 0x0400);
    assert_eq!(regs.sr(), SR_RESET);
    assert_ne!(regs.sr() & SR_SUPERVISOR, 0);
}

#[test]
fn reset_without_vector_region_is_a_bus_fault() {
    let mut bus = Bus::new();
    bus.attach(0x1000, Ram::new(0x100));
    let mut cpu = new_cpu(&CpuConfig::default());
    assert_eq!(
        cpu.reset(&bus),
        Err(Fault::RegionNotFound { address: 0 })
    );
}

#[test]
fn power_on_clears_ram_but_keeps_rom() {
    let image = vector_image(0x9000, 0x0008, &[0x7000]);
    let mut bus = Bus::new();
    bus.attach(0x0000, Rom::from_bytes(0x100, &image).expect("fits"));
    bus.attach(0x8000, Ram::new(0x2000));
    bus.write_u16(0x8000, 0xBEEF).expect("mapped");

    let mut cpu = new_cpu(&CpuConfig::default());
    power_on(&mut bus, cpu.as_mut()).expect("boots");

    assert_eq!(bus.read_u16(0x8000), Ok(0));
    assert_eq!(cpu.registers().pc(), 0x0008);
    assert_eq!(cpu.registers().sp(), 0x9000);

    // moveq #0,d0
    cpu.step(&mut bus).expect("retires");
    assert_eq!(cpu.registers().pc(), 0x000A);
    assert_eq!(cpu.registers().ccr(), FLAG_Z);
}

#[test]
fn boots_from_a_rom_file() {
    let image = vector_image(0x9000, 0x0008, &[0x7205, 0xD281, 0x4E71]);
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(&image).expect("write image");

    let mut bus = Bus::new();
    bus.attach(
        0x0000,
        Rom::from_file(0x100, file.path()).expect("rom loads"),
    );
    bus.attach(0x8000, Ram::new(0x2000));

    let mut cpu = new_cpu(&CpuConfig::default());
    power_on(&mut bus, cpu.as_mut()).expect("boots");
    for _ in 0..3 {
        cpu.step(&mut bus).expect("retires");
    }

    let regs = cpu.registers();
    assert_eq!(regs.d(byo_core::RegisterField::from_bits(1)), 10);
    assert_eq!(regs.pc(), 0x000E);
}

#[test]
fn stepping_past_the_rom_end_hits_a_bus_fault() {
    let image = vector_image(0x0000, 0x0008, &[0x4E71]);
    let mut bus = Bus::new();
    bus.attach(0x0000, Rom::from_bytes(10, &image).expect("fits"));

    let mut cpu = new_cpu(&CpuConfig::default());
    power_on(&mut bus, cpu.as_mut()).expect("boots");

    cpu.step(&mut bus).expect("nop retires");
    // The inclusive end at 10 still maps and reads zero, an invalid opcode.
    assert_eq!(
        cpu.step(&mut bus),
        Err(Fault::InvalidOpcode {
            opcode: 0,
            pc: 0x000A
        })
    );
}
