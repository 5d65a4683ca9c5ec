#![no_main]

use byo_core::{disassemble, step_one, Bus, Decoder, Fault, Ram, Registers};
use libfuzzer_sys::fuzz_target;

const ORIGIN: u64 = 0x1000;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let opcode = u16::from_be_bytes([data[0], data[1]]);
    let decoded = Decoder::decode(opcode);

    let mut bus = Bus::new();
    bus.attach(0, Ram::new(0x4000));
    let program = &data[..data.len().min(0x100)];
    if bus.write(ORIGIN, program).is_err() {
        return;
    }

    let listed = disassemble(&bus, 0x1000);
    let mut regs = Registers::default();
    regs.set_pc(0x1000);
    for (n, byte) in data.iter().skip(2).take(16).enumerate() {
        let value = u32::from(*byte) << 8 | 0x100;
        let reg = byo_core::RegisterField::from_bits(n as u16);
        if n < 8 {
            regs.set_d(reg, value);
        } else {
            regs.set_a(reg, value);
        }
    }
    let before = regs;
    let stepped = step_one(&mut regs, &mut bus);

    match stepped {
        Ok(retired) => {
            assert!(decoded.is_some());
            assert_eq!(listed.map(|(_, len)| len), Ok(retired.length));
        }
        Err(Fault::InvalidOpcode { .. }) => {
            assert!(decoded.is_none());
            assert_eq!(regs, before);
        }
        Err(Fault::RegionNotFound { .. }) => assert_eq!(regs, before),
    }
});
