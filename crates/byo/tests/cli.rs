//! Integration tests for the byo CLI.

use byo_core as _;
use log as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("byo")
}

/// Boot image: SSP 0x9000, PC 0x0008, then `moveq #5,d1; add.l d1,d1; nop`.
fn write_boot_rom(dir: &Path) -> PathBuf {
    let mut image = Vec::new();
    image.extend_from_slice(&0x0000_9000_u32.to_be_bytes());
    image.extend_from_slice(&0x0000_0008_u32.to_be_bytes());
    for word in [0x7205_u16, 0xD281, 0x4E71] {
        image.extend_from_slice(&word.to_be_bytes());
    }
    let path = dir.join("boot.bin");
    fs::write(&path, image).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run byo")
}

#[test]
fn boots_from_rom_and_traces_each_step() {
    let temp_dir = tempfile::tempdir().unwrap();
    let rom = write_boot_rom(temp_dir.path());
    let rom_arg = format!("{}@0x0000", rom.to_str().unwrap());

    let output = run(&[
        "--rom",
        &rom_arg,
        "--ram",
        "0x8000@0x8000",
        "--steps",
        "3",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("00000008  moveq\t#5,d1"));
    assert!(stdout.contains("0000000a  add.l\td1,d1"));
    assert!(stdout.contains("0000000c  nop"));
    assert!(stdout.contains("d1 0000000a"));
    assert!(stdout.contains("a7 00009000"));
    assert!(stdout.contains("pc 0000000e  sr 2700"));
}

#[test]
fn load_images_land_after_power_on_clear() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = temp_dir.path().join("program.bin");
    let mut image = Vec::new();
    image.extend_from_slice(&0x0000_4000_u32.to_be_bytes());
    image.extend_from_slice(&0x0000_0100_u32.to_be_bytes());
    fs::write(&program, image).unwrap();
    let code = temp_dir.path().join("code.bin");
    fs::write(&code, 0x707F_u16.to_be_bytes()).unwrap();

    let program_arg = format!("{}@0", program.to_str().unwrap());
    let code_arg = format!("{}@0x100", code.to_str().unwrap());
    let output = run(&["--load", &program_arg, "--load", &code_arg]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("00000100  moveq\t#127,d0"));
    assert!(stdout.contains("d0 0000007f"));
}

#[test]
fn invalid_opcode_exits_with_fault_text() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = temp_dir.path().join("bad.bin");
    let mut image = Vec::new();
    image.extend_from_slice(&0x0000_4000_u32.to_be_bytes());
    image.extend_from_slice(&0x0000_0008_u32.to_be_bytes());
    image.extend_from_slice(&0x4AFC_u16.to_be_bytes());
    fs::write(&program, image).unwrap();

    let program_arg = format!("{}@0", program.to_str().unwrap());
    let output = run(&["--load", &program_arg]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("4afc") || stderr.contains("4AFC"));
}

#[test]
fn missing_rom_file_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("nope.bin");
    let arg = format!("{}@0", missing.to_str().unwrap());

    let output = run(&["--rom", &arg]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read ROM image"));
}

#[test]
fn unknown_cpu_prints_usage() {
    let output = run(&["--cpu", "6502"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid CPU type: 6502"));
    assert!(stderr.contains("Usage: byo"));
}

#[test]
fn help_exits_cleanly() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--steps <n>"));
}
