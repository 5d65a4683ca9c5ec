//! Reference region backings: zero-initialized RAM and image-backed ROM.

/// Read/write memory cleared on power-on.
pub mod ram;
/// Read-only image memory.
pub mod rom;

pub use ram::Ram;
pub use rom::{LoadError, Rom};

/// Copies the in-range part of `backing[offset..]` into `buf` and zero-fills
/// whatever falls past the end of the backing store.
fn read_clamped(backing: &[u8], offset: u64, buf: &mut [u8]) {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(backing.len());
    let available = &backing[start..];
    let copied = available.len().min(buf.len());
    buf[..copied].copy_from_slice(&available[..copied]);
    buf[copied..].fill(0);
    if copied < buf.len() {
        log::warn!(
            "read of {} byte(s) at offset {offset:#x} runs past region end {:#x}",
            buf.len(),
            backing.len()
        );
    }
}

/// Stores the in-range part of `data` at `backing[offset..]`; the rest is
/// dropped.
fn write_clamped(backing: &mut [u8], offset: u64, data: &[u8]) {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(backing.len());
    let available = &mut backing[start..];
    let copied = available.len().min(data.len());
    available[..copied].copy_from_slice(&data[..copied]);
    if copied < data.len() {
        log::warn!(
            "write of {} byte(s) at offset {offset:#x} runs past region end {:#x}",
            data.len(),
            backing.len()
        );
    }
}
