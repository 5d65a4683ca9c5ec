//! Capability contract every memory-mapped device must satisfy.

/// A memory- or I/O-mapped device that can be attached to a [`Bus`](crate::Bus).
///
/// Offsets are region-local: the bus subtracts the region's base address
/// before delegating. Implementations must not panic for any offset inside
/// `0..length()`; bytes requested outside that range are implementation
/// defined but must never reach another region.
pub trait Region: Send {
    /// Fills `buf` with the bytes stored at `offset..offset + buf.len()`.
    fn read(&self, offset: u64, buf: &mut [u8]);

    /// Stores `data` at `offset..offset + data.len()`.
    fn write(&mut self, offset: u64, data: &[u8]);

    /// Total addressable length in bytes.
    fn length(&self) -> u64;

    /// Reset signal. `power_on` distinguishes a cold start from a warm reset.
    fn reset(&mut self, power_on: bool);
}
