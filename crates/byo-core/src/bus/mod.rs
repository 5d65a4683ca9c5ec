//! Address bus routing reads and writes to attached regions.
//!
//! Regions are kept in attachment order. Lookup scans that order and the
//! first region whose inclusive range `base..=base + length` contains the
//! address wins, so a region's end address is shared with a region attached
//! directly behind it and the earlier attachment services it.
//!
//! All multi-byte values on the bus are big-endian. The `read_u*`/`write_u*`
//! helpers are the single conversion point between bus byte order and host
//! integers.

/// Region capability contract.
pub mod region;

pub use region::Region;

use log::{debug, warn};

use crate::Fault;

/// Stable identifier returned by [`Bus::attach`].
///
/// Identifiers are indices in attachment order and stay valid for the life
/// of the bus because regions are never detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(usize);

impl RegionId {
    /// Zero-based attachment index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

struct Mapping {
    region: Box<dyn Region>,
    base: u64,
    end: u64,
}

impl Mapping {
    const fn contains(&self, address: u64) -> bool {
        self.base <= address && address <= self.end
    }
}

/// Glue between the CPU and every attached region.
///
/// The bus performs no locking. Sharing one bus between several CPUs or
/// with asynchronous peripherals requires the host to serialize access, for
/// example by wrapping the whole bus in a lock or by funnelling requests to
/// a single bus-owning thread.
#[derive(Default)]
pub struct Bus {
    mappings: Vec<Mapping>,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.mappings.iter().map(|m| m.base..=m.end))
            .finish()
    }
}

impl Bus {
    /// Creates a bus with no regions attached.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mappings: Vec::new(),
        }
    }

    /// Attaches `region` at `address` and returns its identifier.
    ///
    /// Overlap with earlier attachments is not rejected; see the module
    /// documentation for how ties are resolved.
    pub fn attach(&mut self, address: u64, region: impl Region + 'static) -> RegionId {
        let end = address.saturating_add(region.length());
        let id = RegionId(self.mappings.len());
        debug!("attach region {} at {address:#010x}..={end:#010x}", id.0);
        self.mappings.push(Mapping {
            region: Box::new(region),
            base: address,
            end,
        });
        id
    }

    /// Number of attached regions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` when no region is attached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Returns the inclusive `(base, end)` bounds of an attached region.
    #[must_use]
    pub fn bounds(&self, id: RegionId) -> Option<(u64, u64)> {
        self.mappings.get(id.0).map(|m| (m.base, m.end))
    }

    /// Translates an absolute address to the region that services it.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when no attached region claims
    /// `address`.
    pub fn lookup(&self, address: u64) -> Result<RegionId, Fault> {
        self.mappings
            .iter()
            .position(|m| m.contains(address))
            .map(RegionId)
            .ok_or_else(|| {
                warn!("bus error at {address:#010x}");
                Fault::RegionNotFound { address }
            })
    }

    /// Reads `buf.len()` bytes starting at `address`.
    ///
    /// The whole access is serviced by the region that owns `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), Fault> {
        let id = self.lookup(address)?;
        self.read_by_id(id, address, buf)
    }

    /// Writes `data` starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn write(&mut self, address: u64, data: &[u8]) -> Result<(), Fault> {
        let id = self.lookup(address)?;
        self.write_by_id(id, address, data)
    }

    /// Reads from a known region, skipping the lookup scan.
    ///
    /// `address` is still absolute; it is translated against the region's
    /// base.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `id` does not name a region of
    /// this bus.
    pub fn read_by_id(&self, id: RegionId, address: u64, buf: &mut [u8]) -> Result<(), Fault> {
        let mapping = self
            .mappings
            .get(id.0)
            .ok_or(Fault::RegionNotFound { address })?;
        mapping
            .region
            .read(address.wrapping_sub(mapping.base), buf);
        Ok(())
    }

    /// Writes to a known region, skipping the lookup scan.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `id` does not name a region of
    /// this bus.
    pub fn write_by_id(&mut self, id: RegionId, address: u64, data: &[u8]) -> Result<(), Fault> {
        let mapping = self
            .mappings
            .get_mut(id.0)
            .ok_or(Fault::RegionNotFound { address })?;
        mapping
            .region
            .write(address.wrapping_sub(mapping.base), data);
        Ok(())
    }

    /// Broadcasts a reset to every region in attachment order.
    pub fn reset(&mut self, power_on: bool) {
        debug!(
            "bus reset (power_on={power_on}) to {} region(s)",
            self.mappings.len()
        );
        for mapping in &mut self.mappings {
            mapping.region.reset(power_on);
        }
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn read_u8(&self, address: u64) -> Result<u8, Fault> {
        let mut buf = [0; 1];
        self.read(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Reads a big-endian word and returns it in host order.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn read_u16(&self, address: u64) -> Result<u16, Fault> {
        let mut buf = [0; 2];
        self.read(address, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Reads a big-endian long word and returns it in host order.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn read_u32(&self, address: u64) -> Result<u32, Fault> {
        let mut buf = [0; 4];
        self.read(address, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn write_u8(&mut self, address: u64, value: u8) -> Result<(), Fault> {
        self.write(address, &[value])
    }

    /// Writes a host-order word in big-endian byte order.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn write_u16(&mut self, address: u64, value: u16) -> Result<(), Fault> {
        self.write(address, &value.to_be_bytes())
    }

    /// Writes a host-order long word in big-endian byte order.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::RegionNotFound`] when `address` is unmapped.
    pub fn write_u32(&mut self, address: u64, value: u32) -> Result<(), Fault> {
        self.write(address, &value.to_be_bytes())
    }
}
