use crate::Region;

/// Zero-initialized read/write memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    bytes: Box<[u8]>,
}

impl Ram {
    /// Allocates `size` bytes of zeroed RAM.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size].into_boxed_slice(),
        }
    }

    /// Raw contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Region for Ram {
    fn read(&self, offset: u64, buf: &mut [u8]) {
        super::read_clamped(&self.bytes, offset, buf);
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        super::write_clamped(&mut self.bytes, offset, data);
    }

    fn length(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn reset(&mut self, power_on: bool) {
        if power_on {
            self.bytes.fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Ram;
    use crate::Region;

    #[test]
    fn ram_round_trips_bytes() {
        let mut ram = Ram::new(8 * 1024);
        ram.write(0x400, &[0x55, 0xAA]);

        let mut buf = [0; 2];
        ram.read(0x400, &mut buf);
        assert_eq!(buf, [0x55, 0xAA]);
        assert_eq!(ram.length(), 8 * 1024);
    }

    #[test]
    fn power_on_reset_clears_contents_and_warm_reset_keeps_them() {
        let mut ram = Ram::new(16);
        ram.write(0, &[1, 2, 3]);

        ram.reset(false);
        assert_eq!(&ram.as_bytes()[..3], &[1, 2, 3]);

        ram.reset(true);
        assert!(ram.as_bytes().iter().all(|byte| *byte == 0));
    }
}
