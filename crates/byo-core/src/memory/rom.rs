use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::Region;

/// Failure to build a ROM from an image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The image could not be read from disk.
    #[error("cannot read ROM image: {0}")]
    Io(#[from] std::io::Error),
    /// The image does not fit in the requested ROM size.
    #[error("ROM overflow: image is {image_len} bytes, ROM is {size} bytes")]
    Overflow {
        /// Image length in bytes.
        image_len: usize,
        /// Requested ROM size in bytes.
        size: usize,
    },
}

/// Read-only memory holding a fixed image. Writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    image: Box<[u8]>,
}

impl Rom {
    /// Builds a `size`-byte ROM whose first bytes are `image`; the rest is
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Overflow`] when `image` is longer than `size`.
    pub fn from_bytes(size: usize, image: &[u8]) -> Result<Self, LoadError> {
        if image.len() > size {
            return Err(LoadError::Overflow {
                image_len: image.len(),
                size,
            });
        }
        let mut bytes = vec![0; size];
        bytes[..image.len()].copy_from_slice(image);
        Ok(Self {
            image: bytes.into_boxed_slice(),
        })
    }

    /// Loads a ROM image from `path` into a `size`-byte ROM.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be read and
    /// [`LoadError::Overflow`] when it is larger than `size`.
    pub fn from_file(size: usize, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let image = fs::read(path)?;
        Self::from_bytes(size, &image)
    }

    /// Loads a ROM sized exactly to the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the file cannot be read.
    pub fn from_file_exact(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let image = fs::read(path)?;
        Self::from_bytes(image.len(), &image)
    }
}

impl Region for Rom {
    fn read(&self, offset: u64, buf: &mut [u8]) {
        super::read_clamped(&self.image, offset, buf);
    }

    fn write(&mut self, offset: u64, data: &[u8]) {
        log::debug!(
            "ignored {}-byte write to ROM offset {offset:#x}",
            data.len()
        );
    }

    fn length(&self) -> u64 {
        self.image.len() as u64
    }

    fn reset(&mut self, _power_on: bool) {}
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{LoadError, Rom};
    use crate::Region;

    #[test]
    fn image_is_padded_to_rom_size() {
        let rom = Rom::from_bytes(8, &[0x4D, 0x50]).expect("fits");
        assert_eq!(rom.length(), 8);

        let mut buf = [0xFF; 4];
        rom.read(0, &mut buf);
        assert_eq!(buf, [0x4D, 0x50, 0, 0]);
    }

    #[test]
    fn writes_and_resets_leave_the_image_untouched() {
        let mut rom = Rom::from_bytes(4, &[1, 2, 3, 4]).expect("fits");
        rom.write(0, &[9, 9]);
        rom.reset(true);

        let mut buf = [0; 4];
        rom.read(0, &mut buf);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn oversized_image_is_rejected() {
        let err = Rom::from_bytes(2, &[0; 3]).expect_err("too large");
        assert!(matches!(
            err,
            LoadError::Overflow {
                image_len: 3,
                size: 2
            }
        ));
    }

    #[test]
    fn image_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[0x4D, 0x50, 0x12]).expect("write image");

        let rom = Rom::from_file(8 * 1024, file.path()).expect("loads");
        let mut buf = [0; 2];
        rom.read(0, &mut buf);
        assert_eq!(u16::from_be_bytes(buf), 0x4D50);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Rom::from_file(16, dir.path().join("absent.bin")).expect_err("missing");
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn exact_load_sizes_the_rom_to_the_image() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[0, 0, 0x90, 0, 0, 0, 0, 8, 0x72, 0x05])
            .expect("write image");

        let rom = Rom::from_file_exact(file.path()).expect("loads");
        assert_eq!(rom.length(), 10);
        let mut buf = [0; 2];
        rom.read(8, &mut buf);
        assert_eq!(buf, [0x72, 0x05]);

        let dir = tempfile::tempdir().expect("temp dir");
        let err = Rom::from_file_exact(dir.path().join("absent.bin")).expect_err("missing");
        assert!(matches!(err, LoadError::Io(_)));
    }
}
