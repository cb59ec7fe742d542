//! Mock Flash implementation

use crate::platform::error::{FlashError, PlatformError, Result};
use crate::platform::traits::FlashInterface;
use std::vec;
use std::vec::Vec;

const MOCK_FLASH_SIZE: usize = 4096;

/// In-memory Flash region
///
/// Erased bytes read back as 0xFF, matching NOR Flash behavior.
pub struct MockFlash {
    data: Vec<u8>,
}

impl MockFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; MOCK_FLASH_SIZE],
        }
    }

    fn check_bounds(&self, offset: u32, len: usize) -> Result<()> {
        let end = offset as usize + len;
        if end > self.data.len() {
            return Err(PlatformError::Flash(FlashError::OutOfBounds));
        }
        Ok(())
    }
}

impl Default for MockFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashInterface for MockFlash {
    fn read(&self, offset: u32, buffer: &mut [u8]) -> Result<()> {
        self.check_bounds(offset, buffer.len())?;
        let start = offset as usize;
        buffer.copy_from_slice(&self.data[start..start + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()> {
        self.check_bounds(offset, data.len())?;
        let start = offset as usize;
        self.data[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn erase(&mut self, offset: u32, len: u32) -> Result<()> {
        self.check_bounds(offset, len as usize)?;
        let start = offset as usize;
        self.data[start..start + len as usize].fill(0xFF);
        Ok(())
    }

    fn capacity(&self) -> u32 {
        self.data.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let mut flash = MockFlash::new();
        flash.write(16, &[0xAA, 0xBB, 0xCC]).unwrap();

        let mut buf = [0u8; 3];
        flash.read(16, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_erase_restores_ff() {
        let mut flash = MockFlash::new();
        flash.write(0, &[0x00; 8]).unwrap();
        flash.erase(0, 8).unwrap();

        let mut buf = [0u8; 8];
        flash.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 8]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut flash = MockFlash::new();
        let result = flash.write(flash.capacity() - 2, &[0; 4]);
        assert_eq!(result, Err(PlatformError::Flash(FlashError::OutOfBounds)));
    }
}
