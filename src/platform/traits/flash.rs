//! Flash interface trait

use crate::platform::error::Result;

/// Byte-addressable non-volatile storage region
///
/// Offsets are relative to the start of the region reserved for parameter
/// storage, not absolute Flash addresses.
pub trait FlashInterface {
    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&self, offset: u32, buffer: &mut [u8]) -> Result<()>;

    /// Write bytes starting at `offset` (region must be erased first)
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<()>;

    /// Erase `len` bytes starting at `offset`
    fn erase(&mut self, offset: u32, len: u32) -> Result<()>;

    /// Size of the storage region in bytes
    fn capacity(&self) -> u32;
}
