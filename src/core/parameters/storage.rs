//! Flash parameter block
//!
//! Layout at the configured offset:
//!
//! ```text
//! +0   magic      u32 LE
//! +4   version    u8
//! +5   count      u8
//! +6   reserved   u16
//! +8   crc32      u32 LE  (over all records)
//! +12  records    count * 12 bytes
//! ```
//!
//! Each record is `name_hash u32 LE | value_bits u32 LE | type u8 | pad[3]`.
//! A bad magic reads as "no block"; a bad CRC is an error so the caller can
//! decide to keep defaults.

use super::registry::{ParamMetadata, ParamType, MAX_PARAMS};
use super::{crc32, hash_param_name};
use crate::platform::error::{FlashError, PlatformError, Result};
use crate::platform::FlashInterface;
use heapless::Vec;

const BLOCK_MAGIC: u32 = 0x4150_5842;
const BLOCK_VERSION: u8 = 1;
const HEADER_SIZE: usize = 12;
const RECORD_SIZE: usize = 12;

/// One persisted parameter
#[derive(Debug, Clone, Copy)]
pub struct ParamRecord {
    pub name_hash: u32,
    pub value_bits: u32,
    pub param_type: ParamType,
}

impl ParamRecord {
    fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.name_hash.to_le_bytes());
        buf[4..8].copy_from_slice(&self.value_bits.to_le_bytes());
        buf[8] = match self.param_type {
            ParamType::Float => 0,
            ParamType::Int32 => 1,
            ParamType::Uint32 => 2,
        };
        buf
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let param_type = match buf[8] {
            0 => ParamType::Float,
            1 => ParamType::Int32,
            2 => ParamType::Uint32,
            _ => return Err(PlatformError::Flash(FlashError::ReadFailed)),
        };
        Ok(Self {
            name_hash: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            value_bits: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            param_type,
        })
    }
}

/// Parameter block reader/writer over a Flash region
pub struct FlashParamStorage<F: FlashInterface> {
    flash: F,
    offset: u32,
}

impl<F: FlashInterface> FlashParamStorage<F> {
    pub fn new(flash: F, offset: u32) -> Self {
        Self { flash, offset }
    }

    /// Write all parameters as a fresh block
    pub fn save(&mut self, params: &[ParamMetadata]) -> Result<()> {
        let count = params.len().min(MAX_PARAMS);
        let total = HEADER_SIZE + count * RECORD_SIZE;
        if self.offset as usize + total > self.flash.capacity() as usize {
            return Err(PlatformError::Flash(FlashError::OutOfBounds));
        }

        let mut records: Vec<u8, { MAX_PARAMS * RECORD_SIZE }> = Vec::new();
        for param in params.iter().take(count) {
            let record = ParamRecord {
                name_hash: hash_param_name(param.name),
                value_bits: param.value.to_bits(),
                param_type: param.value.param_type(),
            };
            // Capacity matches MAX_PARAMS
            let _ = records.extend_from_slice(&record.encode());
        }

        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&BLOCK_MAGIC.to_le_bytes());
        header[4] = BLOCK_VERSION;
        header[5] = count as u8;
        header[8..12].copy_from_slice(&crc32(&records).to_le_bytes());

        self.flash.erase(self.offset, total as u32)?;
        self.flash.write(self.offset, &header)?;
        self.flash.write(self.offset + HEADER_SIZE as u32, &records)?;
        Ok(())
    }

    /// Read the block back
    ///
    /// Returns `Ok(None)` when no block has ever been written.
    pub fn load(&self) -> Result<Option<Vec<ParamRecord, MAX_PARAMS>>> {
        let mut header = [0u8; HEADER_SIZE];
        self.flash.read(self.offset, &mut header)?;

        let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        if magic != BLOCK_MAGIC {
            return Ok(None);
        }
        if header[4] != BLOCK_VERSION {
            return Err(PlatformError::Flash(FlashError::ReadFailed));
        }
        let count = header[5] as usize;
        if count > MAX_PARAMS {
            return Err(PlatformError::Flash(FlashError::ReadFailed));
        }
        let stored_crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        let mut raw: Vec<u8, { MAX_PARAMS * RECORD_SIZE }> = Vec::new();
        // count was range-checked above
        let _ = raw.resize_default(count * RECORD_SIZE);
        self.flash.read(self.offset + HEADER_SIZE as u32, &mut raw)?;

        if crc32(&raw) != stored_crc {
            return Err(PlatformError::Flash(FlashError::ReadFailed));
        }

        let mut records: Vec<ParamRecord, MAX_PARAMS> = Vec::new();
        for chunk in raw.chunks_exact(RECORD_SIZE) {
            let _ = records.push(ParamRecord::decode(chunk)?);
        }
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    fn sample_params() -> [ParamMetadata; 2] {
        [
            ParamMetadata::new_uint32("gps_baud", 115_200, 4800, 921_600),
            ParamMetadata::new_float("trip_total_m", 42.5, 0.0, 1.0e9),
        ]
    }

    #[test]
    fn test_empty_flash_reads_as_no_block() {
        let storage = FlashParamStorage::new(MockFlash::new(), 0);
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = FlashParamStorage::new(MockFlash::new(), 64);
        storage.save(&sample_params()).unwrap();

        let records = storage.load().unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name_hash, hash_param_name("gps_baud"));
        assert_eq!(records[0].value_bits, 115_200);
        assert_eq!(records[1].param_type, ParamType::Float);
        assert_eq!(f32::from_bits(records[1].value_bits), 42.5);
    }

    #[test]
    fn test_corrupt_crc_is_rejected() {
        let mut storage = FlashParamStorage::new(MockFlash::new(), 0);
        storage.save(&sample_params()).unwrap();

        // Flip a bit inside the first record
        let mut byte = [0u8; 1];
        storage.flash.read(HEADER_SIZE as u32, &mut byte).unwrap();
        storage
            .flash
            .write(HEADER_SIZE as u32, &[byte[0] ^ 0x01])
            .unwrap();

        assert!(storage.load().is_err());
    }
}
