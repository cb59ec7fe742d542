//! Persistent parameter system
//!
//! Typed parameters identified by short names, persisted to a Flash page as
//! a CRC-validated key/value block. Names are stored as FNV-1a hashes so
//! records stay fixed-size.

pub mod registry;
pub mod storage;

pub use registry::{ParamMetadata, ParamType, ParamValue, ParameterRegistry, RegistryError};
pub use storage::FlashParamStorage;

/// FNV-1a hash of a parameter name
pub fn hash_param_name(name: &str) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for byte in name.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// CRC-32 (IEEE, reflected) over a byte slice
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}
