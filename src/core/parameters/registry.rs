//! Parameter registry
//!
//! In-RAM table of typed parameters with range validation, backed by an
//! optional Flash storage block. The stock table mirrors the unit's saved
//! preferences: GNSS link settings, clock offset, RPM calibration, and the
//! persisted trip total.

use super::storage::FlashParamStorage;
use crate::log_warn;
use crate::platform::FlashInterface;
use heapless::Vec;

/// Maximum number of registered parameters
pub const MAX_PARAMS: usize = 64;

/// Parameter value type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamType {
    Float,
    Int32,
    Uint32,
}

/// Typed parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamValue {
    Float(f32),
    Int32(i32),
    Uint32(u32),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Int32(_) => ParamType::Int32,
            ParamValue::Uint32(_) => ParamType::Uint32,
        }
    }

    /// Raw bits for storage
    pub fn to_bits(&self) -> u32 {
        match self {
            ParamValue::Float(v) => v.to_bits(),
            ParamValue::Int32(v) => *v as u32,
            ParamValue::Uint32(v) => *v,
        }
    }

    /// Rebuild a value from stored bits and a type tag
    pub fn from_bits(param_type: ParamType, bits: u32) -> Self {
        match param_type {
            ParamType::Float => ParamValue::Float(f32::from_bits(bits)),
            ParamType::Int32 => ParamValue::Int32(bits as i32),
            ParamType::Uint32 => ParamValue::Uint32(bits),
        }
    }

    /// Value as f32 for range checks
    fn as_f32(&self) -> f32 {
        match self {
            ParamValue::Float(v) => *v,
            ParamValue::Int32(v) => *v as f32,
            ParamValue::Uint32(v) => *v as f32,
        }
    }
}

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Parameter name not registered
    NotFound,
    /// Value out of range or wrong type
    InvalidValue,
    /// Flash storage operation failed
    FlashError,
    /// Registry is full
    Full,
}

/// Parameter definition and current value
#[derive(Debug, Clone, Copy)]
pub struct ParamMetadata {
    pub name: &'static str,
    pub value: ParamValue,
    pub default: ParamValue,
    pub min: f32,
    pub max: f32,
    pub modified: bool,
}

impl ParamMetadata {
    pub const fn new_float(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            value: ParamValue::Float(default),
            default: ParamValue::Float(default),
            min,
            max,
            modified: false,
        }
    }

    pub const fn new_int32(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            name,
            value: ParamValue::Int32(default),
            default: ParamValue::Int32(default),
            min: min as f32,
            max: max as f32,
            modified: false,
        }
    }

    pub const fn new_uint32(name: &'static str, default: u32, min: u32, max: u32) -> Self {
        Self {
            name,
            value: ParamValue::Uint32(default),
            default: ParamValue::Uint32(default),
            min: min as f32,
            max: max as f32,
            modified: false,
        }
    }
}

/// Parameter registry with optional Flash persistence
pub struct ParameterRegistry<F: FlashInterface> {
    params: Vec<ParamMetadata, MAX_PARAMS>,
    storage: Option<FlashParamStorage<F>>,
}

impl<F: FlashInterface> ParameterRegistry<F> {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            storage: None,
        }
    }

    /// Registry preloaded with the stock parameter table
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for param in stock_params() {
            // Table is sized for the stock set
            let _ = registry.register(param);
        }
        registry
    }

    /// Attach a Flash storage backend
    pub fn set_storage(&mut self, storage: FlashParamStorage<F>) {
        self.storage = Some(storage);
    }

    pub fn register(&mut self, param: ParamMetadata) -> Result<(), RegistryError> {
        if self.params.iter().any(|p| p.name == param.name) {
            return Err(RegistryError::InvalidValue);
        }
        self.params.push(param).map_err(|_| RegistryError::Full)
    }

    pub fn get(&self, name: &str) -> Result<ParamValue, RegistryError> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
            .ok_or(RegistryError::NotFound)
    }

    pub fn get_float(&self, name: &str) -> Result<f32, RegistryError> {
        match self.get(name)? {
            ParamValue::Float(v) => Ok(v),
            _ => Err(RegistryError::InvalidValue),
        }
    }

    pub fn get_int32(&self, name: &str) -> Result<i32, RegistryError> {
        match self.get(name)? {
            ParamValue::Int32(v) => Ok(v),
            _ => Err(RegistryError::InvalidValue),
        }
    }

    pub fn get_uint32(&self, name: &str) -> Result<u32, RegistryError> {
        match self.get(name)? {
            ParamValue::Uint32(v) => Ok(v),
            _ => Err(RegistryError::InvalidValue),
        }
    }

    /// Set a value, enforcing type and range
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), RegistryError> {
        let param = self
            .params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or(RegistryError::NotFound)?;

        if value.param_type() != param.value.param_type() {
            return Err(RegistryError::InvalidValue);
        }
        let v = value.as_f32();
        if v < param.min || v > param.max {
            return Err(RegistryError::InvalidValue);
        }

        param.value = value;
        param.modified = true;
        Ok(())
    }

    /// Persist all parameters to Flash
    pub fn save(&mut self) -> Result<(), RegistryError> {
        let storage = self.storage.as_mut().ok_or(RegistryError::FlashError)?;
        storage
            .save(&self.params)
            .map_err(|_| RegistryError::FlashError)?;
        for param in self.params.iter_mut() {
            param.modified = false;
        }
        Ok(())
    }

    /// Load persisted values over the registered defaults
    ///
    /// A missing or corrupt block leaves defaults in place. Stored records
    /// whose hash matches no registered parameter are skipped.
    pub fn load(&mut self) -> Result<(), RegistryError> {
        let storage = self.storage.as_ref().ok_or(RegistryError::FlashError)?;
        let records = match storage.load() {
            Ok(Some(records)) => records,
            Ok(None) => return Ok(()),
            Err(_) => {
                log_warn!("parameter block unreadable, keeping defaults");
                return Ok(());
            }
        };

        for record in records.iter() {
            if let Some(param) = self
                .params
                .iter_mut()
                .find(|p| super::hash_param_name(p.name) == record.name_hash)
            {
                if record.param_type == param.value.param_type() {
                    param.value = ParamValue::from_bits(record.param_type, record.value_bits);
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<F: FlashInterface> Default for ParameterRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stock parameter table
///
/// `rpm_ppr` is an index into the pulses-per-revolution table, not a ratio.
fn stock_params() -> [ParamMetadata; 10] {
    [
        ParamMetadata::new_uint32("gps_baud", 115_200, 4800, 921_600),
        ParamMetadata::new_uint32("gnss_mode", 0, 0, 7),
        ParamMetadata::new_uint32("gnss_model", 0, 0, 7),
        ParamMetadata::new_uint32("gnss_sbas", 1, 0, 10),
        ParamMetadata::new_int32("utc_offset", 0, -12, 14),
        ParamMetadata::new_uint32("rpm_enabled", 0, 0, 1),
        ParamMetadata::new_uint32("rpm_ppr", 0, 0, 4),
        ParamMetadata::new_float("trip_total_m", 0.0, 0.0, 1.0e9),
        ParamMetadata::new_uint32("gps_rx_pin", 16, 0, 48),
        ParamMetadata::new_uint32("gps_tx_pin", 17, 0, 48),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockFlash;

    #[test]
    fn test_stock_table_registers() {
        let registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.get_uint32("gps_baud"), Ok(115_200));
        assert_eq!(registry.get_int32("utc_offset"), Ok(0));
        assert_eq!(registry.get_float("trip_total_m"), Ok(0.0));
    }

    #[test]
    fn test_set_enforces_range() {
        let mut registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        assert_eq!(
            registry.set("utc_offset", ParamValue::Int32(15)),
            Err(RegistryError::InvalidValue)
        );
        assert_eq!(registry.set("utc_offset", ParamValue::Int32(-5)), Ok(()));
        assert_eq!(registry.get_int32("utc_offset"), Ok(-5));

        // SBAS region list runs through index 10
        assert_eq!(registry.set("gnss_sbas", ParamValue::Uint32(10)), Ok(()));
        assert_eq!(
            registry.set("gnss_sbas", ParamValue::Uint32(11)),
            Err(RegistryError::InvalidValue)
        );
    }

    #[test]
    fn test_set_enforces_type() {
        let mut registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        assert_eq!(
            registry.set("gps_baud", ParamValue::Float(9600.0)),
            Err(RegistryError::InvalidValue)
        );
    }

    #[test]
    fn test_unknown_name() {
        let registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        assert_eq!(registry.get("no_such"), Err(RegistryError::NotFound));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        registry.set_storage(FlashParamStorage::new(MockFlash::new(), 0));

        registry
            .set("trip_total_m", ParamValue::Float(1234.5))
            .unwrap();
        registry.set("gnss_model", ParamValue::Uint32(3)).unwrap();
        registry.save().unwrap();

        // Simulate reboot by rebuilding the registry over the same Flash.
        // MockFlash is owned, so pull the storage back out via save/load on
        // a fresh registry sharing the flash image.
        let ParameterRegistry { storage, .. } = registry;
        let mut fresh: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        fresh.storage = storage;
        fresh.load().unwrap();

        assert_eq!(fresh.get_float("trip_total_m"), Ok(1234.5));
        assert_eq!(fresh.get_uint32("gnss_model"), Ok(3));
        assert_eq!(fresh.get_uint32("gps_baud"), Ok(115_200));
    }

    #[test]
    fn test_load_without_block_keeps_defaults() {
        let mut registry: ParameterRegistry<MockFlash> = ParameterRegistry::with_defaults();
        registry.set_storage(FlashParamStorage::new(MockFlash::new(), 0));
        registry.load().unwrap();
        assert_eq!(registry.get_uint32("gps_baud"), Ok(115_200));
    }
}
