//! UART interface trait

use crate::platform::error::Result;

/// UART parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartParity {
    None,
    Even,
    Odd,
}

/// UART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartStopBits {
    One,
    Two,
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: u8,
    /// Stop bits
    pub stop_bits: UartStopBits,
    /// Parity
    pub parity: UartParity,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: 8,
            stop_bits: UartStopBits::One,
            parity: UartParity::None,
        }
    }
}

impl UartConfig {
    /// Create a config with the given baud rate and 8N1 framing
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }
}

/// Byte-oriented serial port
///
/// Non-blocking: `read` returns however many bytes are pending, possibly zero.
pub trait UartInterface {
    /// Write bytes, returning the number written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Read pending bytes into `buffer`, returning the number read
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Reconfigure the local baud rate
    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()>;

    /// Whether received data is pending
    fn available(&self) -> bool;

    /// Block until all queued TX bytes have left the peripheral
    fn flush(&mut self) -> Result<()>;
}
