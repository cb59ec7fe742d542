//! Mock UART implementation

use crate::platform::error::Result;
use crate::platform::traits::{UartConfig, UartInterface};
use ::core::cell::RefCell;
use std::vec::Vec;

/// Mock UART with in-memory TX/RX buffers
///
/// Tests inject received bytes with `inject_rx_data` and inspect what the
/// driver transmitted with `tx_buffer`.
pub struct MockUart {
    config: UartConfig,
    tx_buffer: RefCell<Vec<u8>>,
    rx_buffer: RefCell<Vec<u8>>,
}

impl MockUart {
    pub fn new(config: UartConfig) -> Self {
        Self {
            config,
            tx_buffer: RefCell::new(Vec::new()),
            rx_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Queue bytes to be returned by subsequent `read` calls
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.borrow_mut().extend_from_slice(data);
    }

    /// Everything written so far
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.borrow().clone()
    }

    /// Discard captured TX bytes
    pub fn clear_tx(&self) {
        self.tx_buffer.borrow_mut().clear();
    }

    /// Current baud rate
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }
}

impl UartInterface for MockUart {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.tx_buffer.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut rx = self.rx_buffer.borrow_mut();
        let n = buffer.len().min(rx.len());
        buffer[..n].copy_from_slice(&rx[..n]);
        rx.drain(..n);
        Ok(n)
    }

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<()> {
        self.config.baud_rate = baud_rate;
        Ok(())
    }

    fn available(&self) -> bool {
        !self.rx_buffer.borrow().is_empty()
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_captures_tx() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.write(b"hello").unwrap();
        assert_eq!(uart.tx_buffer(), b"hello");
    }

    #[test]
    fn test_read_drains_injected_data() {
        let mut uart = MockUart::new(UartConfig::default());
        uart.inject_rx_data(&[1, 2, 3, 4]);
        assert!(uart.available());

        let mut buf = [0u8; 3];
        let n = uart.read(&mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(buf, [1, 2, 3]);

        let n = uart.read(&mut buf).unwrap();
        assert_eq!(n, 1);
        assert_eq!(buf[0], 4);
        assert!(!uart.available());
    }

    #[test]
    fn test_set_baud_rate() {
        let mut uart = MockUart::new(UartConfig::with_baud_rate(9600));
        assert_eq!(uart.baud_rate(), 9600);
        uart.set_baud_rate(115_200).unwrap();
        assert_eq!(uart.baud_rate(), 115_200);
    }
}
