//! GNSS receiver driver
//!
//! Owns the receiver UART: negotiates the link baud rate, pushes UBX
//! configuration (fire and forget, no ACK handling), and decodes the NMEA
//! stream into the merged [`Fix`]. An optional raw byte tap sees every
//! received byte before parsing, for external raw-stream loggers.

pub mod fix;
pub mod ubx;

pub use fix::{Fix, FixField, Position, UtcDate, UtcTime, WORST_HDOP};

use crate::log_info;
use crate::platform::error::Result;
use crate::platform::{TimerInterface, UartInterface};
use nmea0183::{ParseResult, Parser};

/// Factory-default baud rate of u-blox receivers
pub const FACTORY_BAUD: u32 = 9600;

/// Settle time after a baud-change command before switching the local UART
pub const BAUD_SETTLE_MS: u32 = 250;

/// Highest baud at which the NMEA stream cannot sustain more than 1 Hz
pub const LOW_BAUD_CEILING: u32 = 38_400;

/// Delay between consecutive configuration frames
const INTER_FRAME_DELAY_MS: u32 = 50;

/// Per-poll UART drain chunk
const READ_CHUNK: usize = 64;

/// Link negotiation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No negotiation attempted yet
    Unconfigured,
    /// Talking to the receiver at the factory default baud
    ProbingDefault,
    /// Baud-change command sent, waiting out the settle time
    Negotiating,
    /// Link established at the contained baud
    Configured(u32),
}

/// Outcome of a fire-and-forget configuration send
///
/// `Sent` means the frame left the UART, not that the receiver applied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    Sent,
    NoLink,
}

/// Constellation selection presented to the user
///
/// The receiver keeps its default constellation set; the selection only
/// caps the solution rate through [`max_update_rate_hz`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConstellationMode {
    GpsOnly,
    GpsSbas,
    GpsGlonass,
    GpsGalileo,
    GpsBeidou,
    GpsGlonassGalileo,
    GpsGalileoBeidou,
    AllSystems,
}

impl ConstellationMode {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => ConstellationMode::GpsOnly,
            1 => ConstellationMode::GpsSbas,
            2 => ConstellationMode::GpsGlonass,
            3 => ConstellationMode::GpsGalileo,
            4 => ConstellationMode::GpsBeidou,
            5 => ConstellationMode::GpsGlonassGalileo,
            6 => ConstellationMode::GpsGalileoBeidou,
            _ => ConstellationMode::AllSystems,
        }
    }
}

/// CFG-NAV5 dynamic platform model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DynamicModel {
    Portable,
    Stationary,
    Pedestrian,
    Automotive,
    Sea,
    Airborne1g,
    Airborne2g,
    Airborne4g,
}

impl DynamicModel {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => DynamicModel::Portable,
            1 => DynamicModel::Stationary,
            2 => DynamicModel::Pedestrian,
            3 => DynamicModel::Automotive,
            4 => DynamicModel::Sea,
            5 => DynamicModel::Airborne1g,
            6 => DynamicModel::Airborne2g,
            _ => DynamicModel::Airborne4g,
        }
    }

    /// UBX dynModel field value
    pub fn ubx_id(&self) -> u8 {
        match self {
            DynamicModel::Portable => 0,
            DynamicModel::Stationary => 2,
            DynamicModel::Pedestrian => 3,
            DynamicModel::Automotive => 4,
            DynamicModel::Sea => 5,
            DynamicModel::Airborne1g => 6,
            DynamicModel::Airborne2g => 7,
            DynamicModel::Airborne4g => 8,
        }
    }
}

/// Highest solution rate the link can sustain at the given baud
pub fn max_update_rate_hz(baud: u32) -> u8 {
    if baud <= LOW_BAUD_CEILING {
        1
    } else {
        5
    }
}

/// Receiver configuration derived from the parameter registry
#[derive(Debug, Clone, Copy)]
pub struct GnssConfig {
    pub baud: u32,
    pub constellation: ConstellationMode,
    pub dynamic_model: DynamicModel,
    /// SBAS region selection; indices 6..=8 mean "off"
    pub sbas_index: u8,
}

impl Default for GnssConfig {
    fn default() -> Self {
        Self {
            baud: 115_200,
            constellation: ConstellationMode::GpsOnly,
            dynamic_model: DynamicModel::Automotive,
            sbas_index: 1,
        }
    }
}

/// GNSS receiver driver generic over the UART implementation
pub struct GnssManager<U: UartInterface> {
    uart: Option<U>,
    parser: Parser,
    fix: Fix,
    state: LinkState,
    raw_tap: Option<fn(u8)>,
}

impl<U: UartInterface> GnssManager<U> {
    pub fn new() -> Self {
        Self {
            uart: None,
            parser: Parser::new(),
            fix: Fix::new(),
            state: LinkState::Unconfigured,
            raw_tap: None,
        }
    }

    /// Hand the receiver UART to the driver
    pub fn attach_uart(&mut self, uart: U) {
        self.uart = Some(uart);
    }

    /// Borrow the attached UART, if any
    pub fn uart_mut(&mut self) -> Option<&mut U> {
        self.uart.as_mut()
    }

    /// Register or clear a tap that sees every received byte before parsing
    pub fn set_raw_tap(&mut self, tap: Option<fn(u8)>) {
        self.raw_tap = tap;
    }

    pub fn link_state(&self) -> LinkState {
        self.state
    }

    pub fn has_link(&self) -> bool {
        matches!(self.state, LinkState::Configured(_))
    }

    pub fn fix(&self) -> &Fix {
        &self.fix
    }

    pub fn clear_updated(&mut self) {
        self.fix.clear_updated();
    }

    /// Negotiate the link up from the factory default baud
    ///
    /// The baud-change command is sent blind at the factory rate. Receivers
    /// already running at `target_baud` ignore the garbled frame and keep
    /// streaming, so the sequence is safe to run on every boot.
    pub fn begin<T: TimerInterface>(
        &mut self,
        timer: &mut T,
        target_baud: u32,
    ) -> Result<SendStatus> {
        let uart = match self.uart.as_mut() {
            Some(uart) => uart,
            None => return Ok(SendStatus::NoLink),
        };

        self.state = LinkState::ProbingDefault;
        uart.set_baud_rate(FACTORY_BAUD)?;
        if target_baud != FACTORY_BAUD {
            uart.write(&ubx::cfg_prt_baud(target_baud))?;
            uart.flush()?;

            self.state = LinkState::Negotiating;
            timer.delay_ms(BAUD_SETTLE_MS)?;
            uart.set_baud_rate(target_baud)?;
        }
        self.state = LinkState::Configured(target_baud);
        log_info!("GNSS link at {} baud", target_baud);
        Ok(SendStatus::Sent)
    }

    /// Push the full receiver configuration
    pub fn configure<T: TimerInterface>(
        &mut self,
        timer: &mut T,
        config: &GnssConfig,
    ) -> Result<SendStatus> {
        if !self.has_link() {
            return Ok(SendStatus::NoLink);
        }

        self.quiet_verbose_sentences(timer)?;
        timer.delay_ms(INTER_FRAME_DELAY_MS)?;
        self.send_constellation_mode(config.constellation)?;
        timer.delay_ms(INTER_FRAME_DELAY_MS)?;
        self.send_dynamic_model(config.dynamic_model)?;
        timer.delay_ms(INTER_FRAME_DELAY_MS)?;
        self.send_sbas_region(config.sbas_index)?;
        Ok(SendStatus::Sent)
    }

    /// Silence GSA, GSV and GLL so the stream is GGA/RMC/VTG only
    pub fn quiet_verbose_sentences<T: TimerInterface>(
        &mut self,
        timer: &mut T,
    ) -> Result<SendStatus> {
        let uart = match self.uart.as_mut() {
            Some(uart) => uart,
            None => return Ok(SendStatus::NoLink),
        };
        for id in [ubx::nmea_msg::GSA, ubx::nmea_msg::GSV, ubx::nmea_msg::GLL] {
            uart.write(&ubx::cfg_msg_rate(ubx::nmea_msg::CLASS, id, 0))?;
            timer.delay_ms(INTER_FRAME_DELAY_MS)?;
        }
        Ok(SendStatus::Sent)
    }

    /// Request a solution rate in Hz
    pub fn send_update_rate(&mut self, hz: u8) -> Result<SendStatus> {
        let meas_ms = 1000 / hz.max(1) as u16;
        self.send_frame(&ubx::cfg_rate(meas_ms))
    }

    /// Apply a constellation selection
    ///
    /// The receiver keeps its default constellation set; the selection only
    /// caps the solution rate, which the link baud bounds in turn.
    pub fn send_constellation_mode(&mut self, _mode: ConstellationMode) -> Result<SendStatus> {
        let rate = match self.state {
            LinkState::Configured(baud) => max_update_rate_hz(baud),
            _ => 1,
        };
        self.send_update_rate(rate)
    }

    /// Set the CFG-NAV5 dynamic platform model
    pub fn send_dynamic_model(&mut self, model: DynamicModel) -> Result<SendStatus> {
        self.send_frame(&ubx::cfg_nav5(model.ubx_id()))
    }

    /// Apply an SBAS region selection; indices 6..=8 turn SBAS off
    pub fn send_sbas_region(&mut self, index: u8) -> Result<SendStatus> {
        self.send_frame(&ubx::cfg_sbas(!(6..=8).contains(&index)))
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<SendStatus> {
        match self.uart.as_mut() {
            Some(uart) => {
                uart.write(frame)?;
                Ok(SendStatus::Sent)
            }
            None => Ok(SendStatus::NoLink),
        }
    }

    /// Drain the UART and feed the NMEA parser
    ///
    /// Returns the number of bytes consumed.
    pub fn poll(&mut self) -> Result<usize> {
        let uart = match self.uart.as_mut() {
            Some(uart) => uart,
            None => return Ok(0),
        };

        let mut total = 0;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = uart.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            total += n;
            for &byte in &chunk[..n] {
                if let Some(tap) = self.raw_tap {
                    tap(byte);
                }
                if let Some(parsed) = self.parser.parse_from_byte(byte) {
                    match parsed {
                        Ok(ParseResult::GGA(Some(gga))) => self.fix.apply_gga(&gga),
                        Ok(ParseResult::GGA(None)) => self.fix.mark_lost(),
                        Ok(ParseResult::RMC(Some(rmc))) => self.fix.apply_rmc(&rmc),
                        Ok(ParseResult::RMC(None)) => self.fix.mark_lost(),
                        Ok(ParseResult::VTG(Some(vtg))) => self.fix.apply_vtg(&vtg),
                        // Other sentences and checksum failures are skipped
                        _ => {}
                    }
                }
            }
        }
        Ok(total)
    }
}

impl<U: UartInterface> Default for GnssManager<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockTimer, MockUart};
    use crate::platform::UartConfig;

    const GGA_SENTENCE: &[u8] =
        b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
    const RMC_SENTENCE: &[u8] =
        b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\r\n";

    fn manager_with_uart() -> GnssManager<MockUart> {
        let mut manager = GnssManager::new();
        manager.attach_uart(MockUart::new(UartConfig::with_baud_rate(9600)));
        manager
    }

    #[test]
    fn test_begin_negotiates_baud() {
        let mut manager = manager_with_uart();
        let mut timer = MockTimer::new();

        let status = manager.begin(&mut timer, 115_200).unwrap();
        assert_eq!(status, SendStatus::Sent);
        assert_eq!(manager.link_state(), LinkState::Configured(115_200));

        let uart = manager.uart.as_ref().unwrap();
        assert_eq!(uart.baud_rate(), 115_200);
        // The baud-change frame went out before the switch
        let tx = uart.tx_buffer();
        assert_eq!(&tx[..4], &[0xB5, 0x62, 0x06, 0x00]);
        // Settle time was honored
        assert!(timer.now_ms() >= BAUD_SETTLE_MS as u64);
    }

    #[test]
    fn test_sends_report_no_link_without_uart() {
        let mut manager: GnssManager<MockUart> = GnssManager::new();
        let mut timer = MockTimer::new();

        assert_eq!(manager.begin(&mut timer, 115_200).unwrap(), SendStatus::NoLink);
        assert_eq!(manager.send_update_rate(5).unwrap(), SendStatus::NoLink);
        assert_eq!(manager.poll().unwrap(), 0);
    }

    #[test]
    fn test_configure_requires_link() {
        let mut manager = manager_with_uart();
        let mut timer = MockTimer::new();
        let status = manager
            .configure(&mut timer, &GnssConfig::default())
            .unwrap();
        assert_eq!(status, SendStatus::NoLink);
        assert!(manager.uart.as_ref().unwrap().tx_buffer().is_empty());
    }

    #[test]
    fn test_quiet_sends_three_disable_frames() {
        let mut manager = manager_with_uart();
        let mut timer = MockTimer::new();
        manager.begin(&mut timer, 115_200).unwrap();
        manager.uart.as_ref().unwrap().clear_tx();

        manager.quiet_verbose_sentences(&mut timer).unwrap();
        let tx = manager.uart.as_ref().unwrap().tx_buffer();
        // Three 16-byte CFG-MSG frames
        assert_eq!(tx.len(), 48);
        assert_eq!(tx[3], 0x01);
        assert_eq!(tx[19], 0x01);
        assert_eq!(tx[35], 0x01);
    }

    #[test]
    fn test_sbas_region_indices() {
        let mut manager = manager_with_uart();
        let mut timer = MockTimer::new();
        manager.begin(&mut timer, 115_200).unwrap();

        // Region selections enable; the three "off" entries disable; the
        // regions past them enable again
        for (index, enabled) in [(0u8, 1u8), (5, 1), (6, 0), (7, 0), (8, 0), (9, 1), (10, 1)] {
            manager.uart.as_ref().unwrap().clear_tx();
            manager.send_sbas_region(index).unwrap();
            let tx = manager.uart.as_ref().unwrap().tx_buffer();
            assert_eq!(tx[6], enabled, "index {}", index);
        }
    }

    #[test]
    fn test_poll_decodes_gga() {
        let mut manager = manager_with_uart();
        manager
            .uart
            .as_mut()
            .unwrap()
            .inject_rx_data(GGA_SENTENCE);

        let consumed = manager.poll().unwrap();
        assert_eq!(consumed, GGA_SENTENCE.len());

        let fix = manager.fix();
        assert!(fix.has_fix());
        assert!(fix.location.is_updated());
        let pos = fix.location.value();
        assert!((pos.latitude - 48.1173).abs() < 0.0001);
        assert!((pos.longitude - 11.5167).abs() < 0.0001);
        assert_eq!(fix.satellites.value(), 8);
        assert!((fix.hdop.value() - 0.9).abs() < 0.01);
        assert!((fix.altitude_m.value() - 545.4).abs() < 0.1);
    }

    #[test]
    fn test_poll_decodes_rmc_time_and_speed() {
        let mut manager = manager_with_uart();
        manager
            .uart
            .as_mut()
            .unwrap()
            .inject_rx_data(RMC_SENTENCE);
        manager.poll().unwrap();

        let fix = manager.fix();
        assert!((fix.speed_kmh.value() - 22.4 * 1.852).abs() < 0.1);
        assert_eq!(
            fix.time.value(),
            UtcTime {
                hours: 12,
                minutes: 35,
                seconds: 19
            }
        );
        let date = fix.date.value();
        assert_eq!(date.day, 23);
        assert_eq!(date.month, 3);
    }

    #[test]
    fn test_clear_updated_keeps_validity() {
        let mut manager = manager_with_uart();
        manager
            .uart
            .as_mut()
            .unwrap()
            .inject_rx_data(GGA_SENTENCE);
        manager.poll().unwrap();
        manager.clear_updated();

        let fix = manager.fix();
        assert!(fix.has_fix());
        assert!(!fix.location.is_updated());
    }

    #[test]
    fn test_garbage_between_sentences_is_skipped() {
        let mut manager = manager_with_uart();
        let uart = manager.uart.as_mut().unwrap();
        uart.inject_rx_data(b"\xFF\x00garbage\r\n");
        uart.inject_rx_data(GGA_SENTENCE);

        manager.poll().unwrap();
        assert!(manager.fix().has_fix());
    }

    static TAP_COUNT: ::core::sync::atomic::AtomicUsize =
        ::core::sync::atomic::AtomicUsize::new(0);

    #[test]
    fn test_raw_tap_sees_every_byte() {
        fn tap(_byte: u8) {
            TAP_COUNT.fetch_add(1, ::core::sync::atomic::Ordering::Relaxed);
        }

        let mut manager = manager_with_uart();
        manager.set_raw_tap(Some(tap));
        manager
            .uart
            .as_mut()
            .unwrap()
            .inject_rx_data(GGA_SENTENCE);
        manager.poll().unwrap();

        assert_eq!(
            TAP_COUNT.load(::core::sync::atomic::Ordering::Relaxed),
            GGA_SENTENCE.len()
        );
    }
}
