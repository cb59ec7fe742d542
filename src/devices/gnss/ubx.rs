//! UBX protocol frame builders
//!
//! u-blox configuration frames: sync chars, class/id, little-endian length,
//! payload, Fletcher-8 checksum over class through payload. All builders
//! return complete ready-to-send frames as fixed arrays.

/// UBX sync characters
pub const SYNC1: u8 = 0xB5;
pub const SYNC2: u8 = 0x62;

const CLASS_CFG: u8 = 0x06;
const ID_CFG_PRT: u8 = 0x00;
const ID_CFG_MSG: u8 = 0x01;
const ID_CFG_RATE: u8 = 0x08;
const ID_CFG_SBAS: u8 = 0x16;
const ID_CFG_NAV5: u8 = 0x24;

/// Fletcher-8 checksum over class, id, length and payload bytes
pub fn checksum(frame_body: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for &byte in frame_body {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

fn finish<const N: usize>(frame: &mut [u8; N]) {
    let (ck_a, ck_b) = checksum(&frame[2..N - 2]);
    frame[N - 2] = ck_a;
    frame[N - 1] = ck_b;
}

/// CFG-RATE: set the measurement interval in milliseconds
///
/// navRate stays 1 (one solution per measurement), timeRef 1 (GPS time).
pub fn cfg_rate(meas_ms: u16) -> [u8; 14] {
    let mut frame = [0u8; 14];
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    frame[2] = CLASS_CFG;
    frame[3] = ID_CFG_RATE;
    frame[4] = 6;
    frame[5] = 0;
    frame[6..8].copy_from_slice(&meas_ms.to_le_bytes());
    frame[8..10].copy_from_slice(&1u16.to_le_bytes());
    frame[10..12].copy_from_slice(&1u16.to_le_bytes());
    finish(&mut frame);
    frame
}

/// CFG-PRT: reconfigure UART1 to the given baud, 8N1, NMEA+UBX in, NMEA out
pub fn cfg_prt_baud(baud: u32) -> [u8; 28] {
    let mut frame = [0u8; 28];
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    frame[2] = CLASS_CFG;
    frame[3] = ID_CFG_PRT;
    frame[4] = 0x14;
    frame[5] = 0;
    frame[6] = 1; // portID: UART1
    // mode: 8 data bits, no parity, 1 stop bit (txReady at 8..10 stays 0)
    frame[10] = 0xD0;
    frame[11] = 0x08;
    frame[14..18].copy_from_slice(&baud.to_le_bytes());
    frame[18] = 0x07; // inProtoMask: UBX+NMEA+RTCM
    frame[20] = 0x03; // outProtoMask: UBX+NMEA
    finish(&mut frame);
    frame
}

/// CFG-NAV5: set the dynamic platform model
///
/// Remaining fields are the stock navigation-engine settings: auto 2D/3D
/// fix mode, 5 degree minimum elevation, 25.0 position/time DOP masks,
/// 100 m position accuracy mask, 300 m time accuracy mask.
pub fn cfg_nav5(dyn_model: u8) -> [u8; 44] {
    let mut frame = [0u8; 44];
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    frame[2] = CLASS_CFG;
    frame[3] = ID_CFG_NAV5;
    frame[4] = 0x24;
    frame[5] = 0;
    frame[6] = 0xFF; // apply all settings
    frame[7] = 0xFF;
    frame[8] = dyn_model;
    frame[9] = 0x03; // fixMode: auto 2D/3D (fixedAlt at 10..14 stays 0)
    frame[14] = 0x10; // fixedAltVar: 1.0 m^2
    frame[15] = 0x27;
    frame[18] = 0x05; // minElev: 5 deg
    frame[20] = 0xFA; // pDop: 25.0
    frame[22] = 0xFA; // tDop: 25.0
    frame[24] = 0x64; // pAcc: 100 m
    frame[26] = 0x2C; // tAcc: 300 m
    frame[27] = 0x01;
    frame[29] = 0x3C; // dgnssTimeout: 60 s
    finish(&mut frame);
    frame
}

/// CFG-SBAS: enable or disable SBAS ranging and correction
pub fn cfg_sbas(enabled: bool) -> [u8; 16] {
    let mut frame = [0u8; 16];
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    frame[2] = CLASS_CFG;
    frame[3] = ID_CFG_SBAS;
    frame[4] = 8;
    frame[5] = 0;
    frame[6] = if enabled { 1 } else { 0 };
    frame[7] = 0x03; // usage: range + diffCorr
    frame[8] = 3; // maxSBAS
    finish(&mut frame);
    frame
}

/// CFG-MSG: set the output rate of an NMEA sentence on all targets
///
/// Rate 0 silences the sentence.
pub fn cfg_msg_rate(msg_class: u8, msg_id: u8, rate: u8) -> [u8; 16] {
    let mut frame = [0u8; 16];
    frame[0] = SYNC1;
    frame[1] = SYNC2;
    frame[2] = CLASS_CFG;
    frame[3] = ID_CFG_MSG;
    frame[4] = 8;
    frame[5] = 0;
    frame[6] = msg_class;
    frame[7] = msg_id;
    frame[8..14].fill(rate);
    finish(&mut frame);
    frame
}

/// Standard NMEA sentence ids (class 0xF0)
pub mod nmea_msg {
    pub const CLASS: u8 = 0xF0;
    pub const GGA: u8 = 0x00;
    pub const GLL: u8 = 0x01;
    pub const GSA: u8 = 0x02;
    pub const GSV: u8 = 0x03;
    pub const RMC: u8 = 0x04;
    pub const VTG: u8 = 0x05;
}
