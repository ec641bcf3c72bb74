//! HID report layouts for the FTDI FT260 USB to I2C/UART bridge.
//!
//! This crate is the pure codec layer of the FT260 stack: it builds the
//! byte-exact feature and output reports the chip expects and decodes the
//! responses it returns. There is no I/O here; the driver crate owns the
//! transport.
//!
//! ## Report map
//!
//! | Report | Transfer | ID | Layout |
//! |--------|----------|----|--------|
//! | Chip version | feature GET | `0xA0` | 13 bytes; bytes 1–4 chip code, 5–12 reserved |
//! | System status | feature GET | `0xA1` | 26 bytes; fields at offsets 1–14, 15–25 reserved |
//! | Set I2C mode | feature SET | `0xA1` | `[0xA1, 0x02, enable]` |
//! | I2C reset | feature SET | `0xA1` | `[0xA1, 0x20]` |
//! | Set I2C clock | feature SET | `0xA1` | `[0xA1, 0x22, kHz lo, kHz hi]` |
//! | I2C write request | output | `0xD0 + (len-1)/4` | id, address, condition, length, payload |
//! | I2C read request | output | `0xC2` | id, address, condition, length (u16 LE) |
//! | I2C input report | input | — | 64 bytes; byte 1 = payload length, payload at offset 2 |
//!
//! Multi-byte fields are little-endian. A single transaction carries at
//! most [`I2C_WRITE_MAX`] write bytes or [`I2C_READ_MAX`] read bytes; the
//! encoders reject anything larger instead of truncating.

pub mod feature;
pub mod i2c;
pub mod types;

pub use feature::*;
pub use i2c::*;
pub use types::*;

use ft260_hid_common::HidError;
use thiserror::Error;

/// Errors returned by FT260 report encoding and decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("I2C slave address {0:#04x} outside the 7-bit range")]
    InvalidSlaveAddress(u16),

    #[error("I2C write payload length {0} outside 1..=60")]
    InvalidWriteLength(usize),

    #[error("I2C read length {0} outside 1..=62")]
    InvalidReadLength(usize),

    #[error("I2C clock speed {0} kHz not representable as u16")]
    InvalidClockSpeed(u64),

    #[error("malformed report: {0}")]
    Malformed(String),
}

/// Convenience result alias for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl From<HidError> for ProtocolError {
    fn from(e: HidError) -> Self {
        ProtocolError::Malformed(e.to_string())
    }
}

/// FTDI USB vendor ID.
pub const VENDOR_ID: u16 = 0x0403;
/// FT260 USB product ID.
pub const PRODUCT_ID: u16 = 0x6030;

/// Feature report ID for the chip version query.
pub const REPORT_ID_CHIP_VERSION: u8 = 0xA0;
/// Feature report ID for system status and system setting commands.
pub const REPORT_ID_SYSTEM_SETTING: u8 = 0xA1;
/// Output report ID for I2C read requests.
pub const REPORT_ID_I2C_READ_REQUEST: u8 = 0xC2;
/// Base output report ID for I2C write requests; the payload length tier
/// is added on top.
pub const REPORT_ID_I2C_WRITE_BASE: u8 = 0xD0;

/// Size of the chip version feature report, report ID included.
pub const CHIP_VERSION_REPORT_LEN: usize = 13;
/// Size of the system status feature report, report ID included.
pub const SYSTEM_STATUS_REPORT_LEN: usize = 26;
/// Size of the inbound I2C input report buffer.
pub const I2C_INPUT_REPORT_LEN: usize = 64;

/// Largest I2C write payload a single write request carries.
pub const I2C_WRITE_MAX: usize = 60;
/// Largest I2C read a single read request may ask for.
pub const I2C_READ_MAX: usize = 62;
