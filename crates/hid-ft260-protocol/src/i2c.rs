//! I2C transaction reports: write request, read request, and the inbound
//! input report carrying read data.
//!
//! Reads are two-phase on this chip: a read request output report arms the
//! controller, and the data arrives later in an input report. The codec
//! only handles the byte layouts; sequencing lives in the driver.

use crate::{
    I2C_READ_MAX, I2C_WRITE_MAX, I2cCondition, ProtocolError, ProtocolResult,
    REPORT_ID_I2C_READ_REQUEST, REPORT_ID_I2C_WRITE_BASE,
};
use ft260_hid_common::{ReportBuilder, ReportParser};

fn check_slave_address(address: u8) -> ProtocolResult<()> {
    if address >= 0x80 {
        return Err(ProtocolError::InvalidSlaveAddress(u16::from(address)));
    }
    Ok(())
}

/// Output report ID for a write request with `payload_len` data bytes.
///
/// The chip encodes the payload length tier into the report ID itself:
/// `0xD0` covers 1–4 bytes, `0xD1` 5–8, and so on up to `0xDE` for 60.
///
/// # Errors
/// Returns [`ProtocolError::InvalidWriteLength`] outside `1..=60`.
pub fn i2c_write_report_id(payload_len: usize) -> ProtocolResult<u8> {
    if payload_len == 0 || payload_len > I2C_WRITE_MAX {
        return Err(ProtocolError::InvalidWriteLength(payload_len));
    }
    Ok(REPORT_ID_I2C_WRITE_BASE + ((payload_len - 1) / 4) as u8)
}

/// Encode an I2C write request output report.
///
/// # Errors
/// Rejects addresses outside the 7-bit range and payloads outside
/// `1..=60` bytes before producing any bytes; nothing is truncated.
pub fn encode_i2c_write_request(
    address: u8,
    condition: I2cCondition,
    data: &[u8],
) -> ProtocolResult<Vec<u8>> {
    check_slave_address(address)?;
    let report_id = i2c_write_report_id(data.len())?;

    let mut builder = ReportBuilder::with_capacity(4 + data.len());
    builder
        .write_u8(report_id)
        .write_u8(address)
        .write_u8(condition.wire())
        .write_u8(data.len() as u8)
        .write_bytes(data);
    Ok(builder.into_inner())
}

/// Encode an I2C read request output report asking for `length` bytes.
///
/// # Errors
/// Rejects addresses outside the 7-bit range and lengths outside
/// `1..=62`.
pub fn encode_i2c_read_request(
    address: u8,
    condition: I2cCondition,
    length: u16,
) -> ProtocolResult<Vec<u8>> {
    check_slave_address(address)?;
    if length == 0 || usize::from(length) > I2C_READ_MAX {
        return Err(ProtocolError::InvalidReadLength(usize::from(length)));
    }

    let mut builder = ReportBuilder::with_capacity(5);
    builder
        .write_u8(REPORT_ID_I2C_READ_REQUEST)
        .write_u8(address)
        .write_u8(condition.wire())
        .write_u16_le(length);
    Ok(builder.into_inner())
}

/// Decode an I2C input report into its payload bytes.
///
/// Byte 0 is a report ID the codec ignores, byte 1 is the payload length,
/// and anything past `2 + length` is padding.
///
/// # Errors
/// Returns [`ProtocolError::Malformed`] if the buffer does not cover the
/// advertised payload length.
pub fn decode_i2c_input_report(report: &[u8]) -> ProtocolResult<Vec<u8>> {
    let mut parser = ReportParser::from_slice(report);
    let _report_id = parser.read_u8()?;
    let length = usize::from(parser.read_u8()?);
    Ok(parser.read_bytes(length)?)
}
