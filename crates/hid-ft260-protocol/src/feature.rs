//! Feature report layouts: chip version, system status, and the system
//! setting commands (I2C mode, reset, clock speed).

use crate::{
    CHIP_VERSION_REPORT_LEN, ProtocolResult, REPORT_ID_CHIP_VERSION,
    REPORT_ID_SYSTEM_SETTING, SYSTEM_STATUS_REPORT_LEN, SystemClockSpeed, UartMode,
};
use ft260_hid_common::ReportParser;
use serde::{Deserialize, Serialize};

/// Query buffer for a chip version feature GET. Byte 0 selects the report,
/// the rest is a zero-filled placeholder the device overwrites.
pub fn chip_version_request() -> Vec<u8> {
    let mut report = vec![0u8; CHIP_VERSION_REPORT_LEN];
    report[0] = REPORT_ID_CHIP_VERSION;
    report
}

/// Query buffer for a system status feature GET.
pub fn system_status_request() -> Vec<u8> {
    let mut report = vec![0u8; SYSTEM_STATUS_REPORT_LEN];
    report[0] = REPORT_ID_SYSTEM_SETTING;
    report
}

/// Feature SET enabling or disabling the I2C controller.
pub fn set_i2c_mode_report(enable: bool) -> [u8; 3] {
    [REPORT_ID_SYSTEM_SETTING, 0x02, u8::from(enable)]
}

/// Feature SET resetting the I2C controller.
pub fn i2c_reset_report() -> [u8; 2] {
    [REPORT_ID_SYSTEM_SETTING, 0x20]
}

/// Feature SET selecting the I2C clock speed in kHz.
pub fn set_i2c_clock_speed_report(speed_khz: u16) -> [u8; 4] {
    let [lo, hi] = speed_khz.to_le_bytes();
    [REPORT_ID_SYSTEM_SETTING, 0x22, lo, hi]
}

/// Decoded chip version response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipVersion {
    /// Four-byte code identifying the silicon revision.
    pub chip_code: [u8; 4],
    /// Opaque trailing bytes of the fixed-size response.
    pub reserved: [u8; 8],
}

impl ChipVersion {
    /// Decode a chip version feature report, report ID byte included.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Malformed`] if the buffer is shorter than
    /// the 13-byte response layout.
    pub fn decode(report: &[u8]) -> ProtocolResult<Self> {
        let mut parser = ReportParser::from_slice(report);
        let _report_id = parser.read_u8()?;
        Ok(Self {
            chip_code: parser.read_array::<4>()?,
            reserved: parser.read_array::<8>()?,
        })
    }
}

/// Decoded system status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub chip_mode: u8,
    pub clock: SystemClockSpeed,
    pub suspended: bool,
    pub power_enabled: bool,
    pub i2c_enabled: bool,
    pub uart_mode: UartMode,
    pub hid_over_i2c_enabled: bool,
    pub gpio2_function: u8,
    pub gpioa_function: u8,
    pub gpiog_function: u8,
    pub suspend_out_polarity: u8,
    pub wakeup_interrupt_enabled: bool,
    pub interrupt_condition: u8,
    pub power_saving_enabled: bool,
    pub reserved: [u8; 11],
}

impl SystemStatus {
    /// Decode a system status feature report, report ID byte included.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Malformed`] if the buffer is shorter than
    /// the 26-byte response layout.
    pub fn decode(report: &[u8]) -> ProtocolResult<Self> {
        let mut parser = ReportParser::from_slice(report);
        let _report_id = parser.read_u8()?;
        Ok(Self {
            chip_mode: parser.read_u8()?,
            clock: SystemClockSpeed::from_wire(parser.read_u8()?),
            suspended: parser.read_bool()?,
            power_enabled: parser.read_bool()?,
            i2c_enabled: parser.read_bool()?,
            uart_mode: UartMode::from_wire(parser.read_u8()?),
            hid_over_i2c_enabled: parser.read_bool()?,
            gpio2_function: parser.read_u8()?,
            gpioa_function: parser.read_u8()?,
            gpiog_function: parser.read_u8()?,
            suspend_out_polarity: parser.read_u8()?,
            wakeup_interrupt_enabled: parser.read_bool()?,
            interrupt_condition: parser.read_u8()?,
            power_saving_enabled: parser.read_bool()?,
            reserved: parser.read_array::<11>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolError;
    use ft260_hid_common::ReportBuilder;

    #[test]
    fn test_chip_version_request_layout() {
        let report = chip_version_request();
        assert_eq!(report.len(), 13);
        assert_eq!(report[0], 0xA0);
        assert!(report[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_system_status_request_layout() {
        let report = system_status_request();
        assert_eq!(report.len(), 26);
        assert_eq!(report[0], 0xA1);
    }

    #[test]
    fn test_setting_report_layouts() {
        assert_eq!(set_i2c_mode_report(true), [0xA1, 0x02, 0x01]);
        assert_eq!(set_i2c_mode_report(false), [0xA1, 0x02, 0x00]);
        assert_eq!(i2c_reset_report(), [0xA1, 0x20]);
        // 400 kHz = 0x0190 little-endian.
        assert_eq!(set_i2c_clock_speed_report(400), [0xA1, 0x22, 0x90, 0x01]);
        assert_eq!(set_i2c_clock_speed_report(100), [0xA1, 0x22, 0x64, 0x00]);
    }

    #[test]
    fn test_chip_version_decode() -> ProtocolResult<()> {
        let mut report = vec![0xA0, 0x02, 0x03, 0x01, 0x00];
        report.extend_from_slice(&[0x11; 8]);

        let version = ChipVersion::decode(&report)?;
        assert_eq!(version.chip_code, [0x02, 0x03, 0x01, 0x00]);
        assert_eq!(version.reserved, [0x11; 8]);
        Ok(())
    }

    #[test]
    fn test_chip_version_decode_short_fails() {
        let err = ChipVersion::decode(&[0xA0, 0x01, 0x02]).expect_err("short buffer");
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_system_status_offset_round_trip() -> ProtocolResult<()> {
        // Build a response with a distinct value at every field offset and
        // check each one lands in its field.
        let mut builder = ReportBuilder::with_capacity(26);
        builder
            .write_u8(0xA1) // report ID echo
            .write_u8(0x01) // chip mode
            .write_u8(0x02) // clock: 48 MHz
            .write_u8(0x01) // suspended
            .write_u8(0x00) // power enabled
            .write_u8(0x01) // i2c enabled
            .write_u8(0x04) // uart: no flow control
            .write_u8(0x00) // hid-over-i2c
            .write_u8(0x05) // gpio2
            .write_u8(0x06) // gpioa
            .write_u8(0x07) // gpiog
            .write_u8(0x01) // suspend out polarity
            .write_u8(0x01) // wakeup interrupt
            .write_u8(0x03) // interrupt condition
            .write_u8(0x01) // power saving
            .write_bytes(&[0xEE; 11]);

        let status = SystemStatus::decode(builder.as_slice())?;
        assert_eq!(status.chip_mode, 0x01);
        assert_eq!(status.clock, SystemClockSpeed::Mhz48);
        assert!(status.suspended);
        assert!(!status.power_enabled);
        assert!(status.i2c_enabled);
        assert_eq!(status.uart_mode, UartMode::NoFlowControl);
        assert!(!status.hid_over_i2c_enabled);
        assert_eq!(status.gpio2_function, 0x05);
        assert_eq!(status.gpioa_function, 0x06);
        assert_eq!(status.gpiog_function, 0x07);
        assert_eq!(status.suspend_out_polarity, 0x01);
        assert!(status.wakeup_interrupt_enabled);
        assert_eq!(status.interrupt_condition, 0x03);
        assert!(status.power_saving_enabled);
        assert_eq!(status.reserved, [0xEE; 11]);
        Ok(())
    }

    #[test]
    fn test_system_status_unknown_codes_do_not_crash() -> ProtocolResult<()> {
        let mut report = vec![0xA1];
        report.extend_from_slice(&[0xFF; 25]);

        let status = SystemStatus::decode(&report)?;
        assert_eq!(status.clock, SystemClockSpeed::Unknown(0xFF));
        assert_eq!(status.uart_mode, UartMode::Unknown(0xFF));
        // Flag bytes other than exactly 1 decode as false.
        assert!(!status.suspended);
        Ok(())
    }

    #[test]
    fn test_system_status_decode_short_fails() {
        let report = vec![0xA1; 14];
        assert!(SystemStatus::decode(&report).is_err());
    }
}
