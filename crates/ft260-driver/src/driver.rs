//! The FT260 chip driver: one wire exchange per operation.

use crate::{DriverError, DriverResult};
use ft260_hid_common::HidTransport;
use hid_ft260_protocol as protocol;
use hid_ft260_protocol::{ChipVersion, I2cCondition, SystemStatus};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A driver handle shareable between bus adapters.
///
/// The mutex serializes individual driver calls; whole transactions still
/// need caller-level serialization, since the chip allows only one
/// outstanding transaction at a time.
pub type SharedDriver = Arc<Mutex<Ft260>>;

/// Owns a HID transport exclusively and exposes one method per chip
/// operation. No retries, no queuing: every method is a single blocking
/// round trip (reads excepted, which the chip splits into a request and a
/// later input report).
pub struct Ft260 {
    transport: Option<Box<dyn HidTransport>>,
}

impl Ft260 {
    pub fn new(transport: Box<dyn HidTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// Wrap the driver for sharing between bus adapters.
    pub fn into_shared(self) -> SharedDriver {
        Arc::new(Mutex::new(self))
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    fn transport_mut(&mut self) -> DriverResult<&mut (dyn HidTransport + 'static)> {
        self.transport.as_deref_mut().ok_or(DriverError::Closed)
    }

    /// Query the chip silicon revision.
    ///
    /// # Errors
    /// Propagates transport failures; fails with [`DriverError::Closed`]
    /// after [`close`](Self::close).
    pub fn chip_version(&mut self) -> DriverResult<ChipVersion> {
        let mut report = protocol::chip_version_request();
        self.transport_mut()?.get_feature_report(&mut report)?;
        let version = ChipVersion::decode(&report)?;
        debug!(chip_code = ?version.chip_code, "chip version");
        Ok(version)
    }

    /// Query the chip operating mode, clock selection, and enable flags.
    ///
    /// # Errors
    /// Propagates transport failures and decode errors.
    pub fn system_status(&mut self) -> DriverResult<SystemStatus> {
        let mut report = protocol::system_status_request();
        self.transport_mut()?.get_feature_report(&mut report)?;
        let status = SystemStatus::decode(&report)?;
        debug!(
            chip_mode = status.chip_mode,
            i2c_enabled = status.i2c_enabled,
            "system status"
        );
        Ok(status)
    }

    /// Enable or disable the I2C controller.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub fn set_i2c_mode(&mut self, enable: bool) -> DriverResult<()> {
        let report = protocol::set_i2c_mode_report(enable);
        self.transport_mut()?.send_feature_report(&report)?;
        debug!(enable, "set I2C mode");
        Ok(())
    }

    /// Reset the I2C controller. The chip state with respect to any
    /// in-flight transaction is undefined after a failed exchange, so this
    /// is the recovery primitive for callers that need one.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub fn i2c_reset(&mut self) -> DriverResult<()> {
        let report = protocol::i2c_reset_report();
        self.transport_mut()?.send_feature_report(&report)?;
        debug!("I2C reset");
        Ok(())
    }

    /// Select the I2C clock speed in kHz.
    ///
    /// # Errors
    /// Propagates transport failures.
    pub fn set_i2c_clock_speed(&mut self, speed_khz: u16) -> DriverResult<()> {
        let report = protocol::set_i2c_clock_speed_report(speed_khz);
        self.transport_mut()?.send_feature_report(&report)?;
        debug!(speed_khz, "set I2C clock speed");
        Ok(())
    }

    /// Send one I2C write request. Returns the number of report bytes the
    /// transport accepted.
    ///
    /// # Errors
    /// Validation failures (address, payload length) are caught before any
    /// transport call; transport failures propagate verbatim.
    pub fn i2c_write_request(
        &mut self,
        address: u8,
        data: &[u8],
        condition: I2cCondition,
    ) -> DriverResult<usize> {
        let report = protocol::encode_i2c_write_request(address, condition, data)?;
        let n = self.transport_mut()?.write(&report)?;
        debug!(address, len = data.len(), ?condition, "I2C write request");
        Ok(n)
    }

    /// Arm an I2C read of `length` bytes. The data itself arrives in a
    /// subsequent [`i2c_input_report`](Self::i2c_input_report) once the
    /// chip has completed the bus transaction.
    ///
    /// # Errors
    /// Validation failures are caught before any transport call; transport
    /// failures propagate verbatim.
    pub fn i2c_read_request(
        &mut self,
        address: u8,
        condition: I2cCondition,
        length: u16,
    ) -> DriverResult<()> {
        let report = protocol::encode_i2c_read_request(address, condition, length)?;
        self.transport_mut()?.write(&report)?;
        debug!(address, length, ?condition, "I2C read request");
        Ok(())
    }

    /// Block until the chip delivers one input report, and return its
    /// payload.
    ///
    /// # Errors
    /// Propagates transport failures and malformed-report decode errors.
    pub fn i2c_input_report(&mut self) -> DriverResult<Vec<u8>> {
        self.read_input_report(None)
    }

    /// Like [`i2c_input_report`](Self::i2c_input_report) but bounded.
    /// Expiry surfaces as a timeout error distinguishable via
    /// [`DriverError::is_timeout`].
    ///
    /// # Errors
    /// Propagates transport failures, timeouts, and decode errors.
    pub fn i2c_input_report_timeout(&mut self, timeout: Duration) -> DriverResult<Vec<u8>> {
        self.read_input_report(Some(timeout))
    }

    fn read_input_report(&mut self, timeout: Option<Duration>) -> DriverResult<Vec<u8>> {
        let mut report = [0u8; protocol::I2C_INPUT_REPORT_LEN];
        let transport = self.transport_mut()?;
        match timeout {
            Some(t) => transport.read_timeout(&mut report, Some(t))?,
            None => transport.read(&mut report)?,
        };
        let payload = protocol::decode_i2c_input_report(&report)?;
        debug!(len = payload.len(), "I2C input report");
        Ok(payload)
    }

    /// Release the transport handle. Every subsequent operation fails with
    /// [`DriverError::Closed`].
    ///
    /// # Errors
    /// Propagates the transport's close failure; closing twice is an
    /// error.
    pub fn close(&mut self) -> DriverResult<()> {
        match self.transport.take() {
            Some(mut transport) => {
                transport.close()?;
                Ok(())
            }
            None => Err(DriverError::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ft260_hid_common::mock::MockTransport;

    fn mock_driver() -> (MockTransport, Ft260) {
        let mock = MockTransport::new(protocol::VENDOR_ID, protocol::PRODUCT_ID, "mock0");
        let driver = Ft260::new(Box::new(mock.clone()));
        (mock, driver)
    }

    #[test]
    fn test_chip_version_exchange() -> DriverResult<()> {
        let (mock, mut driver) = mock_driver();
        let mut response = vec![0xA0, 0x02, 0x03, 0x01, 0x00];
        response.resize(13, 0);
        mock.queue_feature_response(0xA0, response);

        let version = driver.chip_version()?;
        assert_eq!(version.chip_code, [0x02, 0x03, 0x01, 0x00]);
        Ok(())
    }

    #[test]
    fn test_setting_operations_send_feature_reports() -> DriverResult<()> {
        let (mock, mut driver) = mock_driver();

        driver.set_i2c_mode(true)?;
        driver.i2c_reset()?;
        driver.set_i2c_clock_speed(400)?;

        assert_eq!(
            mock.feature_history(),
            vec![
                vec![0xA1, 0x02, 0x01],
                vec![0xA1, 0x20],
                vec![0xA1, 0x22, 0x90, 0x01],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_write_request_validates_before_transport() {
        let (mock, mut driver) = mock_driver();

        let err = driver
            .i2c_write_request(0x90, &[0x01], I2cCondition::StartAndStop)
            .expect_err("address out of range");
        assert!(matches!(err, DriverError::Protocol(_)));

        let payload = vec![0u8; 61];
        assert!(
            driver
                .i2c_write_request(0x50, &payload, I2cCondition::StartAndStop)
                .is_err()
        );

        // Nothing reached the wire.
        assert!(mock.write_history().is_empty());
    }

    #[test]
    fn test_two_phase_read() -> DriverResult<()> {
        let (mock, mut driver) = mock_driver();
        let mut input = vec![0xDE, 0x02, 0xBE, 0xEF];
        input.resize(64, 0);
        mock.queue_read(input);

        driver.i2c_read_request(0x50, I2cCondition::StartAndStop, 2)?;
        let payload = driver.i2c_input_report()?;

        assert_eq!(mock.write_history(), vec![vec![0xC2, 0x50, 0x06, 0x02, 0x00]]);
        assert_eq!(payload, vec![0xBE, 0xEF]);
        Ok(())
    }

    #[test]
    fn test_input_report_timeout_is_distinguishable() {
        let (_mock, mut driver) = mock_driver();
        let err = driver
            .i2c_input_report_timeout(Duration::from_millis(5))
            .expect_err("nothing queued");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_operations_fail_cleanly_after_close() -> DriverResult<()> {
        let (_mock, mut driver) = mock_driver();
        driver.close()?;
        assert!(driver.is_closed());

        assert!(matches!(driver.chip_version(), Err(DriverError::Closed)));
        assert!(matches!(driver.i2c_reset(), Err(DriverError::Closed)));
        assert!(matches!(
            driver.i2c_input_report(),
            Err(DriverError::Closed)
        ));
        assert!(matches!(driver.close(), Err(DriverError::Closed)));
        Ok(())
    }
}
