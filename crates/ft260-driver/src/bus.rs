//! Synchronous I2C bus interface over the two-phase chip protocol.

use crate::registry::DriverCache;
use crate::{DriverResult, SharedDriver};
use hid_ft260_protocol::{I2cCondition, ProtocolError};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Delay between the write and read phases of a combined transaction.
///
/// The chip gives no readiness handshake after a write, so this is a
/// heuristic grace period for the peripheral, tunable via
/// [`Ft260I2cBus::with_write_read_delay`].
pub const DEFAULT_WRITE_READ_DELAY: Duration = Duration::from_millis(1);

/// A synchronous single-transaction I2C bus.
pub trait I2cBus: Send {
    /// Bus identity, also used as the registry key.
    fn name(&self) -> &str;

    /// One I2C transaction: write `write` to `address` (if non-empty),
    /// then read `read.len()` bytes into `read` (if non-empty). Any
    /// failure aborts the transaction; there is no implicit reset or
    /// retry.
    ///
    /// # Errors
    /// Addressing and length validation errors are returned before any
    /// transport exchange; transport failures propagate verbatim.
    fn tx(&mut self, address: u16, write: &[u8], read: &mut [u8]) -> DriverResult<()>;

    /// Change the bus clock, given a frequency in hertz.
    ///
    /// # Errors
    /// Frequencies above 65 535 kHz are rejected before any transport
    /// call.
    fn set_speed(&mut self, frequency_hz: u32) -> DriverResult<()>;

    /// Close the underlying device handle.
    ///
    /// # Errors
    /// Propagates the driver's close failure.
    fn close(&mut self) -> DriverResult<()>;
}

/// [`I2cBus`] implementation over a shared [`crate::Ft260`] driver.
pub struct Ft260I2cBus {
    name: String,
    dev: SharedDriver,
    write_read_delay: Duration,
    cache: Option<Arc<DriverCache>>,
}

impl Ft260I2cBus {
    pub fn new(name: impl Into<String>, dev: SharedDriver) -> Self {
        Self {
            name: name.into(),
            dev,
            write_read_delay: DEFAULT_WRITE_READ_DELAY,
            cache: None,
        }
    }

    /// Tune the grace period between the write and read phases of a
    /// combined transaction.
    pub fn with_write_read_delay(mut self, delay: Duration) -> Self {
        self.write_read_delay = delay;
        self
    }

    /// Tie this bus to a [`DriverCache`] entry, removed when the bus is
    /// explicitly closed.
    pub fn with_cache(mut self, cache: Arc<DriverCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl fmt::Display for Ft260I2cBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl I2cBus for Ft260I2cBus {
    fn name(&self) -> &str {
        &self.name
    }

    fn tx(&mut self, address: u16, write: &[u8], read: &mut [u8]) -> DriverResult<()> {
        if address >= 0x80 {
            return Err(ProtocolError::InvalidSlaveAddress(address).into());
        }
        let address = address as u8;

        let mut dev = self.dev.lock();

        if !write.is_empty() {
            dev.i2c_write_request(address, write, I2cCondition::StartAndStop)?;
        }

        if !write.is_empty() && !read.is_empty() {
            // Give the peripheral time to prepare its response; the chip
            // itself never signals readiness.
            thread::sleep(self.write_read_delay);
        }

        if !read.is_empty() {
            let length = u16::try_from(read.len())
                .map_err(|_| ProtocolError::InvalidReadLength(read.len()))?;
            dev.i2c_read_request(address, I2cCondition::StartAndStop, length)?;
            let payload = dev.i2c_input_report()?;
            // Fill the caller's buffer; excess returned bytes are ignored.
            for (dst, src) in read.iter_mut().zip(payload.iter()) {
                *dst = *src;
            }
        }

        Ok(())
    }

    fn set_speed(&mut self, frequency_hz: u32) -> DriverResult<()> {
        let speed_khz = frequency_hz / 1000;
        let speed_khz = u16::try_from(speed_khz)
            .map_err(|_| ProtocolError::InvalidClockSpeed(u64::from(speed_khz)))?;
        self.dev.lock().set_i2c_clock_speed(speed_khz)
    }

    fn close(&mut self) -> DriverResult<()> {
        self.dev.lock().close()?;
        if let Some(cache) = self.cache.take() {
            cache.remove(&self.name);
            debug!(bus = %self.name, "removed closed bus from driver cache");
        }
        Ok(())
    }
}
