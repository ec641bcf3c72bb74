//! `hidapi`-backed implementation of [`HidTransport`].

use crate::{HidDeviceInfo, HidError, HidResult, HidTransport};
use hidapi::{DeviceInfo, HidApi};
use std::ffi::CString;
use std::time::Duration;
use tracing::debug;

/// List attached devices matching a vendor/product identifier pair.
pub fn enumerate_devices(api: &HidApi, vendor_id: u16, product_id: u16) -> Vec<HidDeviceInfo> {
    api.device_list()
        .filter(|dev| dev.vendor_id() == vendor_id && dev.product_id() == product_id)
        .map(to_device_info)
        .collect()
}

fn to_device_info(dev: &DeviceInfo) -> HidDeviceInfo {
    let mut info = HidDeviceInfo::new(
        dev.vendor_id(),
        dev.product_id(),
        dev.path().to_string_lossy().into_owned(),
    );
    if let Some(serial) = dev.serial_number() {
        info = info.with_serial(serial);
    }
    if let Some(manufacturer) = dev.manufacturer_string() {
        info = info.with_manufacturer(manufacturer);
    }
    if let Some(product) = dev.product_string() {
        info = info.with_product_name(product);
    }
    info
}

/// A real HID device handle. The underlying OS handle is released on drop.
pub struct HidapiTransport {
    device: hidapi::HidDevice,
    info: HidDeviceInfo,
}

impl HidapiTransport {
    /// Reopen a previously enumerated device by its platform path.
    pub fn open(api: &HidApi, info: &HidDeviceInfo) -> HidResult<Self> {
        let path =
            CString::new(info.path.as_str()).map_err(|e| HidError::Open(e.to_string()))?;
        let device = api
            .open_path(&path)
            .map_err(|e| HidError::Open(e.to_string()))?;
        debug!(path = %info.path, "opened HID device");
        Ok(Self {
            device,
            info: info.clone(),
        })
    }

    /// Open the `index`-th attached device matching `vendor_id:product_id`.
    pub fn open_nth(
        api: &HidApi,
        vendor_id: u16,
        product_id: u16,
        index: usize,
    ) -> HidResult<Self> {
        let devices = enumerate_devices(api, vendor_id, product_id);
        let info = devices.get(index).ok_or_else(|| {
            HidError::DeviceNotFound(format!(
                "{vendor_id:04x}:{product_id:04x} index {index} ({} attached)",
                devices.len()
            ))
        })?;
        Self::open(api, info)
    }
}

impl HidTransport for HidapiTransport {
    fn write(&mut self, data: &[u8]) -> HidResult<usize> {
        self.device
            .write(data)
            .map_err(|e| HidError::Write(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        self.device
            .read(buf)
            .map_err(|e| HidError::Read(e.to_string()))
    }

    fn read_timeout(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> HidResult<usize> {
        // hidapi takes milliseconds, with -1 meaning block forever, and
        // reports an expired timeout as a zero-byte read.
        let timeout_ms = match timeout {
            Some(t) => i32::try_from(t.as_millis()).unwrap_or(i32::MAX),
            None => -1,
        };
        let n = self
            .device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| HidError::Read(e.to_string()))?;
        if n == 0 && timeout.is_some() {
            return Err(HidError::Timeout);
        }
        Ok(n)
    }

    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
        self.device
            .get_feature_report(buf)
            .map_err(|e| HidError::Feature(e.to_string()))
    }

    fn send_feature_report(&mut self, data: &[u8]) -> HidResult<usize> {
        self.device
            .send_feature_report(data)
            .map_err(|e| HidError::Feature(e.to_string()))?;
        Ok(data.len())
    }

    fn device_info(&self) -> &HidDeviceInfo {
        &self.info
    }

    fn close(&mut self) -> HidResult<()> {
        debug!(path = %self.info.path, "closing HID device");
        Ok(())
    }
}
