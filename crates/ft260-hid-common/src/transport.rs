//! The synchronous HID transport trait and a scriptable mock.
//!
//! The FT260 protocol is strictly request/response, so the trait is
//! deliberately blocking: every method completes one wire exchange before
//! returning. Concurrent use of one transport from multiple threads must be
//! serialized by the caller.

use crate::{HidDeviceInfo, HidError, HidResult};
use std::time::Duration;

pub trait HidTransport: Send {
    /// Send one output report (first byte is the report ID). Returns the
    /// number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> HidResult<usize>;

    /// Blocking read of one input report into `buf`. Returns the number of
    /// bytes read.
    fn read(&mut self, buf: &mut [u8]) -> HidResult<usize>;

    /// Bounded read of one input report. `None` waits forever. A timeout
    /// surfaces as [`HidError::Timeout`], distinct from transport failure.
    fn read_timeout(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> HidResult<usize>;

    /// Feature report GET exchange: `buf[0]` selects the report ID, the
    /// device fills in the remainder. Returns the number of bytes read.
    fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize>;

    /// Feature report SET exchange (first byte is the report ID). Returns
    /// the number of bytes accepted.
    fn send_feature_report(&mut self, data: &[u8]) -> HidResult<usize>;

    fn device_info(&self) -> &HidDeviceInfo;

    fn close(&mut self) -> HidResult<()>;
}

pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// In-memory transport for driver tests.
    ///
    /// Clones share state, so a test can keep one handle for scripting and
    /// inspection while the driver owns another.
    pub struct MockTransport {
        info: HidDeviceInfo,
        read_queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
        write_history: Arc<Mutex<Vec<Vec<u8>>>>,
        feature_history: Arc<Mutex<Vec<Vec<u8>>>>,
        feature_responses: Arc<Mutex<HashMap<u8, VecDeque<Vec<u8>>>>>,
        connected: Arc<Mutex<bool>>,
    }

    impl MockTransport {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path.into()),
                read_queue: Arc::new(Mutex::new(VecDeque::new())),
                write_history: Arc::new(Mutex::new(Vec::new())),
                feature_history: Arc::new(Mutex::new(Vec::new())),
                feature_responses: Arc::new(Mutex::new(HashMap::new())),
                connected: Arc::new(Mutex::new(true)),
            }
        }

        /// Queue one input report to be returned by the next `read`.
        pub fn queue_read(&self, data: Vec<u8>) {
            let mut queue = self.read_queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.push_back(data);
        }

        /// Queue the device's answer to a feature report GET for `report_id`.
        /// The queued bytes should start with the report ID, as on the wire.
        pub fn queue_feature_response(&self, report_id: u8, data: Vec<u8>) {
            let mut responses = self
                .feature_responses
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            responses.entry(report_id).or_default().push_back(data);
        }

        /// All output reports written so far.
        pub fn write_history(&self) -> Vec<Vec<u8>> {
            let history = self.write_history.lock().unwrap_or_else(|e| e.into_inner());
            history.clone()
        }

        /// All feature reports SET so far.
        pub fn feature_history(&self) -> Vec<Vec<u8>> {
            let history = self
                .feature_history
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            history.clone()
        }

        pub fn disconnect(&self) {
            let mut connected = self.connected.lock().unwrap_or_else(|e| e.into_inner());
            *connected = false;
        }

        pub fn is_connected(&self) -> bool {
            *self.connected.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn check_connected(&self) -> HidResult<()> {
            if self.is_connected() {
                Ok(())
            } else {
                Err(HidError::Disconnected)
            }
        }

        fn pop_read(&self) -> Option<Vec<u8>> {
            let mut queue = self.read_queue.lock().unwrap_or_else(|e| e.into_inner());
            queue.pop_front()
        }
    }

    impl Clone for MockTransport {
        fn clone(&self) -> Self {
            Self {
                info: self.info.clone(),
                read_queue: Arc::clone(&self.read_queue),
                write_history: Arc::clone(&self.write_history),
                feature_history: Arc::clone(&self.feature_history),
                feature_responses: Arc::clone(&self.feature_responses),
                connected: Arc::clone(&self.connected),
            }
        }
    }

    fn fill(buf: &mut [u8], data: &[u8]) -> usize {
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        n
    }

    impl HidTransport for MockTransport {
        fn write(&mut self, data: &[u8]) -> HidResult<usize> {
            self.check_connected()?;
            let mut history = self.write_history.lock().unwrap_or_else(|e| e.into_inner());
            history.push(data.to_vec());
            Ok(data.len())
        }

        fn read(&mut self, buf: &mut [u8]) -> HidResult<usize> {
            self.check_connected()?;
            let data = self
                .pop_read()
                .ok_or_else(|| HidError::Read("no data available".to_string()))?;
            Ok(fill(buf, &data))
        }

        fn read_timeout(&mut self, buf: &mut [u8], _timeout: Option<Duration>) -> HidResult<usize> {
            self.check_connected()?;
            match self.pop_read() {
                Some(data) => Ok(fill(buf, &data)),
                None => Err(HidError::Timeout),
            }
        }

        fn get_feature_report(&mut self, buf: &mut [u8]) -> HidResult<usize> {
            self.check_connected()?;
            let report_id = *buf
                .first()
                .ok_or_else(|| HidError::Feature("empty feature report buffer".to_string()))?;
            let mut responses = self
                .feature_responses
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            let data = responses
                .get_mut(&report_id)
                .and_then(|queue| queue.pop_front())
                .ok_or_else(|| {
                    HidError::Feature(format!("no response queued for report {report_id:#04x}"))
                })?;
            Ok(fill(buf, &data))
        }

        fn send_feature_report(&mut self, data: &[u8]) -> HidResult<usize> {
            self.check_connected()?;
            let mut history = self
                .feature_history
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            history.push(data.to_vec());
            Ok(data.len())
        }

        fn device_info(&self) -> &HidDeviceInfo {
            &self.info
        }

        fn close(&mut self) -> HidResult<()> {
            self.disconnect();
            Ok(())
        }
    }
}
