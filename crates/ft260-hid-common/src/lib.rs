//! Common HID plumbing for the FT260 driver stack.
//!
//! This crate provides the pieces every layer above shares: a synchronous
//! [`HidTransport`] trait modelling the raw HID exchanges the FT260 uses
//! (interrupt write/read plus get/set feature report), a [`hidapi`]-backed
//! implementation of it, device identity types, and bounds-checked report
//! parsing/building helpers. A scriptable [`mock::MockTransport`] lives in
//! [`transport::mock`] for exercising drivers without hardware.

pub mod backend;
pub mod device_info;
pub mod report;
pub mod transport;

pub use backend::{HidapiTransport, enumerate_devices};
pub use device_info::HidDeviceInfo;
pub use report::{ReportBuilder, ReportParser};
pub use transport::{HidTransport, mock};

use thiserror::Error;

/// Errors surfaced by HID transports and report parsing.
#[derive(Error, Debug)]
pub enum HidError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to open device: {0}")]
    Open(String),

    #[error("failed to read from device: {0}")]
    Read(String),

    #[error("failed to write to device: {0}")]
    Write(String),

    #[error("feature report exchange failed: {0}")]
    Feature(String),

    #[error("read timed out")]
    Timeout,

    #[error("invalid report: {0}")]
    InvalidReport(String),

    #[error("device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HidError {
    /// True for the bounded-read timeout outcome, as opposed to a hard
    /// transport failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HidError::Timeout)
    }
}

pub type HidResult<T> = Result<T, HidError>;
