//! Driver stack for the FTDI FT260 USB to I2C bridge.
//!
//! Three layers, bottom up:
//! - [`Ft260`] — the chip driver: one blocking request/response exchange
//!   per chip operation over a [`ft260_hid_common::HidTransport`].
//! - [`Ft260I2cBus`] — a synchronous single-transaction I2C interface
//!   ([`I2cBus`]) sequencing the chip's two-phase read protocol.
//! - [`BusRegistry`] / [`DriverCache`] / [`register_ft260_buses`] — named
//!   bus openers over enumerated devices, deduplicating open handles.
//!
//! The chip permits one outstanding transaction at a time, so there is no
//! internal queuing or retry anywhere: every error propagates to the
//! caller, and a caller needing recovery issues an explicit
//! [`Ft260::i2c_reset`] before retrying.

pub mod bus;
pub mod driver;
pub mod registry;

pub use bus::{DEFAULT_WRITE_READ_DELAY, Ft260I2cBus, I2cBus};
pub use driver::{Ft260, SharedDriver};
pub use registry::{BusOpener, BusRegistry, DriverCache, register_ft260_buses};

use ft260_hid_common::HidError;
use hid_ft260_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the driver, bus adapter, and registry.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Caller error caught before any transport exchange.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Failure reported by the underlying HID transport, propagated
    /// verbatim.
    #[error("transport error: {0}")]
    Transport(#[from] HidError),

    #[error("device handle closed")]
    Closed,

    #[error("bus {0:?} is already registered")]
    AlreadyRegistered(String),

    #[error("bus {0:?} is not registered")]
    NotRegistered(String),
}

impl DriverError {
    /// True when a bounded input report read expired, as opposed to the
    /// device going away.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Transport(HidError::Timeout))
    }
}

pub type DriverResult<T> = Result<T, DriverError>;
