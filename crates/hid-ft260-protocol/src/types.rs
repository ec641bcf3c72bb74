//! Wire enumerations used by FT260 reports.
//!
//! Each enum is a closed set of the codes the datasheet defines plus an
//! `Unknown` variant carrying the raw byte, so an unexpected wire value
//! decodes without crashing and re-encodes unchanged.

use serde::{Deserialize, Serialize};

/// System clock selection reported in the system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemClockSpeed {
    Mhz12,
    Mhz24,
    Mhz48,
    Unknown(u8),
}

impl SystemClockSpeed {
    pub fn from_wire(code: u8) -> Self {
        match code {
            0 => Self::Mhz12,
            1 => Self::Mhz24,
            2 => Self::Mhz48,
            other => Self::Unknown(other),
        }
    }

    pub fn wire(self) -> u8 {
        match self {
            Self::Mhz12 => 0,
            Self::Mhz24 => 1,
            Self::Mhz48 => 2,
            Self::Unknown(code) => code,
        }
    }
}

/// UART flow control mode reported in the system status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UartMode {
    Off,
    CtsRts,
    DtrDts,
    XonXoff,
    NoFlowControl,
    Unknown(u8),
}

impl UartMode {
    pub fn from_wire(code: u8) -> Self {
        match code {
            0 => Self::Off,
            1 => Self::CtsRts,
            2 => Self::DtrDts,
            3 => Self::XonXoff,
            4 => Self::NoFlowControl,
            other => Self::Unknown(other),
        }
    }

    pub fn wire(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::CtsRts => 1,
            Self::DtrDts => 2,
            Self::XonXoff => 3,
            Self::NoFlowControl => 4,
            Self::Unknown(code) => code,
        }
    }
}

/// START/STOP framing accompanying an I2C transaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum I2cCondition {
    None,
    Start,
    RepeatedStart,
    Stop,
    /// A complete standalone transaction.
    StartAndStop,
    Unknown(u8),
}

impl I2cCondition {
    pub fn from_wire(code: u8) -> Self {
        match code {
            0x00 => Self::None,
            0x02 => Self::Start,
            0x03 => Self::RepeatedStart,
            0x04 => Self::Stop,
            0x06 => Self::StartAndStop,
            other => Self::Unknown(other),
        }
    }

    pub fn wire(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Start => 0x02,
            Self::RepeatedStart => 0x03,
            Self::Stop => 0x04,
            Self::StartAndStop => 0x06,
            Self::Unknown(code) => code,
        }
    }
}
