//! Types for reader operations

use std::fmt;
use std::time::Duration;

/// Read timeout used when none is configured
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// One line reported by the reader, trailing newline included.
///
/// The content is opaque; an empty report means no data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport(String);

impl TagReport {
    pub(crate) fn from_bytes(line: &[u8]) -> Self {
        Self(String::from_utf8_lossy(line).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The report without surrounding whitespace and line terminator
    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration commands understood by the reader.
///
/// Values are passed through unchecked, the reader decides what it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Transmit power in dBm (`SET_PWR`)
    SetPower { dbm: i32 },
    /// Tag polling interval in milliseconds (`SET_PING`)
    SetPingRate { millis: i32 },
}

impl Command {
    /// Wire encoding: the command line followed by `\n`
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}\n", self).into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetPower { dbm } => write!(f, "SET_PWR {}", dbm),
            Command::SetPingRate { millis } => write!(f, "SET_PING {}", millis),
        }
    }
}

/// Reader families with a binary single-poll frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderModel {
    R200,
    E200,
}

impl ReaderModel {
    const R200_HEADER: u8 = 0xAA;
    const R200_END: u8 = 0xDD;
    const R200_CMD_TYPE: u8 = 0x00;
    const R200_SINGLE_POLL: u8 = 0x22;

    const E200_SINGLE_POLL: [u8; 12] = [
        0x55, 0x00, 0x07, 0x97, 0x83, 0x03, 0x01, 0x07, 0x08, 0x00, 0xC2, 0x0D,
    ];

    /// Frame that triggers a single inventory round on this model
    pub fn scan_frame(&self) -> Vec<u8> {
        match self {
            ReaderModel::R200 => Self::r200_frame(Self::R200_SINGLE_POLL, &[]),
            ReaderModel::E200 => Self::E200_SINGLE_POLL.to_vec(),
        }
    }

    /// R200 command frame. The checksum covers everything between header and checksum.
    pub(crate) fn r200_frame(command: u8, params: &[u8]) -> Vec<u8> {
        let param_len = params.len() as u16;
        let msb = (param_len >> 8) as u8;
        let lsb = (param_len & 0xFF) as u8;

        let checksum = [Self::R200_CMD_TYPE, command, msb, lsb]
            .iter()
            .chain(params.iter())
            .fold(0u8, |acc, &b| acc.wrapping_add(b));

        let mut frame = vec![Self::R200_HEADER, Self::R200_CMD_TYPE, command, msb, lsb];
        frame.extend_from_slice(params);
        frame.push(checksum);
        frame.push(Self::R200_END);
        frame
    }
}

/// Connection settings for a reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl ReaderConfig {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Errors that can occur during reader operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    /// The device could not be opened
    Open(String),
    /// No complete line arrived within the read timeout
    Timeout(Duration),
    /// The handle was closed
    Closed,
    /// Device I/O failed
    Io(String),
    /// A thread panicked while holding a shared handle
    Poisoned,
}

impl ReaderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReaderError::Timeout(_))
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Open(reason) => write!(f, "failed to open reader: {}", reason),
            ReaderError::Timeout(timeout) => write!(f, "no tag report within {:?}", timeout),
            ReaderError::Closed => write!(f, "reader handle is closed"),
            ReaderError::Io(reason) => write!(f, "reader I/O error: {}", reason),
            ReaderError::Poisoned => write!(f, "shared reader lock poisoned"),
        }
    }
}

impl std::error::Error for ReaderError {}
