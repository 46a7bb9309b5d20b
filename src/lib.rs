//! Driver for UHF RFID readers that speak a line-oriented text protocol over a serial link.
//!
//! The reader reports each detected tag as one newline-terminated line and
//! accepts two configuration commands, `SET_PWR <dBm>` and `SET_PING <ms>`.
//! Commands are fire-and-forget: no acknowledgement is read back.
//!
//! # Features
//!
//! - `serial` (default) - Serial port transport for desktop using serialport crate
//!
//! # Example
//!
//! ```ignore
//! use uhf_line_reader::ReaderHandle;
//!
//! let mut reader = ReaderHandle::open("/dev/ttyUSB0", 115200)?;
//! reader.announce()?;
//! reader.set_power_level(26)?;
//! reader.set_ping_rate(500)?;
//!
//! match reader.read_tag() {
//!     Ok(tag) => println!("Tag data: {}", tag.trimmed()),
//!     Err(e) if e.is_timeout() => println!("No tag in range"),
//!     Err(e) => return Err(e.into()),
//! }
//! reader.close()?;
//! ```

mod reader;
mod shared;
mod transport;
mod types;

#[cfg(feature = "serial")]
mod serial;

// Re-exports
pub use reader::ReaderHandle;
pub use shared::SharedReader;
pub use transport::ReaderTransport;
pub use types::{Command, DEFAULT_READ_TIMEOUT, ReaderConfig, ReaderError, ReaderModel, TagReport};

#[cfg(feature = "serial")]
pub use serial::SerialTransport;
