//! Serial port transport for desktop using serialport crate

use crate::reader::ReaderHandle;
use crate::transport::ReaderTransport;
use crate::types::{ReaderConfig, ReaderError};
use log::debug;
use std::io::ErrorKind;
use std::time::Duration;

pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    /// Open the port as 8N1 without flow control
    pub fn open(config: &ReaderConfig) -> Result<Self, serialport::Error> {
        let port = serialport::new(config.port_name.as_str(), config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.read_timeout)
            .open()?;
        port.clear(serialport::ClearBuffer::Input)?;

        Ok(Self { port })
    }
}

impl ReaderTransport for SerialTransport {
    type Error = std::io::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        std::io::Write::write_all(&mut self.port, data)?;
        std::io::Write::flush(&mut self.port)
    }

    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error> {
        self.port
            .set_timeout(Duration::from_millis(timeout_ms as u64))
            .map_err(std::io::Error::other)?;
        match std::io::Read::read(&mut self.port, buf) {
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            other => other,
        }
    }

    fn clear_input(&mut self) -> Result<(), Self::Error> {
        let discarded = self.port.bytes_to_read().unwrap_or(0);
        if discarded > 0 {
            debug!("Discarding {} stale input bytes", discarded);
        }
        Ok(self.port.clear(serialport::ClearBuffer::Input)?)
    }
}

impl ReaderHandle<SerialTransport> {
    /// Open a reader on a serial device with the default read timeout
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, ReaderError> {
        Self::open_with_config(ReaderConfig::new(port_name, baud_rate))
    }

    pub fn open_with_config(config: ReaderConfig) -> Result<Self, ReaderError> {
        debug!(
            "Opening {} at {} baud, read timeout {:?}",
            config.port_name, config.baud_rate, config.read_timeout
        );
        let transport = SerialTransport::open(&config)
            .map_err(|e| ReaderError::Open(format!("{}: {}", config.port_name, e)))?;
        Ok(Self::new(transport, config))
    }
}
