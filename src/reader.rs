use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::transport::ReaderTransport;
use crate::types::{Command, ReaderConfig, ReaderError, ReaderModel, TagReport};

const CHUNK_SIZE: usize = 256;

pub struct ReaderHandle<T: ReaderTransport> {
    transport: Option<T>,
    config: ReaderConfig,
    pending: Vec<u8>,
}

impl<T: ReaderTransport> ReaderHandle<T> {
    const LINE_END: u8 = b'\n';
    // A scan reply is complete once the line stays silent this long
    const SCAN_QUIET_MS: u32 = 100;

    /// Create a reader handle over an already open transport
    pub fn new(transport: T, config: ReaderConfig) -> Self {
        Self {
            transport: Some(transport),
            config,
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Log that the connection is up. Has no effect on the device.
    pub fn announce(&self) -> Result<(), ReaderError> {
        if !self.is_open() {
            return Err(ReaderError::Closed);
        }
        info!(
            "Connected to {} at {} baud.",
            self.config.port_name, self.config.baud_rate
        );
        Ok(())
    }

    /// Release the transport. Every later call on this handle fails with [`ReaderError::Closed`].
    pub fn close(&mut self) -> Result<(), ReaderError> {
        let transport = self.transport.take().ok_or(ReaderError::Closed)?;
        drop(transport);
        self.pending.clear();
        info!("Disconnected from UHF reader.");
        Ok(())
    }

    /// Read one tag report, blocking up to the configured read timeout
    ///
    /// # Returns
    /// The line including its trailing newline. Bytes received after the
    /// newline, or a partial line at timeout, are kept for the next call.
    pub fn read_tag(&mut self) -> Result<TagReport, ReaderError> {
        let timeout = self.config.read_timeout;
        let deadline = Instant::now().checked_add(timeout);
        let transport = self.transport.as_mut().ok_or(ReaderError::Closed)?;

        loop {
            if let Some(end) = self.pending.iter().position(|&b| b == Self::LINE_END) {
                let line: Vec<u8> = self.pending.drain(..=end).collect();
                debug!("Received tag line: {:?}", String::from_utf8_lossy(&line));
                return Ok(TagReport::from_bytes(&line));
            }

            let remaining = time_left(deadline);
            if remaining.is_zero() {
                return Err(ReaderError::Timeout(timeout));
            }

            let mut chunk = [0u8; CHUNK_SIZE];
            let bytes_read = transport
                .read(&mut chunk, wait_ms(remaining))
                .map_err(io_error)?;
            self.pending.extend_from_slice(&chunk[..bytes_read]);
        }
    }

    /// Read one tag report, logging any failure and returning an empty report instead
    pub fn read_tag_lossy(&mut self) -> TagReport {
        match self.read_tag() {
            Ok(report) => report,
            Err(e) => {
                error!("Error reading from the UHF reader: {}", e);
                TagReport::default()
            }
        }
    }

    /// Send a configuration command. No acknowledgement is awaited.
    pub fn send(&mut self, command: Command) -> Result<(), ReaderError> {
        let transport = self.transport.as_mut().ok_or(ReaderError::Closed)?;
        debug!("Sending command: {}", command);
        transport.write(&command.to_bytes()).map_err(io_error)
    }

    /// Set transmit power in dBm
    pub fn set_power_level(&mut self, dbm: i32) -> Result<(), ReaderError> {
        self.send(Command::SetPower { dbm })
    }

    /// Set the tag polling interval in milliseconds
    pub fn set_ping_rate(&mut self, millis: i32) -> Result<(), ReaderError> {
        self.send(Command::SetPingRate { millis })
    }

    /// Trigger one inventory round on a binary-protocol reader
    ///
    /// # Returns
    /// The raw, undecoded reply bytes
    pub fn scan(&mut self, model: ReaderModel) -> Result<Vec<u8>, ReaderError> {
        let timeout = self.config.read_timeout;
        let transport = self.transport.as_mut().ok_or(ReaderError::Closed)?;

        transport.clear_input().map_err(io_error)?;
        self.pending.clear();

        let frame = model.scan_frame();
        debug!("Sending {:?} scan frame: {:02X?}", model, frame);
        transport.write(&frame).map_err(io_error)?;

        let deadline = Instant::now().checked_add(timeout);
        let mut response = Vec::new();

        loop {
            let remaining = time_left(deadline);
            if remaining.is_zero() {
                break;
            }

            let wait = if response.is_empty() {
                wait_ms(remaining)
            } else {
                wait_ms(remaining).min(Self::SCAN_QUIET_MS)
            };

            let mut chunk = [0u8; CHUNK_SIZE];
            match transport.read(&mut chunk, wait).map_err(io_error)? {
                0 if !response.is_empty() => break,
                0 => {}
                bytes_read => response.extend_from_slice(&chunk[..bytes_read]),
            }
        }

        if response.is_empty() {
            return Err(ReaderError::Timeout(timeout));
        }
        debug!("Received {} bytes: {:02X?}", response.len(), response);
        Ok(response)
    }
}

// A timeout too large to add to the clock never expires
fn time_left(deadline: Option<Instant>) -> Duration {
    match deadline {
        Some(deadline) => deadline.saturating_duration_since(Instant::now()),
        None => Duration::MAX,
    }
}

fn wait_ms(remaining: Duration) -> u32 {
    u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX).max(1)
}

fn io_error<E: std::fmt::Debug>(e: E) -> ReaderError {
    ReaderError::Io(format!("{:?}", e))
}
