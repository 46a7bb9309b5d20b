/// Byte stream between the host and a reader.
///
/// The serial backend lives in `serial.rs`; tests supply in-memory streams.
pub trait ReaderTransport {
    type Error: std::fmt::Debug;

    /// Send every byte of `data` or fail
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Wait up to `timeout_ms` for input and copy what arrived into `buf`.
    ///
    /// Must block for the full timeout before returning `Ok(0)`; callers
    /// loop on this until their own deadline, so an immediate `Ok(0)`
    /// turns every read into a busy wait.
    fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, Self::Error>;

    /// Drop input received but not yet read
    fn clear_input(&mut self) -> Result<(), Self::Error>;
}
