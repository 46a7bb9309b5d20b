//! Reader handle that can be shared between threads

use std::sync::{Arc, Mutex};

use crate::reader::ReaderHandle;
use crate::transport::ReaderTransport;
use crate::types::{Command, ReaderError, ReaderModel, TagReport};

/// Cloneable handle serializing all access to one reader behind a mutex
pub struct SharedReader<T: ReaderTransport> {
    inner: Arc<Mutex<ReaderHandle<T>>>,
}

impl<T: ReaderTransport> Clone for SharedReader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ReaderTransport> SharedReader<T> {
    pub fn new(handle: ReaderHandle<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(handle)),
        }
    }

    fn with<R>(
        &self,
        f: impl FnOnce(&mut ReaderHandle<T>) -> Result<R, ReaderError>,
    ) -> Result<R, ReaderError> {
        let mut handle = self.inner.lock().map_err(|_| ReaderError::Poisoned)?;
        f(&mut *handle)
    }

    pub fn is_open(&self) -> Result<bool, ReaderError> {
        self.with(|handle| Ok(handle.is_open()))
    }

    pub fn announce(&self) -> Result<(), ReaderError> {
        self.with(|handle| handle.announce())
    }

    /// Close the underlying handle for every clone
    pub fn close(&self) -> Result<(), ReaderError> {
        self.with(|handle| handle.close())
    }

    /// Holds the lock for the whole read, so other clones wait up to the read timeout
    pub fn read_tag(&self) -> Result<TagReport, ReaderError> {
        self.with(|handle| handle.read_tag())
    }

    pub fn send(&self, command: Command) -> Result<(), ReaderError> {
        self.with(|handle| handle.send(command))
    }

    pub fn set_power_level(&self, dbm: i32) -> Result<(), ReaderError> {
        self.send(Command::SetPower { dbm })
    }

    pub fn set_ping_rate(&self, millis: i32) -> Result<(), ReaderError> {
        self.send(Command::SetPingRate { millis })
    }

    pub fn scan(&self, model: ReaderModel) -> Result<Vec<u8>, ReaderError> {
        self.with(|handle| handle.scan(model))
    }

    /// Take back the handle if this is the last clone and the lock is not poisoned
    pub fn into_inner(self) -> Option<ReaderHandle<T>> {
        Arc::try_unwrap(self.inner)
            .ok()
            .and_then(|mutex| mutex.into_inner().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReaderConfig;

    struct NullTransport;

    impl ReaderTransport for NullTransport {
        type Error = std::io::Error;

        fn write(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read(&mut self, _buf: &mut [u8], _timeout_ms: u32) -> Result<usize, Self::Error> {
            Ok(0)
        }

        fn clear_input(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_panicked_holder_poisons_shared_reader() {
        let handle = ReaderHandle::new(NullTransport, ReaderConfig::new("COM4", 115200));
        let shared = SharedReader::new(handle);
        let holder = shared.clone();

        let worker: std::thread::JoinHandle<()> = std::thread::spawn(move || {
            let _handle = holder.inner.lock().unwrap();
            panic!("worker died while holding the reader");
        });
        assert!(worker.join().is_err());

        assert_eq!(shared.set_power_level(20), Err(ReaderError::Poisoned));
        assert_eq!(shared.is_open(), Err(ReaderError::Poisoned));
        assert!(shared.into_inner().is_none());
    }
}
