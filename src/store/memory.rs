//! Memory medium
//!
//! A fixed-size simulated EEPROM. Handles are cheap clones sharing one image,
//! so the owner of a dictionary can keep a handle to inspect what was
//! persisted and how many bytes were written.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DictError, Result};

use super::{Medium, ERASED_BYTE};

/// Shared, fixed-size in-memory medium
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug)]
struct MemoryState {
    bytes: Vec<u8>,
    /// Total bytes written through the Medium interface
    bytes_written: u64,
    /// Number of write_all/write_range calls
    write_calls: u64,
}

impl MemoryMedium {
    /// Create an erased medium of `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![ERASED_BYTE; capacity])
    }

    /// Create a medium holding an existing image
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                bytes,
                bytes_written: 0,
                write_calls: 0,
            })),
        }
    }

    /// Copy of the current image
    pub fn snapshot(&self) -> Vec<u8> {
        self.state.lock().bytes.clone()
    }

    /// Overwrite a single byte without counting it as a write
    pub fn poke(&self, addr: usize, value: u8) {
        if let Some(byte) = self.state.lock().bytes.get_mut(addr) {
            *byte = value;
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.state.lock().bytes_written
    }

    pub fn write_calls(&self) -> u64 {
        self.state.lock().write_calls
    }

    pub fn len(&self) -> usize {
        self.state.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Medium for MemoryMedium {
    fn fixed_capacity(&self) -> Option<usize> {
        Some(self.len())
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok(self.snapshot())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_range(0, bytes)
    }

    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        let end = offset + bytes.len();
        if end > state.bytes.len() {
            return Err(DictError::Medium(format!(
                "write of {} bytes at {} exceeds medium size {}",
                bytes.len(),
                offset,
                state.bytes.len()
            )));
        }
        state.bytes[offset..end].copy_from_slice(bytes);
        state.bytes_written += bytes.len() as u64;
        state.write_calls += 1;
        Ok(())
    }
}
