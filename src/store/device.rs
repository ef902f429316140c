//! Device medium
//!
//! Adapts a byte-at-a-time device to the `Medium` interface.

use crate::error::{DictError, Result};

use super::{ByteDevice, Medium};

/// Medium over a `ByteDevice`, skipping writes of unchanged bytes
pub struct DeviceMedium<D: ByteDevice> {
    device: D,
}

impl<D: ByteDevice> DeviceMedium<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }
}

impl<D: ByteDevice> Medium for DeviceMedium<D> {
    fn fixed_capacity(&self) -> Option<usize> {
        Some(self.device.len())
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok((0..self.device.len())
            .map(|addr| self.device.read_byte(addr))
            .collect())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_range(0, bytes)
    }

    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        if offset + bytes.len() > self.device.len() {
            return Err(DictError::Medium(format!(
                "write of {} bytes at {} exceeds device size {}",
                bytes.len(),
                offset,
                self.device.len()
            )));
        }
        for (i, &value) in bytes.iter().enumerate() {
            let addr = offset + i;
            // EEPROM cells wear per write
            if self.device.read_byte(addr) != value {
                self.device.write_byte(addr, value);
            }
        }
        Ok(())
    }
}
