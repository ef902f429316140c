//! Medium traits
//!
//! The capability interface a store is bound to at construction time.

use crate::error::Result;

/// Byte storage a dictionary buffer is mirrored to and loaded from
pub trait Medium {
    /// Physical size for fixed media, `None` for media that can grow
    fn fixed_capacity(&self) -> Option<usize>;

    /// Read the whole medium (its full capacity)
    fn read_all(&mut self) -> Result<Vec<u8>>;

    /// Overwrite the medium starting at offset 0
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Overwrite `bytes.len()` bytes starting at `offset`
    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<()>;
}

/// Byte-addressable device with no atomicity guarantees (e.g. an EEPROM)
pub trait ByteDevice {
    /// Number of addressable bytes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_byte(&mut self, addr: usize) -> u8;

    fn write_byte(&mut self, addr: usize, value: u8);
}
