//! Volatile medium
//!
//! Heap-only backing: the buffer can grow freely and nothing survives a drop.

use crate::error::Result;

use super::Medium;

/// Growable medium that persists nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct Volatile;

impl Medium for Volatile {
    fn fixed_capacity(&self) -> Option<usize> {
        None
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn write_all(&mut self, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }

    fn write_range(&mut self, _offset: usize, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }
}
