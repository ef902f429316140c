//! Durable Store Adapter Module
//!
//! Binds a dictionary buffer to a persistence medium.
//!
//! ## Responsibilities
//! - Load the full medium image at startup
//! - Decide whether a loaded image is usable (version stamp + structure)
//! - Mirror every mutation back to the medium
//! - Answer resize requests according to the medium's capacity
//!
//! ## Resize Policy
//! Fixed media (EEPROM, image files) allow growth up to their physical
//! size and refuse anything beyond. The buffer of a fixed medium is
//! allocated at full size on load, so in practice every resize request
//! that reaches the adapter is refused. Volatile stores always grow.

mod device;
mod file;
mod medium;
mod memory;
mod volatile;

pub use device::DeviceMedium;
pub use file::FileMedium;
pub use medium::{ByteDevice, Medium};
pub use memory::MemoryMedium;
pub use volatile::Volatile;

use crate::codec::{self, Entries, VERSION_TAG};
use crate::config::SavePolicy;
use crate::error::Result;

/// Value of an erased EEPROM cell, used to fill fresh media
pub const ERASED_BYTE: u8 = 0xFF;

/// What load found on the medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Stamp matched and the structure reached its end marker
    Valid,

    /// No version entry at offset 0 (blank or foreign medium)
    Missing,

    /// Version entry present with a different version byte
    VersionMismatch { found: u8 },

    /// Stamp matched but the entries never reach an end marker
    Corrupt,
}

impl LoadOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, LoadOutcome::Valid)
    }
}

/// Classify a loaded image against the expected version byte
pub fn inspect(buf: &[u8], version: u8) -> LoadOutcome {
    if codec::tag_at(buf, 0) != Some(VERSION_TAG) {
        return LoadOutcome::Missing;
    }
    match codec::data_at(buf, 0) {
        Some([found]) if *found == version => {}
        Some([found]) => return LoadOutcome::VersionMismatch { found: *found },
        _ => return LoadOutcome::Missing,
    }

    let mut entries = Entries::new(buf);
    entries.by_ref().for_each(drop);
    if entries.reached_end() {
        LoadOutcome::Valid
    } else {
        LoadOutcome::Corrupt
    }
}

/// Persistence side of a dictionary
pub struct Store<M: Medium> {
    medium: M,
    policy: SavePolicy,
    /// Last image known to be on the medium (ChangedBytes only)
    shadow: Vec<u8>,
    saves: u64,
}

impl<M: Medium> Store<M> {
    pub fn new(medium: M, policy: SavePolicy) -> Self {
        Self {
            medium,
            policy,
            shadow: Vec::new(),
            saves: 0,
        }
    }

    /// Read the whole medium image
    pub fn load(&mut self) -> Result<Vec<u8>> {
        let image = self.medium.read_all()?;
        tracing::debug!(bytes = image.len(), "loaded medium image");
        if self.policy == SavePolicy::ChangedBytes {
            self.shadow = image.clone();
        }
        Ok(image)
    }

    /// Mirror `buf` to the medium
    pub fn save(&mut self, buf: &[u8]) -> Result<()> {
        match self.policy {
            SavePolicy::Full => self.medium.write_all(buf)?,
            SavePolicy::ChangedBytes => {
                let mut written = 0;
                for (start, end) in changed_runs(&self.shadow, buf) {
                    self.medium.write_range(start, &buf[start..end])?;
                    written += end - start;
                }
                self.shadow.clear();
                self.shadow.extend_from_slice(buf);
                tracing::trace!(written, "saved changed bytes");
            }
        }
        self.saves += 1;
        Ok(())
    }

    /// Whether the buffer may grow to `new_size` bytes
    pub fn resize(&self, new_size: usize) -> bool {
        match self.medium.fixed_capacity() {
            Some(capacity) => new_size <= capacity,
            None => true,
        }
    }

    pub fn fixed_capacity(&self) -> Option<usize> {
        self.medium.fixed_capacity()
    }

    /// Number of completed saves
    pub fn saves(&self) -> u64 {
        self.saves
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }
}

/// Half-open ranges of `new` that differ from `old`.
/// Bytes past the end of `old` always count as changed.
fn changed_runs(old: &[u8], new: &[u8]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for (i, &byte) in new.iter().enumerate() {
        let differs = old.get(i) != Some(&byte);
        match (differs, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, new.len()));
    }

    runs
}
