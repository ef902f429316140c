//! Engine Module
//!
//! The dictionary engine: owns the record buffer and implements lookup,
//! insert, update, delete and compaction directly on the bytes.
//!
//! ## Responsibilities
//! - Linear scan for tags (entries number in the tens at most)
//! - Same-size updates in place, everything else delete + append
//! - Close gaps left by deleted entries with one contiguous move
//! - Refuse any write that would not fit, before touching the buffer
//! - Heal structural corruption by resetting to an empty store
//!
//! ## Corruption Policy
//! A scan that runs off the buffer without meeting the end marker means the
//! image is unusable. There is no backup to repair from, so the store resets
//! itself to `[version][end]`, reports the lookup as "not found", and bumps
//! `Stats::recoveries` so callers can still observe that it happened.

use std::path::Path;

use crate::codec::{
    self, Entries, Entry, END_MARKER_SIZE, END_TAG, MAX_ENTRY_SIZE, TERMINATOR,
    VERSION_ENTRY_SIZE, VERSION_TAG,
};
use crate::config::{Config, DEFAULT_CAPACITY};
use crate::error::{DictError, Result};
use crate::store::{inspect, FileMedium, LoadOutcome, Medium, Store, Volatile};

/// Counters describing what the engine has done since it was opened
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Resets of any kind (explicit, initialization, recovery)
    pub resets: u64,

    /// Resets caused by corruption or a version mismatch
    pub recoveries: u64,

    /// Completed saves to the medium
    pub saves: u64,
}

/// Result of walking the buffer looking for a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Found(usize),
    Missing { end: usize },
    Corrupt,
}

/// Walks all the way to the end marker even after a match, so a `Found`
/// offset is only handed out for a buffer that is intact.
fn scan(buf: &[u8], tag: &[u8]) -> Scan {
    let mut offset = 0;
    let mut found = None;
    loop {
        let (current, size) = match (codec::tag_at(buf, offset), codec::entry_size(buf, offset)) {
            (Some(current), Some(size)) => (current, size),
            _ => return Scan::Corrupt,
        };

        if found.is_none() && current == tag {
            found = Some(offset);
        }
        if current == END_TAG {
            return match found {
                Some(offset) => Scan::Found(offset),
                None => Scan::Missing { end: offset },
            };
        }
        offset += size;
    }
}

fn display_tag(tag: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(tag)
}

/// A tag-length-value dictionary bound to a medium
///
/// ## Ownership
/// The dictionary exclusively owns its buffer and its medium. Lookups take
/// `&mut self` because a lookup that discovers corruption resets the store.
pub struct Dictionary<M: Medium = Volatile> {
    /// Record buffer: `[version][entry]*[end]` then free space
    buf: Vec<u8>,

    /// Version byte written into the stamp and the end marker
    version: u8,

    /// Buffer size a volatile store shrinks back to on reset
    initial_capacity: usize,

    /// Persistence side (medium + save policy)
    store: Store<M>,

    /// What the medium held when the dictionary was opened
    outcome: LoadOutcome,

    resets: u64,
    recoveries: u64,
}

impl Dictionary<Volatile> {
    /// Create a growable dictionary that lives only in memory
    pub fn in_memory(config: Config) -> Result<Self> {
        Self::open(Volatile, config)
    }
}

impl Dictionary<FileMedium> {
    /// Open an image file with the default config and capacity
    pub fn open_path(path: &Path) -> Result<Self> {
        let medium = FileMedium::open(path, DEFAULT_CAPACITY)?;
        Self::open(medium, Config::default())
    }
}

impl<M: Medium> Dictionary<M> {
    /// Open a dictionary on `medium`
    ///
    /// On startup:
    /// 1. Read the whole medium into the buffer
    /// 2. Check the version stamp and walk the entries to the end marker
    /// 3. Reset (and persist) an empty store if either check fails
    pub fn open(medium: M, config: Config) -> Result<Self> {
        config.validate()?;

        let mut store = Store::new(medium, config.save_policy);
        let mut buf = store.load()?;

        match store.fixed_capacity() {
            Some(capacity) if capacity < codec::EMPTY_STORE_SIZE => {
                return Err(DictError::Config(format!(
                    "medium holds {} bytes, an empty store needs {}",
                    capacity,
                    codec::EMPTY_STORE_SIZE
                )));
            }
            Some(_) => {}
            None => {
                if buf.len() < config.initial_capacity {
                    buf.resize(config.initial_capacity, 0);
                }
            }
        }

        let outcome = inspect(&buf, config.version);
        let mut dict = Self {
            buf,
            version: config.version,
            initial_capacity: config.initial_capacity,
            store,
            outcome,
            resets: 0,
            recoveries: 0,
        };

        match outcome {
            LoadOutcome::Valid => {
                tracing::debug!(used = dict.used(), "opened dictionary");
            }
            LoadOutcome::Missing => {
                tracing::debug!("no version stamp on medium, initializing empty store");
                dict.reset()?;
            }
            LoadOutcome::VersionMismatch { found } => {
                tracing::warn!(
                    found,
                    expected = config.version,
                    "version mismatch on load, resetting store"
                );
                dict.recoveries += 1;
                dict.reset()?;
            }
            LoadOutcome::Corrupt => {
                tracing::warn!("stored entries never reach the end marker, resetting store");
                dict.recoveries += 1;
                dict.reset()?;
            }
        }

        Ok(dict)
    }

    // =========================================================================
    // Public API
    // =========================================================================

    /// Store `data` under `tag`
    ///
    /// Fails without touching the buffer if the payload exceeds 255 bytes,
    /// the tag is unusable, or the resulting layout does not fit.
    pub fn set(&mut self, tag: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> Result<()> {
        let tag = tag.as_ref();
        let data = data.as_ref();

        codec::validate_tag(tag)?;
        if data.len() > MAX_ENTRY_SIZE {
            return Err(DictError::PayloadTooLarge {
                len: data.len(),
                max: MAX_ENTRY_SIZE,
            });
        }

        let existing = self.locate(tag);

        // Same size: overwrite in place, no layout change
        if let Some(offset) = existing {
            if codec::data_size(&self.buf, offset) == Some(data.len()) {
                if codec::data_at(&self.buf, offset) == Some(data) {
                    return Ok(());
                }
                let start = offset + tag.len() + 2;
                self.buf[start..start + data.len()].copy_from_slice(data);
                tracing::trace!(tag = %display_tag(tag), len = data.len(), "updated in place");
                return self.persist();
            }
        }

        // Check room before any destructive step
        let old_size = existing
            .and_then(|offset| codec::entry_size(&self.buf, offset))
            .unwrap_or(0);
        let needed = self.used() - old_size + codec::record_size(tag.len(), data.len());
        if needed > self.buf.len() {
            if !self.store.resize(needed) {
                return Err(DictError::CapacityExceeded {
                    needed,
                    capacity: self.capacity(),
                });
            }
            self.buf.resize(needed, 0);
            tracing::trace!(size = needed, "grew buffer");
        }

        if let Some(offset) = existing {
            self.delete_at(offset);
        }

        let end = self.end_offset();
        let next = codec::write_entry(&mut self.buf, end, tag, data)?;
        codec::write_end_marker(&mut self.buf, next, self.version)?;
        tracing::trace!(tag = %display_tag(tag), len = data.len(), offset = end, "appended entry");

        self.persist()
    }

    /// Store a string the way the reference image does: UTF-8 plus a trailing 0x00
    pub fn set_str(&mut self, tag: impl AsRef<[u8]>, value: &str) -> Result<()> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(TERMINATOR);
        self.set(tag, data)
    }

    /// Copy up to `out.len()` bytes of the stored value into `out`
    ///
    /// Returns the number of bytes copied; 0 (with `out` untouched) if absent.
    /// Longer values are truncated silently, see `size`.
    pub fn get(&mut self, tag: impl AsRef<[u8]>, out: &mut [u8]) -> usize {
        let Some(offset) = self.find(tag.as_ref()) else {
            return 0;
        };
        match codec::data_at(&self.buf, offset) {
            Some(data) => {
                let n = data.len().min(out.len());
                out[..n].copy_from_slice(&data[..n]);
                n
            }
            None => 0,
        }
    }

    /// Owned copy of the stored value
    pub fn get_vec(&mut self, tag: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        let offset = self.find(tag.as_ref())?;
        codec::data_at(&self.buf, offset).map(<[u8]>::to_vec)
    }

    /// Stored string up to its first 0x00
    pub fn get_string(&mut self, tag: impl AsRef<[u8]>) -> Option<String> {
        let data = self.get_vec(tag)?;
        let text = data.split(|&b| b == TERMINATOR).next().unwrap_or_default();
        Some(String::from_utf8_lossy(text).into_owned())
    }

    /// Stored payload length, or 0 if absent
    pub fn size(&mut self, tag: impl AsRef<[u8]>) -> usize {
        self.find(tag.as_ref())
            .and_then(|offset| codec::data_size(&self.buf, offset))
            .unwrap_or(0)
    }

    pub fn contains(&mut self, tag: impl AsRef<[u8]>) -> bool {
        self.find(tag.as_ref()).is_some()
    }

    /// Delete `tag` and close the gap. Returns whether it existed.
    pub fn remove(&mut self, tag: impl AsRef<[u8]>) -> Result<bool> {
        let tag = tag.as_ref();
        let Some(offset) = self.find(tag) else {
            return Ok(false);
        };
        self.delete_at(offset);
        tracing::trace!(tag = %display_tag(tag), "removed entry");
        self.persist()?;
        Ok(true)
    }

    /// Discard every entry and persist `[version][end]`
    pub fn reset(&mut self) -> Result<()> {
        if self.store.fixed_capacity().is_none() {
            self.buf.truncate(self.initial_capacity);
            self.buf.resize(self.initial_capacity, 0);
        }

        let next = codec::write_entry(&mut self.buf, 0, VERSION_TAG, &[self.version])?;
        codec::write_end_marker(&mut self.buf, next, self.version)?;
        self.resets += 1;
        tracing::debug!(version = self.version, "reset store");

        self.persist()
    }

    /// Bytes occupied by the version entry, all entries and the end marker
    pub fn used(&mut self) -> usize {
        self.end_offset() + END_MARKER_SIZE
    }

    /// Free bytes left in the buffer
    pub fn remaining(&mut self) -> usize {
        self.capacity().saturating_sub(self.used())
    }

    /// Fixed medium size, or the current allocation for volatile stores
    pub fn capacity(&self) -> usize {
        self.store.fixed_capacity().unwrap_or(self.buf.len())
    }

    /// User entries in storage order (the version entry is skipped)
    pub fn iter(&mut self) -> impl Iterator<Item = Entry<'_>> {
        // Walk once first so a corrupt buffer is reset before iterating
        self.end_offset();
        Entries::new(&self.buf).skip(1)
    }

    /// All user tags in storage order
    pub fn tags(&mut self) -> Vec<Vec<u8>> {
        self.iter().map(|entry| entry.tag.to_vec()).collect()
    }

    /// Number of user entries
    pub fn len(&mut self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// What the medium held at open time
    pub fn load_outcome(&self) -> LoadOutcome {
        self.outcome
    }

    pub fn stats(&self) -> Stats {
        Stats {
            resets: self.resets,
            recoveries: self.recoveries,
            saves: self.store.saves(),
        }
    }

    /// Raw buffer, for debugging
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn medium(&self) -> &M {
        self.store.medium()
    }

    pub fn into_medium(self) -> M {
        self.store.into_medium()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Lookup for caller-supplied tags; reserved or malformed tags are absent
    fn find(&mut self, tag: &[u8]) -> Option<usize> {
        codec::validate_tag(tag).ok()?;
        self.locate(tag)
    }

    fn locate(&mut self, tag: &[u8]) -> Option<usize> {
        match scan(&self.buf, tag) {
            Scan::Found(offset) => Some(offset),
            Scan::Missing { .. } => None,
            Scan::Corrupt => {
                self.recover();
                None
            }
        }
    }

    /// Offset of the end marker
    fn end_offset(&mut self) -> usize {
        match scan(&self.buf, END_TAG) {
            Scan::Found(offset) | Scan::Missing { end: offset } => offset,
            Scan::Corrupt => {
                self.recover();
                VERSION_ENTRY_SIZE
            }
        }
    }

    fn recover(&mut self) {
        tracing::warn!("scan ran past the buffer without an end marker, resetting store");
        self.recoveries += 1;
        if let Err(e) = self.reset() {
            tracing::error!("failed to persist reset store: {}", e);
        }
    }

    /// Remove the entry at `start` by shifting everything after it left
    fn delete_at(&mut self, start: usize) {
        // The version entry is never deleted
        if start == 0 {
            return;
        }

        let end = self.end_offset();
        let Some(size) = codec::entry_size(&self.buf, start) else {
            return;
        };
        let next = start + size;
        if next <= end {
            self.buf.copy_within(next..end + END_MARKER_SIZE, start);
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.buf)
    }
}
