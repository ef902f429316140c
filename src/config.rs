//! Configuration for tlvdict
//!
//! Centralized configuration with sensible defaults.

use crate::codec::EMPTY_STORE_SIZE;
use crate::error::{DictError, Result};

/// Reference EEPROM size used when no capacity is given
pub const DEFAULT_CAPACITY: usize = 4096;

/// Main configuration for a dictionary instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Format Configuration
    // -------------------------------------------------------------------------
    /// Version byte stamped into the version entry and the end marker.
    /// A stored image carrying a different byte is discarded on load.
    pub version: u8,

    // -------------------------------------------------------------------------
    // Capacity Configuration
    // -------------------------------------------------------------------------
    /// Size of fixed media created from this config (bytes)
    pub capacity: usize,

    /// Initial buffer size for growable in-memory stores (bytes)
    pub initial_capacity: usize,

    // -------------------------------------------------------------------------
    // Persistence Configuration
    // -------------------------------------------------------------------------
    /// How mutations are mirrored back to the medium
    pub save_policy: SavePolicy,
}

/// Persistence strategy for the store adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePolicy {
    /// Rewrite the whole buffer after every mutation
    Full,

    /// Write only the byte runs that differ from the last persisted image
    ChangedBytes,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            capacity: DEFAULT_CAPACITY,
            initial_capacity: EMPTY_STORE_SIZE,
            save_policy: SavePolicy::Full,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the sizes can hold at least an empty store
    pub fn validate(&self) -> Result<()> {
        if self.capacity < EMPTY_STORE_SIZE {
            return Err(DictError::Config(format!(
                "capacity {} is smaller than an empty store ({} bytes)",
                self.capacity, EMPTY_STORE_SIZE
            )));
        }
        if self.initial_capacity < EMPTY_STORE_SIZE {
            return Err(DictError::Config(format!(
                "initial capacity {} is smaller than an empty store ({} bytes)",
                self.initial_capacity, EMPTY_STORE_SIZE
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the format version byte
    pub fn version(mut self, version: u8) -> Self {
        self.config.version = version;
        self
    }

    /// Set the fixed medium capacity (in bytes)
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.config.capacity = bytes;
        self
    }

    /// Set the starting buffer size for growable stores (in bytes)
    pub fn initial_capacity(mut self, bytes: usize) -> Self {
        self.config.initial_capacity = bytes;
        self
    }

    /// Set the save policy
    pub fn save_policy(mut self, policy: SavePolicy) -> Self {
        self.config.save_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
