//! # tlvdict
//!
//! A compact, self-describing key-value store that lives inside a small
//! byte buffer mirrored to non-volatile memory (EEPROM, flash, image file):
//! - Tag-length-value records scanned linearly
//! - In-place updates and single-move compaction on delete
//! - Version stamp checked on load, silent reset on mismatch or corruption
//! - Pluggable media: fixed-size devices or a growable heap buffer
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Dictionary Engine                        │
//! │          (set / get / remove / reset, owns buffer)           │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │                              │
//!                ▼                              ▼
//!        ┌──────────────┐               ┌──────────────┐
//!        │ Record Codec │               │    Store     │
//!        │ (TLV layout) │               │ (load/save)  │
//!        └──────────────┘               └──────┬───────┘
//!                                              │
//!                                              ▼
//!                                       ┌──────────────┐
//!                                       │    Medium    │
//!                                       │ (EEPROM/file)│
//!                                       └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DictError, Result};
pub use config::{Config, SavePolicy};
pub use engine::{Dictionary, Stats};
pub use store::{
    ByteDevice, DeviceMedium, FileMedium, LoadOutcome, Medium, MemoryMedium, Volatile,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tlvdict
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
