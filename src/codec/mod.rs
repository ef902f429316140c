//! Record Codec Module
//!
//! Defines the on-buffer layout of a single entry and of the end marker.
//! Everything here is a free function over a byte slice and an offset; the
//! codec holds no state of its own.
//!
//! ## Buffer Layout
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Version entry (7 bytes, always at offset 0)          │
//! │   "vers" | 0x00 | 0x01 | version                     │
//! ├──────────────────────────────────────────────────────┤
//! │ Entry (variable)                                     │
//! │   tag (n bytes) | 0x00 | len (1) | data (len bytes)  │
//! │   ... zero or more ...                               │
//! ├──────────────────────────────────────────────────────┤
//! │ End marker (6 bytes)                                 │
//! │   "end" | 0x00 | 0x01 | version                      │
//! ├──────────────────────────────────────────────────────┤
//! │ Free space up to capacity                            │
//! └──────────────────────────────────────────────────────┘
//! ```

mod iterator;
mod record;

pub use iterator::{Entries, Entry};
pub use record::{
    data_at, data_size, entry_size, record_size, tag_at, validate_tag, write_end_marker,
    write_entry,
};

// =============================================================================
// Shared Constants
// =============================================================================

/// Reserved tag of the version entry at offset 0
pub const VERSION_TAG: &[u8] = b"vers";

/// Reserved tag of the end marker
pub const END_TAG: &[u8] = b"end";

/// Byte that terminates every tag
pub const TERMINATOR: u8 = 0x00;

/// Largest payload a single length byte can describe
pub const MAX_ENTRY_SIZE: usize = u8::MAX as usize;

/// Version entry footprint: "vers" (4) + terminator (1) + len (1) + version (1)
pub const VERSION_ENTRY_SIZE: usize = 7;

/// End marker footprint: "end" (3) + terminator (1) + len (1) + version (1)
pub const END_MARKER_SIZE: usize = 6;

/// Footprint of a store holding nothing but the version entry and end marker
pub const EMPTY_STORE_SIZE: usize = VERSION_ENTRY_SIZE + END_MARKER_SIZE;

/// Whether a tag is one of the reserved structural tags
pub fn is_reserved(tag: &[u8]) -> bool {
    tag == VERSION_TAG || tag == END_TAG
}
