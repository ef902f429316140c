//! Record accessors and writers
//!
//! Readers return `None` when the entry at `offset` does not fit inside the
//! buffer; writers fail without touching the buffer.

use crate::error::{DictError, Result};

use super::{is_reserved, END_TAG, MAX_ENTRY_SIZE, TERMINATOR};

/// Footprint of an entry with the given tag and payload lengths
pub fn record_size(tag_len: usize, data_len: usize) -> usize {
    tag_len + 1 + 1 + data_len
}

/// Tag bytes of the entry starting at `offset` (terminator excluded)
pub fn tag_at(buf: &[u8], offset: usize) -> Option<&[u8]> {
    let rest = buf.get(offset..)?;
    let len = rest.iter().position(|&b| b == TERMINATOR)?;
    Some(&rest[..len])
}

/// Payload length stored in the entry's length byte
pub fn data_size(buf: &[u8], offset: usize) -> Option<usize> {
    let tag = tag_at(buf, offset)?;
    buf.get(offset + tag.len() + 1).map(|&len| len as usize)
}

/// Total footprint of the entry at `offset`: tag + terminator + length byte + data
pub fn entry_size(buf: &[u8], offset: usize) -> Option<usize> {
    let tag = tag_at(buf, offset)?;
    let len = *buf.get(offset + tag.len() + 1)? as usize;
    let size = record_size(tag.len(), len);
    if offset + size > buf.len() {
        return None;
    }
    Some(size)
}

/// Payload bytes of the entry at `offset`
pub fn data_at(buf: &[u8], offset: usize) -> Option<&[u8]> {
    let tag = tag_at(buf, offset)?;
    let start = offset + tag.len() + 2;
    let len = *buf.get(start - 1)? as usize;
    buf.get(start..start + len)
}

/// Encode `tag`, length byte and `data` at `offset`.
///
/// Returns the offset immediately following the written entry.
pub fn write_entry(buf: &mut [u8], offset: usize, tag: &[u8], data: &[u8]) -> Result<usize> {
    if data.len() > MAX_ENTRY_SIZE {
        return Err(DictError::PayloadTooLarge {
            len: data.len(),
            max: MAX_ENTRY_SIZE,
        });
    }

    let end = offset + record_size(tag.len(), data.len());
    if end > buf.len() {
        return Err(DictError::CapacityExceeded {
            needed: end,
            capacity: buf.len(),
        });
    }

    let mut pos = offset;
    buf[pos..pos + tag.len()].copy_from_slice(tag);
    pos += tag.len();
    buf[pos] = TERMINATOR;
    pos += 1;
    buf[pos] = data.len() as u8;
    pos += 1;
    buf[pos..pos + data.len()].copy_from_slice(data);

    Ok(end)
}

/// Write the end marker carrying `version` at `offset`
pub fn write_end_marker(buf: &mut [u8], offset: usize, version: u8) -> Result<usize> {
    write_entry(buf, offset, END_TAG, &[version])
}

/// Reject tags that cannot be stored as user entries
pub fn validate_tag(tag: &[u8]) -> Result<()> {
    if tag.is_empty() {
        return Err(DictError::InvalidTag("tag is empty".to_string()));
    }
    if tag.contains(&TERMINATOR) {
        return Err(DictError::InvalidTag(format!(
            "tag {:?} contains a terminator byte",
            String::from_utf8_lossy(tag)
        )));
    }
    if is_reserved(tag) {
        return Err(DictError::InvalidTag(format!(
            "tag {:?} is reserved",
            String::from_utf8_lossy(tag)
        )));
    }
    Ok(())
}
