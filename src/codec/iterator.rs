//! Entry Iterator
//!
//! Sequential walk over the entries of a buffer, starting at offset 0.

use super::{data_at, entry_size, tag_at, END_TAG};

/// A borrowed view of one stored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    /// Offset of the entry's first tag byte
    pub offset: usize,
    pub tag: &'a [u8],
    pub data: &'a [u8],
}

/// Iterator over entries in storage order, version entry included.
///
/// Stops at the end marker, or at the first entry that does not fit in the
/// buffer. Callers that need to tell the two apart check `reached_end`.
pub struct Entries<'a> {
    buf: &'a [u8],
    offset: usize,
    reached_end: bool,
    done: bool,
}

impl<'a> Entries<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            reached_end: false,
            done: false,
        }
    }

    /// Whether the walk stopped on the end marker
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Offset of the end marker, once reached
    pub fn end_offset(&self) -> Option<usize> {
        self.reached_end.then_some(self.offset)
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let parsed = tag_at(self.buf, self.offset).and_then(|tag| {
            let size = entry_size(self.buf, self.offset)?;
            let data = data_at(self.buf, self.offset)?;
            Some((tag, size, data))
        });

        match parsed {
            Some((tag, _, _)) if tag == END_TAG => {
                self.reached_end = true;
                self.done = true;
                None
            }
            Some((tag, size, data)) => {
                let entry = Entry {
                    offset: self.offset,
                    tag,
                    data,
                };
                self.offset += size;
                Some(entry)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}
