//! File medium
//!
//! Fixed-size image file on disk, for host-side tooling and tests.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{DictError, Result};

use super::{Medium, ERASED_BYTE};

/// Medium backed by an image file of fixed size
pub struct FileMedium {
    path: PathBuf,
    file: File,
    capacity: usize,
}

impl FileMedium {
    /// Open or create an image of `capacity` bytes
    ///
    /// A new (or short) file is padded with erased bytes up to `capacity`.
    /// An existing file larger than `capacity` is rejected.
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len() as usize;
        if len > capacity {
            return Err(DictError::Medium(format!(
                "image {} is {} bytes, larger than capacity {}",
                path.display(),
                len,
                capacity
            )));
        }

        if len < capacity {
            file.seek(SeekFrom::Start(len as u64))?;
            file.write_all(&vec![ERASED_BYTE; capacity - len])?;
            file.sync_data()?;
            tracing::debug!(path = %path.display(), capacity, "padded image file");
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            capacity,
        })
    }

    /// Open an existing image, taking its capacity from the file size
    pub fn open_existing(path: &Path) -> Result<Self> {
        let len = std::fs::metadata(path)?.len() as usize;
        Self::open(path, len)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Medium for FileMedium {
    fn fixed_capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; self.capacity];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_range(0, bytes)
    }

    fn write_range(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        if offset + bytes.len() > self.capacity {
            return Err(DictError::Medium(format!(
                "write of {} bytes at {} exceeds image size {}",
                bytes.len(),
                offset,
                self.capacity
            )));
        }
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(bytes)?;
        self.file.sync_data()?;
        Ok(())
    }
}
