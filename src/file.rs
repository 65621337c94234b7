//! Memory-mapped file access for policy documents.
//!
//! Policy documents for a full framework run into many megabytes. They are mapped instead of
//! read, and handed to the XML reader as a borrowed `&str`.

use memmap2::Mmap;
use std::{fs, path::Path};

use crate::{Error::FileError, Result};

/// A read-only, memory-mapped file.
#[derive(Debug)]
pub(crate) struct Physical {
    data: Mmap,
}

impl Physical {
    /// Map the file at `path` into memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub(crate) fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(FileError(error)),
        };

        Ok(Physical { data: mmap })
    }

    /// The complete file contents.
    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// The file contents as UTF-8 text, with a leading byte order mark removed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the contents are not valid UTF-8.
    pub(crate) fn text(&self) -> Result<&str> {
        let data = self.data();
        let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

        std::str::from_utf8(data).map_err(|e| malformed_error!("File is not valid UTF-8 - {}", e))
    }
}
