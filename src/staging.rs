//! Staged files: the on-disk hand-off between the archive codec and the
//! content gateway.
//!
//! Each entry gets its own uniquely named temporary file inside the staging
//! directory.  A [`StagedFile`] removes itself when dropped, so no exit path
//! can leave one behind.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::error::{Result, TigError};

const STAGED_PREFIX: &str = ".tig-";

/// Factory for staged files in one directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create an empty staged file for the entry `name`.
    ///
    /// The file keeps the entry's extension since TI files are partly
    /// identified by it.
    pub fn create(&self, name: &str) -> Result<StagedFile> {
        let suffix = staged_suffix(name);
        let file = Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .map_err(|source| TigError::StagingWriteFailed { name: name.to_owned(), source })?;
        log::trace!("staged '{}' at {}", name, file.path().display());
        Ok(StagedFile { file })
    }
}

/// A temporary copy of one entry.  Deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Fresh handle positioned at the start, seeing whatever was written
    /// through the path by a content writer.
    pub fn reopen(&self) -> io::Result<File> {
        self.file.reopen()
    }

    /// Delete the file now.  Failures are only logged; the entry has
    /// already been consumed at this point.
    pub fn remove(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            log::warn!("failed to remove staged file {}: {}", path.display(), e);
        }
    }
}

fn staged_suffix(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

// ── Transfer ─────────────────────────────────────────────────────────────────

/// Which side of a [`transfer`] failed.
#[derive(Debug)]
pub enum TransferError {
    Read(io::Error),
    Write(io::Error),
}

/// Allocate the reusable transfer buffer.
pub fn transfer_buffer(size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size.max(1)).map_err(|_| TigError::AllocationFailed)?;
    buf.resize(size.max(1), 0);
    Ok(buf)
}

/// Copy `reader` into `writer` one buffer at a time until `reader` is
/// exhausted.  Returns the number of bytes copied.
pub fn transfer<R, W>(reader: &mut R, writer: &mut W, buf: &mut [u8]) -> std::result::Result<u64, TransferError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total = 0u64;
    loop {
        let n = match reader.read(buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransferError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(TransferError::Write)?;
        total += n as u64;
    }
    writer.flush().map_err(TransferError::Write)?;
    Ok(total)
}
