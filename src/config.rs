//! Options shared by the extraction and assembly pipelines.

use std::path::{Path, PathBuf};

/// Size of the reusable transfer buffer used to stream entries: 8 KiB.
pub const TRANSFER_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration shared by extraction and assembly.
#[derive(Debug, Clone)]
pub struct TigOptions {
    /// Password for encrypted entries.  Only consulted on read; entries are
    /// always written unencrypted.
    pub password:    Option<String>,
    /// Directory holding staged entry files while they are converted.
    pub staging_dir: PathBuf,
    /// Chunk size, in bytes, used when streaming entries to and from staged
    /// files.  Never zero when set through [`TigOptions::with_buffer_size`].
    pub buffer_size: usize,
}

impl Default for TigOptions {
    fn default() -> Self {
        Self {
            password:    None,
            staging_dir: std::env::temp_dir(),
            buffer_size: TRANSFER_BUFFER_SIZE,
        }
    }
}

impl TigOptions {
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_staging_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.staging_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_builders() {
        let opts = TigOptions::default();
        assert_eq!(opts.buffer_size, TRANSFER_BUFFER_SIZE);
        assert_eq!(opts.staging_dir, std::env::temp_dir());
        assert!(opts.password.is_none());

        let opts = opts.with_buffer_size(0).with_password("pw").with_staging_dir("/tmp/tig");
        assert_eq!(opts.buffer_size, 1);
        assert_eq!(opts.password.as_deref(), Some("pw"));
        assert_eq!(opts.staging_dir, PathBuf::from("/tmp/tig"));
    }
}
