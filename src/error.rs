//! Error taxonomy for TiGroup reading, writing and listing.
//!
//! Every variant names the stage that failed.  Codec and content errors are
//! kept as boxed sources so the `zip` capability can be compiled out without
//! changing this type.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error produced by the archive codec or a content gateway.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TigError {
    #[error("cannot open archive {}: {source}", path.display())]
    ArchiveOpenFailed { path: PathBuf, #[source] source: BoxError },

    #[error("cannot create archive {}: {source}", path.display())]
    ArchiveCreateFailed { path: PathBuf, #[source] source: io::Error },

    #[error("cannot close archive {}: {source}", path.display())]
    ArchiveCloseFailed { path: PathBuf, #[source] source: BoxError },

    #[error("cannot advance to archive entry #{index}: {source}")]
    ArchiveIterationFailed { index: usize, #[source] source: BoxError },

    #[error("cannot read metadata of archive entry #{index}: {source}")]
    MetadataReadFailed { index: usize, #[source] source: BoxError },

    #[error("cannot open entry '{name}': {source}")]
    EntryOpenFailed { name: String, #[source] source: BoxError },

    #[error("cannot read entry '{name}': {source}")]
    EntryReadFailed { name: String, #[source] source: io::Error },

    #[error("cannot write entry '{name}': {source}")]
    EntryWriteFailed { name: String, #[source] source: io::Error },

    #[error("cannot close entry '{name}': {source}")]
    EntryCloseFailed { name: String, #[source] source: BoxError },

    #[error("cannot stage entry '{name}': {source}")]
    StagingWriteFailed { name: String, #[source] source: io::Error },

    #[error("cannot parse content of '{name}': {source}")]
    ContentParseFailed { name: String, #[source] source: BoxError },

    #[error("cannot serialize content of '{name}': {source}")]
    ContentSerializeFailed { name: String, #[source] source: BoxError },

    #[error("container has no target platform")]
    MissingPlatform,

    #[error("TiGroup support was built without the archive codec")]
    Unsupported,

    #[error("out of memory")]
    AllocationFailed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TigError>;
