//! Contract between the TiGroup pipelines and the per-category file codecs.
//!
//! A gateway knows how to recognise a staged file, turn it into an in-memory
//! content object, write such an object back to disk and finally release it.
//! The pipelines never look inside content objects; all they need is this
//! trait.

use std::path::Path;

use crate::classify::Category;
use crate::platform::Platform;

pub trait ContentGateway {
    /// Parsed regular (variable) file.
    type Regular;
    /// Parsed flash (application / OS) file.
    type Flash;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sniff a staged file.  Unreadable files are `Unrecognized`.
    fn classify(&self, staged: &Path) -> Category;

    /// Device family the staged file targets, if the gateway can tell.
    fn platform(&self, _staged: &Path) -> Platform {
        Platform::None
    }

    fn read_regular(&self, staged: &Path) -> Result<Self::Regular, Self::Error>;
    fn read_flash(&self, staged: &Path) -> Result<Self::Flash, Self::Error>;

    fn write_regular(&self, content: &Self::Regular, staged: &Path) -> Result<(), Self::Error>;
    fn write_flash(&self, content: &Self::Flash, staged: &Path) -> Result<(), Self::Error>;

    fn release_regular(&self, content: Self::Regular) {
        drop(content);
    }

    fn release_flash(&self, content: Self::Flash) {
        drop(content);
    }
}
