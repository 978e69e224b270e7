//! In-memory model of a TiGroup.
//!
//! ```no_run
//! use tigroup::{Container, Platform, TigOptions, TiFiles};
//!
//! let opts = TigOptions::default();
//! let group: Container = Container::open("backup.tig", &TiFiles, &opts)?;
//! println!("{} regular, {} flash", group.regular_count(), group.flash_count());
//!
//! let mut copy = Container::new(Platform::Ti89);
//! for e in group.regular() {
//!     copy.push_regular(e.name.clone(), e.content.clone())?;
//! }
//! copy.save("copy.tig", &TiFiles, &opts)?;
//! # Ok::<(), tigroup::TigError>(())
//! ```

use std::path::Path;

use crate::classify::Content;
use crate::config::TigOptions;
use crate::error::{Result, TigError};
use crate::gateway::ContentGateway;
use crate::platform::Platform;
use crate::tifile::{FlashContent, RegularContent};

/// Archive comment written on new groups.
pub const DEFAULT_COMMENT: &str = "TiGroup v1.0 (tigroup)";

/// One named file of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    /// Filename inside the archive, verbatim.
    pub name:    String,
    pub content: T,
}

/// Classified contents of a TiGroup plus its archive-level metadata.
#[derive(Debug, Clone)]
pub struct Container<R = RegularContent, F = FlashContent> {
    pub platform: Platform,
    pub comment:  String,
    regular:      Vec<Entry<R>>,
    flash:        Vec<Entry<F>>,
}

impl<R, F> Default for Container<R, F> {
    fn default() -> Self {
        Self::new(Platform::None)
    }
}

impl<R, F> Container<R, F> {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            comment: DEFAULT_COMMENT.to_owned(),
            regular: Vec::new(),
            flash:   Vec::new(),
        }
    }

    /// Like [`Container::new`] with room for the expected number of entries.
    /// The counts are hints only; both collections keep growing on demand.
    pub fn with_capacity(platform: Platform, regular: usize, flash: usize) -> Result<Self> {
        let mut c = Self::new(platform);
        c.regular.try_reserve(regular).map_err(|_| TigError::AllocationFailed)?;
        c.flash.try_reserve(flash).map_err(|_| TigError::AllocationFailed)?;
        Ok(c)
    }

    // ── Append ───────────────────────────────────────────────────────────────

    /// Take ownership of `content` and file it under `name` in its category.
    pub fn append(&mut self, name: impl Into<String>, content: Content<R, F>) -> Result<()> {
        match content {
            Content::Regular(c) => self.push_regular(name, c),
            Content::Flash(c)   => self.push_flash(name, c),
        }
    }

    pub fn push_regular(&mut self, name: impl Into<String>, content: R) -> Result<()> {
        self.regular.try_reserve(1).map_err(|_| TigError::AllocationFailed)?;
        self.regular.push(Entry { name: name.into(), content });
        Ok(())
    }

    pub fn push_flash(&mut self, name: impl Into<String>, content: F) -> Result<()> {
        self.flash.try_reserve(1).map_err(|_| TigError::AllocationFailed)?;
        self.flash.push(Entry { name: name.into(), content });
        Ok(())
    }

    // ── Access ───────────────────────────────────────────────────────────────

    pub fn regular(&self) -> &[Entry<R>] {
        &self.regular
    }

    pub fn flash(&self) -> &[Entry<F>] {
        &self.flash
    }

    pub fn regular_count(&self) -> usize {
        self.regular.len()
    }

    pub fn flash_count(&self) -> usize {
        self.flash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regular.is_empty() && self.flash.is_empty()
    }

    /// Internal names of every entry, regular first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regular.iter().map(|e| e.name.as_str())
            .chain(self.flash.iter().map(|e| e.name.as_str()))
    }

    // ── Teardown ─────────────────────────────────────────────────────────────

    /// Hand every content object back to `gateway` for release, then free the
    /// names and the collections.
    pub fn destroy<G>(self, gateway: &G)
    where
        G: ContentGateway<Regular = R, Flash = F>,
    {
        let Container { regular, flash, .. } = self;
        for entry in regular {
            gateway.release_regular(entry.content);
        }
        for entry in flash {
            gateway.release_flash(entry.content);
        }
    }
}

impl<R, F> Container<R, F> {
    /// Read a TiGroup into a new container.
    pub fn open<G, P>(path: P, gateway: &G, options: &TigOptions) -> Result<Self>
    where
        G: ContentGateway<Regular = R, Flash = F>,
        P: AsRef<Path>,
    {
        let mut c = Self::new(Platform::None);
        crate::extract::extract(path, &mut c, gateway, options)?;
        Ok(c)
    }

    /// Write this container as a TiGroup, replacing any existing file.
    pub fn save<G, P>(&self, path: P, gateway: &G, options: &TigOptions) -> Result<()>
    where
        G: ContentGateway<Regular = R, Flash = F>,
        P: AsRef<Path>,
    {
        crate::assemble::assemble(self, path, gateway, options)
    }
}
