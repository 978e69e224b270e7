//! Routing of staged entries to the matching content reader.

use std::path::Path;

use crate::error::BoxError;
use crate::gateway::ContentGateway;

/// Verdict of a [`ContentGateway::classify`] probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Regular,
    Flash,
    Unrecognized,
}

/// A parsed content object tagged with its category.
#[derive(Debug, Clone, PartialEq)]
pub enum Content<R, F> {
    Regular(R),
    Flash(F),
}

impl<R, F> Content<R, F> {
    pub fn category(&self) -> Category {
        match self {
            Content::Regular(_) => Category::Regular,
            Content::Flash(_)   => Category::Flash,
        }
    }
}

/// Classify `staged` once and parse it with the reader of its category.
///
/// `Ok(None)` means the file is not a TI file and should be skipped.
pub fn dispatch<G: ContentGateway>(
    gateway: &G,
    staged:  &Path,
) -> Result<Option<Content<G::Regular, G::Flash>>, BoxError> {
    match gateway.classify(staged) {
        Category::Regular      => Ok(Some(Content::Regular(gateway.read_regular(staged)?))),
        Category::Flash        => Ok(Some(Content::Flash(gateway.read_flash(staged)?))),
        Category::Unrecognized => Ok(None),
    }
}
