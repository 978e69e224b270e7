//! Assembly: container → staged files → stored archive entries.
//!
//! Every content object is serialised by the gateway into a staged file in
//! the configured staging directory, then copied into a new archive entry
//! using the stored method.  Regular entries are written first, then flash
//! entries, each in insertion order.  The container comment becomes the
//! archive comment.
//!
//! Nothing is rolled back on failure; the output file must then be treated
//! as garbage.

use std::path::Path;

use crate::config::TigOptions;
use crate::container::Container;
use crate::error::{Result, TigError};
use crate::gateway::ContentGateway;

/// Write `from` as a TiGroup at `path`, truncating any existing file.
///
/// Fails with [`TigError::MissingPlatform`] before touching the disk when
/// `from.platform` is `Platform::None`.
pub fn assemble<G, P>(
    from:    &Container<G::Regular, G::Flash>,
    path:    P,
    gateway: &G,
    options: &TigOptions,
) -> Result<()>
where
    G: ContentGateway,
    P: AsRef<Path>,
{
    #[cfg(feature = "archive")]
    {
        imp::assemble_zip(from, path.as_ref(), gateway, options)
    }
    #[cfg(not(feature = "archive"))]
    {
        let _ = (from, path, gateway, options);
        Err(TigError::Unsupported)
    }
}

#[cfg(feature = "archive")]
mod imp {
    use std::fs::{File, Metadata};
    use std::io::Write;

    use chrono::{Datelike, Local, Timelike};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, DateTime, ZipWriter};

    use super::*;
    use crate::error::BoxError;
    use crate::platform::Platform;
    use crate::staging::{transfer, transfer_buffer, StagingArea, TransferError};

    pub(super) fn assemble_zip<G: ContentGateway>(
        from:    &Container<G::Regular, G::Flash>,
        path:    &Path,
        gateway: &G,
        options: &TigOptions,
    ) -> Result<()> {
        if from.platform == Platform::None {
            return Err(TigError::MissingPlatform);
        }
        let file = File::create(path)
            .map_err(|source| TigError::ArchiveCreateFailed { path: path.to_path_buf(), source })?;
        let mut zip = ZipWriter::new(file);
        let staging = StagingArea::new(&options.staging_dir);
        let mut buf = transfer_buffer(options.buffer_size)?;

        for entry in from.regular() {
            write_entry(&mut zip, &staging, &entry.name, &mut buf, |staged| {
                gateway.write_regular(&entry.content, staged).map_err(BoxError::from)
            })?;
        }
        for entry in from.flash() {
            write_entry(&mut zip, &staging, &entry.name, &mut buf, |staged| {
                gateway.write_flash(&entry.content, staged).map_err(BoxError::from)
            })?;
        }

        zip.set_comment(from.comment.clone());
        zip.finish()
            .map_err(|e| TigError::ArchiveCloseFailed { path: path.to_path_buf(), source: e.into() })?;

        log::info!(
            "{}: wrote {} regular and {} flash entries for {}",
            path.display(),
            from.regular_count(),
            from.flash_count(),
            from.platform,
        );
        Ok(())
    }

    /// Serialise one object into a staged file and copy it into a new
    /// stored entry named `name`.
    ///
    /// `zip` has no explicit per-entry close: the previous entry is
    /// finalised (sizes and CRC written) inside the next `start_file` or in
    /// `finish`.  A real close failure therefore surfaces as the following
    /// entry's [`TigError::EntryOpenFailed`], or as
    /// [`TigError::ArchiveCloseFailed`] for the last entry.  The flush below
    /// only pushes buffered bytes to the output file, and that is what
    /// [`TigError::EntryCloseFailed`] reports.
    fn write_entry<F>(
        zip:       &mut ZipWriter<File>,
        staging:   &StagingArea,
        name:      &str,
        buf:       &mut [u8],
        serialize: F,
    ) -> Result<()>
    where
        F: FnOnce(&Path) -> std::result::Result<(), BoxError>,
    {
        let staged = staging.create(name)?;
        serialize(staged.path())
            .map_err(|source| TigError::ContentSerializeFailed { name: name.to_owned(), source })?;

        let write_failed = |source| TigError::EntryWriteFailed { name: name.to_owned(), source };
        let mut input = staged.reopen().map_err(write_failed)?;
        let modified = input.metadata().map(|m| dos_time(&m)).unwrap_or_default();

        let opts = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(modified);
        zip.start_file(name, opts)
            .map_err(|e| TigError::EntryOpenFailed { name: name.to_owned(), source: e.into() })?;

        let written = transfer(&mut input, zip, buf).map_err(|e| match e {
            TransferError::Read(source) | TransferError::Write(source) => write_failed(source),
        })?;
        zip.flush()
            .map_err(|e| TigError::EntryCloseFailed { name: name.to_owned(), source: e.into() })?;
        log::debug!("stored '{}' ({} bytes)", name, written);

        drop(input);
        staged.remove();
        Ok(())
    }

    /// Modification time of a staged file as a ZIP (DOS) timestamp.
    /// Times the DOS format cannot represent fall back to 1980-01-01.
    fn dos_time(meta: &Metadata) -> DateTime {
        let Ok(modified) = meta.modified() else {
            return DateTime::default();
        };
        let t: chrono::DateTime<Local> = modified.into();
        let (Ok(year), Ok(month), Ok(day)) = (u16::try_from(t.year()), u8::try_from(t.month()), u8::try_from(t.day())) else {
            return DateTime::default();
        };
        DateTime::from_date_and_time(year, month, day, t.hour() as u8, t.minute() as u8, t.second() as u8)
            .unwrap_or_default()
    }
}
