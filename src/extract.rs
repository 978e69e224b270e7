//! Extraction: TiGroup archive → staged files → classified, parsed entries.
//!
//! Entries are processed one at a time in archive order.  Each is streamed
//! into a staged file, classified, parsed by the gateway and appended to the
//! destination container; the staged file is removed before the next entry
//! starts.  Entries that are not TI files are skipped without error.
//!
//! The first failure aborts the whole call.  The destination keeps whatever
//! was appended up to that point and remains safe to use or destroy.

use std::path::Path;

use crate::config::TigOptions;
use crate::container::Container;
use crate::error::{Result, TigError};
use crate::gateway::ContentGateway;

/// Read the TiGroup at `path` and append its TI files to `into`.
///
/// The archive comment replaces `into.comment`.  If `into.platform` is
/// still `Platform::None` it is taken from the first recognised entry.
pub fn extract<G, P>(
    path:    P,
    into:    &mut Container<G::Regular, G::Flash>,
    gateway: &G,
    options: &TigOptions,
) -> Result<()>
where
    G: ContentGateway,
    P: AsRef<Path>,
{
    #[cfg(feature = "archive")]
    {
        imp::extract_zip(path.as_ref(), into, gateway, options)
    }
    #[cfg(not(feature = "archive"))]
    {
        let _ = (path, into, gateway, options);
        Err(TigError::Unsupported)
    }
}

#[cfg(feature = "archive")]
mod imp {
    use std::fs::File;
    use std::io;

    use zip::result::ZipError;
    use zip::ZipArchive;

    use super::*;
    use crate::classify::dispatch;
    use crate::error::BoxError;
    use crate::platform::Platform;
    use crate::staging::{transfer, transfer_buffer, StagingArea, TransferError};

    pub(super) fn extract_zip<G: ContentGateway>(
        path:    &Path,
        into:    &mut Container<G::Regular, G::Flash>,
        gateway: &G,
        options: &TigOptions,
    ) -> Result<()> {
        let open_failed = |source: BoxError| TigError::ArchiveOpenFailed {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(|e| open_failed(e.into()))?;
        let mut archive = ZipArchive::new(file).map_err(|e| open_failed(e.into()))?;

        let count = archive.len();
        into.comment = match std::str::from_utf8(archive.comment()) {
            Ok(s) => s.to_owned(),
            Err(_) => {
                log::warn!("archive comment of {} is not UTF-8", path.display());
                String::from_utf8_lossy(archive.comment()).into_owned()
            }
        };
        log::info!("{}: {} entries", path.display(), count);

        let staging = StagingArea::new(&options.staging_dir);
        let mut buf = transfer_buffer(options.buffer_size)?;

        for index in 0..count {
            // Metadata first, from the central directory record.
            let (name, declared, is_dir) = match archive.by_index_raw(index) {
                Ok(entry) => (entry.name().to_owned(), entry.size(), entry.is_dir()),
                Err(ZipError::FileNotFound) => {
                    return Err(TigError::ArchiveIterationFailed {
                        index,
                        source: ZipError::FileNotFound.into(),
                    });
                }
                Err(e) => return Err(TigError::MetadataReadFailed { index, source: e.into() }),
            };
            if is_dir {
                log::debug!("skipping directory entry '{}'", name);
                continue;
            }
            log::debug!("extracting '{}' ({} bytes)", name, declared);

            let staged = {
                let mut entry = match options.password.as_deref() {
                    Some(pwd) => archive.by_index_decrypt(index, pwd.as_bytes()),
                    None      => archive.by_index(index),
                }
                .map_err(|e| TigError::EntryOpenFailed { name: name.clone(), source: e.into() })?;

                let mut staged = staging.create(&name)?;
                let copied = transfer(&mut entry, staged.as_file_mut(), &mut buf).map_err(|e| match e {
                    TransferError::Read(source)  => TigError::EntryReadFailed { name: name.clone(), source },
                    TransferError::Write(source) => TigError::StagingWriteFailed { name: name.clone(), source },
                })?;
                if copied != declared {
                    return Err(TigError::EntryReadFailed {
                        name,
                        source: io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("read {copied} bytes, entry declares {declared}"),
                        ),
                    });
                }
                drop(entry);
                staged
            };

            let detected = gateway.platform(staged.path());
            let parsed = dispatch(gateway, staged.path());
            staged.remove();

            let content = match parsed {
                Ok(Some(content)) => content,
                Ok(None) => {
                    log::debug!("'{}' is not a TI file, skipped", name);
                    continue;
                }
                Err(source) => return Err(TigError::ContentParseFailed { name, source }),
            };

            if into.platform == Platform::None && detected != Platform::None {
                log::debug!("platform set to {} from '{}'", detected, name);
                into.platform = detected;
            }
            log::debug!("'{}' added as {:?}", name, content.category());
            into.append(name, content)?;
        }

        Ok(())
    }
}
