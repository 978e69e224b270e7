//! Read-only listing of a TiGroup, in the spirit of `unzip -l`.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, TigError};

/// One archive entry as seen by the listing.
#[derive(Debug, Clone, Serialize)]
pub struct EntryInfo {
    pub name:            String,
    pub size:            u64,
    pub compressed_size: u64,
    pub method:          String,
    pub crc32:           u32,
}

/// Entry descriptors plus the archive comment.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub comment: String,
    pub entries: Vec<EntryInfo>,
}

/// Collect the central directory of the archive at `path`.
pub fn list<P: AsRef<Path>>(path: P) -> Result<Listing> {
    #[cfg(feature = "archive")]
    {
        imp::list_zip(path.as_ref())
    }
    #[cfg(not(feature = "archive"))]
    {
        let _ = path;
        Err(TigError::Unsupported)
    }
}

/// Print the listing of `path` to stdout.
pub fn display<P: AsRef<Path>>(path: P) -> Result<()> {
    let stdout = io::stdout();
    display_to(path, &mut stdout.lock())
}

/// Print the listing of `path` to `out`.
pub fn display_to<P: AsRef<Path>, W: Write>(path: P, out: &mut W) -> Result<()> {
    let listing = list(path)?;

    writeln!(out, "{:>10}  {:<7} {:>10} {:>5}  {:<8}  Name", "Length", "Method", "Size", "Cmpr", "CRC-32")?;
    writeln!(out, "{:->10}  {:-<7} {:->10} {:->5}  {:-<8}  ----", "", "", "", "", "")?;
    let (mut total, mut total_comp) = (0u64, 0u64);
    for e in &listing.entries {
        writeln!(
            out,
            "{:>10}  {:<7} {:>10} {:>4}%  {}  {}",
            e.size,
            e.method,
            e.compressed_size,
            ratio(e.size, e.compressed_size),
            hex::encode(e.crc32.to_be_bytes()),
            e.name,
        )?;
        total += e.size;
        total_comp += e.compressed_size;
    }
    writeln!(out, "{:->10}  {:7} {:->10} {:->5}  {:8}  ----", "", "", "", "", "")?;
    writeln!(
        out,
        "{:>10}  {:7} {:>10} {:>4}%  {:8}  {} files",
        total, "", total_comp, ratio(total, total_comp), "", listing.entries.len()
    )?;
    if !listing.comment.is_empty() {
        writeln!(out, "Comment: {}", listing.comment)?;
    }
    Ok(())
}

fn ratio(size: u64, compressed: u64) -> u64 {
    if size == 0 || compressed >= size {
        return 0;
    }
    (size - compressed) * 100 / size
}

#[cfg(feature = "archive")]
mod imp {
    use std::fs::File;

    use zip::ZipArchive;

    use super::*;
    use crate::error::BoxError;

    pub(super) fn list_zip(path: &Path) -> Result<Listing> {
        let open_failed = |source: BoxError| TigError::ArchiveOpenFailed { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(|e| open_failed(e.into()))?;
        let mut archive = ZipArchive::new(file).map_err(|e| open_failed(e.into()))?;

        let comment = String::from_utf8_lossy(archive.comment()).into_owned();
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let e = archive
                .by_index_raw(index)
                .map_err(|e| TigError::MetadataReadFailed { index, source: e.into() })?;
            entries.push(EntryInfo {
                name:            e.name().to_owned(),
                size:            e.size(),
                compressed_size: e.compressed_size(),
                method:          format!("{:?}", e.compression()),
                crc32:           e.crc32(),
            });
        }
        Ok(Listing { comment, entries })
    }
}

#[cfg(all(test, feature = "archive"))]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    #[test]
    fn lists_entries_and_comment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("l.tig");
        let mut w = zip::ZipWriter::new(File::create(&path).unwrap());
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        w.start_file("A.89p", opts).unwrap();
        w.write_all(b"abcdef").unwrap();
        w.start_file("README.TXT", opts).unwrap();
        w.write_all(b"hello").unwrap();
        w.set_comment("group comment");
        w.finish().unwrap();

        let listing = list(&path).unwrap();
        assert_eq!(listing.comment, "group comment");
        assert_eq!(listing.entries.len(), 2);
        assert_eq!(listing.entries[0].name, "A.89p");
        assert_eq!(listing.entries[0].size, 6);
        assert_eq!(listing.entries[1].compressed_size, 5);

        let mut out = Vec::new();
        display_to(&path, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("README.TXT"));
        assert!(text.contains("2 files"));
        assert!(text.contains("Comment: group comment"));
    }

    #[test]
    fn missing_archive_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = display_to(dir.path().join("missing.tig"), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, TigError::ArchiveOpenFailed { .. }));
    }
}
