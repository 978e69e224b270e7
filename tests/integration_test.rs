#![cfg(feature = "archive")]

use std::cell::Cell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;
use tigroup::{
    assemble, extract, Category, Container, ContentGateway, FlashContent, Platform,
    RegularContent, TiFiles, TigError, TigOptions,
};
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(name.to_string(), opts).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

fn staging_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

/// `TiFiles` wrapper whose readers fail after `ok_reads` successes.
struct FlakyReader {
    ok_reads: Cell<usize>,
}

impl ContentGateway for FlakyReader {
    type Regular = RegularContent;
    type Flash   = FlashContent;
    type Error   = std::io::Error;

    fn classify(&self, staged: &Path) -> Category {
        TiFiles.classify(staged)
    }

    fn read_regular(&self, staged: &Path) -> Result<RegularContent, std::io::Error> {
        if self.ok_reads.get() == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "parser gave up"));
        }
        self.ok_reads.set(self.ok_reads.get() - 1);
        TiFiles.read_regular(staged).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn read_flash(&self, staged: &Path) -> Result<FlashContent, std::io::Error> {
        TiFiles.read_flash(staged).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn write_regular(&self, _: &RegularContent, _: &Path) -> Result<(), std::io::Error> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "writer disabled"))
    }

    fn write_flash(&self, c: &FlashContent, staged: &Path) -> Result<(), std::io::Error> {
        fs::write(staged, c.as_bytes())
    }
}

#[test]
fn test_text_entry_is_skipped() {
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let tig = dir.path().join("group.tig");
    let a = RegularContent::new(Platform::Ti89, "var a", b"\x00\x01\x02\x03").unwrap();
    write_zip(&tig, &[("A.89", a.as_bytes()), ("README.TXT", b"Hello from the group\n")]);

    let mut group = Container::new(Platform::None);
    extract(&tig, &mut group, &TiFiles, &TigOptions::default().with_staging_dir(staging.path())).unwrap();

    assert_eq!(group.regular_count(), 1);
    assert_eq!(group.flash_count(), 0);
    assert_eq!(group.regular()[0].name, "A.89");
    assert_eq!(group.regular()[0].content, a);
    assert_eq!(group.platform, Platform::Ti89);
    assert!(staging_is_empty(staging.path()));
}

#[test]
fn test_missing_platform_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let tig = dir.path().join("never.tig");
    let mut group = Container::new(Platform::None);
    group.push_regular("A.89p", RegularContent::new(Platform::Ti89, "", b"x").unwrap()).unwrap();

    let err = assemble(&group, &tig, &TiFiles, &TigOptions::default()).unwrap_err();
    assert!(matches!(err, TigError::MissingPlatform));
    assert!(!tig.exists());
}

#[test]
fn test_roundtrip_regular_and_flash() {
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let opts = TigOptions::default().with_staging_dir(staging.path()).with_buffer_size(100);
    let tig = dir.path().join("rt.tig");

    let mut group = Container::new(Platform::Ti92Plus);
    group.comment = "round trip".into();
    group.push_regular("main/prog.9xp", RegularContent::new(Platform::Ti92Plus, "prog", &[9u8; 5000]).unwrap()).unwrap();
    group.push_regular("main/x.9xe", RegularContent::new(Platform::Ti92Plus, "x", b"").unwrap()).unwrap();
    group.push_flash("geo.9xk", FlashContent::new("Geometry", 0x88, 0x24, &[3u8; 9000])).unwrap();
    group.save(&tig, &TiFiles, &opts).unwrap();
    assert!(staging_is_empty(staging.path()));

    let back: Container = Container::open(&tig, &TiFiles, &opts).unwrap();
    assert!(staging_is_empty(staging.path()));
    assert_eq!(back.comment, "round trip");
    assert_eq!(back.platform, Platform::Ti92Plus);
    assert_eq!(back.regular(), group.regular());
    assert_eq!(back.flash(), group.flash());

    back.destroy(&TiFiles);
    group.destroy(&TiFiles);
}

#[test]
fn test_parse_failure_aborts_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let tig = dir.path().join("bad.tig");
    let ok = RegularContent::new(Platform::Ti89, "", b"1").unwrap();
    write_zip(&tig, &[("one.89p", ok.as_bytes()), ("two.89p", ok.as_bytes()), ("three.89p", ok.as_bytes())]);

    let gw = FlakyReader { ok_reads: Cell::new(1) };
    let mut group = Container::new(Platform::Ti89);
    let err = extract(&tig, &mut group, &gw, &TigOptions::default().with_staging_dir(staging.path())).unwrap_err();

    match err {
        TigError::ContentParseFailed { name, .. } => assert_eq!(name, "two.89p"),
        other => panic!("unexpected error: {other}"),
    }
    // Partially filled but intact.
    assert_eq!(group.regular_count(), 1);
    assert_eq!(group.regular()[0].name, "one.89p");
    assert!(staging_is_empty(staging.path()));
    group.destroy(&gw);
}

#[test]
fn test_serialize_failure_aborts_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let tig = dir.path().join("out.tig");

    let gw = FlakyReader { ok_reads: Cell::new(0) };
    let mut group = Container::new(Platform::Ti89);
    group.push_regular("a.89p", RegularContent::new(Platform::Ti89, "", b"1").unwrap()).unwrap();

    let err = assemble(&group, &tig, &gw, &TigOptions::default().with_staging_dir(staging.path())).unwrap_err();
    assert!(matches!(err, TigError::ContentSerializeFailed { ref name, .. } if name == "a.89p"));
    assert!(staging_is_empty(staging.path()));
}

#[test]
fn test_unwritable_output_fails_to_create() {
    let dir = TempDir::new().unwrap();
    let tig = dir.path().join("no/such/dir/out.tig");
    let group: Container = Container::new(Platform::Ti89);
    let err = assemble(&group, &tig, &TiFiles, &TigOptions::default()).unwrap_err();
    assert!(matches!(err, TigError::ArchiveCreateFailed { .. }));
}

#[test]
fn test_missing_staging_dir_fails_staging() {
    let dir = TempDir::new().unwrap();
    let tig = dir.path().join("g.tig");
    let a = RegularContent::new(Platform::Ti89, "", b"1").unwrap();
    write_zip(&tig, &[("a.89p", a.as_bytes())]);

    let opts = TigOptions::default().with_staging_dir(dir.path().join("gone"));
    let mut group = Container::new(Platform::None);
    let err = extract(&tig, &mut group, &TiFiles, &opts).unwrap_err();
    assert!(matches!(err, TigError::StagingWriteFailed { .. }));
    assert!(group.is_empty());
}

#[test]
fn test_password_protected_entry() {
    use zip::unstable::write::FileOptionsExt;

    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let tig = dir.path().join("locked.tig");
    let a = RegularContent::new(Platform::Ti89, "locked", b"\x10\x20\x30").unwrap();

    let mut writer = zip::ZipWriter::new(File::create(&tig).unwrap());
    let locked = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .with_deprecated_encryption(b"secret");
    writer.start_file("A.89p", locked).unwrap();
    writer.write_all(a.as_bytes()).unwrap();
    writer.finish().unwrap();

    let opts = TigOptions::default().with_staging_dir(staging.path());
    let mut group = Container::new(Platform::None);
    let err = extract(&tig, &mut group, &TiFiles, &opts).unwrap_err();
    assert!(matches!(err, TigError::EntryOpenFailed { ref name, .. } if name == "A.89p"));
    assert!(group.is_empty());
    assert!(staging_is_empty(staging.path()));

    let mut group = Container::new(Platform::None);
    extract(&tig, &mut group, &TiFiles, &opts.with_password("secret")).unwrap();
    assert_eq!(group.regular_count(), 1);
    assert_eq!(group.regular()[0].content, a);
    assert!(staging_is_empty(staging.path()));
}

#[test]
fn test_display_lists_written_group() {
    let dir = TempDir::new().unwrap();
    let tig = dir.path().join("l.tig");
    let mut group = Container::new(Platform::Ti83Plus);
    group.push_regular("PROG.8xp", RegularContent::new(Platform::Ti83Plus, "", b"abc").unwrap()).unwrap();
    group.save(&tig, &TiFiles, &TigOptions::default().with_staging_dir(dir.path())).unwrap();

    let listing = tigroup::list(&tig).unwrap();
    assert_eq!(listing.entries.len(), 1);
    assert_eq!(listing.entries[0].name, "PROG.8xp");
    assert_eq!(listing.entries[0].method, "Stored");
    assert_eq!(listing.comment, tigroup::DEFAULT_COMMENT);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_roundtrip_preserves_entries(
        platform in proptest::sample::select(vec![
            Platform::Ti83Plus, Platform::Ti84Plus, Platform::Ti86,
            Platform::Ti89, Platform::Ti89Titanium, Platform::V200,
        ]),
        regular in proptest::collection::vec(
            ("[a-z ]{0,60}", proptest::collection::vec(any::<u8>(), 0..600)),
            0..5,
        ),
        flash   in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..600), 0..3),
    ) {
        let dir = TempDir::new().unwrap();
        let opts = TigOptions::default().with_staging_dir(dir.path()).with_buffer_size(64);
        let tig = dir.path().join("p.tig");

        let mut group = Container::new(platform);
        for (i, (comment, body)) in regular.iter().enumerate() {
            let content = RegularContent::new(platform, comment, body).unwrap();
            group.push_regular(format!("R{i}.bin"), content).unwrap();
        }
        for (i, body) in flash.iter().enumerate() {
            group.push_flash(format!("F{i}.89k"), FlashContent::new("app", 0x98, 0x24, body)).unwrap();
        }
        group.save(&tig, &TiFiles, &opts).unwrap();

        let back: Container = Container::open(&tig, &TiFiles, &opts).unwrap();
        prop_assert_eq!(back.regular_count(), regular.len());
        prop_assert_eq!(back.flash_count(), flash.len());
        prop_assert_eq!(back.regular(), group.regular());
        prop_assert_eq!(back.flash(), group.flash());

        // Only the archive itself is left in the staging directory.
        prop_assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
