//! Archives written by the `zip` crate, read back through `nkar_archive`.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use nkar_archive::{Archive, ArchiveCache, CacheConfig, EntryKind, Error};
use tempfile::{NamedTempFile, TempDir};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Helper: deterministic, moderately compressible content
fn script(seed: usize, len: usize) -> Vec<u8> {
    format!("// module {seed}\nexports.value = {seed};\n")
        .into_bytes()
        .into_iter()
        .cycle()
        .take(len)
        .collect()
}

/// Helper: an application bundle with nested folders and mixed methods
fn write_bundle(path: &Path, comment: Option<&str>) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.add_directory("app/", stored).unwrap();
    writer.start_file("app/index.js", deflated).unwrap();
    writer.write_all(&script(0, 40_000)).unwrap();
    writer.add_directory("app/lib/", stored).unwrap();
    writer.add_directory("app/views/", stored).unwrap();
    for i in 1..=5 {
        writer
            .start_file(format!("app/lib/module{i}.js"), if i % 2 == 0 { stored } else { deflated })
            .unwrap();
        writer.write_all(&script(i, 1000 * i)).unwrap();
    }
    writer.start_file("app/views/empty.html", deflated).unwrap();
    if let Some(comment) = comment {
        writer.set_comment(comment);
    }
    writer.finish().unwrap();
}

fn bundle(comment: Option<&str>) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    write_bundle(file.path(), comment);
    file
}

#[test]
fn test_reads_zip_crate_output() {
    let file = bundle(None);
    let (archive, data) = Archive::open_with_data(file.path()).unwrap();

    assert_eq!(archive.len(), 10);
    assert_eq!(archive.read("app/index.js").unwrap(), script(0, 40_000));
    for i in 1..=5 {
        let name = format!("app/lib/module{i}.js");
        assert_eq!(archive.read(&name).unwrap(), script(i, 1000 * i));
        assert_eq!(archive.read_with_data(&name, &data).unwrap(), script(i, 1000 * i));
    }
    assert!(archive.read("app/views/empty.html").unwrap().is_empty());
}

#[test]
fn test_listing_and_metadata() {
    let file = bundle(None);
    let archive = Archive::open(file.path()).unwrap();

    assert_eq!(archive.list_folder("app"), vec!["lib", "views"]);
    assert_eq!(archive.list_folder(""), vec!["app"]);
    assert!(archive.list_folder("app/lib").is_empty());

    let stat = archive.stat("app/lib/module3.js").unwrap();
    assert_eq!(stat.size, 3000);
    assert_eq!(stat.kind, EntryKind::File);

    let stat = archive.stat("app/views").unwrap();
    assert_eq!(stat.kind, EntryKind::Directory);
    assert_eq!(stat.size, 0);
}

#[test]
fn test_wildcard_lookup() {
    let file = bundle(None);
    let archive = Archive::open(file.path()).unwrap();

    assert_eq!(
        archive.read("*pp/lib/MODULE2.js").unwrap(),
        archive.read("app/lib/module2.js").unwrap()
    );
    // the pattern's segment count must match the entry's
    assert!(!archive.exists("*lib/module2.js"));
    assert!(!archive.exists("*module2.js"));
    assert!(archive.exists("*APP/index.js"));
}

#[test]
fn test_archive_comment_is_skipped() {
    let file = bundle(Some("built by the packager"));
    let archive = Archive::open(file.path()).unwrap();

    assert_eq!(archive.len(), 10);
    assert!(archive.comment().starts_with(b"built by the packager"));
    assert_eq!(archive.read("app/lib/module4.js").unwrap(), script(4, 4000));
}

#[test]
fn test_truncated_file_is_rejected() {
    let file = bundle(None);
    let bytes = std::fs::read(file.path()).unwrap();
    let truncated = NamedTempFile::new().unwrap();
    std::fs::write(truncated.path(), &bytes[..bytes.len() - 10]).unwrap();

    let err = Archive::open(truncated.path()).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_cache_shared_between_threads() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<_> = (0..4)
        .map(|i| {
            let path = dir.path().join(format!("bundle{i}.nkar"));
            write_bundle(&path, None);
            path
        })
        .collect();

    let cache = Arc::new(ArchiveCache::new(
        CacheConfig::default()
            .with_directory_capacity(3)
            .with_data_capacity(2),
    ));

    let handles: Vec<_> = (0..16)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let paths = paths.clone();
            thread::spawn(move || {
                for round in 0..20 {
                    let path = &paths[(thread_id + round) % paths.len()];
                    let module = round % 5 + 1;
                    let data = cache
                        .read_entry(path, &format!("app/lib/module{module}.js"))
                        .unwrap();
                    assert_eq!(data, script(module, 1000 * module));
                    assert_eq!(cache.list_folder(path, "app").unwrap(), vec!["lib", "views"]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.resident_reads + stats.file_reads, 320);
    assert!(stats.archives_parsed >= 4);
    assert!(stats.cached_archives <= 3);
    assert!(stats.resident_archives <= 2);
}

#[test]
fn test_cache_reports_missing_entries() {
    let file = bundle(None);
    let cache = ArchiveCache::default();

    let err = cache.read_entry(file.path(), "app/missing.js").unwrap_err();
    assert!(matches!(err, Error::EntryNotFound(_)));
    assert!(!cache.exists(file.path(), "app/missing.js"));
    assert!(cache.is_cached(file.path()));
}
