//! Integration tests for the CSV registry file.

use std::path::{Path, PathBuf};

use errdownload_core::{Registry, RegistryError};
use tempfile::TempDir;

#[test]
fn test_registry_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("downloaded.csv");

    let mut registry = Registry::open(&path).unwrap();
    registry.add("http://a/1", Path::new("one.m4a")).unwrap();
    registry
        .add("http://a/2", Path::new("two, with comma.m4a"))
        .unwrap();
    registry.close().unwrap();

    let registry = Registry::open(&path).unwrap();
    let index = registry.index();
    assert_eq!(index.len(), 2);
    assert_eq!(index.output_path("http://a/1"), Some(PathBuf::from("one.m4a")));
    assert_eq!(
        index.output_path("http://a/2"),
        Some(PathBuf::from("two, with comma.m4a"))
    );
}

#[test]
fn test_registry_reads_file_written_by_hand() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("downloaded.csv");
    std::fs::write(
        &path,
        "http://arhiiv.err.ee/vaata/a,a.m4a\n\"http://x/b\",\"b.mp3\"\nbroken-row\n",
    )
    .unwrap();

    let registry = Registry::open(&path).unwrap();
    assert!(registry.exists("http://arhiiv.err.ee/vaata/a"));
    assert!(registry.exists("http://x/b"));
    assert!(!registry.exists("broken-row"));
    assert_eq!(registry.index().len(), 2);
}

#[test]
fn test_registry_appends_after_unterminated_row() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("downloaded.csv");
    std::fs::write(&path, "http://a/1,one.m4a").unwrap();

    let mut registry = Registry::open(&path).unwrap();
    registry.add("http://a/2", Path::new("two.m4a")).unwrap();
    registry.close().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "http://a/1,one.m4a\nhttp://a/2,two.m4a\n");
}

#[test]
fn test_registry_rejects_non_csv_path() {
    let dir = TempDir::new().unwrap();
    let err = Registry::open(dir.path().join("downloaded.db")).unwrap_err();
    assert!(matches!(err, RegistryError::UnsupportedFormat { .. }));
    assert!(!dir.path().join("downloaded.db").exists());
}
