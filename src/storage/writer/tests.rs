use super::*;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CURRENT");

    write_atomic(&path, b"gen-abc").unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"gen-abc");
    assert!(!dir.path().join("CURRENT.tmp").exists());
}

#[test]
fn test_write_atomic_replaces_existing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CURRENT");

    write_atomic(&path, b"gen-old").unwrap();
    write_atomic(&path, b"gen-new").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "gen-new");
}

#[test]
fn test_write_atomic_missing_parent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("file");

    assert!(matches!(
        write_atomic(&path, b"x").unwrap_err(),
        StorageError::Io(_)
    ));
}

#[test]
fn test_directory_writer_returns_handle() {
    let dir = TempDir::new().unwrap();
    let writer = DirectoryWriter::create(dir.path().join("gen-1")).unwrap();

    let handle = writer.write("index.rkyv", b"payload").unwrap();

    assert_eq!(handle.as_slice(), b"payload");
    assert_eq!(handle.path(), writer.root().join("index.rkyv").as_path());
}

#[test]
fn test_directory_writer_rejects_nested_keys() {
    let dir = TempDir::new().unwrap();
    let writer = DirectoryWriter::create(dir.path()).unwrap();

    for key in ["", "..", "a/b", "a\\b"] {
        assert!(
            matches!(
                writer.write(key, b"x").unwrap_err(),
                StorageError::WriteFailed { .. }
            ),
            "key {:?} should be rejected",
            key
        );
    }
}
