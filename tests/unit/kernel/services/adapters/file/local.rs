use super::*;
use tempfile::tempdir;

#[test]
fn test_read_string() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "hello world").unwrap();

    let mut provider = LocalFileProvider::new(&path);
    assert_eq!(provider.read_string().unwrap(), "hello world");
    assert_eq!(provider.file_name(), path.as_path());
}

#[test]
fn test_read_missing_file_is_source_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.txt");

    let mut provider = LocalFileProvider::new(&path);
    assert!(matches!(
        provider.read_string(),
        Err(FindError::SourceNotFound(p)) if p == path
    ));
}

#[test]
fn test_read_directory_is_io_error() {
    let dir = tempdir().unwrap();

    let mut provider = LocalFileProvider::new(dir.path());
    assert!(matches!(provider.read_string(), Err(FindError::Io { .. })));
}

#[test]
fn test_replace_batch_writes_on_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "foo bar foo").unwrap();

    let mut provider = LocalFileProvider::new(&path);
    let content = provider.read_string().unwrap();
    provider.begin_replace(&content);
    provider.replace(0, 3, "baz").unwrap();
    provider.replace(8, 3, "qux").unwrap();

    // 批次结束前磁盘不变
    assert_eq!(fs::read_to_string(&path).unwrap(), "foo bar foo");

    provider.end_replace().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "baz bar qux");
}

#[test]
fn test_empty_batch_does_not_touch_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "foo").unwrap();

    let mut provider = LocalFileProvider::new(&path);
    provider.begin_replace("foo");
    fs::remove_file(&path).unwrap();
    provider.end_replace().unwrap();

    assert!(!path.exists());
}

#[test]
fn test_replace_out_of_range() {
    let mut provider = LocalFileProvider::new("unused.txt");
    provider.begin_replace("abc");

    assert!(matches!(
        provider.replace(2, 5, "x"),
        Err(FindError::EditOutOfRange { len: 3, .. })
    ));
}

#[test]
fn test_replace_outside_batch_fails() {
    let mut provider = LocalFileProvider::new("unused.txt");
    assert!(provider.replace(0, 0, "x").is_err());
}

#[test]
fn test_is_likely_binary() {
    let dir = tempdir().unwrap();
    let text = dir.path().join("a.txt");
    let bin = dir.path().join("a.bin");
    fs::write(&text, "plain text").unwrap();
    fs::write(&bin, [0x7f, b'E', b'L', b'F', 0, 1, 2]).unwrap();

    assert!(!is_likely_binary(&text).unwrap());
    assert!(is_likely_binary(&bin).unwrap());
}
