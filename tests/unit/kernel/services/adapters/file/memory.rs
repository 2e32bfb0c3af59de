use super::*;

#[test]
fn test_clones_share_buffer() {
    let handle = MemoryFileProvider::new("untitled-1", "foo bar");
    let mut provider = handle.clone();

    provider.begin_replace("foo bar");
    provider.replace(4, 3, "baz").unwrap();
    provider.end_replace().unwrap();

    assert_eq!(handle.text(), "foo baz");
    assert_eq!(handle.version(), 1);
}

#[test]
fn test_empty_batch_keeps_version() {
    let mut provider = MemoryFileProvider::new("a", "abc");
    provider.begin_replace("abc");
    provider.end_replace().unwrap();

    assert_eq!(provider.version(), 0);
}

#[test]
fn test_replace_non_ascii_byte_offsets() {
    let mut provider = MemoryFileProvider::new("a", "héllo wörld");
    let content = provider.read_string().unwrap();
    let offset = content.find("wörld").unwrap();

    provider.begin_replace(&content);
    provider.replace(offset, "wörld".len(), "world").unwrap();
    provider.end_replace().unwrap();

    assert_eq!(provider.text(), "héllo world");
}

#[test]
fn test_replace_rejects_mid_char_offset() {
    let mut provider = MemoryFileProvider::new("a", "é");
    provider.begin_replace("é");

    assert!(matches!(
        provider.replace(1, 1, "e"),
        Err(FindError::EditOutOfRange { .. })
    ));
    assert!(provider.replace(0, 3, "e").is_err());
}

#[test]
fn test_closed_buffer_is_not_found() {
    let handle = MemoryFileProvider::new("gone.txt", "text");
    let mut provider = handle.clone();
    handle.close();

    assert!(matches!(
        provider.read_string(),
        Err(FindError::SourceNotFound(_))
    ));
}

#[test]
fn test_selection() {
    let provider = MemoryFileProvider::new("a", "aaa")
        .with_selection(SelectionBounds::new(Some(1), Some(2)));

    assert_eq!(provider.selection(), SelectionBounds::new(Some(1), Some(2)));
}
