use super::*;
use std::fs;
use tempfile::tempdir;

fn names(scope: &dyn Scope) -> Vec<String> {
    scope
        .files(&|| false, &FilterOptions::default())
        .unwrap()
        .iter()
        .map(|p| {
            p.file_name()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[test]
fn test_directory_scope_lists_text_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("b.rs"), "fn main() {}").unwrap();
    fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3]).unwrap();

    let scope = DirectoryScope::new(dir.path());

    assert_eq!(scope.total_work(&FilterOptions::default()), 2);
    let mut found = names(&scope);
    found.sort();
    assert_eq!(found, vec!["a.txt", "b.rs"]);
}

#[test]
fn test_directory_scope_binary_files_optional() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3]).unwrap();

    let scope = DirectoryScope::new(dir.path()).skip_binary(false);
    assert_eq!(scope.total_work(&FilterOptions::default()), 1);
}

#[test]
fn test_directory_scope_honors_gitignore() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
    fs::create_dir(dir.path().join("target")).unwrap();
    fs::write(dir.path().join("target").join("out.txt"), "hello").unwrap();
    fs::write(dir.path().join("keep.txt"), "hello").unwrap();

    let scope = DirectoryScope::new(dir.path());
    assert_eq!(names(&scope), vec!["keep.txt"]);

    let scope = DirectoryScope::new(dir.path()).git_ignore(false);
    assert_eq!(scope.total_work(&FilterOptions::default()), 2);
}

#[test]
fn test_directory_scope_hidden_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".secret"), "hello").unwrap();
    fs::write(dir.path().join("plain.txt"), "hello").unwrap();

    let scope = DirectoryScope::new(dir.path());
    assert_eq!(names(&scope), vec!["plain.txt"]);

    let scope = DirectoryScope::new(dir.path()).hidden(true);
    assert_eq!(scope.total_work(&FilterOptions::default()), 2);
}

#[test]
fn test_directory_scope_multiple_roots() {
    let a = tempdir().unwrap();
    let b = tempdir().unwrap();
    fs::write(a.path().join("one.txt"), "x").unwrap();
    fs::write(b.path().join("two.txt"), "x").unwrap();

    let settings = FindSettings::default();
    let scope = DirectoryScope::from_settings(
        vec![a.path().to_path_buf(), b.path().to_path_buf()],
        &settings,
    );

    assert_eq!(scope.total_work(&FilterOptions::default()), 2);
    assert_eq!(scope.roots().len(), 2);
}

#[test]
fn test_directory_scope_cancelled_walk_is_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    let scope = DirectoryScope::new(dir.path());
    let files = scope.files(&|| true, &FilterOptions::default()).unwrap();
    assert!(files.is_empty());

    // 不完整的遍历不缓存，后续调用重新遍历
    assert_eq!(scope.total_work(&FilterOptions::default()), 1);
    assert_eq!(names(&scope), vec!["a.txt"]);
}

#[test]
fn test_descriptions() {
    let filter = FilterOptions::default();
    let scope = BufferScope::new(vec![]);
    assert_eq!(
        scope.description(&filter, "foo", None),
        "Looking for 'foo' in open documents"
    );
    assert_eq!(
        scope.description(&filter, "foo", Some("bar")),
        "Replacing 'foo' with 'bar' in open documents"
    );

    let scope = FileListScope::new(["a.txt"]);
    assert_eq!(
        scope.description(&filter, "x", None),
        "Looking for 'x' in selected files"
    );
}

#[test]
fn test_file_list_scope_keeps_missing_paths() {
    let scope = FileListScope::new(["does/not/exist.txt", "other.txt"]);
    assert_eq!(scope.total_work(&FilterOptions::default()), 2);
    assert_eq!(names(&scope), vec!["exist.txt", "other.txt"]);
}

#[test]
fn test_buffer_scope_shares_buffers() {
    let buffer = MemoryFileProvider::new("doc", "text");
    let scope = BufferScope::new(vec![buffer.clone()]);

    let mut files = scope.files(&|| false, &FilterOptions::default()).unwrap();
    files[0].begin_replace("text");
    files[0].replace(0, 4, "done").unwrap();
    files[0].end_replace().unwrap();

    assert_eq!(buffer.text(), "done");
}
