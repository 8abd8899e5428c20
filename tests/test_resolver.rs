use std::fs;

use mws::files::{DocumentRoot, ResolveFailure};
use tempfile::TempDir;

/// Layout:
///
/// ```text
/// tmp/
///   secret.txt
///   www/
///     index.html
///     hello.txt
///     docs/index.html
///     empty/
/// ```
fn site() -> (TempDir, DocumentRoot) {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("secret.txt"), b"top secret").unwrap();

    let www = tmp.path().join("www");
    fs::create_dir_all(www.join("docs")).unwrap();
    fs::create_dir_all(www.join("empty")).unwrap();
    fs::write(www.join("index.html"), b"<h1>home</h1>").unwrap();
    fs::write(www.join("hello.txt"), b"hello, world\n").unwrap();
    fs::write(www.join("docs").join("index.html"), b"docs").unwrap();

    let root = DocumentRoot::open(&www, "index.html").unwrap();
    (tmp, root)
}

#[test]
fn test_open_rejects_missing_root() {
    let tmp = tempfile::tempdir().unwrap();

    assert!(DocumentRoot::open(tmp.path().join("nope"), "index.html").is_err());
}

#[test]
fn test_open_rejects_file_as_root() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("f");
    fs::write(&file, b"x").unwrap();

    assert!(DocumentRoot::open(&file, "index.html").is_err());
}

#[tokio::test]
async fn test_resolve_existing_file() {
    let (_tmp, root) = site();

    let res = root.resolve("/hello.txt").await;

    assert!(res.exists());
    assert_eq!(res.size, Some(13));
    assert_eq!(res.path, root.path().join("hello.txt"));
    assert!(res.failure.is_none());
}

#[tokio::test]
async fn test_resolve_missing_file() {
    let (_tmp, root) = site();

    let res = root.resolve("/nope.html").await;

    assert!(!res.exists());
    assert_eq!(res.failure, Some(ResolveFailure::NotFound));
    assert!(res.path.starts_with(root.path()));
}

#[tokio::test]
async fn test_resolve_trailing_slash_serves_index() {
    let (_tmp, root) = site();

    let slash = root.resolve("/docs/").await;
    let explicit = root.resolve("/docs/index.html").await;

    assert!(slash.exists());
    assert_eq!(slash.path, explicit.path);
    assert_eq!(slash.size, explicit.size);
}

#[tokio::test]
async fn test_resolve_root_slash() {
    let (_tmp, root) = site();

    let res = root.resolve("/").await;

    assert!(res.exists());
    assert_eq!(res.path, root.path().join("index.html"));
}

#[tokio::test]
async fn test_resolve_trailing_slash_without_index() {
    let (_tmp, root) = site();

    let res = root.resolve("/empty/").await;

    assert!(!res.exists());
    assert_eq!(res.failure, Some(ResolveFailure::NotFound));
}

#[tokio::test]
async fn test_resolve_directory_is_not_a_file() {
    let (_tmp, root) = site();

    let res = root.resolve("/docs").await;

    assert!(!res.exists());
    assert_eq!(res.failure, Some(ResolveFailure::NotAFile));
}

#[tokio::test]
async fn test_resolve_parent_traversal_rejected() {
    let (_tmp, root) = site();

    for target in ["/../secret.txt", "/docs/../../secret.txt", "/./../secret.txt", "../secret.txt"] {
        let res = root.resolve(target).await;

        assert!(!res.exists(), "target {}", target);
        assert_eq!(res.failure, Some(ResolveFailure::Traversal));
        assert!(res.path.starts_with(root.path()));
    }
}

#[tokio::test]
async fn test_resolve_target_without_leading_slash_stays_inside_root() {
    let (_tmp, root) = site();

    let res = root.resolve("hello.txt").await;

    assert!(res.exists());
    assert_eq!(res.path, root.path().join("hello.txt"));
}

#[tokio::test]
async fn test_resolve_does_not_percent_decode() {
    let (_tmp, root) = site();

    let res = root.resolve("/%2e%2e/secret.txt").await;

    assert!(!res.exists());
    assert_eq!(res.failure, Some(ResolveFailure::NotFound));
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_symlink_escape_rejected() {
    let (tmp, root) = site();
    std::os::unix::fs::symlink(tmp.path().join("secret.txt"), root.path().join("leak.txt")).unwrap();

    let res = root.resolve("/leak.txt").await;

    assert!(!res.exists());
    assert_eq!(res.failure, Some(ResolveFailure::Traversal));
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_symlink_inside_root_allowed() {
    let (_tmp, root) = site();
    std::os::unix::fs::symlink(root.path().join("hello.txt"), root.path().join("alias.txt")).unwrap();

    let res = root.resolve("/alias.txt").await;

    assert!(res.exists());
    assert_eq!(res.size, Some(13));
}
