// tests/git_gateway_test.rs
use std::fs;
use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use git_release_notes::git::{Git2TagStore, TagStore};
use git_release_notes::ReleaseError;

/// Two hours east of UTC
const OFFSET_MINUTES: i32 = 120;

fn signature(seconds: i64) -> Signature<'static> {
    Signature::new(
        "Release Bot",
        "bot@example.com",
        &Time::new(seconds, OFFSET_MINUTES),
    )
    .unwrap()
}

fn commit_files(repo: &Repository, files: &[(&str, &str)], seconds: i64) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (name, content) in files {
        let path = workdir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        index.add_path(Path::new(name)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    let sig = signature(seconds);

    repo.commit(Some("HEAD"), &sig, &sig, "update", &tree, &parents)
        .unwrap()
}

fn annotated_tag(repo: &Repository, name: &str, target: Oid, seconds: i64) {
    let object = repo.find_object(target, None).unwrap();
    repo.tag(name, &object, &signature(seconds), name, false)
        .unwrap();
}

fn lightweight_tag(repo: &Repository, name: &str, target: Oid) {
    let object = repo.find_object(target, None).unwrap();
    repo.tag_lightweight(name, &object, false).unwrap();
}

#[test]
fn test_tags_listed_newest_first() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let first = commit_files(&repo, &[("version.txt", "1.0.0\n")], 1_700_000_000);
    annotated_tag(&repo, "v1.0.0", first, 1_700_000_100);

    let second = commit_files(&repo, &[("version.txt", "1.1.0\n")], 1_700_100_000);
    lightweight_tag(&repo, "v1.1.0", second);

    // Older commit, but the annotation is the newest of all
    annotated_tag(&repo, "v1.0.1", first, 1_700_200_000);

    let store = Git2TagStore::from_git2(repo);

    assert_eq!(
        store.list_tags_by_creation().unwrap(),
        vec!["v1.0.1", "v1.1.0", "v1.0.0"]
    );
    assert_eq!(store.latest_tag().unwrap().as_deref(), Some("v1.0.1"));
}

#[test]
fn test_read_file_at_tag_uses_tagged_content() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let tagged = commit_files(
        &repo,
        &[
            ("package.json", r#"{"version": "1.2.0"}"#),
            ("docs/CHANGELOG.md", "## 1.2.0\n"),
        ],
        1_700_000_000,
    );
    annotated_tag(&repo, "v1.2.0", tagged, 1_700_000_100);
    commit_files(&repo, &[("package.json", r#"{"version": "9.9.9"}"#)], 1_700_100_000);

    let store = Git2TagStore::from_git2(repo);

    assert_eq!(
        store.read_file_at_tag("v1.2.0", "package.json").unwrap().as_deref(),
        Some(r#"{"version": "1.2.0"}"#)
    );
    assert_eq!(
        store.read_file_at_tag("v1.2.0", "docs/CHANGELOG.md").unwrap().as_deref(),
        Some("## 1.2.0\n")
    );
    assert_eq!(store.read_file_at_tag("v1.2.0", "version.txt").unwrap(), None);
}

#[test]
fn test_read_file_at_unknown_tag_fails() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_files(&repo, &[("version.txt", "1.0.0\n")], 1_700_000_000);

    let store = Git2TagStore::from_git2(repo);

    assert!(matches!(
        store.read_file_at_tag("v0.0.0", "version.txt"),
        Err(ReleaseError::VersionControl(_))
    ));
}

#[test]
fn test_tag_commit_date_is_author_date_with_offset() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let oid = commit_files(&repo, &[("version.txt", "1.0.0\n")], 1_700_000_000);
    // The tagger date must not leak into the window
    annotated_tag(&repo, "v1.0.0", oid, 1_800_000_000);

    let store = Git2TagStore::from_git2(repo);
    let date = store.tag_commit_date("v1.0.0").unwrap();

    assert_eq!(date.timestamp(), 1_700_000_000);
    assert_eq!(date.offset().local_minus_utc(), OFFSET_MINUTES * 60);
    assert_eq!(date.to_rfc3339(), "2023-11-15T00:13:20+02:00");
}

#[test]
fn test_fetch_tags_from_local_remote() {
    let origin_dir = TempDir::new().unwrap();
    let origin = Repository::init(origin_dir.path()).unwrap();
    let oid = commit_files(&origin, &[("version.txt", "2.0.0\n")], 1_700_000_000);
    annotated_tag(&origin, "v2.0.0", oid, 1_700_000_100);

    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    repo.remote("origin", origin_dir.path().to_str().unwrap())
        .unwrap();

    let store = Git2TagStore::from_git2(repo);
    assert!(store.list_tags_by_creation().unwrap().is_empty());

    store.fetch_tags("origin").unwrap();

    assert_eq!(store.list_tags_by_creation().unwrap(), vec!["v2.0.0"]);
    assert_eq!(
        store.read_file_at_tag("v2.0.0", "version.txt").unwrap().as_deref(),
        Some("2.0.0\n")
    );
}

#[test]
fn test_open_missing_directory_fails() {
    let dir = TempDir::new().unwrap();

    let result = Git2TagStore::open(dir.path().join("missing-checkout"));

    assert!(matches!(result, Err(ReleaseError::VersionControl(_))));
}
