//! Test fixtures for unit tests
//!
//! Temp directories, git repositories, and file trees in one call each.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::{commit_all, create_git_repo, write_files};
//!
//! #[test]
//! fn my_test() {
//!     let (_temp, path) = create_git_repo();
//!     write_files(&path, &[("README.md", "# app")]);
//!     commit_all(&path, "init");
//! }
//! ```

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Repository, Signature};
use tempfile::TempDir;

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::temp::temp_dir_base()).expect("Failed to create temp directory")
}

/// Create a temp directory with a git repository initialized.
///
/// Returns the `TempDir` (which cleans up on drop) and the path to the repo.
///
/// # Panics
///
/// Panics if the temp directory or git repository cannot be created.
#[must_use]
pub fn create_git_repo() -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let path = temp.path().to_path_buf();
    let repo = Repository::init(&path).expect("Failed to init git repository");
    let mut config = repo.config().expect("Failed to open repo config");
    config
        .set_str("user.name", "Test User")
        .expect("Failed to set user.name");
    config
        .set_str("user.email", "test@example.com")
        .expect("Failed to set user.email");
    (temp, path)
}

/// Write `(relative path, content)` pairs under `root`, creating parents.
///
/// # Panics
///
/// Panics if any file cannot be written.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Stage everything (including deletions) and commit on HEAD.
///
/// # Panics
///
/// Panics if any git operation fails.
pub fn commit_all(repo_path: &Path, message: &str) {
    let repo = Repository::open(repo_path).expect("Failed to open repository");
    let mut index = repo.index().expect("Failed to open index");
    index
        .add_all(["*"], IndexAddOption::DEFAULT, None)
        .expect("Failed to stage files");
    index
        .update_all(["*"], None)
        .expect("Failed to stage deletions");
    index.write().expect("Failed to write index");

    let tree_oid = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_oid).expect("Failed to find tree");
    let sig = Signature::now("Test User", "test@example.com").expect("Failed to build signature");

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Failed to commit");
}

/// Id of the commit HEAD points at.
///
/// # Panics
///
/// Panics if the repository has no commits.
#[must_use]
pub fn head_oid(repo_path: &Path) -> String {
    let repo = Repository::open(repo_path).expect("Failed to open repository");
    repo.head()
        .and_then(|h| h.peel_to_commit())
        .expect("Repository has no HEAD commit")
        .id()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_git_repo() {
        let (temp, path) = create_git_repo();
        assert!(path.join(".git").exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_write_files_creates_parents() {
        let temp = create_temp_dir();
        write_files(temp.path(), &[("config/environment.js", "module.exports = {};")]);

        let content = std::fs::read_to_string(temp.path().join("config/environment.js"))
            .expect("Failed to read");
        assert_eq!(content, "module.exports = {};");
    }

    #[test]
    fn test_commit_all_advances_head() {
        let (_temp, path) = create_git_repo();
        write_files(&path, &[("a.txt", "1")]);
        commit_all(&path, "first");
        let first = head_oid(&path);

        std::fs::remove_file(path.join("a.txt")).expect("Failed to remove");
        write_files(&path, &[("b.txt", "2")]);
        commit_all(&path, "second");

        assert_ne!(head_oid(&path), first);
        let repo = Repository::open(&path).expect("open");
        let tree = repo
            .head()
            .and_then(|h| h.peel_to_tree())
            .expect("tree");
        assert!(tree.get_name("a.txt").is_none());
        assert!(tree.get_name("b.txt").is_some());
    }
}
