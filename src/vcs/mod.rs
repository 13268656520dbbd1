//! Version-control capabilities needed by the update engine
//!
//! The engine never talks to git directly. Everything it needs is behind
//! [`VersionControl`]:
//! - query working tree cleanliness
//! - find untracked files an upstream change would overwrite
//! - create a commit from a tree without checking it out (an anchor)
//! - merge with an explicitly supplied base
//! - list changed paths and detect conflict markers
//!
//! [`git::GitRepository`] implements this on top of libgit2. Unit tests use
//! an in-memory fake with the same contract.
//!
//! All paths crossing this interface are relative to the project root and
//! `/`-separated, even when the project lives in a subdirectory of the
//! repository.

pub mod git;
#[cfg(test)]
pub mod memory;

pub use git::GitRepository;

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::scaffold::ScaffoldTree;

/// Failure reported by a version-control backend
///
/// Carries no stage: the caller knows which step it was running and wraps
/// this into [`crate::error::UpdateError::MergeEngineFault`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct VcsError(pub String);

impl From<git2::Error> for VcsError {
    fn from(err: git2::Error) -> Self {
        VcsError(err.message().to_string())
    }
}

impl From<std::io::Error> for VcsError {
    fn from(err: std::io::Error) -> Self {
        VcsError(err.to_string())
    }
}

pub type VcsResult<T> = std::result::Result<T, VcsError>;

/// Opaque handle to an out-of-band anchor commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnchorId(String);

impl AnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of merging the new anchor into the current branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Paths the upstream delta changed or whose merged content differs from
    /// the pre-merge commit
    pub touched_paths: BTreeSet<String>,
    /// Paths left with unresolved conflicts
    pub conflicted_paths: BTreeSet<String>,
    /// True when no path conflicted
    pub cleanly_applied: bool,
}

impl MergeOutcome {
    /// Build an outcome, deriving `cleanly_applied` from the conflict set
    pub fn new(touched_paths: BTreeSet<String>, conflicted_paths: BTreeSet<String>) -> Self {
        let cleanly_applied = conflicted_paths.is_empty();
        Self {
            touched_paths,
            conflicted_paths,
            cleanly_applied,
        }
    }
}

/// Narrow version-control interface used by the update engine
pub trait VersionControl {
    /// Paths with staged, unstaged, or untracked changes, anywhere in the
    /// repository
    fn dirty_paths(&self) -> VcsResult<Vec<String>>;

    /// Create a commit whose project subtree is exactly `tree`
    ///
    /// Must not touch the working tree, the index, or any ref.
    fn create_anchor(
        &self,
        tree: &ScaffoldTree,
        parent: Option<&AnchorId>,
        message: &str,
    ) -> VcsResult<AnchorId>;

    /// Paths the upstream delta from `base` to `theirs` writes that are
    /// absent from the last commit but already exist on disk
    ///
    /// On a clean tree these are ignored files the merge would clobber.
    fn untracked_collisions(&self, base: &AnchorId, theirs: &AnchorId)
    -> VcsResult<Vec<String>>;

    /// Three-way merge `theirs` into the current branch using `base` as the
    /// merge base, writing the result (including conflict markers) to the
    /// working tree
    fn merge_with_base(&self, base: &AnchorId, theirs: &AnchorId) -> VcsResult<MergeOutcome>;

    /// Paths that differ between the last commit and the working tree
    fn changed_paths(&self) -> VcsResult<BTreeSet<String>>;

    /// Whether the working tree file at `path` contains conflict markers
    fn has_conflict_markers(&self, path: &str) -> VcsResult<bool>;

    /// Content of `path` in the last commit
    fn read_committed(&self, path: &str) -> VcsResult<Option<Vec<u8>>>;

    /// Content of `path` in the working tree
    fn read_working(&self, path: &str) -> VcsResult<Option<Vec<u8>>>;
}

/// Whether `content` holds a complete set of merge conflict markers
///
/// A file counts as conflicted only when an opening, separator, and closing
/// marker all appear at line starts, in that order.
pub fn contains_conflict_markers(content: &[u8]) -> bool {
    let mut seen_open = false;
    let mut seen_separator = false;

    for line in content.split(|b| *b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.starts_with(b"<<<<<<<") {
            seen_open = true;
            seen_separator = false;
        } else if seen_open && line == b"=======" {
            seen_separator = true;
        } else if seen_separator && line.starts_with(b">>>>>>>") {
            return true;
        }
    }

    false
}
