//! Precondition errors

use super::UpdateError;

/// Creates a dirty working tree error
pub fn dirty_working_tree(path: impl Into<String>) -> UpdateError {
    UpdateError::DirtyWorkingTree { path: path.into() }
}

/// Creates a not-a-scaffolded-project error
pub fn not_scaffolded(marker: impl Into<String>, manifest: impl Into<String>) -> UpdateError {
    UpdateError::NotAScaffoldedProject {
        marker: marker.into(),
        manifest: manifest.into(),
    }
}

/// Creates a not-in-git-repository error
pub fn not_in_repo(path: impl Into<String>) -> UpdateError {
    UpdateError::NotInGitRepository { path: path.into() }
}

/// Creates an error for an upstream file blocked by an untracked local file
pub fn would_overwrite_untracked(path: impl Into<String>) -> UpdateError {
    UpdateError::WouldOverwriteUntracked { path: path.into() }
}
