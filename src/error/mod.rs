//! Error types and handling for scaffold-update
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`precondition`]: Gates that run before any mutation
//! - [`scaffold`]: Version parsing and scaffold materialization errors
//! - [`git`]: Version-control engine faults
//! - [`config`]: Configuration file errors
//! - [`fs`]: File system errors
//!
//! Conflicts are not errors. A merge that leaves conflict markers behind is a
//! successful run and is reported through [`crate::report::StatusReport`].

pub mod config;
pub mod fs;
pub mod git;
pub mod precondition;
pub mod scaffold;

use miette::Diagnostic;
use thiserror::Error;

use crate::merge::MergeStage;

/// Main error type for scaffold-update operations
#[derive(Error, Diagnostic, Debug)]
pub enum UpdateError {
    // Precondition errors
    #[error("You must start with a clean working directory: {path} has uncommitted changes")]
    #[diagnostic(
        code(scaffold_update::precondition::dirty_working_tree),
        help("Commit or stash your changes (including untracked files), then run the update again")
    )]
    DirtyWorkingTree { path: String },

    #[error("'{marker}' was not found in this project's {manifest}")]
    #[diagnostic(
        code(scaffold_update::precondition::not_scaffolded),
        help(
            "The project manifest must list '{marker}' in dependencies or devDependencies. Use --marker to check for a different dependency."
        )
    )]
    NotAScaffoldedProject { marker: String, manifest: String },

    #[error("Updating would overwrite {path}, which exists locally but is not tracked by git")]
    #[diagnostic(
        code(scaffold_update::precondition::would_overwrite_untracked),
        help(
            "The new scaffold adds this file. Move the local copy aside (it is probably git-ignored), then run the update again"
        )
    )]
    WouldOverwriteUntracked { path: String },

    #[error("Not in a git repository: {path}")]
    #[diagnostic(
        code(scaffold_update::precondition::not_in_repo),
        help("The project must be tracked by git. Run 'git init' and commit your files first.")
    )]
    NotInGitRepository { path: String },

    // Scaffold errors
    #[error("Invalid version '{input}': {reason}")]
    #[diagnostic(code(scaffold_update::scaffold::invalid_version))]
    InvalidVersion { input: String, reason: String },

    #[error("Could not determine the version this project was scaffolded from")]
    #[diagnostic(
        code(scaffold_update::scaffold::missing_from_version),
        help("Pass --from <VERSION> explicitly")
    )]
    MissingFromVersion,

    #[error("Scaffold for version '{version}' is unavailable: {reason}")]
    #[diagnostic(
        code(scaffold_update::scaffold::unavailable),
        help("Check that the version exists and that the scaffold generator is configured")
    )]
    ScaffoldUnavailable { version: String, reason: String },

    #[error("No scaffold generator configured")]
    #[diagnostic(
        code(scaffold_update::scaffold::generator_not_configured),
        help(
            "Pass --templates <DIR>, set SCAFFOLD_UPDATE_TEMPLATES, or add a 'generator' section to scaffold-update.yaml"
        )
    )]
    GeneratorNotConfigured,

    // Version-control engine errors
    #[error("Merge engine failed while {stage}: {reason}")]
    #[diagnostic(
        code(scaffold_update::git::merge_engine_fault),
        help(
            "The repository may be corrupted. Any anchor commits created so far are unreferenced and will be garbage-collected by git."
        )
    )]
    MergeEngineFault { stage: MergeStage, reason: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(scaffold_update::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(scaffold_update::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read project manifest: {path}: {reason}")]
    #[diagnostic(code(scaffold_update::config::manifest_read_failed))]
    ManifestReadFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(scaffold_update::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(scaffold_update::fs::io_error))]
    IoError { message: String },
}

impl UpdateError {
    /// Whether this error was raised before the repository was touched.
    ///
    /// Only a [`UpdateError::MergeEngineFault`] past the preflight stage can
    /// occur after anchor creation has started.
    pub fn is_precondition(&self) -> bool {
        match self {
            UpdateError::MergeEngineFault { stage, .. } => *stage == MergeStage::Preflight,
            _ => true,
        }
    }
}

impl From<std::io::Error> for UpdateError {
    fn from(err: std::io::Error) -> Self {
        UpdateError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for UpdateError {
    fn from(err: serde_yaml::Error) -> Self {
        UpdateError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        UpdateError::ManifestReadFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, UpdateError>;
