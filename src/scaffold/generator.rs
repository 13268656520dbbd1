//! Scaffold generator collaborators
//!
//! A generator turns a version identifier into files on disk. The engine
//! relies on generators being deterministic: the same version must always
//! produce the same tree.
//!
//! Two implementations are provided:
//! - [`TemplateDirGenerator`] copies a pre-rendered tree from
//!   `<root>/<version>/`
//! - [`CommandGenerator`] runs an external program with `{version}` and
//!   `{output}` substituted into its arguments

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use super::VersionId;

/// Exit code a generator command uses to signal an unknown version
pub const UNKNOWN_VERSION_EXIT_CODE: i32 = 2;

/// Errors reported by a generator
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("unknown scaffold version")]
    UnknownVersion,

    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

/// Produces the scaffold output for a version
pub trait ScaffoldGenerator {
    /// Write the complete scaffold for `version` into `output_dir`
    ///
    /// `output_dir` does not exist yet; its parent does.
    fn materialize(&self, version: &VersionId, output_dir: &Path) -> Result<(), GeneratorError>;
}

/// Serves scaffolds from a directory holding one subdirectory per version
#[derive(Debug, Clone)]
pub struct TemplateDirGenerator {
    root: PathBuf,
}

impl TemplateDirGenerator {
    /// Create a generator reading from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the given version's scaffold
    pub fn version_dir(&self, version: &VersionId) -> PathBuf {
        self.root.join(version.as_str())
    }
}

impl ScaffoldGenerator for TemplateDirGenerator {
    fn materialize(&self, version: &VersionId, output_dir: &Path) -> Result<(), GeneratorError> {
        let source = self.version_dir(version);
        if !source.is_dir() {
            return Err(GeneratorError::UnknownVersion);
        }

        debug!(source = %source.display(), "copying scaffold template");
        copy_tree(&source, output_dir)
    }
}

/// Recursively copy `src` into `dst`, skipping `.git`
fn copy_tree(src: &Path, dst: &Path) -> Result<(), GeneratorError> {
    let failed = |e: &dyn std::fmt::Display| GeneratorError::GenerationFailed(e.to_string());

    std::fs::create_dir_all(dst).map_err(|e| failed(&e))?;

    let walker = WalkDir::new(src)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| failed(&e))?;
        let relative = entry.path().strip_prefix(src).map_err(|e| failed(&e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| failed(&e))?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target).map_err(|e| {
                GeneratorError::GenerationFailed(format!(
                    "Failed to copy {} to {}: {}",
                    entry.path().display(),
                    target.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

/// Runs an external scaffold generator
///
/// Arguments may contain `{version}` and `{output}` placeholders. The
/// program is expected to create the output directory itself and to exit
/// with [`UNKNOWN_VERSION_EXIT_CODE`] when the version does not exist.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Create a generator running `program` with `args`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments with placeholders substituted
    pub fn render_args(&self, version: &VersionId, output_dir: &Path) -> Vec<String> {
        let output = output_dir.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{version}", version.as_str())
                    .replace("{output}", &output)
            })
            .collect()
    }
}

impl ScaffoldGenerator for CommandGenerator {
    fn materialize(&self, version: &VersionId, output_dir: &Path) -> Result<(), GeneratorError> {
        let args = self.render_args(version, output_dir);
        debug!(program = %self.program, ?args, "running scaffold generator");

        // Run beside the output directory so relative paths stay out of the project
        let mut command = Command::new(&self.program);
        command.args(&args);
        if let Some(parent) = output_dir.parent() {
            command.current_dir(parent);
        }

        let output = command
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => GeneratorError::GenerationFailed(format!(
                    "generator program '{}' not found",
                    self.program
                )),
                _ => GeneratorError::GenerationFailed(e.to_string()),
            })?;

        if output.status.success() {
            return Ok(());
        }

        if output.status.code() == Some(UNKNOWN_VERSION_EXIT_CODE) {
            return Err(GeneratorError::UnknownVersion);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("'{}' exited with {}", self.program, output.status),
            message => message.to_string(),
        };
        Err(GeneratorError::GenerationFailed(reason))
    }
}
