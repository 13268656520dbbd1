//! Scaffold snapshots and the materializer adapter
//!
//! A [`ScaffoldTree`] is the complete output of a scaffold generator for one
//! [`VersionId`], held in memory as a path-sorted map of file contents. Trees
//! exist only for the duration of one update run.
//!
//! Materialization is delegated to a [`ScaffoldGenerator`] collaborator that
//! writes into a throwaway directory; the adapter then reads that directory
//! back into a tree. Generator failures of any kind surface as
//! [`UpdateError::ScaffoldUnavailable`].

pub mod generator;

pub use generator::{CommandGenerator, GeneratorError, ScaffoldGenerator, TemplateDirGenerator};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{self, Result, UpdateError};
use crate::hash;

/// Identifier of a published scaffold version, e.g. `2.14.1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(String);

impl VersionId {
    /// Parse and validate a version identifier
    ///
    /// Identifiers are opaque to the engine, but they end up in directory
    /// names and command lines, so separators and whitespace are rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(error::scaffold::invalid_version(input, "version is empty"));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(error::scaffold::invalid_version(
                input,
                "version cannot be a relative path",
            ));
        }
        if trimmed.contains(['/', '\\']) {
            return Err(error::scaffold::invalid_version(
                input,
                "version cannot contain path separators",
            ));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(error::scaffold::invalid_version(
                input,
                "version cannot contain whitespace",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The identifier as written
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionId {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The pair of versions one run updates between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    from: VersionId,
    to: VersionId,
}

impl VersionRange {
    /// Create a range, rejecting a no-op update
    pub fn new(from: VersionId, to: VersionId) -> Result<Self> {
        if from == to {
            return Err(error::scaffold::invalid_version(
                to.as_str(),
                format!("project is already at version {from}, nothing to update"),
            ));
        }
        Ok(Self { from, to })
    }

    /// Version the project was last scaffolded or updated to
    pub fn from(&self) -> &VersionId {
        &self.from
    }

    /// Version to update to
    pub fn to(&self) -> &VersionId {
        &self.to
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Full output of one scaffold version: relative path to file content
///
/// Paths always use `/` as separator regardless of platform. Executable
/// files are tracked separately so anchors can carry their mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldTree {
    files: BTreeMap<String, Vec<u8>>,
    executable: BTreeSet<String>,
}

impl ScaffoldTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Mark a file as executable
    pub fn set_executable(&mut self, path: impl Into<String>) {
        self.executable.insert(path.into());
    }

    /// Whether `path` is an executable file
    pub fn is_executable(&self, path: &str) -> bool {
        self.executable.contains(path)
    }

    /// Content of a file, if present
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Whether the tree holds `path`
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Iterate over `(path, content)` sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_slice()))
    }

    /// Iterate over paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// BLAKE3 fingerprint over every path and its content
    pub fn fingerprint(&self) -> String {
        hash::hash_entries(self.iter())
    }

    /// Read every regular file under `root` into a tree
    ///
    /// `.git` directories are skipped: a generator that initializes a
    /// repository in its output must not leak that repository into anchors.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut tree = Self::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != ".git");

        for entry in walker {
            let entry = entry.map_err(|e| error::fs::io_error(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| error::fs::io_error(e.to_string()))?;
            let Some(key) = to_tree_path(relative) else {
                continue;
            };

            let content = std::fs::read(entry.path())
                .map_err(|e| error::fs::read_failed(entry.path().display().to_string(), e.to_string()))?;
            if is_executable(&entry)? {
                tree.set_executable(key.clone());
            }
            tree.insert(key, content);
        }

        Ok(tree)
    }
}

impl FromIterator<(String, Vec<u8>)> for ScaffoldTree {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
            executable: BTreeSet::new(),
        }
    }
}

#[cfg(unix)]
fn is_executable(entry: &walkdir::DirEntry) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = entry
        .metadata()
        .map_err(|e| error::fs::io_error(e.to_string()))?;
    Ok(metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(_entry: &walkdir::DirEntry) -> Result<bool> {
    Ok(false)
}

/// Convert a relative filesystem path to a `/`-separated tree key
fn to_tree_path(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Materialize the scaffold output for `version`
///
/// The generator writes into a temporary directory that is removed when
/// this function returns. An empty result is treated as a failed
/// generation: no published scaffold version is empty.
pub fn materialize(generator: &dyn ScaffoldGenerator, version: &VersionId) -> Result<ScaffoldTree> {
    let temp = crate::temp::scratch_dir(version.as_str())
        .map_err(|e| error::scaffold::unavailable(version.as_str(), e.to_string()))?;
    let output_dir = temp.path().join("scaffold");

    debug!(%version, output = %output_dir.display(), "materializing scaffold");

    generator
        .materialize(version, &output_dir)
        .map_err(|e| error::scaffold::unavailable(version.as_str(), e.to_string()))?;

    if !output_dir.is_dir() {
        return Err(error::scaffold::unavailable(
            version.as_str(),
            "generator did not produce an output directory",
        ));
    }

    let tree = ScaffoldTree::from_dir(&output_dir)
        .map_err(|e| error::scaffold::unavailable(version.as_str(), e.to_string()))?;

    if tree.is_empty() {
        return Err(error::scaffold::unavailable(
            version.as_str(),
            "generator produced no files",
        ));
    }

    debug!(
        %version,
        files = tree.len(),
        fingerprint = %tree.fingerprint(),
        "materialized scaffold"
    );

    Ok(tree)
}
