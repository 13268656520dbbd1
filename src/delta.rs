//! Delta synthesis between two scaffold trees
//!
//! The delta is never applied to the user's files directly: the three-way
//! merge does that. It validates that the two materialized versions differ,
//! drives dry-run output, and is logged for diagnosis.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::scaffold::ScaffoldTree;

/// How a path differs between the old and new scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Absent in old, present in new
    Added,
    /// Present in old, absent in new
    Removed,
    /// Present in both with differing content or executable bit
    Changed,
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiffKind::Added => "Added",
            DiffKind::Removed => "Removed",
            DiffKind::Changed => "Changed",
        };
        f.write_str(label)
    }
}

/// One differing path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: String,
    pub kind: DiffKind,
    pub old_content: Option<Vec<u8>>,
    pub new_content: Option<Vec<u8>>,
}

/// Per-path differences between two scaffold trees, keyed by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    entries: BTreeMap<String, DiffEntry>,
}

impl Delta {
    /// Look up the entry for a path
    pub fn get(&self, path: &str) -> Option<&DiffEntry> {
        self.entries.get(path)
    }

    /// Entries sorted by path
    pub fn entries(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.values()
    }

    /// Number of differing paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether both trees were identical
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries of one kind
    pub fn count(&self, kind: DiffKind) -> usize {
        self.entries.values().filter(|e| e.kind == kind).count()
    }

    /// Render as `"<kind>:   <path>"` lines
    pub fn render_lines(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|e| format!("{}:   {}", e.kind, e.path))
            .collect()
    }
}

/// Compute the delta from `old` to `new`
///
/// Paths identical in both trees are omitted.
pub fn diff(old: &ScaffoldTree, new: &ScaffoldTree) -> Delta {
    let paths: BTreeSet<&str> = old.paths().chain(new.paths()).collect();

    let entries = paths
        .into_iter()
        .filter_map(|path| {
            let kind = match (old.get(path), new.get(path)) {
                (None, Some(_)) => DiffKind::Added,
                (Some(_), None) => DiffKind::Removed,
                (Some(a), Some(b)) if a != b || old.is_executable(path) != new.is_executable(path) => {
                    DiffKind::Changed
                }
                _ => return None,
            };
            let entry = DiffEntry {
                path: path.to_string(),
                kind,
                old_content: old.get(path).map(<[u8]>::to_vec),
                new_content: new.get(path).map(<[u8]>::to_vec),
            };
            Some((path.to_string(), entry))
        })
        .collect();

    Delta { entries }
}
