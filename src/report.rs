//! Post-merge status report
//!
//! Every path the merge touched, every conflicted path, and every path that
//! now differs from the pre-merge commit is classified. Precedence:
//! conflicted, then deleted, then added, then modified. A path the upstream
//! delta changed counts as modified even when the user had already made the
//! same change; any other path whose content is unchanged is left out.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::error::{self, Result};
use crate::merge::MergeStage;
use crate::vcs::{MergeOutcome, VersionControl};

/// How a path ended up after the merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    Added,
    Modified,
    Deleted,
    Conflicted,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::Added => "Added",
            Classification::Modified => "Modified",
            Classification::Deleted => "Deleted",
            Classification::Conflicted => "Conflicted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub classification: Classification,
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:   {}", self.classification, self.path)
    }
}

/// Classified paths, sorted by path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    entries: Vec<StatusEntry>,
}

impl StatusReport {
    /// Build a report, sorting entries by path
    pub fn new(mut entries: Vec<StatusEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Classification of `path`, if it is in the report
    pub fn get(&self, path: &str) -> Option<Classification> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.classification)
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.entries
            .iter()
            .filter(|e| e.classification == classification)
            .count()
    }

    pub fn has_conflicts(&self) -> bool {
        self.count(Classification::Conflicted) > 0
    }

    /// Render as `"<classification>:   <path>"` lines
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Classify one path from its pre-merge and post-merge content
///
/// `touched` marks a path the merge changed or the upstream delta covered.
pub fn classify(
    conflicted: bool,
    touched: bool,
    before: Option<&[u8]>,
    after: Option<&[u8]>,
) -> Option<Classification> {
    if conflicted {
        return Some(Classification::Conflicted);
    }
    match (before, after) {
        (Some(_), None) => Some(Classification::Deleted),
        (None, Some(_)) => Some(Classification::Added),
        (Some(b), Some(a)) if touched || b != a => Some(Classification::Modified),
        _ => None,
    }
}

/// Classify every path affected by `outcome`
pub fn report(vcs: &dyn VersionControl, outcome: &MergeOutcome) -> Result<StatusReport> {
    let at = error::git::at(MergeStage::Report);

    let mut candidates: BTreeSet<String> = outcome
        .touched_paths
        .union(&outcome.conflicted_paths)
        .cloned()
        .collect();
    candidates.extend(vcs.changed_paths().map_err(&at)?);

    let mut entries = Vec::new();
    for path in candidates {
        let conflicted =
            outcome.conflicted_paths.contains(&path) || vcs.has_conflict_markers(&path).map_err(&at)?;
        let before = vcs.read_committed(&path).map_err(&at)?;
        let after = vcs.read_working(&path).map_err(&at)?;

        let touched = outcome.touched_paths.contains(&path);

        if let Some(classification) =
            classify(conflicted, touched, before.as_deref(), after.as_deref())
        {
            entries.push(StatusEntry {
                path,
                classification,
            });
        }
    }

    let report = StatusReport::new(entries);
    debug!(entries = report.len(), "status report");
    Ok(report)
}
