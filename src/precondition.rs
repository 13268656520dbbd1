//! Gates that must pass before anything is written
//!
//! Read-only. The cleanliness check runs first: it is the only thing
//! standing between the merge and uncommitted user work.

use std::path::Path;

use tracing::debug;

use crate::error::{self, Result};
use crate::manifest::ManifestInspector;
use crate::merge::MergeStage;
use crate::vcs::VersionControl;

/// Verify the repository is clean and the project is scaffolded
pub fn check(
    vcs: &dyn VersionControl,
    inspector: &dyn ManifestInspector,
    project_root: &Path,
) -> Result<()> {
    let dirty = vcs
        .dirty_paths()
        .map_err(error::git::at(MergeStage::Preflight))?;
    if let Some(first) = dirty.first() {
        debug!(count = dirty.len(), first = %first, "working tree is dirty");
        return Err(error::precondition::dirty_working_tree(first.as_str()));
    }

    if !inspector.is_scaffolded_project(project_root)? {
        return Err(error::precondition::not_scaffolded(
            inspector.marker(),
            inspector.manifest_name(),
        ));
    }

    Ok(())
}
