//! Merge orchestration between two scaffold versions
//!
//! The orchestrator stages two anchor commits (old scaffold, new scaffold)
//! and asks the version-control backend to merge the new anchor into the
//! current branch with the old anchor as merge base. The backend's native
//! three-way merge does all content reconciliation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut orchestrator = MergeOrchestrator::new(&repo);
//! let outcome = orchestrator.run(&range, &old_tree, &new_tree)?;
//!
//! if !outcome.cleanly_applied {
//!     // conflict markers are left in the working tree on purpose
//! }
//! ```
//!
//! Conflicts are a terminal state, not an error. Failures are backend
//! faults, reported as [`UpdateError::MergeEngineFault`] tagged with the
//! stage that failed, and untracked local files standing where the new
//! scaffold adds a file ([`UpdateError::WouldOverwriteUntracked`]). The
//! latter is detected before the merge writes anything. Anchors created
//! before a failure are unreferenced objects and need no cleanup.
//!
//! [`UpdateError::MergeEngineFault`]: crate::error::UpdateError::MergeEngineFault
//! [`UpdateError::WouldOverwriteUntracked`]: crate::error::UpdateError::WouldOverwriteUntracked

use std::fmt;

use tracing::{debug, info};

use crate::error::{self, Result};
use crate::scaffold::{ScaffoldTree, VersionRange};
use crate::vcs::{MergeOutcome, VersionControl};

/// Step of an update run that talks to version control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeStage {
    /// Checking working tree cleanliness
    Preflight,
    /// Writing the old scaffold anchor
    OldAnchor,
    /// Writing the new scaffold anchor
    NewAnchor,
    /// Running the three-way merge
    Merge,
    /// Reading the merged working tree for the report
    Report,
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MergeStage::Preflight => "checking the working tree",
            MergeStage::OldAnchor => "creating the old scaffold anchor",
            MergeStage::NewAnchor => "creating the new scaffold anchor",
            MergeStage::Merge => "merging",
            MergeStage::Report => "reading merge results",
        };
        f.write_str(label)
    }
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Start,
    OldAnchorCreated,
    NewAnchorCreated,
    Merging,
    Clean,
    Conflicted,
    Done,
}

/// Drives one merge from `Start` to `Done`
pub struct MergeOrchestrator<'a> {
    vcs: &'a dyn VersionControl,
    state: MergeState,
    /// Every state entered, in order
    history: Vec<MergeState>,
}

impl<'a> MergeOrchestrator<'a> {
    pub fn new(vcs: &'a dyn VersionControl) -> Self {
        Self {
            vcs,
            state: MergeState::Start,
            history: vec![MergeState::Start],
        }
    }

    /// Current state
    pub fn state(&self) -> MergeState {
        self.state
    }

    /// States entered so far, starting with `Start`
    pub fn history(&self) -> &[MergeState] {
        &self.history
    }

    fn transition(&mut self, next: MergeState) {
        debug!(from = ?self.state, to = ?next, "merge state");
        self.state = next;
        self.history.push(next);
    }

    /// Stage both anchors and merge
    ///
    /// Can only run once; a second call fails without touching the
    /// repository.
    pub fn run(
        &mut self,
        range: &VersionRange,
        old: &ScaffoldTree,
        new: &ScaffoldTree,
    ) -> Result<MergeOutcome> {
        if self.state != MergeState::Start {
            return Err(error::git::fault(
                MergeStage::OldAnchor,
                "merge orchestrator has already run",
            ));
        }

        let old_anchor = self
            .vcs
            .create_anchor(old, None, &format!("Scaffold {}", range.from()))
            .map_err(error::git::at(MergeStage::OldAnchor))?;
        debug!(anchor = %old_anchor, version = %range.from(), "old anchor");
        self.transition(MergeState::OldAnchorCreated);

        let new_anchor = self
            .vcs
            .create_anchor(new, Some(&old_anchor), &format!("Scaffold {}", range.to()))
            .map_err(error::git::at(MergeStage::NewAnchor))?;
        debug!(anchor = %new_anchor, version = %range.to(), "new anchor");
        self.transition(MergeState::NewAnchorCreated);

        let collisions = self
            .vcs
            .untracked_collisions(&old_anchor, &new_anchor)
            .map_err(error::git::at(MergeStage::Merge))?;
        if let Some(first) = collisions.first() {
            debug!(count = collisions.len(), first = %first, "merge would overwrite untracked files");
            return Err(error::precondition::would_overwrite_untracked(first.as_str()));
        }

        self.transition(MergeState::Merging);
        let outcome = self
            .vcs
            .merge_with_base(&old_anchor, &new_anchor)
            .map_err(error::git::at(MergeStage::Merge))?;

        if outcome.cleanly_applied {
            self.transition(MergeState::Clean);
        } else {
            self.transition(MergeState::Conflicted);
        }

        info!(
            touched = outcome.touched_paths.len(),
            conflicted = outcome.conflicted_paths.len(),
            "merged {range}"
        );
        self.transition(MergeState::Done);

        Ok(outcome)
    }
}
