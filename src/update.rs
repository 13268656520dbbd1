//! The update pipeline
//!
//! Strictly sequential, each step short-circuiting on the first failure:
//!
//! 1. precondition gate (clean tree, scaffolded project)
//! 2. version range resolution (`--from` or the manifest)
//! 3. materialize the old and new scaffold
//! 4. delta between the two
//! 5. anchors and merge
//! 6. status report
//!
//! Nothing is written to the repository before step 5, so every failure in
//! steps 1 to 4 leaves the project exactly as it was.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::UpdateConfig;
use crate::delta::{self, Delta, DiffKind};
use crate::error::{Result, UpdateError};
use crate::manifest::{ManifestInspector, PackageJsonInspector};
use crate::merge::MergeOrchestrator;
use crate::precondition;
use crate::progress::ProgressReporter;
use crate::report::{self, StatusReport};
use crate::scaffold::{self, ScaffoldGenerator, VersionRange};
use crate::vcs::{GitRepository, VersionControl};

/// External collaborators the pipeline runs against
pub struct Collaborators<'a> {
    pub vcs: &'a dyn VersionControl,
    pub inspector: &'a dyn ManifestInspector,
    pub generator: &'a dyn ScaffoldGenerator,
}

/// What an update run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// `--dry-run`: the delta was computed, nothing was written
    DryRun { range: VersionRange, delta: Delta },
    /// Both versions produce identical scaffolds, nothing was written
    NoChanges { range: VersionRange },
    /// The merge ran; conflicts, if any, are in the report
    Applied {
        range: VersionRange,
        delta: Delta,
        report: StatusReport,
    },
}

impl UpdateOutcome {
    pub fn range(&self) -> &VersionRange {
        match self {
            UpdateOutcome::DryRun { range, .. }
            | UpdateOutcome::NoChanges { range }
            | UpdateOutcome::Applied { range, .. } => range,
        }
    }

    /// Status report, present only when the merge ran
    pub fn report(&self) -> Option<&StatusReport> {
        match self {
            UpdateOutcome::Applied { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Run an update against the git repository containing the project
pub fn run_update(
    config: &UpdateConfig,
    progress: &mut dyn ProgressReporter,
) -> Result<UpdateOutcome> {
    let generator = config
        .generator()
        .ok_or(UpdateError::GeneratorNotConfigured)?
        .build();
    let repo = GitRepository::discover(config.project_root())?;
    let inspector = PackageJsonInspector::new(config.marker(), config.manifest());

    let collaborators = Collaborators {
        vcs: &repo,
        inspector: &inspector,
        generator: generator.as_ref(),
    };
    run_update_with(config, &collaborators, progress)
}

/// Run an update against explicit collaborators
pub fn run_update_with(
    config: &UpdateConfig,
    collaborators: &Collaborators<'_>,
    progress: &mut dyn ProgressReporter,
) -> Result<UpdateOutcome> {
    let result = pipeline(config, collaborators, progress);
    match &result {
        Ok(_) => progress.finish(),
        Err(_) => progress.abandon(),
    }
    result
}

fn pipeline(
    config: &UpdateConfig,
    c: &Collaborators<'_>,
    progress: &mut dyn ProgressReporter,
) -> Result<UpdateOutcome> {
    progress.stage("Checking working tree");
    precondition::check(c.vcs, c.inspector, config.project_root())?;

    let range = resolve_range(config, c.inspector)?;
    info!(%range, "updating scaffold");

    progress.stage(&format!("Generating scaffold {}", range.from()));
    let old = scaffold::materialize(c.generator, range.from())?;
    progress.stage(&format!("Generating scaffold {}", range.to()));
    let new = scaffold::materialize(c.generator, range.to())?;

    let delta = delta::diff(&old, &new);
    debug!(
        added = delta.count(DiffKind::Added),
        removed = delta.count(DiffKind::Removed),
        changed = delta.count(DiffKind::Changed),
        "scaffold delta"
    );

    if config.dry_run() {
        return Ok(UpdateOutcome::DryRun { range, delta });
    }
    if delta.is_empty() {
        warn!(%range, "scaffolds are identical, nothing to merge");
        return Ok(UpdateOutcome::NoChanges { range });
    }

    progress.stage("Merging");
    let outcome = MergeOrchestrator::new(c.vcs).run(&range, &old, &new)?;

    progress.stage("Collecting status");
    let report = report::report(c.vcs, &outcome)?;

    Ok(UpdateOutcome::Applied {
        range,
        delta,
        report,
    })
}

/// Pair the configured or detected start version with the target
fn resolve_range(config: &UpdateConfig, inspector: &dyn ManifestInspector) -> Result<VersionRange> {
    let from = match config.from() {
        Some(from) => from.clone(),
        None => detect_from(inspector, config.project_root())?,
    };
    VersionRange::new(from, config.to().clone())
}

fn detect_from(inspector: &dyn ManifestInspector, root: &Path) -> Result<scaffold::VersionId> {
    let version = inspector
        .scaffold_version(root)?
        .ok_or(UpdateError::MissingFromVersion)?;
    debug!(%version, "detected start version from manifest");
    Ok(version)
}
