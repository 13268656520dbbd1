//! libgit2-backed implementation of [`VersionControl`]
//!
//! Anchors are written straight into the object database through an
//! in-memory index, so creating them never touches the user's checkout,
//! index, or refs. The merge uses `merge_trees` with the old anchor as the
//! ancestor, then checks the merged index out over the working tree with
//! conflicts allowed, which is what leaves conflict markers in files.
//!
//! The result is staged but not committed: there is no merge commit and no
//! `MERGE_HEAD`. Anchor commits stay unreferenced and are eventually
//! collected by `git gc`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{
    ErrorCode, Index, IndexConflict, IndexEntry, IndexTime, MergeOptions, ObjectType, Oid,
    Repository, Signature, StatusOptions, Tree, TreeWalkMode, TreeWalkResult,
};
use normpath::PathExt;
use tracing::debug;

use super::{AnchorId, MergeOutcome, VcsError, VcsResult, VersionControl};
use crate::error::{self, Result};
use crate::scaffold::ScaffoldTree;

/// Author used for anchor commits when git has no identity configured
pub const ANCHOR_AUTHOR: &str = "scaffold-update";
/// Email used for anchor commits when git has no identity configured
pub const ANCHOR_EMAIL: &str = "scaffold-update@localhost";

const BLOB_MODE: u32 = 0o100_644;
const EXECUTABLE_MODE: u32 = 0o100_755;
const STAGE_MASK: u16 = 0x3000;
const STAGE_SHIFT: u16 = 12;

/// A git repository with a project rooted somewhere inside its working tree
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
    project_root: PathBuf,
    /// Project root relative to the working tree, `/`-separated, empty at root
    prefix: String,
}

impl GitRepository {
    /// Open the repository containing `project_root`
    pub fn discover(project_root: &Path) -> Result<Self> {
        let not_in_repo = || error::precondition::not_in_repo(project_root.display().to_string());

        let repo = Repository::discover(project_root).map_err(|_| not_in_repo())?;
        let workdir = repo.workdir().map(normalized).ok_or_else(not_in_repo)?;
        let project = normalized(project_root);

        let relative = project.strip_prefix(&workdir).map_err(|_| not_in_repo())?;
        let prefix = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        debug!(
            workdir = %workdir.display(),
            prefix = %prefix,
            "opened repository"
        );

        Ok(Self {
            repo,
            workdir,
            project_root: project,
            prefix,
        })
    }

    /// Root of the scaffolded project
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Project location relative to the working tree, empty at the root
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn to_repo_path(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }

    fn to_project_path(&self, repo_path: &str) -> Option<String> {
        if self.prefix.is_empty() {
            return Some(repo_path.to_string());
        }
        repo_path
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }

    fn signature(&self) -> VcsResult<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now(ANCHOR_AUTHOR, ANCHOR_EMAIL)?),
        }
    }

    fn head_tree(&self) -> VcsResult<Tree<'_>> {
        let head = self.repo.head().map_err(|e| match e.code() {
            ErrorCode::UnbornBranch => VcsError("repository has no commits".to_string()),
            _ => VcsError::from(e),
        })?;
        Ok(head.peel_to_commit()?.tree()?)
    }

    fn anchor_tree(&self, anchor: &AnchorId) -> VcsResult<Tree<'_>> {
        let oid = Oid::from_str(anchor.as_str())?;
        Ok(self.repo.find_commit(oid)?.tree()?)
    }

    /// Blob ids and modes of every file in `tree`, keyed by repository path
    fn blobs(tree: &Tree<'_>) -> VcsResult<BTreeMap<String, (Oid, u32)>> {
        let mut blobs = BTreeMap::new();
        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                let name = entry.name().unwrap_or_default();
                #[allow(clippy::cast_sign_loss)]
                let mode = entry.filemode() as u32;
                blobs.insert(format!("{root}{name}"), (entry.id(), mode));
            }
            TreeWalkResult::Ok
        })?;
        Ok(blobs)
    }

    /// Replace the repository index with the merge result, conflicts included
    fn stage_merge_result(&self, merged: &Index) -> VcsResult<()> {
        let mut index = self.repo.index()?;
        index.clear()?;
        for entry in merged.iter() {
            index.add(&entry)?;
        }
        index.write()?;
        Ok(())
    }
}

impl VersionControl for GitRepository {
    fn dirty_paths(&self) -> VcsResult<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn create_anchor(
        &self,
        tree: &ScaffoldTree,
        parent: Option<&AnchorId>,
        message: &str,
    ) -> VcsResult<AnchorId> {
        let mut index = Index::new()?;

        for (path, content) in tree.iter() {
            let blob = self.repo.blob(content)?;
            let file_size = u32::try_from(content.len()).unwrap_or(u32::MAX);
            index.add(&IndexEntry {
                ctime: IndexTime::new(0, 0),
                mtime: IndexTime::new(0, 0),
                dev: 0,
                ino: 0,
                mode: if tree.is_executable(path) {
                    EXECUTABLE_MODE
                } else {
                    BLOB_MODE
                },
                uid: 0,
                gid: 0,
                file_size,
                id: blob,
                flags: 0,
                flags_extended: 0,
                path: self.to_repo_path(path).into_bytes(),
            })?;
        }

        let tree_oid = index.write_tree_to(&self.repo)?;
        let git_tree = self.repo.find_tree(tree_oid)?;
        let sig = self.signature()?;

        let parent_commit = match parent {
            Some(anchor) => Some(self.repo.find_commit(Oid::from_str(anchor.as_str())?)?),
            None => None,
        };
        let parents: Vec<_> = parent_commit.iter().collect();

        // No ref is updated: the commit is only reachable through its id
        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &git_tree, &parents)?;

        debug!(anchor = %oid, files = tree.len(), "created anchor commit");
        Ok(AnchorId::new(oid.to_string()))
    }

    fn untracked_collisions(
        &self,
        base: &AnchorId,
        theirs: &AnchorId,
    ) -> VcsResult<Vec<String>> {
        let base_blobs = Self::blobs(&self.anchor_tree(base)?)?;
        let their_blobs = Self::blobs(&self.anchor_tree(theirs)?)?;
        let ours = Self::blobs(&self.head_tree()?)?;

        let collisions: Vec<String> = their_blobs
            .iter()
            .filter(|(path, blob)| base_blobs.get(*path) != Some(*blob))
            .filter(|(path, _)| !ours.contains_key(*path))
            .filter(|(path, _)| self.workdir.join(path).symlink_metadata().is_ok())
            .filter_map(|(path, _)| self.to_project_path(path))
            .collect();

        if !collisions.is_empty() {
            debug!(count = collisions.len(), "untracked files in the way of the merge");
        }
        Ok(collisions)
    }

    fn merge_with_base(&self, base: &AnchorId, theirs: &AnchorId) -> VcsResult<MergeOutcome> {
        let base_tree = self.anchor_tree(base)?;
        let their_tree = self.anchor_tree(theirs)?;
        let our_tree = self.head_tree()?;

        let opts = MergeOptions::new();
        let mut merged = self
            .repo
            .merge_trees(&base_tree, &our_tree, &their_tree, Some(&opts))?;

        let mut conflicted = BTreeSet::new();
        for conflict in merged.conflicts()? {
            if let Some(path) = conflict_path(&conflict?) {
                conflicted.insert(path);
            }
        }

        let mut checkout = CheckoutBuilder::new();
        checkout
            .force()
            .allow_conflicts(true)
            .conflict_style_merge(true);
        self.repo
            .checkout_index(Some(&mut merged), Some(&mut checkout))?;
        self.stage_merge_result(&merged)?;

        let base_blobs = Self::blobs(&base_tree)?;
        let their_blobs = Self::blobs(&their_tree)?;
        let ours = Self::blobs(&our_tree)?;
        let mut resolved = BTreeMap::new();
        for entry in merged.iter() {
            if entry_stage(&entry) == 0 {
                let path = String::from_utf8_lossy(&entry.path).into_owned();
                resolved.insert(path, (entry.id, entry.mode));
            }
        }

        let mut touched = BTreeSet::new();
        for (path, blob) in &resolved {
            if ours.get(path) != Some(blob) {
                touched.insert(path.clone());
            }
        }
        for path in ours.keys() {
            if !resolved.contains_key(path) && !conflicted.contains(path) {
                touched.insert(path.clone());
            }
        }
        // Upstream changes the user had already made leave the result equal
        // to HEAD but still count as touched
        for path in base_blobs.keys().chain(their_blobs.keys()) {
            if base_blobs.get(path) != their_blobs.get(path) && !conflicted.contains(path) {
                touched.insert(path.clone());
            }
        }

        let touched: BTreeSet<String> = touched
            .iter()
            .filter_map(|p| self.to_project_path(p))
            .collect();
        let conflicted: BTreeSet<String> = conflicted
            .iter()
            .filter_map(|p| self.to_project_path(p))
            .collect();

        debug!(
            touched = touched.len(),
            conflicted = conflicted.len(),
            "merge applied to working tree"
        );
        Ok(MergeOutcome::new(touched, conflicted))
    }

    fn changed_paths(&self) -> VcsResult<BTreeSet<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        if !self.prefix.is_empty() {
            opts.pathspec(self.prefix.as_str());
        }

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| entry.path().and_then(|p| self.to_project_path(p)))
            .collect())
    }

    fn has_conflict_markers(&self, path: &str) -> VcsResult<bool> {
        Ok(self
            .read_working(path)?
            .is_some_and(|content| super::contains_conflict_markers(&content)))
    }

    fn read_committed(&self, path: &str) -> VcsResult<Option<Vec<u8>>> {
        let tree = self.head_tree()?;
        let entry = match tree.get_path(Path::new(&self.to_repo_path(path))) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some(blob.content().to_vec()))
    }

    fn read_working(&self, path: &str) -> VcsResult<Option<Vec<u8>>> {
        let full_path = self.project_root.join(path);
        if !full_path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&full_path)?))
    }
}

fn normalized(path: &Path) -> PathBuf {
    path.normalize()
        .map(|np| np.into_path_buf())
        .unwrap_or_else(|_| path.to_path_buf())
}

fn entry_stage(entry: &IndexEntry) -> u16 {
    (entry.flags & STAGE_MASK) >> STAGE_SHIFT
}

fn conflict_path(conflict: &IndexConflict) -> Option<String> {
    conflict
        .our
        .as_ref()
        .or(conflict.their.as_ref())
        .or(conflict.ancestor.as_ref())
        .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
}
