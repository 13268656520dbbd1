//! In-memory [`VersionControl`] fake for unit tests
//!
//! Holds a committed snapshot and a working snapshot as plain maps. The
//! merge is whole-file: a path changed on one side only takes that side, a
//! path changed differently on both sides gets conflict markers around the
//! two full versions.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use super::{AnchorId, MergeOutcome, VcsError, VcsResult, VersionControl};
use crate::scaffold::ScaffoldTree;

type Files = BTreeMap<String, Vec<u8>>;

/// Operation the fake should fail on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    DirtyPaths,
    /// The nth anchor created, counting from 1
    Anchor(usize),
    Collisions,
    Merge,
    ChangedPaths,
}

#[derive(Debug, Clone)]
pub struct StoredAnchor {
    pub files: Files,
    pub parent: Option<AnchorId>,
    pub message: String,
}

#[derive(Default)]
struct State {
    head: Files,
    working: Files,
    /// Working paths hidden from status, like git-ignored files
    ignored: BTreeSet<String>,
    anchors: Vec<StoredAnchor>,
    failure: Option<Failure>,
    calls: Vec<&'static str>,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RefCell<State>,
}

impl MemoryRepository {
    /// Repository whose last commit and working tree both hold `files`
    pub fn new(files: &[(&str, &str)]) -> Self {
        let head: Files = files
            .iter()
            .map(|(p, c)| ((*p).to_string(), c.as_bytes().to_vec()))
            .collect();
        let state = State {
            working: head.clone(),
            head,
            ..State::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn fail_on(self, failure: Failure) -> Self {
        self.state.borrow_mut().failure = Some(failure);
        self
    }

    /// Change a working file without committing it
    pub fn write_working(&self, path: &str, content: &str) {
        self.state
            .borrow_mut()
            .working
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    /// Create a working file that status does not report
    pub fn write_ignored(&self, path: &str, content: &str) {
        let mut state = self.state.borrow_mut();
        state.ignored.insert(path.to_string());
        state
            .working
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    pub fn working_file(&self, path: &str) -> Option<String> {
        self.state
            .borrow()
            .working
            .get(path)
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    pub fn working_snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.state.borrow().working.clone()
    }

    pub fn anchors(&self) -> Vec<StoredAnchor> {
        self.state.borrow().anchors.clone()
    }

    /// Names of trait methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    fn enter(&self, call: &'static str, failure: Failure) -> VcsResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if state.failure == Some(failure) {
            return Err(VcsError(format!("injected failure in {call}")));
        }
        Ok(())
    }

    fn changed_paths_unchecked(&self) -> BTreeSet<String> {
        let state = self.state.borrow();
        state
            .head
            .keys()
            .chain(state.working.keys())
            .filter(|p| !state.ignored.contains(*p))
            .filter(|p| state.head.get(*p) != state.working.get(*p))
            .cloned()
            .collect()
    }

    fn anchor_files(&self, id: &AnchorId) -> VcsResult<Files> {
        let index: usize = id
            .as_str()
            .parse()
            .map_err(|_| VcsError(format!("bad anchor id {id}")))?;
        self.state
            .borrow()
            .anchors
            .get(index)
            .map(|a| a.files.clone())
            .ok_or_else(|| VcsError(format!("unknown anchor {id}")))
    }
}

fn markers(ours: Option<&Vec<u8>>, theirs: Option<&Vec<u8>>) -> Vec<u8> {
    fn push_side(out: &mut Vec<u8>, side: Option<&Vec<u8>>) {
        if let Some(content) = side {
            out.extend_from_slice(content);
            if !content.is_empty() && !content.ends_with(b"\n") {
                out.push(b'\n');
            }
        }
    }

    let mut out = b"<<<<<<< ours\n".to_vec();
    push_side(&mut out, ours);
    out.extend_from_slice(b"=======\n");
    push_side(&mut out, theirs);
    out.extend_from_slice(b">>>>>>> theirs\n");
    out
}

impl VersionControl for MemoryRepository {
    fn dirty_paths(&self) -> VcsResult<Vec<String>> {
        self.enter("dirty_paths", Failure::DirtyPaths)?;
        Ok(self.changed_paths_unchecked().into_iter().collect())
    }

    fn create_anchor(
        &self,
        tree: &ScaffoldTree,
        parent: Option<&AnchorId>,
        message: &str,
    ) -> VcsResult<AnchorId> {
        let number = self.state.borrow().anchors.len() + 1;
        self.enter("create_anchor", Failure::Anchor(number))?;

        let files = tree
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_vec()))
            .collect();
        let mut state = self.state.borrow_mut();
        state.anchors.push(StoredAnchor {
            files,
            parent: parent.cloned(),
            message: message.to_string(),
        });
        Ok(AnchorId::new((state.anchors.len() - 1).to_string()))
    }

    fn untracked_collisions(
        &self,
        base: &AnchorId,
        theirs: &AnchorId,
    ) -> VcsResult<Vec<String>> {
        self.enter("untracked_collisions", Failure::Collisions)?;
        let base = self.anchor_files(base)?;
        let theirs = self.anchor_files(theirs)?;

        let state = self.state.borrow();
        Ok(theirs
            .iter()
            .filter(|(path, content)| base.get(*path) != Some(*content))
            .filter(|(path, _)| !state.head.contains_key(*path))
            .filter(|(path, _)| state.working.contains_key(*path))
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn merge_with_base(&self, base: &AnchorId, theirs: &AnchorId) -> VcsResult<MergeOutcome> {
        self.enter("merge_with_base", Failure::Merge)?;
        let base = self.anchor_files(base)?;
        let theirs = self.anchor_files(theirs)?;

        let mut state = self.state.borrow_mut();
        let ours = state.head.clone();
        let paths: BTreeSet<&String> = base.keys().chain(ours.keys()).chain(theirs.keys()).collect();

        let mut touched = BTreeSet::new();
        let mut conflicted = BTreeSet::new();

        for path in paths {
            let (b, o, t) = (base.get(path), ours.get(path), theirs.get(path));
            if t == b {
                continue;
            }
            if o == t {
                touched.insert(path.clone());
            } else if o == b {
                match t {
                    Some(content) => state.working.insert(path.clone(), content.clone()),
                    None => state.working.remove(path),
                };
                touched.insert(path.clone());
            } else {
                state.working.insert(path.clone(), markers(o, t));
                conflicted.insert(path.clone());
            }
        }

        Ok(MergeOutcome::new(touched, conflicted))
    }

    fn changed_paths(&self) -> VcsResult<BTreeSet<String>> {
        self.enter("changed_paths", Failure::ChangedPaths)?;
        Ok(self.changed_paths_unchecked())
    }

    fn has_conflict_markers(&self, path: &str) -> VcsResult<bool> {
        Ok(self
            .state
            .borrow()
            .working
            .get(path)
            .is_some_and(|c| super::contains_conflict_markers(c)))
    }

    fn read_committed(&self, path: &str) -> VcsResult<Option<Vec<u8>>> {
        Ok(self.state.borrow().head.get(path).cloned())
    }

    fn read_working(&self, path: &str) -> VcsResult<Option<Vec<u8>>> {
        Ok(self.state.borrow().working.get(path).cloned())
    }
}
