//! Version-control engine errors

use super::UpdateError;
use crate::merge::MergeStage;

/// Creates a merge engine fault for the given stage
pub fn fault(stage: MergeStage, reason: impl Into<String>) -> UpdateError {
    UpdateError::MergeEngineFault {
        stage,
        reason: reason.into(),
    }
}

/// Returns a closure mapping a backend error to a fault at `stage`
///
/// ```rust,ignore
/// vcs.merge_with_base(&old, &new).map_err(error::git::at(MergeStage::Merge))?;
/// ```
pub fn at<E: std::fmt::Display>(stage: MergeStage) -> impl Fn(E) -> UpdateError {
    move |err| fault(stage, err.to_string())
}
