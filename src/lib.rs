//! scaffold-update - upgrade a scaffolded project to a newer template version
//!
//! The old and new scaffold versions are materialized, committed as two
//! out-of-band anchor commits, and the new anchor is merged into the
//! current branch with the old anchor as merge base. git's own three-way
//! merge keeps every local customization and leaves conflict markers where
//! both sides changed the same lines.

pub mod cli;
pub mod commands;
pub mod config;
pub mod delta;
pub mod error;
pub mod hash;
pub mod logging;
pub mod manifest;
pub mod merge;
pub mod precondition;
pub mod progress;
pub mod report;
pub mod scaffold;
pub mod temp;
pub mod update;
pub mod vcs;

#[cfg(test)]
mod test_fixtures;

pub use config::UpdateConfig;
pub use error::{Result, UpdateError};
pub use report::{Classification, StatusReport};
pub use update::{UpdateOutcome, run_update};
