//! Command implementations for the scaffold-update CLI

pub mod completions;
pub mod update;
pub mod version;
