//! Scratch directories for scaffold materialization
//!
//! Scaffolds are generated outside the project so a generator can never
//! write into the user's working tree, even when TMPDIR is relative.

use std::env;
use std::io;
use std::path::PathBuf;

use tempfile::{Builder, TempDir};

/// Prefix for every scratch directory this crate creates
pub const SCRATCH_PREFIX: &str = "scaffold-update-";

/// Returns an absolute directory suitable for creating temporary directories.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Create a named scratch directory, removed on drop
pub fn scratch_dir(label: &str) -> io::Result<TempDir> {
    Builder::new()
        .prefix(&format!("{SCRATCH_PREFIX}{label}-"))
        .tempdir_in(temp_dir_base())
}
