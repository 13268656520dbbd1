//! Log subscriber setup for the binary
//!
//! `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
//! output for this crate with `--verbose`. Logs go to stderr so the status
//! report on stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,scaffold_update=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
