//! Scaffold errors

use super::UpdateError;

/// Creates a scaffold unavailable error
pub fn unavailable(version: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::ScaffoldUnavailable {
        version: version.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid version error
pub fn invalid_version(input: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::InvalidVersion {
        input: input.into(),
        reason: reason.into(),
    }
}
