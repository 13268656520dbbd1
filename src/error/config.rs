//! Configuration errors

use super::UpdateError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a config read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a manifest read failed error
pub fn manifest_read_failed(path: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::ManifestReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
