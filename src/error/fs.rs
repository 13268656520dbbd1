//! File system errors

use super::UpdateError;

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> UpdateError {
    UpdateError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> UpdateError {
    UpdateError::IoError {
        message: message.into(),
    }
}
