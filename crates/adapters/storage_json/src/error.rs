//! Storage-specific error type wrapping file and JSON errors.

use domotica_domain::error::{CorruptStateError, DomoticaError};

/// Errors originating from the JSON file storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading, writing or renaming the file failed.
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    /// The file content is not a JSON home document.
    #[error("JSON deserialization error")]
    Decode(#[source] serde_json::Error),

    /// The home could not be serialized.
    #[error("JSON serialization error")]
    Encode(#[source] serde_json::Error),
}

impl From<StorageError> for DomoticaError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Decode(source) => {
                CorruptStateError::new("backing file is not a valid home document", source).into()
            }
            other => Self::Storage(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_undecodable_file_as_corrupt_state() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DomoticaError = StorageError::Decode(source).into();
        assert!(matches!(err, DomoticaError::CorruptState(_)));
    }

    #[test]
    fn should_report_io_failure_as_storage_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: DomoticaError = StorageError::from(io).into();
        assert!(matches!(err, DomoticaError::Storage(_)));
    }
}
