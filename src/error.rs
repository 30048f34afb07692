//! Error type shared by the event log, clock, playback and file layers.

use std::path::PathBuf;

/// Errors raised by the review core.
///
/// None of these are fatal: callers report them and carry on with the
/// in-memory annotation state untouched.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Invalid frame index: {frame}")]
    InvalidFrame { frame: i64 },

    #[error("Invalid frame number: {input:?}")]
    InvalidFrameInput { input: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed event data at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("No media loaded")]
    NoMediaLoaded,
}

impl ReviewError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result alias for the review core.
pub type Result<T> = std::result::Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = ReviewError::InvalidFrame { frame: -3 };
        assert_eq!(err.to_string(), "Invalid frame index: -3");

        let err = ReviewError::invalid_config("fps must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: fps must be positive"
        );
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;

        let err = ReviewError::FileWrite {
            path: PathBuf::from("/tmp/event-x.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/event-x.txt"));
        assert!(err.source().is_some());
    }
}
