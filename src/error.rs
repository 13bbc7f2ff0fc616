use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while validating the fixed-layout header block
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HeaderError {
    #[error("Malformed header field '{field}': {value:?}")]
    MalformedField { field: String, value: String },

    #[error("Header length mismatch: expected {expected} bytes, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Unknown file variant: {0:?}")]
    UnknownVariant(String),

    #[error("Degenerate calibration for signal {signal}: {reason}")]
    DegenerateCalibration { signal: usize, reason: String },
}

impl HeaderError {
    pub(crate) fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        HeaderError::MalformedField {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("Cannot open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid header: {0}")]
    Header(#[from] HeaderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Reader has been closed")]
    ResourceClosed,

    #[error("Signal index {0} out of range")]
    InvalidSignalIndex(usize),
}

pub type Result<T> = std::result::Result<T, EdfError>;
