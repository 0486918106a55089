use thiserror::Error;

use crate::sentence::SentenceType;

pub type Result<T> = std::result::Result<T, ReaderError>;

/// Errors that end a reading session.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no serial port found")]
    PortNotFound,

    #[error("UTC offset out of range: {0} hours")]
    InvalidUtcOffset(i32),
}

/// Why a single sentence could not be turned into a fix.
///
/// These never end the session; the sentence is reported and the stream
/// continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{kind} sentence has {found} fields, expected at least {required}")]
    InsufficientFields {
        kind: SentenceType,
        found: usize,
        required: usize,
    },

    #[error("coordinate not available")]
    CoordinateUnavailable,

    #[error("{field} field is not numeric: {value:?}")]
    NumericConversion { field: &'static str, value: String },

    #[error("unsupported sentence type")]
    UnsupportedSentenceType,
}

impl DecodeError {
    pub(crate) fn numeric(field: &'static str, value: &str) -> Self {
        Self::NumericConversion {
            field,
            value: value.to_string(),
        }
    }
}
