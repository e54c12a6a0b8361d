//! Codec Error Types

use crate::models::MessageFormat;
use thiserror::Error;

/// Errors raised while parsing message text or resolving a format tag
///
/// `Parse` and `EmptyResult` are kept apart so callers can word them
/// differently: an empty import is often expected, broken markup is not.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text could not be read as the requested format
    #[error("Failed to parse {format} message: {message}")]
    Parse {
        format: MessageFormat,
        message: String,
    },

    /// The text was readable but contained no records
    #[error("No valid records found in {format} input")]
    EmptyResult { format: MessageFormat },

    /// The format tag is not one of the supported formats
    #[error("Unknown message format: {tag}")]
    UnknownFormat { tag: String },
}

impl CodecError {
    /// Create a parse error
    pub fn parse(format: MessageFormat, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }

    /// Create an empty result error
    pub fn empty_result(format: MessageFormat) -> Self {
        Self::EmptyResult { format }
    }

    /// Create an unknown format error
    pub fn unknown_format(tag: impl Into<String>) -> Self {
        Self::UnknownFormat { tag: tag.into() }
    }

    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult { .. })
    }
}
