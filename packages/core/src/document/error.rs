//! Document Error Types
//!
//! The document layer is the outermost surface of the crate, so its error
//! wraps every lower layer. Matching on the wrapped variant recovers the
//! precise cause (for instance `DocumentError::Codec(CodecError::EmptyResult
//! { .. })` for an import that found nothing).

use crate::codec::CodecError;
use crate::models::MessageFormat;
use crate::operations::OperationError;
use crate::schema::SchemaError;
use crate::store::StoreError;
use crate::templates::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A file whose extension the target format does not accept
    #[error("Invalid file type '.{extension}' for {format}")]
    UnsupportedExtension {
        format: MessageFormat,
        extension: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DocumentError {
    /// Create an unsupported extension error
    pub fn unsupported_extension(format: MessageFormat, extension: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            format,
            extension: extension.into(),
        }
    }
}

pub type DocumentResult<T> = Result<T, DocumentError>;
