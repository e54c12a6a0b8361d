//! Schema Loading Error Types

use thiserror::Error;

/// Errors raised while reading an XSD description
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The text is not well-formed XML
    #[error("Malformed schema: {message}")]
    Malformed { message: String },

    /// Well-formed XML whose document element is not `schema`
    #[error("Expected a schema document element, found <{root}>")]
    NotASchema { root: String },

    /// No named complex types or top-level elements were found
    #[error("Schema defines no element types")]
    NoDefinitions,
}

impl SchemaError {
    /// Create a malformed schema error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Create a wrong document element error
    pub fn not_a_schema(root: impl Into<String>) -> Self {
        Self::NotASchema { root: root.into() }
    }
}
