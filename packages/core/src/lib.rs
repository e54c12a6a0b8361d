//! SmartMsg Core
//!
//! Editing core for healthcare message builders: an in-memory node tree
//! that serializes to and parses from ASTM, HL7 v2, POCT1-A and
//! schema-driven generic XML.
//!
//! # Architecture
//!
//! - **Arena tree**: nodes keyed by id with a children-by-parent index
//! - **One codec per format**: selected once through [`codec::codec_for`]
//! - **Snapshot history**: undo/redo restores whole-tree snapshots
//! - **Session object**: [`document::Document`] owns all editing state
//!
//! # Modules
//!
//! - [`models`] - Nodes, fields, snapshots and the format enum
//! - [`store`] - The node arena
//! - [`operations`] - Structural and field edits
//! - [`history`] - Bounded undo/redo
//! - [`hierarchy`] - Record vocabularies and nesting rules
//! - [`schema`] - XSD loading for the XML formats
//! - [`codec`] - Serialization and parsing per format
//! - [`templates`] - Built-in and user templates
//! - [`document`] - Editing session tying the above together
//! - [`config`] - Builder settings

pub mod codec;
pub mod config;
pub mod document;
pub mod hierarchy;
pub mod history;
pub mod models;
pub mod operations;
pub mod schema;
pub mod store;
pub mod templates;

// Re-export commonly used types
pub use codec::{CodecError, FormatCodec};
pub use config::BuilderConfig;
pub use document::{Document, DocumentError, DocumentResult};
pub use hierarchy::HierarchyResolver;
pub use history::HistoryManager;
pub use models::*;
pub use operations::{Direction, InsertParams, OperationError, TreeOperations};
pub use schema::{SchemaError, SchemaLoader, SchemaMap};
pub use store::{NodeStore, StoreError};
pub use templates::{Template, TemplateError};
