//! Data Models
//!
//! This module contains the core data structures shared by every layer:
//!
//! - `Node` - Universal tree node for records, segments and elements
//! - `DetachedNode` - Id-less subtree used for clipboard and parse output
//! - `Snapshot` - Plain-data copy of a whole tree
//! - `MessageFormat` - The closed set of wire formats

mod format;
mod node;
mod snapshot;

pub use format::MessageFormat;
pub use node::{DetachedNode, Field, FieldName, Node, NodeId};
pub use snapshot::Snapshot;
