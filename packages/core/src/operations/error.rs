//! Error types for the tree operations layer
//!
//! These errors describe edits that were refused. A refused edit never
//! changes the store.

use crate::models::NodeId;
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during tree operations
///
/// # Examples
///
/// ```rust
/// use smartmsg_core::models::NodeId;
/// use smartmsg_core::operations::OperationError;
///
/// let err = OperationError::circular_reference(&NodeId::from("node_1"), &NodeId::from("node_4"));
/// assert_eq!(
///     err.to_string(),
///     "Circular reference: node 'node_1' cannot be moved under 'node_4'"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Re-parent target is the node itself or one of its descendants
    #[error("Circular reference: node '{node_id}' cannot be moved under '{target_id}'")]
    CircularReference { node_id: NodeId, target_id: NodeId },

    /// Referenced node does not exist
    ///
    /// Occurs for stale ids: the node, its intended parent, or an anchor
    /// sibling may already have been deleted.
    #[error("Node '{node_id}' does not exist")]
    NodeNotFound { node_id: NodeId },

    /// Paste requested with nothing copied
    #[error("Clipboard is empty")]
    ClipboardEmpty,

    /// Field index outside the node's field list
    #[error("Node '{node_id}' has no field at index {index}")]
    FieldNotFound { node_id: NodeId, index: usize },

    /// The requested edit is not meaningful
    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },

    /// Structural corruption surfaced by the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OperationError {
    /// Create a CircularReference error
    pub fn circular_reference(node_id: &NodeId, target_id: &NodeId) -> Self {
        Self::CircularReference {
            node_id: node_id.clone(),
            target_id: target_id.clone(),
        }
    }

    /// Create a NodeNotFound error
    pub fn node_not_found(node_id: &NodeId) -> Self {
        Self::NodeNotFound {
            node_id: node_id.clone(),
        }
    }

    /// Create a FieldNotFound error
    pub fn field_not_found(node_id: &NodeId, index: usize) -> Self {
        Self::FieldNotFound {
            node_id: node_id.clone(),
            index,
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}
