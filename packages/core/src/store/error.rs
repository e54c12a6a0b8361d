//! Store Error Types
//!
//! Errors raised while querying the node collection or rebuilding it from a
//! snapshot. Every one of them means the store was left untouched.

use crate::models::NodeId;
use thiserror::Error;

/// Node collection integrity errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced node does not exist
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// Two nodes in one snapshot share an id
    #[error("Duplicate node id: {id}")]
    DuplicateId { id: NodeId },

    /// A node points at a parent that is not in the collection
    #[error("Node {id} references missing parent {parent_id}")]
    DanglingParent { id: NodeId, parent_id: NodeId },

    /// Parent links loop back onto themselves
    #[error("Cycle detected in parent links at node {id}")]
    CycleDetected { id: NodeId },
}

impl StoreError {
    /// Create a node not found error
    pub fn node_not_found(id: &NodeId) -> Self {
        Self::NodeNotFound { id: id.clone() }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: &NodeId) -> Self {
        Self::DuplicateId { id: id.clone() }
    }

    /// Create a dangling parent error
    pub fn dangling_parent(id: &NodeId, parent_id: &NodeId) -> Self {
        Self::DanglingParent {
            id: id.clone(),
            parent_id: parent_id.clone(),
        }
    }

    /// Create a cycle detected error
    pub fn cycle_detected(id: &NodeId) -> Self {
        Self::CycleDetected { id: id.clone() }
    }
}
