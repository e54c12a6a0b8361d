//! Plain-data tree snapshots
//!
//! A `Snapshot` is the whole node collection as an ordered list, parents
//! before their children. It is the shape used for undo/redo, template
//! persistence and the export/replace contract with external collaborators.

use crate::models::{Node, NodeId};
use serde::{Deserialize, Serialize};

/// Structurally independent deep copy of a store's nodes
///
/// Serializes as a bare JSON array of nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    nodes: Vec<Node>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }
}

impl From<Vec<Node>> for Snapshot {
    fn from(nodes: Vec<Node>) -> Self {
        Self::new(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    #[test]
    fn test_snapshot_serializes_as_array() {
        let snapshot = Snapshot::new(vec![Node::new(
            NodeId::from("p1"),
            "L".to_string(),
            vec![Field::positional(1, "1")],
            None,
        )]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.starts_with('['));

        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut nodes = vec![Node::new(
            NodeId::from("p1"),
            "H".to_string(),
            vec![],
            None,
        )];
        let snapshot = Snapshot::new(nodes.clone());
        nodes[0].node_type = "P".to_string();
        assert_eq!(snapshot.nodes()[0].node_type, "H");
    }
}
