//! Node Data Structures
//!
//! This module defines the `Node` record that every message format is built
//! from, plus the id-less `DetachedNode` shape used for clipboard content and
//! freshly parsed input.
//!
//! # Architecture
//!
//! - **Universal Node**: one struct represents ASTM records, HL7 segments,
//!   POCT1-A elements and generic XML elements alike
//! - **Flat storage**: nodes reference their parent by id; the tree shape is
//!   recovered by the store's children index
//! - **Ordered fields**: `fields` keeps insertion order; positional formats
//!   reorder by numeric name at serialization time
//!
//! # Examples
//!
//! ```rust
//! use smartmsg_core::models::{Field, FieldName, Node, NodeId};
//!
//! let header = Node::new(
//!     NodeId::from("node_1"),
//!     "H".to_string(),
//!     vec![Field::positional(1, "1"), Field::positional(5, "Analyzer")],
//!     None,
//! );
//! assert_eq!(header.fields[1].name, FieldName::Position(5));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

fn default_expanded() -> bool {
    true
}

/// Opaque node identifier
///
/// Ids are minted by the store (`node_<n>`) and never reissued within a
/// session. Externally supplied snapshots may carry arbitrary ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a store-minted id (`node_42` → 42)
    pub(crate) fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix("node_")?.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Field address
///
/// Positional formats (ASTM, HL7) address fields by 1-based slot. XML
/// formats use string keys: a bare attribute name for POCT1-A, `@name` or
/// `text()` for generic XML.
///
/// Serialized untagged, so `{"name": 3}` and `{"name": "@id"}` both
/// round-trip through the persisted node shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldName {
    Position(u32),
    Key(String),
}

impl FieldName {
    /// Highest slot a positional field may address
    pub const MAX_POSITION: usize = 9999;

    /// The 1-based slot this name addresses, if it is positional
    ///
    /// String keys that spell a positive integer count as positions too,
    /// since user-edited names arrive as text. Numbers above
    /// [`FieldName::MAX_POSITION`] address no slot.
    pub fn position(&self) -> Option<usize> {
        self.numeric()
            .filter(|n| (1..=Self::MAX_POSITION as u128).contains(n))
            .map(|n| n as usize)
    }

    /// Whether the name is numeric but past [`FieldName::MAX_POSITION`]
    pub fn is_out_of_range(&self) -> bool {
        self.numeric()
            .is_some_and(|n| n > Self::MAX_POSITION as u128)
    }

    fn numeric(&self) -> Option<u128> {
        match self {
            FieldName::Position(n) => Some(u128::from(*n)),
            FieldName::Key(key) => key.trim().parse::<u128>().ok(),
        }
    }

    /// Attribute name for generic XML (`@id` → `id`)
    pub fn attribute(&self) -> Option<&str> {
        match self {
            FieldName::Key(key) => key.strip_prefix('@'),
            FieldName::Position(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FieldName::Key(key) if key == Field::TEXT_KEY)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldName::Position(n) => write!(f, "{n}"),
            FieldName::Key(key) => f.write_str(key),
        }
    }
}

impl From<u32> for FieldName {
    fn from(value: u32) -> Self {
        FieldName::Position(value)
    }
}

impl From<&str> for FieldName {
    fn from(value: &str) -> Self {
        FieldName::Key(value.to_string())
    }
}

/// A single `{name, value}` pair on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: FieldName,
    #[serde(default)]
    pub value: String,
}

impl Field {
    /// Field name that carries element text content in generic XML
    pub const TEXT_KEY: &'static str = "text()";

    pub fn new(name: impl Into<FieldName>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn positional(position: u32, value: impl Into<String>) -> Self {
        Self::new(FieldName::Position(position), value)
    }

    pub fn keyed(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(FieldName::Key(key.into()), value)
    }
}

/// One unit of the document tree
///
/// Serialized in camelCase with `type` for the tag, matching the persisted
/// template shape (`{id, type, fields, parentId, expanded}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier, immutable after creation
    pub id: NodeId,

    /// Record/segment/element tag (e.g. "H", "MSH", "OBS.value")
    #[serde(rename = "type")]
    pub node_type: String,

    /// Ordered field list; duplicate names are permitted
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Owning node, `None` for roots
    #[serde(default)]
    pub parent_id: Option<NodeId>,

    /// Presentation-only expansion flag
    #[serde(default = "default_expanded")]
    pub expanded: bool,

    /// User-defined tag name for POCT1-A custom nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type_name: Option<String>,
}

impl Node {
    pub fn new(
        id: NodeId,
        node_type: String,
        fields: Vec<Field>,
        parent_id: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            node_type,
            fields,
            parent_id,
            expanded: true,
            custom_type_name: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Value at a 1-based position, last write wins
    pub fn positional_value(&self, position: usize) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name.position() == Some(position))
            .map(|f| f.value.as_str())
    }
}

/// A parentless structural copy of a subtree: no ids anywhere
///
/// Used for the clipboard and as the output of every codec's `parse`.
/// Materializing one into a store always mints fresh ids, so two pastes of
/// the same `DetachedNode` never share state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type_name: Option<String>,
    #[serde(default)]
    pub children: Vec<DetachedNode>,
}

impl DetachedNode {
    pub fn new(node_type: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            node_type: node_type.into(),
            fields,
            expanded: true,
            custom_type_name: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<DetachedNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including itself
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DetachedNode::subtree_len)
            .sum::<usize>()
    }
}
