//! POCT1-A XML codec
//!
//! Each node is an element named by its type; every field is an attribute
//! (`V`, `U`, `SN`, …). Childless nodes are self-closing. The message type
//! element (`OBS.R02`, …) is itself the document element.

use crate::codec::xml::{attribute_list, is_namespace_declaration, message_elements, XmlElement};
use crate::codec::{CodecError, FormatCodec};
use crate::models::{DetachedNode, Field, FieldName, MessageFormat, Node};
use crate::store::NodeStore;
use tracing::{debug, warn};

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>";

#[derive(Debug, Clone)]
pub struct Poct1aCodec {
    wrapper_tags: Vec<String>,
}

impl Poct1aCodec {
    pub fn new(wrapper_tags: Vec<String>) -> Self {
        Self { wrapper_tags }
    }

    fn write_node(store: &NodeStore, node: &Node, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let attrs = attribute_list(
            node.fields
                .iter()
                .map(|f| (attribute_name(f), f.value.as_str())),
        );
        let open = if attrs.is_empty() {
            node.node_type.clone()
        } else {
            format!("{} {attrs}", node.node_type)
        };

        let children = store.children_of(Some(&node.id));
        if children.is_empty() {
            out.push_str(&format!("{pad}<{open}/>\n"));
            return;
        }

        out.push_str(&format!("{pad}<{open}>\n"));
        for child in children {
            Self::write_node(store, child, depth + 1, out);
        }
        out.push_str(&format!("{pad}</{}>\n", node.node_type));
    }
}

impl Default for Poct1aCodec {
    fn default() -> Self {
        Self::new(crate::config::BuilderConfig::default().xml_wrapper_tags)
    }
}

/// Attribute name for a field: the key minus any leading `@`; positional
/// fields have no attribute form and are not written
fn attribute_name(field: &Field) -> &str {
    match &field.name {
        FieldName::Key(key) => key.strip_prefix('@').unwrap_or(key.as_str()),
        FieldName::Position(_) => "",
    }
}

fn detach(element: XmlElement) -> DetachedNode {
    let fields = element
        .attributes
        .into_iter()
        .filter(|(name, _)| !is_namespace_declaration(name))
        .map(|(name, value)| Field::keyed(name, value))
        .collect();
    DetachedNode::new(element.name, fields)
        .with_children(element.children.into_iter().map(detach).collect())
}

impl FormatCodec for Poct1aCodec {
    fn format(&self) -> MessageFormat {
        MessageFormat::Poct1a
    }

    fn serialize(&self, store: &NodeStore) -> String {
        let mut out = format!("{HEADER}\n");
        for root in store.root_nodes() {
            Self::write_node(store, root, 0, &mut out);
        }
        out.trim().to_string()
    }

    fn parse(&self, text: &str) -> Result<Vec<DetachedNode>, CodecError> {
        let elements = message_elements(text.trim(), &self.wrapper_tags).map_err(|message| {
            warn!(%message, "Malformed POCT1-A input");
            CodecError::parse(MessageFormat::Poct1a, message)
        })?;
        if elements.is_empty() {
            return Err(CodecError::empty_result(MessageFormat::Poct1a));
        }

        let roots: Vec<DetachedNode> = elements.into_iter().map(detach).collect();
        debug!(
            roots = roots.len(),
            nodes = roots.iter().map(DetachedNode::subtree_len).sum::<usize>(),
            "Parsed POCT1-A message"
        );
        Ok(roots)
    }
}
