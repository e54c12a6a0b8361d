//! Generic XML codec for schema-driven request/result documents
//!
//! Field naming:
//!
//! - `@name` → attribute `name`
//! - `text()` → element text content
//! - anything else is carried on the node but not written
//!
//! Output is wrapped in a fixed envelope element, `<Request>` or
//! `<Result>`, with nodes indented one level inside it.

use crate::codec::xml::{
    attribute_list, escape, is_namespace_declaration, message_elements, XmlElement,
};
use crate::codec::{CodecError, FormatCodec};
use crate::models::{DetachedNode, Field, MessageFormat, Node};
use crate::store::NodeStore;
use tracing::{debug, warn};

const HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Which envelope a generic XML document uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Request,
    Result,
}

impl Envelope {
    pub fn tag(&self) -> &'static str {
        match self {
            Envelope::Request => "Request",
            Envelope::Result => "Result",
        }
    }

    fn format(&self) -> MessageFormat {
        match self {
            Envelope::Request => MessageFormat::XmlRequest,
            Envelope::Result => MessageFormat::XmlResult,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenericXmlCodec {
    envelope: Envelope,
    wrapper_tags: Vec<String>,
}

impl GenericXmlCodec {
    pub fn new(envelope: Envelope, wrapper_tags: Vec<String>) -> Self {
        Self {
            envelope,
            wrapper_tags,
        }
    }

    pub fn request() -> Self {
        Self::new(Envelope::Request, default_wrappers())
    }

    pub fn result() -> Self {
        Self::new(Envelope::Result, default_wrappers())
    }

    fn write_node(store: &NodeStore, node: &Node, depth: usize, out: &mut String) {
        let pad = "  ".repeat(depth);
        let attrs = attribute_list(
            node.fields
                .iter()
                .filter_map(|f| f.name.attribute().map(|name| (name, f.value.as_str()))),
        );
        let open = if attrs.is_empty() {
            node.node_type.clone()
        } else {
            format!("{} {attrs}", node.node_type)
        };

        let text = node
            .fields
            .iter()
            .find(|f| f.name.is_text())
            .map(|f| f.value.as_str())
            .unwrap_or_default();
        let children = store.children_of(Some(&node.id));

        if children.is_empty() && text.is_empty() {
            out.push_str(&format!("{pad}<{open}/>\n"));
            return;
        }

        out.push_str(&format!("{pad}<{open}>{}", escape(text)));
        if children.is_empty() {
            out.push_str(&format!("</{}>\n", node.node_type));
            return;
        }

        out.push('\n');
        for child in children {
            Self::write_node(store, child, depth + 1, out);
        }
        out.push_str(&format!("{pad}</{}>\n", node.node_type));
    }
}

fn default_wrappers() -> Vec<String> {
    crate::config::BuilderConfig::default().xml_wrapper_tags
}

fn detach(element: XmlElement) -> DetachedNode {
    let mut fields: Vec<Field> = element
        .attributes
        .into_iter()
        .filter(|(name, _)| !is_namespace_declaration(name))
        .map(|(name, value)| Field::keyed(format!("@{name}"), value))
        .collect();
    if !element.text.is_empty() {
        fields.push(Field::keyed(Field::TEXT_KEY, element.text));
    }

    DetachedNode::new(element.name, fields)
        .with_children(element.children.into_iter().map(detach).collect())
}

impl FormatCodec for GenericXmlCodec {
    fn format(&self) -> MessageFormat {
        self.envelope.format()
    }

    fn serialize(&self, store: &NodeStore) -> String {
        let tag = self.envelope.tag();
        let mut out = format!("{HEADER}\n<{tag}>\n");
        for root in store.root_nodes() {
            Self::write_node(store, root, 1, &mut out);
        }
        out.push_str(&format!("</{tag}>"));
        out
    }

    fn parse(&self, text: &str) -> Result<Vec<DetachedNode>, CodecError> {
        let format = self.format();
        let elements = message_elements(text.trim(), &self.wrapper_tags).map_err(|message| {
            warn!(%format, %message, "Malformed XML input");
            CodecError::parse(format, message)
        })?;
        if elements.is_empty() {
            return Err(CodecError::empty_result(format));
        }

        let roots: Vec<DetachedNode> = elements.into_iter().map(detach).collect();
        debug!(%format, roots = roots.len(), "Parsed XML message");
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order_tree() -> DetachedNode {
        DetachedNode::new(
            "Order",
            vec![Field::keyed("@id", "ORD-1"), Field::keyed("@priority", "stat")],
        )
        .with_children(vec![
            DetachedNode::new("Patient", vec![Field::keyed("text()", "Doe & Sons")]),
            DetachedNode::new("Test", vec![Field::keyed("@code", "GLU")]),
        ])
    }

    fn store_with(tree: &DetachedNode) -> NodeStore {
        let mut store = NodeStore::new();
        store.materialize(tree, None, None).unwrap();
        store
    }

    #[test]
    fn test_serialize_request() {
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<Request>
  <Order id="ORD-1" priority="stat">
    <Patient>Doe &amp; Sons</Patient>
    <Test code="GLU"/>
  </Order>
</Request>"#;
        assert_eq!(
            GenericXmlCodec::request().serialize(&store_with(&order_tree())),
            expected
        );
    }

    #[test]
    fn test_serialize_text_with_children() {
        let tree = DetachedNode::new("Note", vec![Field::keyed("text()", "see below")])
            .with_children(vec![DetachedNode::new("Line", vec![])]);
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Result>\n  <Note>see below\n    <Line/>\n  </Note>\n</Result>";
        assert_eq!(GenericXmlCodec::result().serialize(&store_with(&tree)), expected);
    }

    #[test]
    fn test_serialize_empty_store() {
        assert_eq!(
            GenericXmlCodec::result().serialize(&NodeStore::new()),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Result>\n</Result>"
        );
    }

    #[test]
    fn test_only_attribute_and_text_fields_are_written() {
        let tree = DetachedNode::new("Test", vec![Field::positional(1, "x"), Field::keyed("V", "y")]);
        let out = GenericXmlCodec::request().serialize(&store_with(&tree));
        assert!(out.contains("  <Test/>\n"));
    }

    #[test]
    fn test_round_trip() {
        let codec = GenericXmlCodec::request();
        let text = codec.serialize(&store_with(&order_tree()));
        assert_eq!(codec.parse(&text).unwrap(), vec![order_tree()]);
    }

    #[test]
    fn test_parse_bare_element() {
        let parsed = GenericXmlCodec::result()
            .parse(r#"<Order xmlns="urn:lab" id="9"><Test/></Order>"#)
            .unwrap();
        assert_eq!(parsed[0].fields, vec![Field::keyed("@id", "9")]);
        assert_eq!(parsed[0].children.len(), 1);
    }

    #[test]
    fn test_empty_and_malformed_are_distinct() {
        let codec = GenericXmlCodec::request();
        assert_eq!(
            codec.parse(""),
            Err(CodecError::empty_result(MessageFormat::XmlRequest))
        );
        assert!(codec.parse("<Request/>").unwrap_err().is_empty_result());
        assert!(matches!(
            codec.parse("<unclosed"),
            Err(CodecError::Parse {
                format: MessageFormat::XmlRequest,
                ..
            })
        ));
    }
}
