//! HL7 v2 segment codec
//!
//! Segments are `type|f1|f2|…` joined with `\r\n`. `MSH` is special: its
//! first two slots are the field separator and the encoding characters, so
//! they are always written as `MSH|^~\&|` and user fields start at
//! position 3.
//!
//! On output the MSH line drops the empty slots between the encoding
//! characters and the first populated field, so a header carrying only
//! positions 9–12 renders as `MSH|^~\&|ORU^R01|MSG001|P|2.5.1`. Gaps after
//! the first populated field are kept. Parsing numbers MSH tokens from 3,
//! which makes rendering a parsed header reproduce its text exactly.
//!
//! Component separators (`^`) inside a value are carried through
//! unescaped.

use crate::codec::astm::split_lines;
use crate::codec::positional::{build_field_array, fields_from_tokens};
use crate::codec::{CodecError, FormatCodec};
use crate::models::{DetachedNode, MessageFormat, Node};
use crate::store::NodeStore;
use tracing::debug;

const MSH: &str = "MSH";
const MSH_PREFIX: &str = "MSH|^~\\&|";

#[derive(Debug, Clone, Copy, Default)]
pub struct Hl7Codec;

impl Hl7Codec {
    fn segment_line(node: &Node) -> String {
        let slots = build_field_array(&node.fields);
        if node.node_type == MSH {
            let user_slots = slots.get(2..).unwrap_or_default();
            let first = user_slots
                .iter()
                .position(|slot| !slot.is_empty())
                .unwrap_or(user_slots.len());
            format!("{MSH_PREFIX}{}", user_slots[first..].join("|"))
        } else {
            format!("{}|{}", node.node_type, slots.join("|"))
        }
    }
}

impl FormatCodec for Hl7Codec {
    fn format(&self) -> MessageFormat {
        MessageFormat::Hl7
    }

    fn serialize(&self, store: &NodeStore) -> String {
        store
            .root_nodes()
            .into_iter()
            .map(Self::segment_line)
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    fn parse(&self, text: &str) -> Result<Vec<DetachedNode>, CodecError> {
        let mut segments = Vec::new();

        for line in split_lines(text.trim()).map(str::trim) {
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split('|');
            let Some(segment_type) = tokens.next() else {
                continue;
            };

            let fields = if segment_type == MSH {
                // Token 1 is the encoding characters; token 2 is MSH-3
                fields_from_tokens(tokens.enumerate().skip(1), 2)
            } else {
                fields_from_tokens(tokens.enumerate(), 1)
            };
            segments.push(DetachedNode::new(segment_type, fields));
        }

        if segments.is_empty() {
            return Err(CodecError::empty_result(MessageFormat::Hl7));
        }
        debug!(segments = segments.len(), "Parsed HL7 message");
        Ok(segments)
    }
}
