//! ASTM E1394 record codec
//!
//! One record per line, `type|f1|f2|…`, lines joined with `\n`. Parsing
//! tolerates transport framing left in pasted captures: `<STX>`, `<ETX>`
//! and `<CR>` markers as well as the raw control bytes.

use crate::codec::positional::{build_field_array, fields_from_tokens};
use crate::codec::{CodecError, FormatCodec};
use crate::models::{DetachedNode, MessageFormat};
use crate::store::NodeStore;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn frame_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<STX>|<ETX>|<CR>|\x02|\x03|\r").unwrap())
}

fn line_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").unwrap())
}

/// Split on runs of CR/LF, shared with the HL7 codec
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    line_break_regex().split(text)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AstmCodec;

impl FormatCodec for AstmCodec {
    fn format(&self) -> MessageFormat {
        MessageFormat::Astm
    }

    fn serialize(&self, store: &NodeStore) -> String {
        store
            .root_nodes()
            .into_iter()
            .map(|node| format!("{}|{}", node.node_type, build_field_array(&node.fields).join("|")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn parse(&self, text: &str) -> Result<Vec<DetachedNode>, CodecError> {
        let mut records = Vec::new();

        for raw in split_lines(text.trim()) {
            let line = frame_regex().replace_all(raw, "");
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut tokens = line.split('|');
            let Some(record_type) = tokens.next() else {
                continue;
            };
            let rest: Vec<(usize, &str)> = tokens.enumerate().collect();
            if rest.is_empty() {
                continue;
            }

            records.push(DetachedNode::new(
                record_type,
                fields_from_tokens(rest.into_iter(), 1),
            ));
        }

        if records.is_empty() {
            return Err(CodecError::empty_result(MessageFormat::Astm));
        }
        debug!(records = records.len(), "Parsed ASTM message");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, FieldName};
    use pretty_assertions::assert_eq;

    fn store_of(records: &[DetachedNode]) -> NodeStore {
        let mut store = NodeStore::new();
        for record in records {
            store.materialize(record, None, None).unwrap();
        }
        store
    }

    #[test]
    fn test_serialize_pads_gaps() {
        let store = store_of(&[
            DetachedNode::new("H", vec![Field::positional(1, "1"), Field::positional(5, "Analyzer")]),
            DetachedNode::new("L", vec![]),
        ]);
        assert_eq!(AstmCodec.serialize(&store), "H|1||||Analyzer\nL|");
    }

    #[test]
    fn test_parse_positions() {
        let records = AstmCodec.parse("H|1||||Analyzer").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_type, "H");
        let names: Vec<&FieldName> = records[0].fields.iter().map(|f| &f.name).collect();
        assert_eq!(names, vec![&FieldName::Position(1), &FieldName::Position(5)]);
        assert_eq!(records[0].fields[1].value, "Analyzer");
    }

    #[test]
    fn test_parse_strips_framing() {
        let records = AstmCodec
            .parse("<STX>H|1|<CR>\r\n\x02P|1||PAT01\x03\r\n<STX>L|1<ETX>")
            .unwrap();
        let types: Vec<&str> = records.iter().map(|r| r.node_type.as_str()).collect();
        assert_eq!(types, vec!["H", "P", "L"]);
        assert_eq!(records[1].fields[1], Field::positional(3, "PAT01"));
    }

    #[test]
    fn test_parse_skips_lines_without_fields() {
        let records = AstmCodec.parse("garbage\nR|1|GLU").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_type, "R");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(
            AstmCodec.parse("  \n\n "),
            Err(CodecError::empty_result(MessageFormat::Astm))
        );
    }
}
