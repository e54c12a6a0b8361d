//! Integration tests for the Document session
//!
//! Tests cover:
//! - Undo/redo idempotence over a sequence of edits
//! - Bounded history
//! - Imports that fail leaving the document untouched
//! - Built-in templates rendering their expected messages
//! - Template persistence through JSON

mod common;

use anyhow::Result;
use common::init_tracing;
use pretty_assertions::assert_eq;
use smartmsg_core::codec::CodecError;
use smartmsg_core::models::{Field, MessageFormat, NodeId};
use smartmsg_core::operations::{Direction, InsertParams};
use smartmsg_core::templates::{self, Template};
use smartmsg_core::{BuilderConfig, Document, DocumentError};

#[test]
fn test_undo_redo_restores_exact_states() -> Result<()> {
    init_tracing();
    let mut doc = Document::new();
    doc.set_format(MessageFormat::Poct1a);

    let root = doc.insert(InsertParams::new("OBS.R01"))?;
    let hdr = doc.insert(InsertParams::new("HDR").under(&root))?;
    let svc = doc.insert(InsertParams::new("SVC").under(&root))?;
    doc.set_field(&hdr, 0, Field::keyed("V", "MSG001"))?;
    let copy = doc.duplicate(&svc)?;
    doc.reparent(&copy, Some(&hdr), None)?;
    doc.move_node(&svc, Direction::Up)?;
    doc.set_custom_type(&svc, "ZSV")?;
    doc.delete(&hdr)?;

    let k = doc.history().undo_depth();
    assert_eq!(k, 9);
    let final_state = doc.export_snapshot();

    for _ in 0..k {
        assert!(doc.undo()?);
    }
    assert!(doc.store().is_empty());
    assert!(!doc.undo()?);

    for _ in 0..k {
        assert!(doc.redo()?);
    }
    assert!(!doc.redo()?);
    assert_eq!(doc.export_snapshot(), final_state);
    Ok(())
}

#[test]
fn test_new_edit_discards_redo() -> Result<()> {
    let mut doc = Document::new();
    doc.insert(InsertParams::new("H"))?;
    doc.insert(InsertParams::new("L"))?;
    doc.undo()?;
    assert!(doc.history().can_redo());

    doc.insert(InsertParams::new("P"))?;
    assert!(!doc.history().can_redo());
    assert_eq!(doc.render(), "H|\nP|");
    Ok(())
}

#[test]
fn test_history_is_bounded() -> Result<()> {
    let config = BuilderConfig {
        max_undo_depth: 3,
        ..Default::default()
    };
    let mut doc = Document::with_config(config)?;
    for record in ["H", "P", "O", "R", "L"] {
        doc.insert(InsertParams::new(record))?;
    }
    assert_eq!(doc.history().undo_depth(), 3);

    while doc.undo()? {}
    assert_eq!(doc.render(), "H|\nP|");
    Ok(())
}

#[test]
fn test_ids_are_never_reissued_after_undo() -> Result<()> {
    let mut doc = Document::new();
    let first = doc.insert(InsertParams::new("H"))?;
    doc.undo()?;
    let second = doc.insert(InsertParams::new("H"))?;
    assert_ne!(first, second);
    Ok(())
}

#[test]
fn test_failed_import_leaves_document_untouched() -> Result<()> {
    let mut doc = Document::new();
    doc.import("H|1||||Analyzer\nL|1", MessageFormat::Astm)?;
    let before = doc.export_snapshot();
    let rendered = doc.render();

    let err = doc.import("<OBS.R01><HDR></OBS.R01>", MessageFormat::Poct1a).unwrap_err();
    assert!(matches!(err, DocumentError::Codec(CodecError::Parse { .. })));
    let err = doc.import("", MessageFormat::XmlResult).unwrap_err();
    assert!(matches!(err, DocumentError::Codec(CodecError::EmptyResult { .. })));

    assert_eq!(doc.format(), MessageFormat::Astm);
    assert_eq!(doc.export_snapshot(), before);
    assert_eq!(doc.render(), rendered);
    Ok(())
}

#[test]
fn test_astm_preset_renders() -> Result<()> {
    let mut doc = Document::new();
    let preset = &templates::presets(MessageFormat::Astm)[0];
    assert_eq!(preset.name, "Basic ASTM Result");

    doc.load_template(preset)?;
    assert_eq!(
        doc.render(),
        "H|1||||Analyzer\nP|1||PatientID\nO|1||SampleID\nR|1||TestCode|100\nL|1"
    );
    Ok(())
}

#[test]
fn test_hl7_presets_render() -> Result<()> {
    let mut doc = Document::new();
    let presets = templates::presets(MessageFormat::Hl7);

    doc.load_template(&presets[0])?;
    assert_eq!(doc.format(), MessageFormat::Hl7);
    assert_eq!(
        doc.render(),
        "MSH|^~\\&|ORU^R01|MSG001|P|2.5.1\r\n\
         PID|||PAT001||Doe^John\r\n\
         OBR|1|||TEST001^Test Name\r\n\
         OBX|1|NM|TEST001||100|mg/dL"
    );

    doc.load_template(&presets[1])?;
    assert_eq!(
        doc.render(),
        "MSH|^~\\&|ADT^A01|MSG001|P|2.5.1\r\nEVN|A01\r\nPID|||PAT001||Doe^John\r\nPV1||I|ROOM101"
    );
    Ok(())
}

#[test]
fn test_poct1a_preset_renders_nested_xml() -> Result<()> {
    let mut doc = Document::new();
    let qc = &templates::presets(MessageFormat::Poct1a)[0];
    assert_eq!(doc.load_template(qc)?, 21);

    let text = doc.render();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<OBS.R02>\n  <HDR>"));
    assert!(text.contains("      <OBS>\n        <OBS.observation_id V=\"GLU\" SN=\"ABT\"/>"));
    assert!(text.ends_with("</OBS.R02>"));

    // The rendered message imports back into the same shape
    let mut copy = Document::new();
    copy.import(&text, MessageFormat::Poct1a)?;
    assert_eq!(copy.store().len(), 21);
    assert_eq!(copy.render(), text);
    Ok(())
}

#[test]
fn test_saved_template_survives_json() -> Result<()> {
    let mut doc = Document::new();
    doc.import("H|1\nP|1||PAT9\nL|1", MessageFormat::Astm)?;
    let saved = doc.save_as_template("Morning QC")?;

    let limit = doc.config().max_template_bytes;
    let json = templates::collection_to_json(std::slice::from_ref(&saved), limit)?;
    let restored = templates::collection_from_json(&json)?;
    assert_eq!(restored, vec![saved.clone()]);

    let mut other = Document::new();
    other.load_template(&restored[0])?;
    assert_eq!(other.render(), doc.render());
    assert!(other.store().get(&NodeId::from("node_1")).is_some());
    Ok(())
}

#[test]
fn test_template_with_bad_links_is_rejected() -> Result<()> {
    let json = r#"{
        "key": "template_x",
        "name": "Broken",
        "format": "astm",
        "createdAt": "2024-01-01T00:00:00Z",
        "nodes": [
            {"id": "a", "type": "H", "fields": [], "parentId": "b"},
            {"id": "b", "type": "P", "fields": [], "parentId": "a"}
        ]
    }"#;
    let template = Template::from_json(json)?;

    let mut doc = Document::new();
    doc.insert(InsertParams::new("H"))?;
    assert!(matches!(
        doc.load_template(&template),
        Err(DocumentError::Store(_))
    ));
    assert_eq!(doc.store().len(), 1);
    Ok(())
}
