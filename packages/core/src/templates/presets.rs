//! Built-in templates

use crate::models::{Field, MessageFormat, Node, NodeId, Snapshot};
use crate::templates::Template;
use chrono::{DateTime, Utc};

/// `(id, type, parent, fields)`; positional fields use numeric names
type Row<'a> = (&'a str, &'a str, Option<&'a str>, &'a [(&'a str, &'a str)]);

fn snapshot(rows: &[Row<'_>]) -> Snapshot {
    Snapshot::new(
        rows.iter()
            .map(|(id, node_type, parent, fields)| {
                let fields = fields
                    .iter()
                    .map(|(name, value)| match name.parse::<u32>() {
                        Ok(position) => Field::positional(position, *value),
                        Err(_) => Field::keyed(*name, *value),
                    })
                    .collect();
                Node::new(
                    NodeId::from(*id),
                    node_type.to_string(),
                    fields,
                    parent.map(NodeId::from),
                )
            })
            .collect(),
    )
}

fn preset(key: &str, name: &str, format: MessageFormat, rows: &[Row<'_>]) -> Template {
    Template {
        key: key.to_string(),
        name: name.to_string(),
        format,
        created_at: DateTime::<Utc>::default(),
        builtin: true,
        nodes: snapshot(rows),
    }
}

/// Built-in templates for `format`; the XML formats have none
pub fn presets(format: MessageFormat) -> Vec<Template> {
    match format {
        MessageFormat::Astm => vec![preset(
            "astm_basic_result",
            "Basic ASTM Result",
            format,
            &[
                ("p1", "H", None, &[("1", "1"), ("5", "Analyzer")]),
                ("p2", "P", None, &[("1", "1"), ("3", "PatientID")]),
                ("p3", "O", None, &[("1", "1"), ("3", "SampleID")]),
                ("p4", "R", None, &[("1", "1"), ("3", "TestCode"), ("4", "100")]),
                ("p5", "L", None, &[("1", "1")]),
            ],
        )],
        MessageFormat::Hl7 => vec![
            preset(
                "hl7_oru_r01",
                "HL7 ORU^R01 Result",
                format,
                &[
                    (
                        "p1",
                        "MSH",
                        None,
                        &[("9", "ORU^R01"), ("10", "MSG001"), ("11", "P"), ("12", "2.5.1")],
                    ),
                    ("p2", "PID", None, &[("3", "PAT001"), ("5", "Doe^John")]),
                    ("p3", "OBR", None, &[("1", "1"), ("4", "TEST001^Test Name")]),
                    (
                        "p4",
                        "OBX",
                        None,
                        &[("1", "1"), ("2", "NM"), ("3", "TEST001"), ("5", "100"), ("6", "mg/dL")],
                    ),
                ],
            ),
            preset(
                "hl7_adt_a01",
                "HL7 ADT^A01 Admission",
                format,
                &[
                    (
                        "p1",
                        "MSH",
                        None,
                        &[("9", "ADT^A01"), ("10", "MSG001"), ("11", "P"), ("12", "2.5.1")],
                    ),
                    ("p2", "EVN", None, &[("1", "A01")]),
                    ("p3", "PID", None, &[("3", "PAT001"), ("5", "Doe^John")]),
                    ("p4", "PV1", None, &[("2", "I"), ("3", "ROOM101")]),
                ],
            ),
        ],
        MessageFormat::Poct1a => vec![
            preset(
                "poct1a_qc_result",
                "POCT1-A QC Result (OBS.R02)",
                format,
                &[
                    ("p1", "OBS.R02", None, &[]),
                    ("p2", "HDR", Some("p1"), &[]),
                    ("p3", "HDR.control_id", Some("p2"), &[("V", "CTRL001")]),
                    ("p4", "HDR.version_id", Some("p2"), &[("V", "POCT1")]),
                    ("p5", "HDR.creation_dttm", Some("p2"), &[("V", "2024-01-01T12:00:00")]),
                    ("p6", "SVC", Some("p1"), &[]),
                    ("p7", "SVC.role_cd", Some("p6"), &[("V", "LQC")]),
                    ("p8", "SVC.observation_dttm", Some("p6"), &[("V", "2024-01-01T11:30:00")]),
                    ("p9", "SVC.status_cd", Some("p6"), &[("V", "NRM")]),
                    ("p10", "CTC", Some("p6"), &[]),
                    ("p11", "CTC.name", Some("p10"), &[("V", "Control L1")]),
                    ("p12", "CTC.lot_number", Some("p10"), &[("V", "12345")]),
                    ("p13", "OBS", Some("p10"), &[]),
                    ("p14", "OBS.observation_id", Some("p13"), &[("V", "GLU"), ("SN", "ABT")]),
                    ("p15", "OBS.value", Some("p13"), &[("V", "100"), ("U", "mg/dL")]),
                    ("p16", "OBS.status_cd", Some("p13"), &[("V", "U")]),
                    ("p17", "OPR", Some("p6"), &[]),
                    ("p18", "OPR.operator_id", Some("p17"), &[("V", "1001")]),
                    ("p19", "RGT", Some("p6"), &[]),
                    ("p20", "RGT.name", Some("p19"), &[("V", "Cartridge CG4+")]),
                    ("p21", "RGT.lot_number", Some("p19"), &[("V", "M12345")]),
                ],
            ),
            preset(
                "poct1a_patient_result",
                "POCT1-A Patient Result (OBS.R01)",
                format,
                &[
                    ("p1", "OBS.R01", None, &[]),
                    ("p2", "HDR", Some("p1"), &[]),
                    ("p3", "HDR.control_id", Some("p2"), &[("V", "MSG001")]),
                    ("p4", "HDR.version_id", Some("p2"), &[("V", "POCT1")]),
                    ("p5", "SVC", Some("p1"), &[]),
                    ("p6", "SVC.role_cd", Some("p5"), &[("V", "PAT")]),
                    ("p7", "SBJ", Some("p5"), &[]),
                    ("p8", "OBS", Some("p5"), &[]),
                    ("p9", "OBS.observation_id", Some("p8"), &[("V", "GLU")]),
                    ("p10", "OBS.value", Some("p8"), &[("V", "95"), ("U", "mg/dL")]),
                ],
            ),
        ],
        MessageFormat::XmlRequest | MessageFormat::XmlResult => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NodeStore;

    #[test]
    fn test_every_preset_is_a_valid_tree() {
        for format in MessageFormat::ALL {
            for template in presets(format) {
                assert!(template.builtin);
                assert_eq!(template.format, format);
                NodeStore::from_snapshot(template.nodes.clone()).unwrap();
            }
        }
    }

    #[test]
    fn test_preset_sizes() {
        assert_eq!(presets(MessageFormat::Astm)[0].nodes.len(), 5);
        assert_eq!(presets(MessageFormat::Hl7).len(), 2);
        let poct = presets(MessageFormat::Poct1a);
        assert_eq!(poct[0].nodes.len(), 21);
        assert_eq!(poct[1].nodes.len(), 10);
        assert!(presets(MessageFormat::XmlResult).is_empty());
    }

    #[test]
    fn test_numeric_names_become_positions() {
        let astm = &presets(MessageFormat::Astm)[0];
        let header = &astm.nodes.nodes()[0];
        assert_eq!(header.positional_value(5), Some("Analyzer"));
        assert_eq!(header.fields[0], Field::positional(1, "1"));
    }
}
