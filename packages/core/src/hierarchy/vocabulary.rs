//! Controlled record/segment/element vocabularies per format

use serde::Serialize;
use std::sync::OnceLock;

/// Tag used for user-named POCT1-A nodes
pub const CUSTOM_TYPE: &str = "CUSTOM";

/// One entry of a format's vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordType {
    pub value: String,
    pub label: String,
    pub allows_children: bool,
    pub is_root: bool,
    pub is_custom: bool,
}

impl RecordType {
    fn flat(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: format!("{value} - {label}"),
            allows_children: false,
            is_root: false,
            is_custom: false,
        }
    }

    fn container(value: &str, label: &str) -> Self {
        Self {
            allows_children: true,
            ..Self::flat(value, label)
        }
    }

    fn message(value: &str, label: &str) -> Self {
        Self {
            is_root: true,
            ..Self::container(value, label)
        }
    }

    /// Entry for an element name taken from a loaded schema
    pub fn schema_element(name: &str, allows_children: bool) -> Self {
        Self {
            value: name.to_string(),
            label: name.to_string(),
            allows_children,
            is_root: false,
            is_custom: false,
        }
    }
}

const ASTM_RECORDS: &[(&str, &str)] = &[
    ("H", "Header"),
    ("P", "Patient"),
    ("O", "Order"),
    ("R", "Result"),
    ("C", "Comment"),
    ("Q", "Query"),
    ("M", "Manufacturer"),
    ("S", "Scientific"),
    ("L", "Terminator"),
];

const HL7_SEGMENTS: &[(&str, &str)] = &[
    ("MSH", "Message Header"),
    ("MSA", "Message Acknowledgment"),
    ("ERR", "Error"),
    ("EVN", "Event Type"),
    ("PID", "Patient Identification"),
    ("PD1", "Patient Additional Demographic"),
    ("NK1", "Next of Kin"),
    ("PV1", "Patient Visit"),
    ("PV2", "Patient Visit Additional"),
    ("MRG", "Merge Patient Information"),
    ("ORC", "Common Order"),
    ("OBR", "Observation Request"),
    ("OBX", "Observation/Result"),
    ("NTE", "Notes and Comments"),
    ("TQ1", "Timing/Quantity"),
    ("TQ2", "Timing/Quantity Relationship"),
    ("RXA", "Pharmacy Administration"),
    ("RXC", "Pharmacy Component"),
    ("RXD", "Pharmacy Dispense"),
    ("RXE", "Pharmacy Encoded Order"),
    ("RXG", "Pharmacy Give"),
    ("RXO", "Pharmacy Prescription"),
    ("RXR", "Pharmacy Route"),
    ("FT1", "Financial Transaction"),
    ("DG1", "Diagnosis"),
    ("GT1", "Guarantor"),
    ("IN1", "Insurance"),
    ("IN2", "Insurance Additional"),
    ("IN3", "Insurance Additional Info"),
    ("SCH", "Scheduling Activity"),
    ("AIS", "Appointment Information"),
    ("AIG", "Appointment Information General"),
    ("AIL", "Appointment Information Location"),
    ("AIP", "Appointment Information Personnel"),
    ("MFI", "Master File Identification"),
    ("MFE", "Master File Entry"),
    ("QRD", "Query Definition"),
    ("QRF", "Query Filter"),
    ("QPD", "Query Parameter Definition"),
    ("RCP", "Response Control Parameter"),
    ("AL1", "Allergy Information"),
    ("DRG", "Diagnosis Related Group"),
    ("PR1", "Procedures"),
    ("ROL", "Role"),
    ("SPM", "Specimen"),
    ("SAC", "Specimen Container"),
    ("TXA", "Transcription Document Header"),
    ("BTS", "Batch Trailer"),
    ("FHS", "File Header"),
    ("FTS", "File Trailer"),
    ("BHS", "Batch Header"),
    ("DSC", "Continuation Pointer"),
    ("CTD", "Contact Data"),
    ("CTI", "Clinical Trial Identification"),
    ("SFT", "Software Segment"),
    ("UAC", "User Authentication Credential"),
];

const POCT1A_MESSAGES: &[(&str, &str)] = &[
    ("OBS.R02", "Observation Result (Device→DMS)"),
    ("OBS.R01", "Unsolicited Observation (Device→DMS)"),
    ("ACK.R01", "Acknowledgment"),
    ("DOR.R01", "Device Observation Request (DMS→Device)"),
    ("ESU.U01", "Device Status Update"),
    ("EAC.U07", "Device Action Request"),
    ("TCU.U10", "Topic Configuration Update"),
    ("INR.U14", "Inventory Request"),
    ("HLO", "Hello Message (Device→DMS)"),
    ("END", "End Session Message"),
];

/// Segments; `false` marks the ones that cannot nest anything
const POCT1A_SEGMENTS: &[(&str, &str, bool)] = &[
    ("HDR", "Header (Message Header)", true),
    ("DEV", "Device Identification", true),
    ("OPR", "Operator", true),
    ("SBJ", "Subject/Patient", true),
    ("SPC", "Specimen", true),
    ("ORD", "Order (Test Order)", true),
    ("OBS", "Observation (Test Result)", true),
    ("CTC", "Control (QC Material)", true),
    ("CAL", "Calibration", true),
    ("RGT", "Reagent/Consumable", true),
    ("ENV", "Environment Conditions", true),
    ("STS", "Status", true),
    ("NTE", "Note/Comment", false),
    ("ERR", "Error", true),
    ("SVC", "Service", true),
    ("INV", "Inventory", true),
    ("CFG", "Configuration", true),
    ("ACT", "Action", true),
    ("ACC", "Access Control", true),
    ("CAP", "Device Capabilities", true),
    ("TPC", "Topic", true),
    ("LST", "List (Operator/Patient)", true),
    ("EVT", "Device Event", true),
];

const POCT1A_ELEMENTS: &[(&str, &str)] = &[
    ("HDR.control_id", "Message Control ID"),
    ("HDR.version_id", "Protocol Version"),
    ("HDR.creation_dttm", "Creation Date/Time"),
    ("HDR.character_set", "Character Set"),
    ("HDR.sending_device", "Sending Device ID"),
    ("HDR.receiving_device", "Receiving Device ID"),
    ("HDR.processing_id", "Processing ID (T/D/P)"),
    ("DEV.device_id", "Device Identifier (EUI-64)"),
    ("DEV.device_type", "Device Type"),
    ("DEV.vendor_id", "Vendor Identifier"),
    ("DEV.manufacturer", "Manufacturer"),
    ("DEV.model", "Model Name"),
    ("DEV.model_id", "Model Identifier"),
    ("DEV.serial_nbr", "Serial Number"),
    ("DEV.serial_id", "Serial Identifier"),
    ("DEV.software_version", "Software Version"),
    ("DEV.firmware_version", "Firmware Version"),
    ("DEV.condition_cd", "Device Condition Code"),
    ("OPR.operator_id", "Operator ID"),
    ("OPR.operator_name", "Operator Name"),
    ("OPR.role_cd", "Role Code"),
    ("OPR.permission_level_cd", "Permission Level"),
    ("OPR.password", "Password"),
    ("OPR.expiration_dttm", "Expiration Date"),
    ("SBJ.patient_id", "Patient ID"),
    ("SBJ.patient_name", "Patient Name"),
    ("SBJ.birth_dttm", "Birth Date"),
    ("SBJ.gender_cd", "Gender Code"),
    ("SBJ.location", "Patient Location"),
    ("SBJ.account_nbr", "Account Number"),
    ("SBJ.medical_record_nbr", "Medical Record Number"),
    ("SPC.specimen_id", "Specimen ID"),
    ("SPC.specimen_type", "Specimen Type"),
    ("SPC.collection_dttm", "Collection Date/Time"),
    ("SPC.source_cd", "Specimen Source"),
    ("SPC.body_site", "Body Site"),
    ("SPC.action_cd", "Specimen Action Code"),
    ("ORD.order_id", "Order ID"),
    ("ORD.accession_nbr", "Accession Number"),
    ("ORD.test_cd", "Test Code"),
    ("ORD.priority_cd", "Priority Code"),
    ("ORD.order_control", "Order Control Code"),
    ("ORD.ordering_provider", "Ordering Provider"),
    ("OBS.observation_id", "Observation ID"),
    ("OBS.value", "Result Value"),
    ("OBS.value_type", "Value Type (ST/NM/CE)"),
    ("OBS.units", "Units"),
    ("OBS.observation_dttm", "Observation Date/Time"),
    ("OBS.method_cd", "Method Code"),
    ("OBS.status_cd", "Status Code (F/P/C)"),
    ("OBS.reference_range", "Reference Range"),
    ("OBS.interpretation_cd", "Interpretation Code"),
    ("OBS.abnormal_flag", "Abnormal Flag (H/L/N)"),
    ("OBS.loinc_cd", "LOINC Code"),
    ("OBS.equipment_id", "Equipment Instance ID"),
    ("OBS.responsible_observer", "Responsible Observer"),
    ("CTC.control_id", "Control ID"),
    ("CTC.name", "Control Name"),
    ("CTC.lot_nbr", "Lot Number"),
    ("CTC.material_lot_number", "Material Lot Number"),
    ("CTC.expiration_dttm", "Expiration Date"),
    ("CTC.level_cd", "Level Code"),
    ("CTC.expected_value", "Expected Value"),
    ("CTC.target_range", "Target Range"),
    ("CTC.manufacturer", "Manufacturer"),
    ("CAL.calibration_id", "Calibration ID"),
    ("CAL.calibration_dttm", "Calibration Date/Time"),
    ("CAL.lot_nbr", "Calibrator Lot Number"),
    ("CAL.expiration_dttm", "Expiration Date"),
    ("CAL.status_cd", "Calibration Status"),
    ("CAL.slope", "Calibration Slope"),
    ("CAL.intercept", "Calibration Intercept"),
    ("RGT.reagent_id", "Reagent ID"),
    ("RGT.name", "Reagent Name"),
    ("RGT.lot_nbr", "Lot Number"),
    ("RGT.expiration_dttm", "Expiration Date"),
    ("RGT.quantity", "Quantity Remaining"),
    ("RGT.manufacturer", "Manufacturer"),
    ("RGT.catalog_nbr", "Catalog Number"),
    ("ENV.temperature", "Temperature"),
    ("ENV.humidity", "Humidity"),
    ("ENV.pressure", "Atmospheric Pressure"),
    ("STS.status_cd", "Status Code"),
    ("STS.status_dttm", "Status Date/Time"),
    ("STS.reason_cd", "Reason Code"),
    ("STS.condition_cd", "Condition Code (R/B/E)"),
    ("ERR.error_cd", "Error Code"),
    ("ERR.error_msg", "Error Message"),
    ("ERR.severity_cd", "Severity Code"),
    ("SVC.role_cd", "Role Code (PAT/LQC/AQC)"),
    ("SVC.observation_dttm", "Observation Date/Time"),
    ("SVC.status_cd", "Status Code"),
    ("SVC.reason_cd", "Reason Code"),
    ("SVC.sequence_nbr", "Sequence Number"),
    ("ACC.permission_level_cd", "Permission Level Code"),
    ("ACC.access_type", "Access Type"),
    ("ACC.effective_dttm", "Effective Date/Time"),
    ("ACC.expiration_dttm", "Expiration Date/Time"),
    ("CAP.max_message_sz", "Max Message Size (bytes)"),
    ("CAP.supported_topics", "Supported Topics"),
    ("CAP.supported_services", "Supported Services"),
    ("CAP.protocol_version", "Protocol Version"),
    ("TPC.topic_id", "Topic Identifier"),
    ("TPC.update_dttm", "Last Update Date/Time"),
    ("TPC.observations_update_dttm", "Observations Update Time"),
    ("TPC.operator_list_update_dttm", "Operator List Update Time"),
    ("TPC.patient_list_update_dttm", "Patient List Update Time"),
    ("LST.list_type", "List Type (OPR/PAT)"),
    ("LST.list_id", "List Identifier"),
    ("LST.update_dttm", "Update Date/Time"),
    ("LST.item_count", "Item Count"),
    ("EVT.event_type", "Event Type"),
    ("EVT.event_dttm", "Event Date/Time"),
    ("EVT.event_cd", "Event Code"),
    ("EVT.event_msg", "Event Message"),
    ("INV.item_id", "Item Identifier"),
    ("INV.item_type", "Item Type"),
    ("INV.quantity", "Quantity"),
    ("INV.status_cd", "Inventory Status"),
    ("CFG.config_id", "Configuration ID"),
    ("CFG.config_value", "Configuration Value"),
    ("CFG.config_type", "Configuration Type"),
    ("ACT.action_id", "Action Identifier"),
    ("ACT.action_type", "Action Type"),
    ("ACT.action_dttm", "Action Date/Time"),
    ("ACT.action_status", "Action Status"),
    ("NTE.text", "Note Text"),
    ("NTE.source_cd", "Source Code"),
    ("NTE.set_id", "Set ID"),
    ("ACK.ack_cd", "Acknowledgment Code (AA/AE/AR)"),
    ("ACK.message_control_id", "Referenced Message ID"),
    ("ACK.text_message", "Text Message"),
    ("ACK.error_cd", "Error Code"),
];

pub fn astm() -> &'static [RecordType] {
    static TYPES: OnceLock<Vec<RecordType>> = OnceLock::new();
    TYPES.get_or_init(|| {
        ASTM_RECORDS
            .iter()
            .map(|(value, label)| RecordType::flat(value, label))
            .collect()
    })
}

pub fn hl7() -> &'static [RecordType] {
    static TYPES: OnceLock<Vec<RecordType>> = OnceLock::new();
    TYPES.get_or_init(|| {
        HL7_SEGMENTS
            .iter()
            .map(|(value, label)| RecordType::flat(value, label))
            .collect()
    })
}

/// Message types, then segments, then segment elements, then `CUSTOM`
pub fn poct1a() -> &'static [RecordType] {
    static TYPES: OnceLock<Vec<RecordType>> = OnceLock::new();
    TYPES.get_or_init(|| {
        let messages = POCT1A_MESSAGES
            .iter()
            .map(|(value, label)| RecordType::message(value, label));
        let segments = POCT1A_SEGMENTS.iter().map(|(value, label, nests)| {
            if *nests {
                RecordType::container(value, label)
            } else {
                RecordType::flat(value, label)
            }
        });
        let elements = POCT1A_ELEMENTS
            .iter()
            .map(|(value, label)| RecordType::flat(value, label));
        let custom = RecordType {
            value: CUSTOM_TYPE.to_string(),
            label: "Custom Node".to_string(),
            allows_children: true,
            is_root: false,
            is_custom: true,
        };

        messages
            .chain(segments)
            .chain(elements)
            .chain(std::iter::once(custom))
            .collect()
    })
}

/// Allowed children for the POCT1-A parents with an explicit nesting rule
pub fn poct1a_rule(parent_type: &str) -> Option<&'static [&'static str]> {
    let children: &'static [&'static str] = match parent_type {
        "OBS.R02" | "OBS.R01" | "ACK.R01" | "DOR.R01" => &["HDR", "SVC"],
        "HDR" => &["HDR.control_id", "HDR.version_id", "HDR.creation_dttm"],
        "SVC" => &[
            "SVC.role_cd",
            "SVC.observation_dttm",
            "SVC.status_cd",
            "SVC.reason_cd",
            "SVC.sequence_nbr",
            "CTC",
            "OPR",
            "RGT",
            "ENV",
            "SBJ",
            "SPC",
            "OBS",
            "NTE",
        ],
        "CTC" => &[
            "CTC.name",
            "CTC.lot_number",
            "CTC.expiration_date",
            "CTC.level_cd",
            "OBS",
            "ISC",
            "NTE",
        ],
        "OBS" => &[
            "OBS.observation_id",
            "OBS.value",
            "OBS.method_cd",
            "OBS.status_cd",
            "OBS.normal_lo-hi_limit",
            "NTE",
        ],
        "OPR" => &["OPR.operator_id"],
        "RGT" => &["RGT.name", "RGT.lot_number", "RGT.expiration_date"],
        "ENV" | "SBJ" | "SPC" | "DVC" => &[],
        "NTE" => &["NTE.text"],
        _ => return None,
    };
    Some(children)
}
