//! Message format tags

use crate::codec::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of wire formats a document can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageFormat {
    Astm,
    Hl7,
    Poct1a,
    XmlRequest,
    XmlResult,
}

impl MessageFormat {
    pub const ALL: [MessageFormat; 5] = [
        MessageFormat::Astm,
        MessageFormat::Hl7,
        MessageFormat::Poct1a,
        MessageFormat::XmlRequest,
        MessageFormat::XmlResult,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            MessageFormat::Astm => "astm",
            MessageFormat::Hl7 => "hl7",
            MessageFormat::Poct1a => "poct1a",
            MessageFormat::XmlRequest => "xml_request",
            MessageFormat::XmlResult => "xml_result",
        }
    }

    /// Badge text, e.g. "XML REQUEST"
    pub fn display_name(&self) -> String {
        self.tag().to_uppercase().replace('_', " ")
    }

    /// Whether nodes nest under non-root parents in this format
    pub fn is_hierarchical(&self) -> bool {
        matches!(
            self,
            MessageFormat::Poct1a | MessageFormat::XmlRequest | MessageFormat::XmlResult
        )
    }

    /// Whether the vocabulary comes from a loaded XSD schema
    pub fn is_schema_driven(&self) -> bool {
        matches!(self, MessageFormat::XmlRequest | MessageFormat::XmlResult)
    }

    pub fn file_extensions(&self) -> &'static [&'static str] {
        match self {
            MessageFormat::Astm => &["astm", "txt"],
            MessageFormat::Hl7 => &["hl7", "txt"],
            MessageFormat::Poct1a => &["poct1a", "xml", "txt"],
            MessageFormat::XmlRequest | MessageFormat::XmlResult => &["xml"],
        }
    }

    /// Case-insensitive extension check, with or without the leading dot
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.file_extensions().iter().any(|e| *e == ext)
    }

    /// Formats in the same group can exchange trees without reshaping
    pub fn is_compatible_with(&self, other: MessageFormat) -> bool {
        self.compatibility_group() == other.compatibility_group()
    }

    fn compatibility_group(&self) -> u8 {
        match self {
            MessageFormat::Astm => 0,
            MessageFormat::Hl7 => 1,
            MessageFormat::Poct1a | MessageFormat::XmlRequest | MessageFormat::XmlResult => 2,
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MessageFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageFormat::ALL
            .into_iter()
            .find(|format| format.tag() == s.trim())
            .ok_or_else(|| CodecError::unknown_format(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for format in MessageFormat::ALL {
            assert_eq!(format.tag().parse::<MessageFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let err = "edifact".parse::<MessageFormat>().unwrap_err();
        assert!(matches!(err, CodecError::UnknownFormat { .. }));
        assert_eq!(err.to_string(), "Unknown message format: edifact");
    }

    #[test]
    fn test_hierarchical_formats() {
        assert!(!MessageFormat::Astm.is_hierarchical());
        assert!(!MessageFormat::Hl7.is_hierarchical());
        assert!(MessageFormat::Poct1a.is_hierarchical());
        assert!(MessageFormat::XmlRequest.is_hierarchical());
        assert!(MessageFormat::XmlResult.is_hierarchical());
    }

    #[test]
    fn test_extensions() {
        assert!(MessageFormat::Hl7.accepts_extension(".HL7"));
        assert!(MessageFormat::Poct1a.accepts_extension("xml"));
        assert!(!MessageFormat::XmlResult.accepts_extension("txt"));
    }

    #[test]
    fn test_compatibility_groups() {
        assert!(MessageFormat::Poct1a.is_compatible_with(MessageFormat::XmlResult));
        assert!(!MessageFormat::Astm.is_compatible_with(MessageFormat::Hl7));
        assert!(MessageFormat::Hl7.is_compatible_with(MessageFormat::Hl7));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(MessageFormat::XmlRequest.display_name(), "XML REQUEST");
        assert_eq!(MessageFormat::Poct1a.display_name(), "POCT1A");
    }
}
