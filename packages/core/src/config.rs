//! Configuration for a message builder document

use crate::models::MessageFormat;
use serde::{Deserialize, Serialize};

/// Default ceiling for a serialized template collection (5 MiB)
const DEFAULT_MAX_TEMPLATE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Number of undo steps kept before the oldest is dropped
    pub max_undo_depth: usize,

    /// Largest template JSON accepted for export
    pub max_template_bytes: usize,

    /// Document elements the XML parsers unwrap, promoting their children
    /// to roots
    pub xml_wrapper_tags: Vec<String>,

    /// Format a new document starts in
    pub default_format: MessageFormat,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: crate::history::DEFAULT_UNDO_DEPTH,
            max_template_bytes: DEFAULT_MAX_TEMPLATE_BYTES,
            xml_wrapper_tags: ["Request", "Result", "POCT1A", "root"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_format: MessageFormat::Astm,
        }
    }
}

impl BuilderConfig {
    /// Parse a JSON configuration, filling unspecified keys with defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid configuration: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_undo_depth == 0 {
            return Err("max_undo_depth must be greater than 0".to_string());
        }

        if self.max_template_bytes == 0 {
            return Err("max_template_bytes must be greater than 0".to_string());
        }

        if self.xml_wrapper_tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err("xml_wrapper_tags cannot contain empty names".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.max_undo_depth, 50);
        assert_eq!(config.max_template_bytes, 5 * 1024 * 1024);
        assert_eq!(config.xml_wrapper_tags, vec!["Request", "Result", "POCT1A", "root"]);
        assert_eq!(config.default_format, MessageFormat::Astm);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BuilderConfig::default();

        config.max_undo_depth = 0;
        assert!(config.validate().is_err());

        config.max_undo_depth = 10;
        config.max_template_bytes = 0;
        assert!(config.validate().is_err());

        config.max_template_bytes = 1024;
        config.xml_wrapper_tags.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json() {
        let config =
            BuilderConfig::from_json(r#"{"max_undo_depth": 5, "default_format": "hl7"}"#).unwrap();
        assert_eq!(config.max_undo_depth, 5);
        assert_eq!(config.default_format, MessageFormat::Hl7);
        assert_eq!(config.xml_wrapper_tags.len(), 4);

        assert!(BuilderConfig::from_json(r#"{"max_undo_depth": 0}"#).is_err());
        assert!(BuilderConfig::from_json("not json").is_err());
    }
}
