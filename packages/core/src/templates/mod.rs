//! Message Templates
//!
//! A template is a named snapshot of a tree in one format. Built-in presets
//! cover the common message shapes; user templates are captured from a
//! document. Persisting templates is left to the caller, which gets plain
//! JSON with a size ceiling enforced here.

mod presets;

pub use presets::presets;

use crate::models::{MessageFormat, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TemplateError {
    /// Serialized form exceeds the storage ceiling
    #[error("Template data is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Template serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique key (`template_<uuid>` for user templates)
    pub key: String,
    pub name: String,
    pub format: MessageFormat,
    pub created_at: DateTime<Utc>,
    /// Shipped with the library rather than saved by a user
    #[serde(default)]
    pub builtin: bool,
    pub nodes: Snapshot,
}

impl Template {
    /// New user template with a freshly minted key
    pub fn new(name: impl Into<String>, format: MessageFormat, nodes: Snapshot) -> Self {
        Self {
            key: format!("template_{}", Uuid::new_v4()),
            name: name.into(),
            format,
            created_at: Utc::now(),
            builtin: false,
            nodes,
        }
    }

    /// Serialize, rejecting output larger than `max_bytes`
    pub fn to_json(&self, max_bytes: usize) -> Result<String, TemplateError> {
        limit(serde_json::to_string(self)?, max_bytes)
    }

    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Serialize a whole template collection under one size ceiling
pub fn collection_to_json(templates: &[Template], max_bytes: usize) -> Result<String, TemplateError> {
    limit(serde_json::to_string(templates)?, max_bytes)
}

pub fn collection_from_json(json: &str) -> Result<Vec<Template>, TemplateError> {
    Ok(serde_json::from_str(json)?)
}

fn limit(json: String, max_bytes: usize) -> Result<String, TemplateError> {
    if json.len() > max_bytes {
        return Err(TemplateError::TooLarge {
            size: json.len(),
            limit: max_bytes,
        });
    }
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Node, NodeId};

    fn sample() -> Template {
        Template::new(
            "Glucose QC",
            MessageFormat::Astm,
            Snapshot::new(vec![Node::new(
                NodeId::from("node_1"),
                "H".to_string(),
                vec![Field::positional(1, "1")],
                None,
            )]),
        )
    }

    #[test]
    fn test_fresh_keys() {
        let a = sample();
        let b = sample();
        assert!(a.key.starts_with("template_"));
        assert_ne!(a.key, b.key);
        assert!(!a.builtin);
    }

    #[test]
    fn test_json_round_trip() {
        let template = sample();
        let json = template.to_json(1024 * 1024).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert_eq!(Template::from_json(&json).unwrap(), template);
    }

    #[test]
    fn test_size_ceiling() {
        let template = sample();
        let err = template.to_json(16).unwrap_err();
        assert!(matches!(err, TemplateError::TooLarge { limit: 16, .. }));

        let all = vec![sample(), sample()];
        assert!(collection_to_json(&all, 16).is_err());
        let json = collection_to_json(&all, 1 << 20).unwrap();
        assert_eq!(collection_from_json(&json).unwrap().len(), 2);
    }
}
