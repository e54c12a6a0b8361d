//! Hierarchy Resolution
//!
//! Answers "which node types may go here?" for every format. The answer is
//! advisory: it drives the choices an editor offers, while the tree
//! operations themselves accept any type.
//!
//! # Sources
//!
//! - **ASTM / HL7**: flat, so every vocabulary entry is always offered
//! - **POCT1-A**: fixed nesting rules, with the whole non-root vocabulary
//!   as the fallback for parents that have no rule, and `CUSTOM` legal
//!   everywhere
//! - **Generic XML**: the loaded XSD's per-element child lists; elements
//!   the schema does not describe are unconstrained

pub mod vocabulary;

pub use vocabulary::{RecordType, CUSTOM_TYPE};

use crate::models::MessageFormat;
use crate::schema::SchemaMap;

/// Type name used when neither rules nor vocabulary suggest anything
pub const FALLBACK_TYPE: &str = "Element";

#[derive(Debug, Clone, Default)]
pub struct HierarchyResolver {
    schema: Option<SchemaMap>,
}

impl HierarchyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: SchemaMap) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    pub fn schema(&self) -> Option<&SchemaMap> {
        self.schema.as_ref()
    }

    pub fn set_schema(&mut self, schema: Option<SchemaMap>) {
        self.schema = schema;
    }

    /// Full vocabulary for a format
    ///
    /// The XML formats list the loaded schema's element names, or nothing
    /// when no schema is loaded.
    pub fn record_types(&self, format: MessageFormat) -> Vec<RecordType> {
        match format {
            MessageFormat::Astm => vocabulary::astm().to_vec(),
            MessageFormat::Hl7 => vocabulary::hl7().to_vec(),
            MessageFormat::Poct1a => vocabulary::poct1a().to_vec(),
            MessageFormat::XmlRequest | MessageFormat::XmlResult => match &self.schema {
                Some(schema) => schema
                    .names()
                    .map(|name| {
                        let nests = schema.children_of(name).is_some_and(|c| !c.is_empty());
                        RecordType::schema_element(name, nests)
                    })
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    /// Types that may be placed under `parent_type` (`None` = root level)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use smartmsg_core::hierarchy::HierarchyResolver;
    /// use smartmsg_core::models::MessageFormat;
    ///
    /// let resolver = HierarchyResolver::new();
    /// let allowed = resolver.allowed_child_types(MessageFormat::Poct1a, Some("OBS.R01"));
    /// assert_eq!(allowed, vec!["HDR", "SVC", "CUSTOM"]);
    /// ```
    pub fn allowed_child_types(
        &self,
        format: MessageFormat,
        parent_type: Option<&str>,
    ) -> Vec<String> {
        match format {
            MessageFormat::Astm | MessageFormat::Hl7 => values(self.record_types(format).iter()),
            MessageFormat::Poct1a => poct1a_children(parent_type),
            MessageFormat::XmlRequest | MessageFormat::XmlResult => {
                let Some(schema) = &self.schema else {
                    return Vec::new();
                };
                match parent_type.and_then(|parent| schema.children_of(parent)) {
                    Some(children) if !children.is_empty() => children.to_vec(),
                    _ => schema.names().map(str::to_string).collect(),
                }
            }
        }
    }

    /// Whether a node of `node_type` may have children in `format`
    ///
    /// Types outside the controlled vocabulary (user-named nodes, elements
    /// the schema does not cover) are allowed to nest.
    pub fn can_have_children(&self, format: MessageFormat, node_type: &str) -> bool {
        match format {
            MessageFormat::Astm | MessageFormat::Hl7 => false,
            MessageFormat::Poct1a => vocabulary::poct1a()
                .iter()
                .find(|t| t.value == node_type)
                .map_or(true, |t| t.allows_children),
            MessageFormat::XmlRequest | MessageFormat::XmlResult => self
                .schema
                .as_ref()
                .and_then(|schema| schema.children_of(node_type))
                .map_or(true, |children| !children.is_empty()),
        }
    }

    /// Type a freshly added node gets by default under `parent_type`
    ///
    /// First allowed child, else the first vocabulary entry, else
    /// [`FALLBACK_TYPE`].
    pub fn default_child_type(&self, format: MessageFormat, parent_type: Option<&str>) -> String {
        self.allowed_child_types(format, parent_type)
            .into_iter()
            .next()
            .or_else(|| {
                self.record_types(format)
                    .into_iter()
                    .next()
                    .map(|t| t.value)
            })
            .unwrap_or_else(|| FALLBACK_TYPE.to_string())
    }
}

fn values<'a>(types: impl Iterator<Item = &'a RecordType>) -> Vec<String> {
    types.map(|t| t.value.clone()).collect()
}

fn poct1a_children(parent_type: Option<&str>) -> Vec<String> {
    let vocab = vocabulary::poct1a();
    match parent_type {
        None => {
            let mut types = values(vocab.iter().filter(|t| t.is_root));
            types.push(CUSTOM_TYPE.to_string());
            types
        }
        Some(parent) => match vocabulary::poct1a_rule(parent) {
            Some(rule) if !rule.is_empty() => {
                let mut types: Vec<String> = rule.iter().map(|t| t.to_string()).collect();
                if !rule.contains(&CUSTOM_TYPE) {
                    types.push(CUSTOM_TYPE.to_string());
                }
                types
            }
            // Unmapped and leaf-only parents are unconstrained
            _ => values(vocab.iter().filter(|t| !t.is_root)),
        },
    }
}
